//! Line diff for `generate --dry-run`

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Keep,
    Remove,
    Add,
}

impl Op {
    fn marker(self) -> char {
        match self {
            Op::Keep => ' ',
            Op::Remove => '-',
            Op::Add => '+',
        }
    }
}

/// Unified diff of `old` against `new`, as a single hunk.
///
/// Dockerfiles are small, so a full LCS table is fine.
pub fn unified(old: &str, new: &str, file_path: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let ops = diff_lines(&old_lines, &new_lines);

    let old_count = ops.iter().filter(|(op, _)| *op != Op::Add).count().max(1);
    let new_count = ops.iter().filter(|(op, _)| *op != Op::Remove).count().max(1);

    let mut out = String::new();
    out.push_str(&format!("--- {} (old)\n", file_path));
    out.push_str(&format!("+++ {} (new)\n", file_path));
    out.push_str(&format!("@@ -1,{} +1,{} @@\n", old_count, new_count));
    for (op, line) in ops {
        out.push(op.marker());
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn diff_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<(Op, &'a str)> {
    let (m, n) = (old.len(), new.len());

    // lcs[i][j]: longest common subsequence of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if old[i] == new[j] {
            ops.push((Op::Keep, old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push((Op::Remove, old[i]));
            i += 1;
        } else {
            ops.push((Op::Add, new[j]));
            j += 1;
        }
    }
    ops.extend(old[i..].iter().map(|l| (Op::Remove, *l)));
    ops.extend(new[j..].iter().map(|l| (Op::Add, *l)));
    ops
}
