//! CLI integration tests
//!
//! These tests run the built binary against throwaway repositories and check:
//! - Dockerfile generation and dry-run diffs
//! - Inspect output formats
//! - Legacy single-dash flags
//! - Error handling and exit codes

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled binary
fn generator_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dockerfile-generator"))
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("No parent")).expect("Failed to create directory");
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// A git repository with an API project referencing a library
fn create_dotnet_repo() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path();
    fs::create_dir_all(root.join(".git")).expect("Failed to create .git");

    write(root, "nuget.config", "<configuration/>");
    write(root, "Directory.Build.props", "<Project/>");
    write(
        root,
        "src/Api/Api.csproj",
        r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Core\Core.csproj" />
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>
</Project>"#,
    );
    write(
        root,
        "src/Core/Core.csproj",
        r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup></Project>"#,
    );
    dir
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(generator_bin())
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute dockerfile-generator")
}

#[test]
fn test_cli_help() {
    let output = Command::new(generator_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute dockerfile-generator");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("inspect"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(generator_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute dockerfile-generator");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_generate_writes_dockerfile() {
    let repo = create_dotnet_repo();
    let output = run(&["-q", "generate", "--path", "src/Api/Api.csproj"], repo.path());
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let dockerfile = fs::read_to_string(repo.path().join("src/Api/Dockerfile"))
        .expect("Dockerfile should be written next to the project");
    assert!(dockerfile.contains("ARG TARGET_DOTNET_VERSION=8.0"));
    assert!(dockerfile.contains(r#"COPY ["nuget.config", "./"]"#));
    assert!(dockerfile.contains(r#"COPY ["Directory.Build.props", "./"]"#));
    assert!(dockerfile.contains(r#"COPY ["src/Core/Core.csproj", "src/Core/"]"#));
    assert!(dockerfile.contains(r#"ENTRYPOINT ["dotnet", "Api.dll"]"#));
}

#[test]
fn test_generate_from_directory_with_custom_name() {
    let repo = create_dotnet_repo();
    let output = run(
        &["-q", "generate", "--path", "src/Api", "--dockerfile", "Dockerfile.api"],
        repo.path(),
    );
    assert!(output.status.success());
    assert!(repo.path().join("src/Api/Dockerfile.api").is_file());
}

#[test]
fn test_generate_uses_dockerbuild_config() {
    let repo = create_dotnet_repo();
    write(
        repo.path(),
        ".dockerbuild",
        "dotnet:\n  application-entrypoint: Custom.dll\nfinal:\n  run:\n    - adduser -D app\n",
    );

    let output = run(&["-q", "generate", "--path", "src/Api"], repo.path());
    assert!(output.status.success());

    let dockerfile = fs::read_to_string(repo.path().join("src/Api/Dockerfile")).unwrap();
    assert!(dockerfile.contains("RUN adduser -D app\nENTRYPOINT [\"dotnet\", \"Custom.dll\"]"));
}

#[test]
fn test_dry_run_prints_diff_without_writing() {
    let repo = create_dotnet_repo();
    let output = run(&["-q", "generate", "--path", "src/Api", "--dry-run"], repo.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("--- Dockerfile (old)\n+++ Dockerfile (new)\n"));
    assert!(stdout.contains("+ARG TARGET_DOTNET_VERSION=8.0"));
    assert!(!repo.path().join("src/Api/Dockerfile").exists());
}

#[test]
fn test_dry_run_against_current_file_has_no_changes() {
    let repo = create_dotnet_repo();
    assert!(run(&["-q", "generate", "--path", "src/Api"], repo.path())
        .status
        .success());

    let output = run(&["-q", "generate", "--path", "src/Api", "--dry-run"], repo.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout
        .lines()
        .skip(3)
        .all(|l| !l.starts_with('+') && !l.starts_with('-')));
}

#[test]
fn test_legacy_flags() {
    let repo = create_dotnet_repo();
    let output = run(
        &["generate", "-path", "src/Api/Api.csproj", "-dry-run=true", "-q"],
        repo.path(),
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("+++ Dockerfile (new)"));
}

#[test]
fn test_inspect_json() {
    let repo = create_dotnet_repo();
    let output = run(
        &["-q", "inspect", "--path", "src/Api", "--format", "json"],
        repo.path(),
    );
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("inspect output should be JSON");
    assert_eq!(report["language"], "dotnet");
    assert_eq!(report["project"], "src/Api/Api.csproj");
    assert_eq!(report["projects"].as_array().map(|p| p.len()), Some(2));
    assert_eq!(report["context_files"][0], "nuget.config");
}

#[test]
fn test_go_project() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    write(dir.path(), "svc/go.mod", "module example.com/svc\n\ngo 1.22\n");

    let output = run(&["-q", "generate", "--path", "svc"], dir.path());
    assert!(output.status.success());
    let dockerfile = fs::read_to_string(dir.path().join("svc/Dockerfile")).unwrap();
    assert!(dockerfile.contains("ARG GO_VERSION=1.22"));
    assert!(dockerfile.contains(r#"ENTRYPOINT ["/app/svc"]"#));
}

#[test]
fn test_circular_reference_fails() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    write(
        dir.path(),
        "A/A.csproj",
        r#"<Project><ItemGroup><ProjectReference Include="../B/B.csproj" /></ItemGroup></Project>"#,
    );
    write(
        dir.path(),
        "B/B.csproj",
        r#"<Project><ItemGroup><ProjectReference Include="../A/A.csproj" /></ItemGroup></Project>"#,
    );

    let output = run(&["-q", "generate", "--path", "A"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Circular project reference"));
    assert!(!dir.path().join("A/Dockerfile").exists());
}

#[test]
fn test_missing_repository_root_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "App/App.csproj", "<Project></Project>");

    let output = run(&["-q", "generate", "--path", "App"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cannot find repository root"));
}

#[test]
fn test_unknown_language_fails() {
    let repo = create_dotnet_repo();
    let output = run(
        &["-q", "generate", "--path", "src/Api", "--language", "cobol"],
        repo.path(),
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown language 'cobol'"));
}
