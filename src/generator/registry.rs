//! Generator registry

use super::Generator;
use crate::dotnet::DotnetGenerator;
use crate::golang::GoGenerator;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Generators in registration order
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: Vec<Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DotnetGenerator));
        registry.register(Arc::new(GoGenerator));
        registry
    }

    /// Adds `generator`, replacing one with the same name in place.
    pub fn register(&mut self, generator: Arc<dyn Generator>) {
        match self
            .generators
            .iter()
            .position(|g| g.name() == generator.name())
        {
            Some(idx) => self.generators[idx] = generator,
            None => self.generators.push(generator),
        }
    }

    /// Get generator by name
    pub fn get(&self, name: &str) -> Option<&dyn Generator> {
        self.generators
            .iter()
            .find(|g| g.name().eq_ignore_ascii_case(name))
            .map(|g| g.as_ref())
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Generator> + '_ {
        self.generators.iter().map(|g| g.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    /// First generator, in registration order, that detects `path`
    pub fn detect(&self, path: &Path) -> Option<&dyn Generator> {
        let found = self.all().find(|g| g.detect(path));
        debug!(
            path = %path.display(),
            generator = ?found.map(|g| g.name()),
            "Generator detection"
        );
        found
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
