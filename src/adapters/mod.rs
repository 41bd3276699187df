//! Source-language adapters
//!
//! An adapter is the only place raw syntax is inspected. It emits
//! normalized `RawDeclaration` records; everything downstream (extraction
//! policy, classification, cataloging) is language-agnostic.

pub mod python;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::scanner::parser::ParsedSource;

/// One parameter as declared in the source, before semantic mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    pub name: String,
    pub annotation: Option<String>,
    pub has_default: bool,
}

/// One top-level function as the adapter saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    pub name: String,
    pub line: u32,
    pub is_invocable: bool,
    pub allows_anonymous: bool,
    pub parameters: Vec<RawParameter>,
    pub docstring: String,
}

pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;
    fn file_extensions(&self) -> &[&'static str];
    fn language(&self) -> tree_sitter::Language;

    /// Cheap syntactic probe, checked before parsing: does this source
    /// plausibly contain function definitions at all?
    fn has_declarations(&self, source: &str) -> bool;

    /// Emits a record for every top-level function in the parsed source,
    /// receiver parameters already dropped.
    fn extract(&self, parsed: &ParsedSource) -> Vec<RawDeclaration>;
}

#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn SourceAdapter>>,
    extension_map: HashMap<String, String>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            adapters: HashMap::new(),
            extension_map: HashMap::new(),
        };

        registry.register(Arc::new(python::PythonAdapter));

        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        let name = adapter.name().to_string();
        for ext in adapter.file_extensions() {
            self.extension_map.insert(ext.to_string(), name.clone());
        }
        self.adapters.insert(name, adapter);
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.extension_map
            .get(ext)
            .and_then(|name| self.adapters.get(name))
            .cloned()
    }

    pub fn get_for_file(&self, path: &Path) -> Option<Arc<dyn SourceAdapter>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.get_for_file(path).is_some()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
