use std::path::Path;
use std::sync::Arc;

use crate::adapters::{AdapterRegistry, SourceAdapter};
use crate::error::{Result, ScoutError};

pub struct SourceParser {
    registry: AdapterRegistry,
}

impl SourceParser {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedSource> {
        let adapter = self
            .registry
            .get_for_file(path)
            .ok_or_else(|| ScoutError::UnsupportedSource(path.display().to_string()))?;

        let source = std::fs::read_to_string(path)?;
        self.parse_source(&source, adapter)
    }

    pub fn parse_source(
        &self,
        source: &str,
        adapter: Arc<dyn SourceAdapter>,
    ) -> Result<ParsedSource> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&adapter.language())
            .map_err(|e| ScoutError::Parse(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ScoutError::Parse("failed to parse source".to_string()))?;

        Ok(ParsedSource {
            tree,
            source: source.to_string(),
            adapter,
        })
    }
}

pub struct ParsedSource {
    pub tree: tree_sitter::Tree,
    pub source: String,
    pub adapter: Arc<dyn SourceAdapter>,
}

impl std::fmt::Debug for ParsedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSource")
            .field("tree", &self.tree)
            .field("source", &self.source)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

impl ParsedSource {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }
}
