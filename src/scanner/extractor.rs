use std::path::{Component, Path};

use crate::adapters::{AdapterRegistry, RawDeclaration};
use crate::catalog::{Declaration, ParamType, ParameterSpec, Target};
use crate::error::{Result, ScoutError};
use crate::scanner::parser::SourceParser;

/// Extracts declarations from one source file at a time. Parse failures
/// are scoped to the file; the caller recovers with zero declarations.
pub struct DeclarationExtractor {
    registry: AdapterRegistry,
    parser: SourceParser,
}

impl DeclarationExtractor {
    pub fn new(registry: AdapterRegistry) -> Self {
        let parser = SourceParser::new(registry.clone());
        Self { registry, parser }
    }

    pub fn extract(&self, path: &Path, target: &Target) -> Result<Vec<Declaration>> {
        let adapter = self
            .registry
            .get_for_file(path)
            .ok_or_else(|| ScoutError::UnsupportedSource(path.display().to_string()))?;

        let source = std::fs::read_to_string(path)?;

        // Fast-reject before paying parse cost on irrelevant files.
        if !adapter.has_declarations(&source) {
            return Ok(Vec::new());
        }

        let parsed = self.parser.parse_source(&source, adapter)?;
        let raw = parsed.adapter.extract(&parsed);

        Ok(raw
            .into_iter()
            .filter(|decl| !decl.name.starts_with('_'))
            .map(|decl| self.build_declaration(decl, path, target))
            .collect())
    }

    fn build_declaration(&self, raw: RawDeclaration, path: &Path, target: &Target) -> Declaration {
        let qualified = self.qualified_path(target, path, &raw.name);
        let parameters = map_parameters(&raw);

        Declaration::new(raw.name, qualified)
            .with_location(path.display().to_string(), raw.line)
            .with_parameters(parameters)
            .with_access(raw.is_invocable, raw.allows_anonymous)
            .with_docstring(raw.docstring)
    }

    /// `target.rel.dirs.file.function`: target root stripped, separators
    /// dotted, extension dropped.
    fn qualified_path(&self, target: &Target, file_path: &Path, function: &str) -> String {
        let relative = file_path.strip_prefix(&target.root).unwrap_or(file_path);
        let stem = relative.with_extension("");

        let mut parts = vec![target.name.clone()];
        for component in stem.components() {
            if let Component::Normal(segment) = component {
                if let Some(segment) = segment.to_str() {
                    parts.push(segment.to_string());
                }
            }
        }
        parts.push(function.to_string());
        parts.join(".")
    }
}

fn map_parameters(raw: &RawDeclaration) -> Vec<ParameterSpec> {
    let first_default = raw
        .parameters
        .iter()
        .position(|p| p.has_default)
        .unwrap_or(raw.parameters.len());

    raw.parameters
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let param_type = param
                .annotation
                .as_deref()
                .map(ParamType::from_annotation)
                .unwrap_or_default();
            ParameterSpec::new(param.name.clone(), param_type, index < first_default)
        })
        .collect()
}
