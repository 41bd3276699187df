use once_cell::sync::OnceCell;
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use super::{RawDeclaration, RawParameter, SourceAdapter};
use crate::scanner::parser::ParsedSource;

pub struct PythonAdapter;

// Module-level functions only; methods inside classes are not endpoints.
const FUNCTIONS_QUERY: &str = r#"
(module
    (function_definition) @function)

(module
    (decorated_definition
        definition: (function_definition) @function))
"#;

static PYTHON_FUNCTIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl PythonAdapter {
    fn cached_functions_query(&self) -> Option<&'static Query> {
        PYTHON_FUNCTIONS_QUERY
            .get_or_try_init(|| Query::new(&self.language(), FUNCTIONS_QUERY))
            .ok()
    }

    /// Reads the invocability markers off a function's decorators: a bare
    /// `@x.whitelist` attribute or a `@x.whitelist(...)` call marks it
    /// invocable; a literal `allow_guest` keyword sets anonymous access.
    fn decorator_flags(&self, parsed: &ParsedSource, function: Node) -> (bool, bool) {
        let mut is_invocable = false;
        let mut allows_anonymous = false;

        let Some(parent) = function.parent() else {
            return (false, false);
        };
        if parent.kind() != "decorated_definition" {
            return (false, false);
        }

        let mut cursor = parent.walk();
        for child in parent.named_children(&mut cursor) {
            if child.kind() != "decorator" {
                continue;
            }
            let Some(expr) = child.named_child(0) else {
                continue;
            };

            match expr.kind() {
                "attribute" => {
                    if self.attribute_name(parsed, expr) == Some("whitelist") {
                        is_invocable = true;
                    }
                }
                "call" => {
                    let Some(callee) = expr.child_by_field_name("function") else {
                        continue;
                    };
                    if callee.kind() != "attribute"
                        || self.attribute_name(parsed, callee) != Some("whitelist")
                    {
                        continue;
                    }
                    is_invocable = true;

                    if let Some(args) = expr.child_by_field_name("arguments") {
                        let mut args_cursor = args.walk();
                        for arg in args.named_children(&mut args_cursor) {
                            if arg.kind() != "keyword_argument" {
                                continue;
                            }
                            let keyword = arg
                                .child_by_field_name("name")
                                .map(|n| parsed.node_text(&n));
                            if keyword != Some("allow_guest") {
                                continue;
                            }
                            // Only literal booleans count; anything computed
                            // keeps the default.
                            match arg.child_by_field_name("value").map(|v| v.kind()) {
                                Some("true") => allows_anonymous = true,
                                Some("false") => allows_anonymous = false,
                                _ => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        (is_invocable, allows_anonymous)
    }

    fn attribute_name<'a>(&self, parsed: &'a ParsedSource, attribute: Node) -> Option<&'a str> {
        attribute
            .child_by_field_name("attribute")
            .map(|n| parsed.node_text(&n))
    }

    fn read_parameters(&self, parsed: &ParsedSource, function: Node) -> Vec<RawParameter> {
        let mut parameters = Vec::new();
        let Some(list) = function.child_by_field_name("parameters") else {
            return parameters;
        };

        let mut cursor = list.walk();
        for node in list.named_children(&mut cursor) {
            let (name_node, annotation, has_default) = match node.kind() {
                "identifier" => (Some(node), None, false),
                "typed_parameter" => (node.named_child(0), node.child_by_field_name("type"), false),
                "default_parameter" => (node.child_by_field_name("name"), None, true),
                "typed_default_parameter" => (
                    node.child_by_field_name("name"),
                    node.child_by_field_name("type"),
                    true,
                ),
                // *args / **kwargs and bare separators are not call parameters
                _ => continue,
            };

            let Some(name_node) = name_node else {
                continue;
            };
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = parsed.node_text(&name_node).to_string();
            if name == "self" {
                continue;
            }

            parameters.push(RawParameter {
                name,
                annotation: annotation.map(|a| parsed.node_text(&a).to_string()),
                has_default,
            });
        }

        parameters
    }

    fn read_docstring(&self, parsed: &ParsedSource, function: Node) -> String {
        let Some(body) = function.child_by_field_name("body") else {
            return String::new();
        };
        let Some(first) = body.named_child(0) else {
            return String::new();
        };
        if first.kind() != "expression_statement" {
            return String::new();
        }
        let Some(expr) = first.named_child(0) else {
            return String::new();
        };
        if expr.kind() != "string" {
            return String::new();
        }

        clean_string_literal(parsed.node_text(&expr))
    }
}

impl SourceAdapter for PythonAdapter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["py"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn has_declarations(&self, source: &str) -> bool {
        source.contains("def ")
    }

    fn extract(&self, parsed: &ParsedSource) -> Vec<RawDeclaration> {
        let Some(query) = self.cached_functions_query() else {
            return Vec::new();
        };

        let mut declarations = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.root_node(), parsed.source_bytes());

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let function = capture.node;
                let Some(name_node) = function.child_by_field_name("name") else {
                    continue;
                };

                let (is_invocable, allows_anonymous) = self.decorator_flags(parsed, function);

                declarations.push(RawDeclaration {
                    name: parsed.node_text(&name_node).to_string(),
                    line: function.start_position().row as u32 + 1,
                    is_invocable,
                    allows_anonymous,
                    parameters: self.read_parameters(parsed, function),
                    docstring: self.read_docstring(parsed, function),
                });
            }
        }

        declarations
    }
}

fn clean_string_literal(raw: &str) -> String {
    let trimmed = raw.trim_start_matches(|c: char| {
        matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F')
    });
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(rest) = trimmed.strip_prefix(quote) {
            return rest.strip_suffix(quote).unwrap_or(rest).trim().to_string();
        }
    }
    trimmed.trim().to_string()
}
