use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::auth::ActorContext;
use crate::config::Settings;

/// An independently scannable source module/application boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub root: PathBuf,
}

impl Target {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Semantic parameter type derived from a source-level annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    Boolean,
    #[default]
    String,
    Object,
    Array,
}

impl ParamType {
    /// Maps an annotation name to a semantic type. Anything unrecognized,
    /// including compound annotations, falls back to `String`.
    pub fn from_annotation(annotation: &str) -> Self {
        match annotation.trim().to_lowercase().as_str() {
            "int" => ParamType::Integer,
            "float" => ParamType::Number,
            "bool" => ParamType::Boolean,
            "str" => ParamType::String,
            "dict" => ParamType::Object,
            "list" => ParamType::Array,
            _ => ParamType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::String => "string",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    /// Placeholder kept for the serialized shape; not populated by the scan.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: String,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, param_type: ParamType, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type,
            required,
            description: String::new(),
            default_value: String::new(),
        }
    }
}

/// One discovered endpoint with its metadata.
///
/// `path` is the dot-joined fully qualified path
/// (`target.module.file.function`), unique within a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub path: String,
    pub file_path: String,
    pub line: u32,
    pub parameters: Vec<ParameterSpec>,
    pub is_invocable: bool,
    pub allows_anonymous: bool,
    #[serde(default)]
    pub docstring: String,
    /// Frequency label, present only on scheduled entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            file_path: String::new(),
            line: 0,
            parameters: Vec::new(),
            is_invocable: false,
            allows_anonymous: false,
            docstring: String::new(),
            frequency: None,
        }
    }

    pub fn with_location(mut self, file_path: impl Into<String>, line: u32) -> Self {
        self.file_path = file_path.into();
        self.line = line;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_access(mut self, is_invocable: bool, allows_anonymous: bool) -> Self {
        self.is_invocable = is_invocable;
        self.allows_anonymous = allows_anonymous;
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }
}

/// Access-level bucket for a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Public,
    Internal,
    Resource,
    Scheduled,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Public => "public",
            Category::Internal => "internal",
            Category::Resource => "resource",
            Category::Scheduled => "scheduled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Category::Public),
            "internal" => Some(Category::Internal),
            "resource" => Some(Category::Resource),
            "scheduled" | "schedulers" => Some(Category::Scheduled),
            _ => None,
        }
    }
}

/// Outcome of scanning one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Every candidate file was visited.
    Complete,
    /// The file cap cut the walk short; the listing is partial.
    Truncated,
    /// The target scan raised; categories are empty, siblings unaffected.
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Complete => "complete",
            ScanStatus::Truncated => "truncated",
            ScanStatus::Failed => "failed",
        }
    }
}

/// Per-target slice of the catalog. A category disabled in settings is
/// `None` and absent from serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetCatalog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<Vec<Declaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<Vec<Declaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<Declaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<Vec<Declaration>>,
    pub status: ScanStatus,
}

impl TargetCatalog {
    pub fn empty(status: ScanStatus) -> Self {
        Self {
            public: None,
            internal: None,
            resource: None,
            scheduled: None,
            status,
        }
    }

    pub fn failed() -> Self {
        Self::empty(ScanStatus::Failed)
    }

    pub fn category(&self, category: Category) -> Option<&[Declaration]> {
        let list = match category {
            Category::Public => self.public.as_ref(),
            Category::Internal => self.internal.as_ref(),
            Category::Resource => self.resource.as_ref(),
            Category::Scheduled => self.scheduled.as_ref(),
        };
        list.map(|v| v.as_slice())
    }

    pub fn set_category(&mut self, category: Category, declarations: Vec<Declaration>) {
        let slot = match category {
            Category::Public => &mut self.public,
            Category::Internal => &mut self.internal,
            Category::Resource => &mut self.resource,
            Category::Scheduled => &mut self.scheduled,
        };
        *slot = Some(declarations);
    }

    pub fn declaration_count(&self) -> usize {
        [&self.public, &self.internal, &self.resource, &self.scheduled]
            .iter()
            .filter_map(|list| list.as_ref())
            .map(|list| list.len())
            .sum()
    }
}

/// Full nested scan result across targets and categories. Iteration order
/// over targets is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub targets: BTreeMap<String, TargetCatalog>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: impl Into<String>, entry: TargetCatalog) {
        self.targets.insert(target.into(), entry);
    }

    pub fn get(&self, target: &str) -> Option<&TargetCatalog> {
        self.targets.get(target)
    }

    /// Category list for `(target, category)`; missing target or disabled
    /// category both read as an empty list.
    pub fn category_list(&self, target: &str, category: Category) -> &[Declaration] {
        self.targets
            .get(target)
            .and_then(|entry| entry.category(category))
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn declaration_count(&self) -> usize {
        self.targets.values().map(|t| t.declaration_count()).sum()
    }
}

/// Counters collected while producing one catalog.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub files_walked: usize,
    pub files_parsed: usize,
    pub declarations: usize,
    pub failed_targets: usize,
    pub duration_ms: u64,
}

/// Immutable result of one scan: the catalog plus the actor context and
/// settings snapshot that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: String,
    pub catalog: Catalog,
    pub actor: ActorContext,
    pub settings: Settings,
    pub stats: ScanStats,
    pub created_at: u64,
}

impl ScanResult {
    pub fn new(catalog: Catalog, actor: ActorContext, settings: Settings, stats: ScanStats) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            catalog,
            actor,
            settings,
            stats,
            created_at,
        }
    }
}
