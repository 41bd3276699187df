//! Settings and configuration loading
//!
//! Settings are read fresh per scan through a `SettingsProvider`; the
//! file-backed provider keeps its own short-lived cache, the scanning core
//! never caches settings itself. A missing or malformed file degrades to
//! the documented defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::cache::TtlCache;
use crate::catalog::Target;
use crate::error::{Result, ScoutError};

const SETTINGS_CACHE_KEY: &str = "settings";
const SETTINGS_CACHE_TTL: Duration = Duration::from_secs(600);

fn default_true() -> bool {
    true
}

fn default_items_per_page() -> usize {
    40
}

fn default_max_apis_per_target() -> usize {
    1000
}

fn default_allowed_roles() -> Vec<String> {
    vec!["admin".to_string()]
}

/// Tunable scan and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    pub show_public: bool,
    pub show_internal: bool,
    pub show_resource: bool,
    pub show_scheduled: bool,
    pub enable_pagination: bool,
    pub items_per_page: usize,
    pub max_apis_per_target: usize,
    pub excluded_targets: Vec<String>,
    pub excluded_method_prefixes: Vec<String>,
    pub allowed_roles: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            show_public: default_true(),
            show_internal: default_true(),
            show_resource: default_true(),
            show_scheduled: default_true(),
            enable_pagination: default_true(),
            items_per_page: default_items_per_page(),
            max_apis_per_target: default_max_apis_per_target(),
            excluded_targets: Vec::new(),
            excluded_method_prefixes: Vec::new(),
            allowed_roles: default_allowed_roles(),
        }
    }
}

impl Settings {
    /// Stable fingerprint of this snapshot, used in cache keys so that a
    /// settings change rotates cached catalogs immediately.
    pub fn fingerprint(&self) -> u64 {
        let serialized = serde_json::to_string(self).unwrap_or_default();
        xxh3_64(serialized.as_bytes())
    }

    pub fn is_target_excluded(&self, target: &str) -> bool {
        self.excluded_targets.iter().any(|t| t == target)
    }

    pub fn is_path_excluded(&self, path: &str) -> bool {
        self.excluded_method_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// A target entry as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub root: PathBuf,
}

/// The full TOML config document: flattened settings, scan targets, and a
/// `[scheduled.<target>]` table of frequency → handler paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub scheduled: HashMap<String, HashMap<String, Vec<String>>>,
}

impl ScoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoutError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ScoutError::Configuration(format!("invalid {}: {}", path.display(), e)))
    }

    pub fn resolved_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|spec| Target::new(spec.name.clone(), spec.root.clone()))
            .collect()
    }
}

pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> Result<Settings>;
}

/// Fixed settings, for tests and embedding.
pub struct StaticSettingsProvider {
    settings: Settings,
}

impl StaticSettingsProvider {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl SettingsProvider for StaticSettingsProvider {
    fn settings(&self) -> Result<Settings> {
        Ok(self.settings.clone())
    }
}

/// Reads settings from a TOML config file, caching the parsed snapshot for
/// ten minutes. Load failures degrade to `Settings::default()`.
pub struct FileSettingsProvider {
    path: PathBuf,
    cache: TtlCache<Settings>,
}

impl FileSettingsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: TtlCache::new(),
        }
    }
}

impl SettingsProvider for FileSettingsProvider {
    fn settings(&self) -> Result<Settings> {
        if let Some(settings) = self.cache.get(SETTINGS_CACHE_KEY) {
            return Ok(settings);
        }

        let settings = match ScoutConfig::load(&self.path) {
            Ok(config) => config.settings,
            Err(e) => {
                tracing::warn!("falling back to default settings: {}", e);
                Settings::default()
            }
        };

        self.cache
            .set(SETTINGS_CACHE_KEY, settings.clone(), SETTINGS_CACHE_TTL);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert!(settings.show_public);
        assert!(settings.enable_pagination);
        assert_eq!(settings.items_per_page, 40);
        assert_eq!(settings.max_apis_per_target, 1000);
        assert!(settings.excluded_targets.is_empty());
        assert_eq!(settings.allowed_roles, vec!["admin"]);
    }

    #[test]
    fn test_fingerprint_changes_with_settings() {
        let base = Settings::default();
        let mut toggled = Settings::default();
        toggled.show_resource = false;

        assert_ne!(base.fingerprint(), toggled.fingerprint());
        assert_eq!(base.fingerprint(), Settings::default().fingerprint());
    }

    #[test]
    fn test_target_exclusion() {
        let mut settings = Settings::default();
        settings.excluded_targets = vec!["legacy".to_string()];

        assert!(settings.is_target_excluded("legacy"));
        assert!(!settings.is_target_excluded("billing"));
    }

    #[test]
    fn test_path_prefix_exclusion() {
        let mut settings = Settings::default();
        settings.excluded_method_prefixes = vec!["billing.invoices".to_string()];

        assert!(settings.is_path_excluded("billing.invoices.send_reminder"));
        assert!(settings.is_path_excluded("billing.invoices"));
        assert!(!settings.is_path_excluded("billing.payments.refund"));
    }

    #[test]
    fn test_config_parses_partial_toml() {
        let toml = r#"
            items_per_page = 20
            excluded_targets = ["legacy"]

            [[targets]]
            name = "billing"
            root = "apps/billing"
        "#;
        let config: ScoutConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.settings.items_per_page, 20);
        // untouched fields keep their defaults
        assert!(config.settings.enabled);
        assert_eq!(config.settings.max_apis_per_target, 1000);

        let targets = config.resolved_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "billing");
    }

    #[test]
    fn test_config_scheduled_table() {
        let toml = r#"
            [scheduled.billing]
            daily = ["billing.tasks.send_reminders"]
            hourly = ["billing.tasks.sync_rates", "billing.tasks.retry_failed"]
        "#;
        let config: ScoutConfig = toml::from_str(toml).unwrap();

        let billing = config.scheduled.get("billing").unwrap();
        assert_eq!(billing["daily"], vec!["billing.tasks.send_reminders"]);
        assert_eq!(billing["hourly"].len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let err = ScoutConfig::load(Path::new("/nonexistent/scout.toml")).unwrap_err();
        assert!(matches!(err, ScoutError::Configuration(_)));
    }

    #[test]
    fn test_file_provider_degrades_to_defaults() {
        let provider = FileSettingsProvider::new("/nonexistent/scout.toml");
        let settings = provider.settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_provider_reads_and_caches() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "items_per_page = 7").unwrap();

        let provider = FileSettingsProvider::new(file.path());
        assert_eq!(provider.settings().unwrap().items_per_page, 7);

        // cached snapshot survives the file changing underneath
        writeln!(file, "items_per_page = 9").unwrap();
        assert_eq!(provider.settings().unwrap().items_per_page, 7);
    }

    #[test]
    fn test_load_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "items_per_page = [not valid").unwrap();

        let err = ScoutConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ScoutError::Configuration(_)));
    }
}
