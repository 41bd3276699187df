use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::adapters::AdapterRegistry;
use crate::auth::ActorContext;
use crate::cache::TtlCache;
use crate::catalog::{
    Catalog, Category, Declaration, ScanResult, ScanStats, ScanStatus, Target, TargetCatalog,
};
use crate::config::{Settings, SettingsProvider};
use crate::error::{Result, ScoutError};
use crate::scanner::classifier::classify;
use crate::scanner::extractor::DeclarationExtractor;
use crate::scanner::scheduled::{scheduled_declarations, ScheduledTaskRegistry};
use crate::scanner::walker::SourceTreeWalker;

/// Full-catalog cache TTL. Expiry is passive; there is no background
/// refresh.
pub const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Cap on the fallback bucket per target.
pub const RESOURCE_CAP: usize = 100;

/// Drives walker, extractor and classifier across all configured targets
/// and owns the full-catalog cache.
pub struct ScanOrchestrator {
    targets: Vec<Target>,
    settings_provider: Arc<dyn SettingsProvider>,
    scheduled: Arc<dyn ScheduledTaskRegistry>,
    walker: SourceTreeWalker,
    extractor: DeclarationExtractor,
    cache: TtlCache<ScanResult>,
}

impl ScanOrchestrator {
    pub fn new(
        targets: Vec<Target>,
        settings_provider: Arc<dyn SettingsProvider>,
        scheduled: Arc<dyn ScheduledTaskRegistry>,
    ) -> Self {
        let registry = AdapterRegistry::new();
        Self {
            targets,
            settings_provider,
            scheduled,
            walker: SourceTreeWalker::new(registry.clone()),
            extractor: DeclarationExtractor::new(registry),
            cache: TtlCache::new(),
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Scans every configured, non-excluded target and returns the
    /// aggregated result, served from cache when a live entry exists for
    /// this actor and settings snapshot.
    pub fn scan(&self, actor: &ActorContext) -> Result<ScanResult> {
        if !actor.authenticated {
            return Err(ScoutError::Authorization(
                "authentication required".to_string(),
            ));
        }
        if !actor.permitted {
            let reason = actor
                .denial_reason
                .clone()
                .unwrap_or_else(|| "access denied".to_string());
            return Err(ScoutError::Authorization(reason));
        }

        let settings = match self.settings_provider.settings() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("settings unavailable, using defaults: {}", e);
                Settings::default()
            }
        };

        let cache_key = catalog_cache_key(actor, &settings);
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("catalog cache hit for {}", cache_key);
            return Ok(cached);
        }

        let started = Instant::now();
        let mut stats = ScanStats::default();
        let mut catalog = Catalog::new();

        for target in &self.targets {
            if settings.is_target_excluded(&target.name) {
                tracing::debug!("target {} excluded by settings", target.name);
                continue;
            }

            let entry = match self.scan_target(target, &settings, &mut stats) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("{}", e);
                    stats.failed_targets += 1;
                    TargetCatalog::failed()
                }
            };
            catalog.insert(target.name.clone(), entry);
        }

        stats.declarations = catalog.declaration_count();
        stats.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "scanned {} targets, {} declarations in {}ms",
            catalog.targets.len(),
            stats.declarations,
            stats.duration_ms
        );

        let result = ScanResult::new(catalog, actor.clone(), settings, stats);
        self.cache.set(cache_key, result.clone(), CATALOG_TTL);
        Ok(result)
    }

    /// Drops every cached catalog.
    pub fn invalidate(&self) -> usize {
        self.cache.clear()
    }

    fn scan_target(
        &self,
        target: &Target,
        settings: &Settings,
        stats: &mut ScanStats,
    ) -> Result<TargetCatalog> {
        if !target.root.is_dir() {
            return Err(ScoutError::TargetScan {
                target: target.name.clone(),
                reason: format!("root {} is not a directory", target.root.display()),
            });
        }

        let outcome = self.walker.walk(&target.root);
        stats.files_walked += outcome.files.len();

        let mut public = Vec::new();
        let mut internal = Vec::new();
        let mut resource = Vec::new();

        for file in &outcome.files {
            let declarations = match self.extractor.extract(file, target) {
                Ok(declarations) => {
                    stats.files_parsed += 1;
                    declarations
                }
                Err(e) => {
                    // One bad file yields zero declarations; siblings are
                    // unaffected.
                    tracing::debug!("skipping {}: {}", file.display(), e);
                    continue;
                }
            };

            for declaration in declarations {
                match classify(&declaration) {
                    Category::Public => public.push(declaration),
                    Category::Internal => internal.push(declaration),
                    Category::Resource => {
                        if resource.len() < RESOURCE_CAP {
                            resource.push(declaration);
                        }
                    }
                    // classify never yields Scheduled; those entries come
                    // from the task registry below
                    Category::Scheduled => {}
                }
            }
        }

        let status = if outcome.truncated {
            ScanStatus::Truncated
        } else {
            ScanStatus::Complete
        };
        let mut entry = TargetCatalog::empty(status);

        if settings.show_public {
            entry.set_category(Category::Public, finalize(public, settings));
        }
        if settings.show_internal {
            entry.set_category(Category::Internal, finalize(internal, settings));
        }
        if settings.show_resource {
            entry.set_category(Category::Resource, finalize(resource, settings));
        }
        if settings.show_scheduled {
            let handlers = self.scheduled.scheduled_handlers(&target.name);
            let scheduled = scheduled_declarations(&handlers, settings.max_apis_per_target);
            entry.set_category(Category::Scheduled, finalize(scheduled, settings));
        }

        Ok(entry)
    }
}

pub fn catalog_cache_key(actor: &ActorContext, settings: &Settings) -> String {
    format!(
        "catalog:{}:{:016x}",
        actor.identity_or_anonymous(),
        settings.fingerprint()
    )
}

/// Truncation to the per-target maximum, then the excluded-prefix drop —
/// in that order.
fn finalize(mut declarations: Vec<Declaration>, settings: &Settings) -> Vec<Declaration> {
    declarations.truncate(settings.max_apis_per_target);
    declarations.retain(|d| !settings.is_path_excluded(&d.path));
    declarations
}
