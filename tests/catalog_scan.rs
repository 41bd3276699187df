use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use api_scout::auth::resolve_actor;
use api_scout::config::{ScoutConfig, Settings, StaticSettingsProvider};
use api_scout::pagination::{NoopEvictionScheduler, PageRequest, PaginationView};
use api_scout::scanner::{NoScheduledTasks, ScanOrchestrator, StaticScheduledRegistry};
use api_scout::{ActorContext, Category, ScanStatus, Target};

fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn admin(settings: &Settings) -> ActorContext {
    resolve_actor("alice", &["admin".to_string()], settings)
}

/// A billing app with 45 guest-accessible handlers in one module, a
/// handful of internal ones, and an invoices module meant for prefix
/// exclusion tests.
fn seed_billing(root: &Path) {
    let mut handlers = String::from("import frappe\n\n");
    for i in 0..45 {
        handlers.push_str(&format!(
            "@frappe.whitelist(allow_guest=True)\ndef handler_{:02}(record_id):\n    pass\n\n",
            i
        ));
    }
    write_file(root, "api/handlers.py", &handlers);

    write_file(
        root,
        "api/admin.py",
        r#"import frappe

@frappe.whitelist()
def rebuild_ledger(year: int):
    """Rebuild the ledger for one year."""
    pass
"#,
    );

    write_file(
        root,
        "invoices.py",
        "@frappe.whitelist()\ndef send_reminder(invoice_id):\n    pass\n",
    );
}

fn seed_legacy(root: &Path) {
    write_file(
        root,
        "api.py",
        "@frappe.whitelist()\ndef old_endpoint():\n    pass\n",
    );
}

fn orchestrator(targets: Vec<Target>, settings: Settings) -> ScanOrchestrator {
    ScanOrchestrator::new(
        targets,
        Arc::new(StaticSettingsProvider::new(settings)),
        Arc::new(NoScheduledTasks),
    )
}

#[test]
fn scan_and_page_through_billing_public_handlers() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let settings = Settings::default();
    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());
    let scan = orchestrator.scan(&admin(&settings)).unwrap();

    let public = scan.catalog.category_list("billing", Category::Public);
    assert_eq!(public.len(), 45);

    let view = PaginationView::new(Arc::new(NoopEvictionScheduler));
    let provider = || public.to_vec();

    let page1 = view.paginate("billing:public", provider, &PageRequest::new(1, 20));
    assert_eq!(page1.items.len(), 20);
    assert_eq!(page1.pagination.total_pages, 3);
    assert_eq!(page1.pagination.total_items, 45);
    assert!(page1.pagination.has_next);
    assert!(!page1.pagination.has_prev);
    assert_eq!(page1.items[0].path, public[0].path);

    let page3 = view.paginate("billing:public", || unreachable!(), &PageRequest::new(3, 20));
    assert_eq!(page3.items.len(), 5);
    assert!(!page3.pagination.has_next);
    assert!(page3.pagination.has_prev);
}

#[test]
fn excluded_target_has_no_catalog_entry() {
    let billing = TempDir::new().unwrap();
    let legacy = TempDir::new().unwrap();
    seed_billing(billing.path());
    seed_legacy(legacy.path());

    let mut settings = Settings::default();
    settings.excluded_targets = vec!["legacy".to_string()];

    let orchestrator = orchestrator(
        vec![
            Target::new("billing", billing.path()),
            Target::new("legacy", legacy.path()),
        ],
        settings.clone(),
    );
    let scan = orchestrator.scan(&admin(&settings)).unwrap();

    assert!(scan.catalog.get("legacy").is_none());
    assert!(scan.catalog.get("billing").is_some());
}

#[test]
fn excluded_method_prefix_is_filtered_from_results() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let mut settings = Settings::default();
    settings.excluded_method_prefixes = vec!["billing.invoices".to_string()];

    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());
    let scan = orchestrator.scan(&admin(&settings)).unwrap();

    let internal = scan.catalog.category_list("billing", Category::Internal);
    assert!(internal
        .iter()
        .all(|d| !d.path.starts_with("billing.invoices")));
    assert!(internal.iter().any(|d| d.path == "billing.api.admin.rebuild_ledger"));
}

#[test]
fn search_filters_across_name_and_path() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let settings = Settings::default();
    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());
    let scan = orchestrator.scan(&admin(&settings)).unwrap();

    let view = PaginationView::new(Arc::new(NoopEvictionScheduler));
    let internal = scan.catalog.category_list("billing", Category::Internal).to_vec();

    let result = view.paginate(
        "billing:internal",
        || internal.clone(),
        &PageRequest::new(1, 20).with_search("LEDGER"),
    );
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].name, "rebuild_ledger");

    let no_match = view.paginate(
        "billing:internal",
        || unreachable!(),
        &PageRequest::new(1, 20).with_search("no-such-thing"),
    );
    assert!(no_match.items.is_empty());
    assert_eq!(no_match.pagination.total_pages, 0);
}

#[test]
fn pagination_disabled_returns_everything_in_one_page() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let mut settings = Settings::default();
    settings.enable_pagination = false;

    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());
    let scan = orchestrator.scan(&admin(&settings)).unwrap();
    let public = scan.catalog.category_list("billing", Category::Public).to_vec();

    let view = PaginationView::new(Arc::new(NoopEvictionScheduler));
    let mut request = PageRequest::new(2, 20);
    request.pagination_enabled = false;

    let result = view.paginate("billing:public", || public, &request);
    assert_eq!(result.items.len(), 45);
    assert_eq!(result.pagination.page_size, 45);
    assert_eq!(result.pagination.total_pages, 1);
    assert!(!result.pagination.has_next);
    assert!(!result.pagination.has_prev);
}

#[test]
fn declaration_metadata_survives_the_pipeline() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let settings = Settings::default();
    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());
    let scan = orchestrator.scan(&admin(&settings)).unwrap();

    let internal = scan.catalog.category_list("billing", Category::Internal);
    let rebuild = internal
        .iter()
        .find(|d| d.name == "rebuild_ledger")
        .unwrap();

    assert_eq!(rebuild.path, "billing.api.admin.rebuild_ledger");
    assert_eq!(rebuild.docstring, "Rebuild the ledger for one year.");
    assert_eq!(rebuild.parameters.len(), 1);
    assert_eq!(rebuild.parameters[0].name, "year");
    assert!(rebuild.parameters[0].required);
    assert!(rebuild.line > 1);
    assert!(rebuild.file_path.ends_with("admin.py"));
}

#[test]
fn unique_paths_within_one_scan() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let settings = Settings::default();
    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());
    let scan = orchestrator.scan(&admin(&settings)).unwrap();

    let mut paths = std::collections::HashSet::new();
    for category in [Category::Public, Category::Internal, Category::Resource] {
        for decl in scan.catalog.category_list("billing", category) {
            assert!(paths.insert(decl.path.clone()), "duplicate path {}", decl.path);
        }
    }
    assert!(paths.len() > 45);
}

#[test]
fn config_file_drives_the_whole_pipeline() {
    let apps = TempDir::new().unwrap();
    let billing_root = apps.path().join("billing");
    seed_billing(&billing_root);

    let config_toml = format!(
        r#"
items_per_page = 20
excluded_method_prefixes = ["billing.invoices"]

[[targets]]
name = "billing"
root = "{}"

[scheduled.billing]
daily = ["billing.tasks.close_books"]
"#,
        billing_root.display()
    );
    let config_path = apps.path().join("scout.toml");
    fs::write(&config_path, config_toml).unwrap();

    let config = ScoutConfig::load(&config_path).unwrap();
    assert_eq!(config.settings.items_per_page, 20);

    let orchestrator = ScanOrchestrator::new(
        config.resolved_targets(),
        Arc::new(StaticSettingsProvider::new(config.settings.clone())),
        Arc::new(StaticScheduledRegistry::from_config(&config.scheduled)),
    );
    let scan = orchestrator.scan(&admin(&config.settings)).unwrap();

    assert_eq!(
        scan.catalog.get("billing").unwrap().status,
        ScanStatus::Complete
    );
    let scheduled = scan.catalog.category_list("billing", Category::Scheduled);
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].name, "close_books");
    assert_eq!(scheduled[0].frequency.as_deref(), Some("daily"));

    let internal = scan.catalog.category_list("billing", Category::Internal);
    assert!(internal.iter().all(|d| !d.path.starts_with("billing.invoices")));
}

#[test]
fn unauthorized_actor_cannot_scan() {
    let dir = TempDir::new().unwrap();
    seed_billing(dir.path());

    let settings = Settings::default();
    let orchestrator = orchestrator(vec![Target::new("billing", dir.path())], settings.clone());

    assert!(orchestrator.scan(&ActorContext::guest()).is_err());

    let viewer = resolve_actor("bob", &["viewer".to_string()], &settings);
    assert!(orchestrator.scan(&viewer).is_err());
}
