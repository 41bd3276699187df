use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

use api_scout::auth::resolve_actor;
use api_scout::config::{
    FileSettingsProvider, ScoutConfig, Settings, SettingsProvider, StaticSettingsProvider,
};
use api_scout::pagination::{PageRequest, PaginationView, TokioEvictionScheduler};
use api_scout::scanner::{ScanOrchestrator, StaticScheduledRegistry};
use api_scout::{ActorContext, Category, ScanResult, Target};

#[derive(Parser)]
#[command(name = "api-scout")]
#[command(about = "Discover and catalog invocable API endpoints in multi-app Python codebases")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Scan app directories (directory name becomes the target name)
    api-scout scan ./apps/billing ./apps/crm

    # Scan targets from a config file, JSON output
    api-scout scan --config scout.toml --format json

    # Page through a category
    api-scout list ./apps/billing --target billing --category public --page 2

    # Search within a category
    api-scout list --config scout.toml --target billing --category internal --search invoice
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Actor identity (defaults to $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Actor role, repeatable (defaults to "admin")
    #[arg(long = "role")]
    pub roles: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan all targets and print the catalog
    Scan {
        /// Target directories
        paths: Vec<PathBuf>,

        /// Output format: summary or json
        #[arg(long, default_value = "summary")]
        format: String,
    },

    /// Page through one category of a scanned target
    List {
        /// Target directories
        paths: Vec<PathBuf>,

        /// Target name to list
        #[arg(long)]
        target: String,

        /// Category: public, internal, resource or scheduled
        #[arg(long)]
        category: String,

        /// Page number
        #[arg(long, default_value = "1")]
        page: usize,

        /// Case-insensitive substring filter on name or path
        #[arg(long)]
        search: Option<String>,

        /// Output format: summary or json
        #[arg(long, default_value = "summary")]
        format: String,
    },
}

pub struct AppContext {
    pub orchestrator: ScanOrchestrator,
    pub actor: ActorContext,
    pub settings: Settings,
}

pub fn build_context(cli: &Cli, paths: &[PathBuf]) -> anyhow::Result<AppContext> {
    // An explicitly named config must load; only its absence is fatal.
    let config = match &cli.config {
        Some(path) => ScoutConfig::load(path).map_err(|e| anyhow::anyhow!(e))?,
        None => ScoutConfig::default(),
    };

    let mut targets = config.resolved_targets();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                anyhow::anyhow!("cannot derive a target name from {}", path.display())
            })?;
        targets.push(Target::new(name, path.clone()));
    }
    if targets.is_empty() {
        anyhow::bail!("no targets: pass directories or configure [[targets]]");
    }

    let settings_provider: Arc<dyn SettingsProvider> = match &cli.config {
        Some(path) => Arc::new(FileSettingsProvider::new(path.clone())),
        None => Arc::new(StaticSettingsProvider::new(Settings::default())),
    };
    let settings = settings_provider.settings().map_err(|e| anyhow::anyhow!(e))?;

    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "local".to_string());
    let roles = if cli.roles.is_empty() {
        vec!["admin".to_string()]
    } else {
        cli.roles.clone()
    };
    let actor = resolve_actor(&user, &roles, &settings);

    let scheduled = Arc::new(StaticScheduledRegistry::from_config(&config.scheduled));
    let orchestrator = ScanOrchestrator::new(targets, settings_provider, scheduled);

    Ok(AppContext {
        orchestrator,
        actor,
        settings,
    })
}

pub fn run_scan(ctx: &AppContext, format: &str) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("scanning targets...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = ctx.orchestrator.scan(&ctx.actor);
    spinner.finish_and_clear();
    let result = result?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_summary(&result),
    }
    Ok(())
}

pub fn run_list(
    ctx: &AppContext,
    target: &str,
    category: &str,
    page: usize,
    search: Option<String>,
    format: &str,
) -> anyhow::Result<()> {
    let category = Category::from_str(category)
        .ok_or_else(|| anyhow::anyhow!("unknown category: {category}"))?;

    let scan = ctx.orchestrator.scan(&ctx.actor)?;

    let view = PaginationView::new(Arc::new(TokioEvictionScheduler));
    let cache_key = format!(
        "slices:{}:{}:{}",
        ctx.actor.identity_or_anonymous(),
        target,
        category.as_str()
    );

    let mut request = PageRequest::new(page, ctx.settings.items_per_page);
    request.pagination_enabled = ctx.settings.enable_pagination;
    if let Some(query) = search {
        request = request.with_search(query);
    }

    let result = view.paginate(
        &cache_key,
        || scan.catalog.category_list(target, category).to_vec(),
        &request,
    );

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            for item in &result.items {
                println!("{:<60} {}:{}", item.path, item.file_path, item.line);
            }
            let p = &result.pagination;
            println!(
                "\npage {}/{} ({} items)",
                p.current_page, p.total_pages, p.total_items
            );
        }
    }
    Ok(())
}

fn print_summary(result: &ScanResult) {
    for (name, entry) in &result.catalog.targets {
        println!("{} [{}]", name, entry.status.as_str());
        for category in [
            Category::Public,
            Category::Internal,
            Category::Resource,
            Category::Scheduled,
        ] {
            if let Some(list) = entry.category(category) {
                println!("  {:<10} {}", category.as_str(), list.len());
            }
        }
    }
    let stats = &result.stats;
    println!(
        "\n{} declarations from {} files in {}ms",
        stats.declarations, stats.files_parsed, stats.duration_ms
    );
}
