mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{build_context, run_list, run_scan, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Scan { paths, format } => {
            let ctx = build_context(&cli, paths)?;
            run_scan(&ctx, format)?;
        }
        Commands::List {
            paths,
            target,
            category,
            page,
            search,
            format,
        } => {
            let ctx = build_context(&cli, paths)?;
            run_list(&ctx, target, category, *page, search.clone(), format)?;
        }
    }

    Ok(())
}
