mod commands;

pub use commands::{build_context, run_list, run_scan, AppContext, Cli, Commands};
