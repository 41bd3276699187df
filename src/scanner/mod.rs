pub mod classifier;
pub mod extractor;
pub mod orchestrator;
pub mod parser;
pub mod scheduled;
pub mod walker;

pub use classifier::classify;
pub use extractor::DeclarationExtractor;
pub use orchestrator::{catalog_cache_key, ScanOrchestrator, CATALOG_TTL, RESOURCE_CAP};
pub use parser::{ParsedSource, SourceParser};
pub use scheduled::{
    scheduled_declarations, NoScheduledTasks, ScheduledHandler, ScheduledTaskRegistry,
    StaticScheduledRegistry,
};
pub use walker::{SourceTreeWalker, WalkOutcome, DEFAULT_MAX_FILES};
