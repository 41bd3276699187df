pub mod adapters;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod pagination;
pub mod scanner;

pub use adapters::{AdapterRegistry, RawDeclaration, RawParameter, SourceAdapter};
pub use auth::{resolve_actor, ActorContext, ActorProvider, StaticActorProvider};
pub use cache::{CacheEntry, TtlCache};
pub use catalog::{
    Catalog, Category, Declaration, ParamType, ParameterSpec, ScanResult, ScanStats, ScanStatus,
    Target, TargetCatalog,
};
pub use config::{
    FileSettingsProvider, ScoutConfig, Settings, SettingsProvider, StaticSettingsProvider,
    TargetSpec,
};
pub use error::{Result, ScoutError};
pub use pagination::{
    EvictionScheduler, NoopEvictionScheduler, PageInfo, PageRequest, PageResult, PaginationView,
    TokioEvictionScheduler,
};
pub use scanner::{
    catalog_cache_key, classify, DeclarationExtractor, NoScheduledTasks, ScanOrchestrator,
    ScheduledHandler, ScheduledTaskRegistry, SourceParser, SourceTreeWalker, StaticScheduledRegistry,
};
