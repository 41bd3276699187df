pub mod models;

pub use models::{
    Catalog, Category, Declaration, ParamType, ParameterSpec, ScanResult, ScanStats, ScanStatus,
    Target, TargetCatalog,
};
