//! Task catalog adapters.

pub mod seed;
pub mod static_catalog;

pub use seed::seed_tasks;
pub use static_catalog::{CatalogError, StaticTaskCatalog};
