pub mod hot_reload;
pub mod loader;
pub mod memory;
pub mod postgres;
pub mod snapshot;
pub mod source;

pub use hot_reload::{CatalogWatcher, SourceWatcher};
pub use loader::{CatalogError, CatalogLoader};
pub use memory::MemoryCatalog;
pub use postgres::PostgresCatalog;
pub use snapshot::CatalogSnapshot;
pub use source::CatalogSource;
