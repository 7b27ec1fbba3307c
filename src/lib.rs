pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod observability;

pub use catalog::CatalogSnapshot;
pub use config::Config;
pub use domain::{Card, CardResult, CardRule, EngineError, TxContext};
pub use engine::calculate;
