// src/lib.rs
pub mod clustering;
pub mod config;
pub mod error;
pub mod ingest;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod resolver;
pub mod synthesis;
pub mod utils;

pub use config::DedupConfig;
pub use error::{ConfigurationError, DedupError, DedupResult};
pub use models::{CategorizedEntity, PointRecord, ResolvedEntity};
pub use resolver::{resolve_duplicates, DuplicateResolver, ResolutionResult, ResolutionStats};
