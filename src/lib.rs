pub mod config;
pub mod date_format;
pub mod error;
pub mod file_ops;
pub mod media;
pub mod metadata;
pub mod naming;
pub mod resolver;
pub mod scan;

pub use config::Settings;
pub use file_ops::{FileOutcome, FileProcessor, PassSummary};
pub use resolver::{DateResolver, UnresolvedPolicy};
