//! Infrastructure layer: group registry and its configuration.

pub mod config;
pub mod directory;

pub use config::DirectoryConfig;
pub use directory::{DirectoryError, DirectoryResult, GroupDirectory, InMemoryGroupDirectory};
