//! Group directory boundary.
//!
//! Creates groups under their deterministic id and resolves ids back to the
//! live aggregate. Group operations themselves stay in the settlement crate;
//! the directory only looks groups up and passes calls through.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryGroupDirectory;
pub use r#trait::{DirectoryError, DirectoryResult, GroupDirectory};
