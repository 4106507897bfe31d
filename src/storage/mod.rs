//! Storage layer abstraction.
//!
//! All multigit state is one [`ConfigDocument`](crate::models::ConfigDocument)
//! behind a [`DocumentStore`]:
//! - **`JsonFileStore`**: the JSON file used by the CLI
//! - **`MemoryStore`**: process-local storage for tests and embedding

pub mod persistence;
pub mod traits;

pub use persistence::{CONFIG_FILE_NAME, JsonFileStore, MemoryStore};
pub use traits::DocumentStore;
