//! Document store implementations.

mod filesystem;
mod memory;

pub use filesystem::{CONFIG_FILE_NAME, JsonFileStore};
pub use memory::MemoryStore;
