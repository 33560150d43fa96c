//! Persistent key-value storage
//!
//! Components read and write small string flags through [`KeyValueStore`],
//! the stand-in for a browser's per-origin local storage.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;

/// String key-value store with interior mutability
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
