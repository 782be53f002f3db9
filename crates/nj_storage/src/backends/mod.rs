pub mod file;
pub mod memory;

pub use file::{FileStore, FILE_NAME};
pub use memory::MemoryStore;
