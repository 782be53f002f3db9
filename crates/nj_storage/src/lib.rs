use std::path::Path;
use std::sync::Arc;

use nj_core::{Error, KeyValueStore, Result};
use tracing::info;

pub mod backends;

pub use backends::*;

pub trait StorageBackend: KeyValueStore {
    fn backend_name(&self) -> &'static str;
}

/// Build the store named on the command line ("memory" or "file").
pub fn create_storage(kind: &str, data_dir: &Path) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match kind {
        "memory" => {
            let store = MemoryStore::new();
            info!("🏦 Storage backend initialized (using {})", store.backend_name());
            Arc::new(store)
        }
        "file" => {
            let store = FileStore::open(data_dir.join(FILE_NAME))?;
            info!("🏦 Storage backend initialized (using {} at {})", store.backend_name(), store.path().display());
            Arc::new(store)
        }
        other => return Err(Error::Config(format!("unknown storage backend: {}", other))),
    };
    Ok(store)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
