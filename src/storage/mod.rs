//! Persistence of monitor definitions and check results
//!
//! ## Design
//!
//! - **Trait-based**: `MonitorStore` lets the scheduler and API run against
//!   any backend
//! - **Async**: All operations are async for use from Tokio tasks
//! - **Atomic check writes**: one call applies a whole tick result
//!
//! ## Backends
//!
//! - **SQLite** (default): Embedded database, feature `storage-sqlite`
//! - **In-Memory**: No persistence, for testing or ephemeral runs
//!
//! ## Usage
//!
//! ```no_run
//! use pulsewatch::config::StorageConfig;
//! use pulsewatch::storage::open_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = open_store(&StorageConfig::default()).await?;
//!     let monitors = store.get_all().await?;
//!     println!("{} monitors", monitors.len());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::{HealthStatus, MonitorStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Open the store selected by the configuration
pub async fn open_store(config: &StorageConfig) -> StoreResult<Arc<dyn MonitorStore>> {
    match config {
        StorageConfig::None => {
            info!("using in-memory monitor store, monitors are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => {
            let store = sqlite::SqliteStore::new(path).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => Err(StoreError::ConnectionFailed(
            "SQLite support not compiled in (enable the `storage-sqlite` feature)".to_string(),
        )),
    }
}
