//! Runtime environment helpers
//!
//! Builds the configured datastore so binary crates need not know about the
//! individual backends.

use std::path::PathBuf;
use std::sync::Arc;

use configs::{BackendKind, DatastoreConfig};
use tracing::info;

use crate::datastore::{Datastore, FileDatastore, MemoryDatastore};

/// Path of the namespace file used by the file backend.
pub fn namespace_file(cfg: &DatastoreConfig) -> PathBuf {
    PathBuf::from(&cfg.data_dir).join(format!("{}.json", cfg.project_id.trim()))
}

/// Open the datastore named by `cfg`.
pub async fn connect(cfg: &DatastoreConfig) -> anyhow::Result<Arc<dyn Datastore>> {
    cfg.validate()?;
    match cfg.backend {
        BackendKind::Memory => {
            info!(project_id = %cfg.project_id, backend = "memory", "datastore ready");
            Ok(Arc::new(MemoryDatastore::new()))
        }
        BackendKind::File => {
            common::env::ensure_data_dir(&cfg.data_dir).await?;
            let path = namespace_file(cfg);
            let store: Arc<dyn Datastore> = FileDatastore::open(&path).await?;
            info!(project_id = %cfg.project_id, backend = "file", path = %path.display(), "datastore ready");
            Ok(store)
        }
    }
}
