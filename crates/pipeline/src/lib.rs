//! Generation job orchestration.
//!
//! Owns the scene status state machine: claiming a scene for a run,
//! driving the compose → select → generate → verify → refine loop,
//! archiving the previous image before overwrite, and sweeping
//! interrupted work at startup. Runs execute as independent tokio tasks;
//! the HTTP request that enqueued them has long since returned.

pub mod archive;
pub mod orchestrator;
pub mod recovery;
pub mod references;
pub mod storage;
pub mod verify;

pub use orchestrator::{enqueue_regeneration, run_generation, run_generation_with, RunRequest};
pub use recovery::recover_interrupted;
pub use storage::StorageLayout;

use kolorit_core::types::DbId;
use kolorit_provider::ProviderError;

/// Errors that abort a generation run. Converted into the scene's
/// `last_error_message` and the render job's failure at the run boundary
/// — a run never leaves its scene in `generating`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Scene {0} no longer exists")]
    SceneGone(DbId),
}
