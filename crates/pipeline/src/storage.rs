//! Rendered-image storage layout.
//!
//! Files are addressed by scene id (and version number for archives), so
//! concurrent runs for different scenes never collide on paths.

use std::path::{Path, PathBuf};

use kolorit_core::types::DbId;

/// Filesystem layout under a single media root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Media root from the `MEDIA_ROOT` env var, defaulting to `./media`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".into()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current rendered image for a scene.
    pub fn scene_image_path(&self, scene_id: DbId) -> PathBuf {
        self.root.join("scenes").join(format!("{scene_id}.png"))
    }

    /// Archived snapshot for a scene version.
    pub fn version_image_path(&self, scene_id: DbId, version_number: i32) -> PathBuf {
        self.root
            .join("versions")
            .join(format!("{scene_id}_v{version_number}.png"))
    }

    /// Create the storage directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.root.join("scenes")).await?;
        tokio::fs::create_dir_all(self.root.join("versions")).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
