//! Scene version entity model: an immutable snapshot of a scene's
//! previous rendered image, taken right before it is overwritten.

use serde::Serialize;
use sqlx::FromRow;

use kolorit_core::types::{DbId, Timestamp};

/// A row from the `scene_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SceneVersion {
    pub id: DbId,
    pub scene_id: DbId,
    /// Monotonic per scene, starting at 1, no gaps.
    pub version_number: i32,
    /// Path of the archived copy.
    pub image_path: String,
    /// The prompt that produced the archived image.
    pub prompt: String,
    pub created_at: Timestamp,
}
