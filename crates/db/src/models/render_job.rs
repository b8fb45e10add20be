//! Render job entity model. One row per generation attempt (initial,
//! regenerate, or refinement).

use serde::Serialize;
use sqlx::FromRow;

use kolorit_core::types::{DbId, Timestamp};

/// A row from the `render_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RenderJob {
    pub id: DbId,
    pub scene_id: DbId,
    /// `image` or `image_refinement`.
    pub job_type: String,
    pub status: String,
    pub error_message: Option<String>,
    pub cost_estimate: Option<f64>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}
