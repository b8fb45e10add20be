//! Scene entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kolorit_core::types::{DbId, Timestamp};

/// A row from the `scenes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scene {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub template_name: Option<String>,
    pub tags: Vec<String>,
    pub blueprint_path: Option<String>,
    pub motif_paths: Vec<String>,
    pub extra_ref_paths: Vec<String>,
    pub aspect_ratio: String,
    pub width_px: Option<i32>,
    pub height_px: Option<i32>,
    /// The AI-expanded scene description actually used for generation.
    pub enriched_prompt: Option<String>,
    /// The last corrective instruction applied by a refinement pass.
    pub last_refinement_prompt: Option<String>,
    /// Non-null only when `image_status` is `done`.
    pub image_path: Option<String>,
    pub image_status: String,
    pub last_error_message: Option<String>,
    pub verification_score: Option<i32>,
    pub verification_issues: Option<serde_json::Value>,
    pub verification_attempts: i32,
    pub review_rating: Option<i16>,
    pub review_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new scene.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScene {
    pub project_id: DbId,
    pub description: String,
    pub template_name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub blueprint_path: Option<String>,
    pub motif_paths: Option<Vec<String>>,
    pub extra_ref_paths: Option<Vec<String>>,
    pub aspect_ratio: Option<String>,
    pub width_px: Option<i32>,
    pub height_px: Option<i32>,
    pub material_ids: Option<Vec<DbId>>,
}

/// DTO for the user review feedback, independent of verification.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSceneReview {
    pub review_rating: Option<i16>,
    pub review_notes: Option<String>,
}
