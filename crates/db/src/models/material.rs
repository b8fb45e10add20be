//! Material entity models. Materials are created and edited by the
//! external material-management surface; the generation core references
//! them read-only.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kolorit_core::types::{DbId, Timestamp};

/// A row from the `materials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Material {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    /// One of the fixed category strings, see `kolorit_core::category`.
    pub category: String,
    /// `idle` materials must never enter a generation's active set.
    pub status: String,
    pub size_text: Option<String>,
    pub surface: Option<String>,
    pub weight_text: Option<String>,
    pub color: Option<String>,
    pub format_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Material {
    /// Whether this material is eligible for generation.
    pub fn is_engaged(&self) -> bool {
        self.status == "engaged"
    }
}

/// A row from the `material_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaterialImage {
    pub id: DbId,
    pub material_id: DbId,
    pub file_path: String,
    /// Free-form perspective label ("front", "label detail", ...).
    pub perspective: String,
    pub is_primary: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// DTO for creating a new material.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaterial {
    pub project_id: DbId,
    pub name: String,
    pub category: String,
    /// Defaults to `engaged` if omitted.
    pub status: Option<String>,
    pub size_text: Option<String>,
    pub surface: Option<String>,
    pub weight_text: Option<String>,
    pub color: Option<String>,
    pub format_code: Option<String>,
}

/// DTO for attaching an image to a material.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaterialImage {
    pub material_id: DbId,
    pub file_path: String,
    pub perspective: Option<String>,
    pub is_primary: Option<bool>,
    pub sort_order: Option<i32>,
}
