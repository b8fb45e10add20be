//! Repository for the `materials` and `material_images` tables.
//!
//! The generation core reads materials; mutation belongs to the external
//! material-management surface (create/attach exist for that surface and
//! for test fixtures).

use sqlx::PgPool;

use kolorit_core::types::DbId;

use crate::models::material::{CreateMaterial, CreateMaterialImage, Material, MaterialImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, category, status, size_text, surface, \
    weight_text, color, format_code, created_at, updated_at";

const IMAGE_COLUMNS: &str =
    "id, material_id, file_path, perspective, is_primary, sort_order, created_at";

/// Provides material read access plus the create operations used by the
/// management surface.
pub struct MaterialRepo;

impl MaterialRepo {
    /// Insert a new material, returning the created row.
    ///
    /// If `status` is `None`, defaults to `engaged`.
    pub async fn create(pool: &PgPool, input: &CreateMaterial) -> Result<Material, sqlx::Error> {
        let query = format!(
            "INSERT INTO materials
                (project_id, name, category, status, size_text, surface, weight_text, color, format_code)
             VALUES ($1, $2, $3, COALESCE($4, 'engaged'), $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.status)
            .bind(&input.size_text)
            .bind(&input.surface)
            .bind(&input.weight_text)
            .bind(&input.color)
            .bind(&input.format_code)
            .fetch_one(pool)
            .await
    }

    /// Attach an image to a material.
    pub async fn add_image(
        pool: &PgPool,
        input: &CreateMaterialImage,
    ) -> Result<MaterialImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO material_images (material_id, file_path, perspective, is_primary, sort_order)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, false), COALESCE($5, 0))
             RETURNING {IMAGE_COLUMNS}"
        );
        sqlx::query_as::<_, MaterialImage>(&query)
            .bind(input.material_id)
            .bind(&input.file_path)
            .bind(&input.perspective)
            .bind(input.is_primary)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a material by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Material>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM materials WHERE id = $1");
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the materials selected for a scene, in selection insert
    /// order. Includes idle materials — the orchestrator filters to
    /// engaged ones itself.
    pub async fn list_for_scene(pool: &PgPool, scene_id: DbId) -> Result<Vec<Material>, sqlx::Error> {
        let query = "SELECT m.id, m.project_id, m.name, m.category, m.status, m.size_text, \
             m.surface, m.weight_text, m.color, m.format_code, m.created_at, m.updated_at
             FROM materials m
             JOIN scene_materials sm ON sm.material_id = m.id
             WHERE sm.scene_id = $1
             ORDER BY m.id ASC"
            .to_string();
        sqlx::query_as::<_, Material>(&query)
            .bind(scene_id)
            .fetch_all(pool)
            .await
    }

    /// List a material's images in declared order.
    pub async fn list_images(pool: &PgPool, material_id: DbId) -> Result<Vec<MaterialImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM material_images
             WHERE material_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, MaterialImage>(&query)
            .bind(material_id)
            .fetch_all(pool)
            .await
    }
}
