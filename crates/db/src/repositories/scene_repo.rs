//! Repository for the `scenes` table.
//!
//! Status transitions are expressed as conditional `UPDATE ... RETURNING`
//! statements so concurrent runs cannot interleave: claiming a scene for
//! generation is an atomic check-and-set on `image_status`, not a
//! read-then-write.

use sqlx::PgPool;

use kolorit_core::types::DbId;

use crate::models::scene::{CreateScene, Scene, UpdateSceneReview};
use crate::models::status::SceneStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, description, template_name, tags, \
    blueprint_path, motif_paths, extra_ref_paths, aspect_ratio, width_px, height_px, \
    enriched_prompt, last_refinement_prompt, image_path, image_status, \
    last_error_message, verification_score, verification_issues, verification_attempts, \
    review_rating, review_notes, created_at, updated_at";

/// Provides CRUD and status-transition operations for scenes.
pub struct SceneRepo;

impl SceneRepo {
    /// Insert a new scene in `generating` status, returning the created
    /// row. Material selection is written to `scene_materials` in the
    /// same transaction.
    pub async fn create(pool: &PgPool, input: &CreateScene) -> Result<Scene, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO scenes
                (project_id, description, template_name, tags, blueprint_path,
                 motif_paths, extra_ref_paths, aspect_ratio, width_px, height_px, image_status)
             VALUES ($1, $2, $3, COALESCE($4, '{{}}'), $5,
                     COALESCE($6, '{{}}'), COALESCE($7, '{{}}'), COALESCE($8, '1:1'), $9, $10,
                     'generating')
             RETURNING {COLUMNS}"
        );
        let scene = sqlx::query_as::<_, Scene>(&query)
            .bind(input.project_id)
            .bind(&input.description)
            .bind(&input.template_name)
            .bind(&input.tags)
            .bind(&input.blueprint_path)
            .bind(&input.motif_paths)
            .bind(&input.extra_ref_paths)
            .bind(&input.aspect_ratio)
            .bind(input.width_px)
            .bind(input.height_px)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(material_ids) = &input.material_ids {
            for material_id in material_ids {
                sqlx::query(
                    "INSERT INTO scene_materials (scene_id, material_id) VALUES ($1, $2) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(scene.id)
                .bind(material_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(scene)
    }

    /// Find a scene by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenes WHERE id = $1");
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all scenes for a project, newest first.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Scene>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scenes WHERE project_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Atomically claim a scene for a new generation run.
    ///
    /// Succeeds only when no other run is in flight: the conditional
    /// update is the mutual-exclusion primitive that serializes
    /// generation per scene. Returns `None` if the scene does not exist
    /// or is already `generating`.
    pub async fn try_claim_generation(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes
             SET image_status = $2, last_error_message = NULL, updated_at = NOW()
             WHERE id = $1 AND image_status <> $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(SceneStatus::Generating.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Persist a freshly rendered image and the enriched prompt that
    /// produced it. The scene stays `generating` — verification and the
    /// refinement decision still run after this write.
    pub async fn update_rendered_image(
        pool: &PgPool,
        id: DbId,
        image_path: &str,
        enriched_prompt: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE scenes SET image_path = $2, enriched_prompt = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(image_path)
        .bind(enriched_prompt)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a verification outcome on the scene row.
    pub async fn record_verification(
        pool: &PgPool,
        id: DbId,
        score: i32,
        issues: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE scenes SET verification_score = $2, verification_issues = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(score)
        .bind(issues)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Increment the refinement attempt counter and remember the
    /// corrective instruction that the next pass applies.
    pub async fn start_refinement(
        pool: &PgPool,
        id: DbId,
        instruction: &str,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "UPDATE scenes SET verification_attempts = verification_attempts + 1, \
             last_refinement_prompt = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING verification_attempts",
        )
        .bind(id)
        .bind(instruction)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Terminal success: the scene keeps its current `image_path` and
    /// becomes visible as `done`.
    pub async fn mark_done(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE scenes SET image_status = $2, last_error_message = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(SceneStatus::Done.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal failure with a human-readable message. The scene remains
    /// regenerable.
    pub async fn mark_failed(pool: &PgPool, id: DbId, message: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE scenes SET image_status = $3, last_error_message = $2, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(message)
        .bind(SceneStatus::Failed.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Startup recovery sweep: fail every scene left `generating` by a
    /// previous process lifetime. Returns the number of swept rows.
    pub async fn sweep_stale_generating(pool: &PgPool, message: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scenes SET image_status = $2, last_error_message = $1, \
             updated_at = NOW() WHERE image_status = $3",
        )
        .bind(message)
        .bind(SceneStatus::Failed.as_str())
        .bind(SceneStatus::Generating.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Store user review feedback. Independent of verification.
    pub async fn update_review(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSceneReview,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes SET
                review_rating = COALESCE($2, review_rating),
                review_notes = COALESCE($3, review_notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(input.review_rating)
            .bind(&input.review_notes)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a scene. Jobs, versions, logs, and material
    /// links cascade at the database level. Returns `true` if a row was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scenes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
