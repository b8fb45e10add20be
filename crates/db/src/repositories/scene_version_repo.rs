//! Repository for the `scene_versions` table.

use sqlx::PgPool;

use kolorit_core::types::DbId;

use crate::models::scene_version::SceneVersion;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scene_id, version_number, image_path, prompt, created_at";

/// Provides snapshot operations for scene versions.
pub struct SceneVersionRepo;

impl SceneVersionRepo {
    /// Insert a new version snapshot, auto-assigning the next sequential
    /// version number for the scene (1 for the first snapshot).
    pub async fn create(
        pool: &PgPool,
        scene_id: DbId,
        image_path: &str,
        prompt: &str,
    ) -> Result<SceneVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO scene_versions (scene_id, version_number, image_path, prompt)
             VALUES (
                $1,
                (SELECT COALESCE(MAX(version_number), 0) + 1 FROM scene_versions WHERE scene_id = $1),
                $2, $3
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SceneVersion>(&query)
            .bind(scene_id)
            .bind(image_path)
            .bind(prompt)
            .fetch_one(pool)
            .await
    }

    /// Find a version by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SceneVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scene_versions WHERE id = $1");
        sqlx::query_as::<_, SceneVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all versions for a scene, newest first.
    pub async fn list_by_scene(pool: &PgPool, scene_id: DbId) -> Result<Vec<SceneVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scene_versions WHERE scene_id = $1 \
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, SceneVersion>(&query)
            .bind(scene_id)
            .fetch_all(pool)
            .await
    }

    /// Get the next version number for a scene (max existing + 1, or 1
    /// if none). The archiver needs the number before copying the file
    /// so the archive path can embed it.
    pub async fn next_version_number(pool: &PgPool, scene_id: DbId) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_number), 0) + 1 \
             FROM scene_versions WHERE scene_id = $1",
        )
        .bind(scene_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Insert a version snapshot with an explicit version number (the
    /// archiver computed it to name the archived file).
    pub async fn create_numbered(
        pool: &PgPool,
        scene_id: DbId,
        version_number: i32,
        image_path: &str,
        prompt: &str,
    ) -> Result<SceneVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO scene_versions (scene_id, version_number, image_path, prompt)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SceneVersion>(&query)
            .bind(scene_id)
            .bind(version_number)
            .bind(image_path)
            .bind(prompt)
            .fetch_one(pool)
            .await
    }

    /// Permanently delete a version row. Returns `true` if a row was
    /// removed. The archived file is the caller's to clean up.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scene_versions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
