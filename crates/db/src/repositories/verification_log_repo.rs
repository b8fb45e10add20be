//! Repository for the append-only `verification_logs` table.

use sqlx::PgPool;

use kolorit_core::types::DbId;

use crate::models::verification_log::VerificationLog;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scene_id, check_type, score, issues, created_at";

/// Appends and reads verification log records. Logs are never updated or
/// deleted individually; they cascade with their scene.
pub struct VerificationLogRepo;

impl VerificationLogRepo {
    /// Append one log record for a verification call.
    pub async fn append(
        pool: &PgPool,
        scene_id: DbId,
        check_type: &str,
        score: Option<i32>,
        issues: &serde_json::Value,
    ) -> Result<VerificationLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO verification_logs (scene_id, check_type, score, issues)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationLog>(&query)
            .bind(scene_id)
            .bind(check_type)
            .bind(score)
            .bind(issues)
            .fetch_one(pool)
            .await
    }

    /// List all log records for a scene, oldest first.
    pub async fn list_by_scene(
        pool: &PgPool,
        scene_id: DbId,
    ) -> Result<Vec<VerificationLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_logs WHERE scene_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, VerificationLog>(&query)
            .bind(scene_id)
            .fetch_all(pool)
            .await
    }

    /// Number of verification calls recorded for a scene.
    pub async fn count_for_scene(pool: &PgPool, scene_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM verification_logs WHERE scene_id = $1")
                .bind(scene_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
