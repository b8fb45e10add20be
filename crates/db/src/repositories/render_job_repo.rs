//! Repository for the `render_jobs` table.

use sqlx::PgPool;

use kolorit_core::types::DbId;

use crate::models::render_job::RenderJob;
use crate::models::status::{JobStatus, JobType};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scene_id, job_type, status, error_message, cost_estimate, \
    created_at, started_at, completed_at";

/// Provides lifecycle operations for render jobs. A job is created
/// `processing` when its run is enqueued and finalized exactly once.
pub struct RenderJobRepo;

impl RenderJobRepo {
    /// Create a job in `processing` status for a run that starts
    /// immediately.
    pub async fn create(
        pool: &PgPool,
        scene_id: DbId,
        job_type: JobType,
    ) -> Result<RenderJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO render_jobs (scene_id, job_type, status, started_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RenderJob>(&query)
            .bind(scene_id)
            .bind(job_type.as_str())
            .bind(JobStatus::Processing.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a job by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RenderJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM render_jobs WHERE id = $1");
        sqlx::query_as::<_, RenderJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all jobs for a scene, newest first.
    pub async fn list_by_scene(pool: &PgPool, scene_id: DbId) -> Result<Vec<RenderJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM render_jobs WHERE scene_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, RenderJob>(&query)
            .bind(scene_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a job completed with its cost estimate.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        cost_estimate: Option<f64>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE render_jobs SET status = $2, cost_estimate = $3, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(JobStatus::Completed.as_str())
        .bind(cost_estimate)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a job failed with the captured error message.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE render_jobs SET status = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(JobStatus::Failed.as_str())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count jobs still in a non-terminal state for a scene. The design
    /// allows at most one.
    pub async fn count_in_flight(pool: &PgPool, scene_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM render_jobs \
             WHERE scene_id = $1 AND status IN ('pending', 'processing')",
        )
        .bind(scene_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Startup recovery sweep: fail every job left non-terminal by a
    /// previous process lifetime. Returns the number of swept rows.
    pub async fn sweep_stale(pool: &PgPool, message: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE render_jobs SET status = 'failed', error_message = $1, completed_at = NOW() \
             WHERE status IN ('pending', 'processing')",
        )
        .bind(message)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
