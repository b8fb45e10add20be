//! Handlers for scene creation, regeneration, polling, review, and
//! deletion.
//!
//! Routes:
//! - `POST   /scenes`                    — create + enqueue initial generation
//! - `POST   /scenes/{id}/regenerate`    — re-enqueue (optional feedback)
//! - `GET    /scenes/{id}`               — poll current state
//! - `GET    /scenes/{id}/jobs`          — render job history
//! - `GET    /projects/{id}/scenes`      — catalog listing
//! - `PUT    /scenes/{id}/review`        — user rating/notes
//! - `DELETE /scenes/{id}`               — cascade delete incl. files
//!
//! Generation runs are spawned fire-and-forget: every enqueueing handler
//! returns 202 before the run produces anything.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use kolorit_core::error::CoreError;
use kolorit_core::types::DbId;
use kolorit_db::models::render_job::RenderJob;
use kolorit_db::models::scene::{CreateScene, Scene, UpdateSceneReview};
use kolorit_db::models::status::JobType;
use kolorit_db::repositories::{
    ProjectRepo, RenderJobRepo, SceneRepo, SceneVersionRepo,
};
use kolorit_pipeline::archive::remove_file_best_effort;
use kolorit_pipeline::{enqueue_regeneration, run_generation, RunRequest};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for `POST /scenes`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSceneRequest {
    pub project_id: DbId,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub template_name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub blueprint_path: Option<String>,
    /// Motif uploads are bounded; generation reserves one reference slot
    /// per motif.
    #[validate(length(max = 6))]
    pub motif_paths: Option<Vec<String>>,
    #[validate(length(max = 4))]
    pub extra_ref_paths: Option<Vec<String>>,
    pub aspect_ratio: Option<String>,
    pub width_px: Option<i32>,
    pub height_px: Option<i32>,
    pub material_ids: Option<Vec<DbId>>,
}

/// Request body for `POST /scenes/{id}/regenerate`.
#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    /// Optional user feedback folded into the generation instruction.
    pub feedback: Option<String>,
}

/// Request body for `PUT /scenes/{id}/review`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i16>,
    pub notes: Option<String>,
}

/// Response for enqueueing handlers: identifiers only, the caller polls
/// `GET /scenes/{id}` for progress.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub scene_id: DbId,
    pub job_id: DbId,
    pub image_status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scenes
///
/// Creates the scene in `generating` status, creates its `processing`
/// render job, spawns the run, and returns immediately.
pub async fn create_scene(
    State(state): State<AppState>,
    Json(input): Json<CreateSceneRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }))?;

    let scene = SceneRepo::create(
        &state.pool,
        &CreateScene {
            project_id: input.project_id,
            description: input.description,
            template_name: input.template_name,
            tags: input.tags,
            blueprint_path: input.blueprint_path,
            motif_paths: input.motif_paths,
            extra_ref_paths: input.extra_ref_paths,
            aspect_ratio: input.aspect_ratio,
            width_px: input.width_px,
            height_px: input.height_px,
            material_ids: input.material_ids,
        },
    )
    .await?;

    let job = RenderJobRepo::create(&state.pool, scene.id, JobType::Image).await?;
    spawn_run(&state, scene.id, job.id, None);

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: EnqueueResponse {
                scene_id: scene.id,
                job_id: job.id,
                image_status: scene.image_status,
            },
        }),
    ))
}

/// POST /api/v1/scenes/{id}/regenerate
///
/// Re-enqueues generation for an existing scene. Rejected with 409 while
/// another run is in flight — the per-scene claim is atomic.
pub async fn regenerate_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<DbId>,
    body: Option<Json<RegenerateRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(body)| body).unwrap_or_default();

    SceneRepo::find_by_id(&state.pool, scene_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Scene",
            id: scene_id,
        }))?;

    let Some(job) = enqueue_regeneration(&state.pool, scene_id).await? else {
        return Err(AppError::Core(CoreError::Conflict(
            "A generation is already in flight for this scene".to_string(),
        )));
    };
    spawn_run(&state, scene_id, job.id, input.feedback);

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: EnqueueResponse {
                scene_id,
                job_id: job.id,
                image_status: "generating".to_string(),
            },
        }),
    ))
}

/// GET /api/v1/scenes/{id}
///
/// Poll the current scene state. Safe to call repeatedly while a run is
/// in flight: read-only, no side effects.
pub async fn get_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Scene>>> {
    let scene = SceneRepo::find_by_id(&state.pool, scene_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Scene",
            id: scene_id,
        }))?;
    Ok(Json(DataResponse { data: scene }))
}

/// GET /api/v1/projects/{id}/scenes
pub async fn list_scenes(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Scene>>>> {
    let scenes = SceneRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: scenes }))
}

/// GET /api/v1/scenes/{id}/jobs
pub async fn list_scene_jobs(
    State(state): State<AppState>,
    Path(scene_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RenderJob>>>> {
    let jobs = RenderJobRepo::list_by_scene(&state.pool, scene_id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// PUT /api/v1/scenes/{id}/review
///
/// User rating and notes, independent of the automated verification.
pub async fn review_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<Scene>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let scene = SceneRepo::update_review(
        &state.pool,
        scene_id,
        &UpdateSceneReview {
            review_rating: input.rating,
            review_notes: input.notes,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Scene",
        id: scene_id,
    }))?;
    Ok(Json(DataResponse { data: scene }))
}

/// DELETE /api/v1/scenes/{id}
///
/// Deletes the scene; jobs, versions, and logs cascade. Rendered and
/// archived files are removed best-effort after the row is gone.
pub async fn delete_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scene = SceneRepo::find_by_id(&state.pool, scene_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Scene",
            id: scene_id,
        }))?;

    let versions = SceneVersionRepo::list_by_scene(&state.pool, scene_id).await?;
    SceneRepo::delete(&state.pool, scene_id).await?;

    if let Some(path) = &scene.image_path {
        remove_file_best_effort(path).await;
    }
    for version in &versions {
        remove_file_best_effort(&version.image_path).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Spawn a generation run decoupled from the request/response cycle.
fn spawn_run(state: &AppState, scene_id: DbId, job_id: DbId, feedback: Option<String>) {
    let pool = state.pool.clone();
    let storage = state.storage.clone();
    tokio::spawn(async move {
        run_generation(
            pool,
            storage,
            RunRequest {
                scene_id,
                job_id,
                feedback,
            },
        )
        .await;
    });
}
