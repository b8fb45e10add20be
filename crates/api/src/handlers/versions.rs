//! Handlers for scene version snapshots.
//!
//! Routes:
//! - `GET    /scenes/{id}/versions` — list archived snapshots
//! - `DELETE /versions/{id}`        — delete one snapshot incl. its file

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use kolorit_core::error::CoreError;
use kolorit_core::types::DbId;
use kolorit_db::models::scene_version::SceneVersion;
use kolorit_db::repositories::SceneVersionRepo;
use kolorit_pipeline::archive::remove_file_best_effort;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/scenes/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(scene_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SceneVersion>>>> {
    let versions = SceneVersionRepo::list_by_scene(&state.pool, scene_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// DELETE /api/v1/versions/{id}
///
/// Removes the snapshot row and its archived file (best-effort).
pub async fn delete_version(
    State(state): State<AppState>,
    Path(version_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = SceneVersionRepo::find_by_id(&state.pool, version_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SceneVersion",
            id: version_id,
        }))?;

    SceneVersionRepo::delete(&state.pool, version_id).await?;
    remove_file_best_effort(&version.image_path).await;

    Ok(StatusCode::NO_CONTENT)
}
