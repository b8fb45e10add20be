//! Version archival: snapshot the previous rendered image before a new
//! one overwrites it.

use kolorit_db::models::scene::Scene;
use kolorit_db::models::scene_version::SceneVersion;
use kolorit_db::repositories::SceneVersionRepo;
use sqlx::PgPool;

use crate::storage::StorageLayout;

/// Archive a scene's current rendered image as the next scene version.
///
/// `prompt_hint` is the prompt that produced the image being archived,
/// when the caller knows it (mid-run refinement); without it the scene
/// row's prompt fields are the best available record.
///
/// Best-effort: a scene without an image yet, or whose image file has
/// gone missing, is skipped with a warning. Only a database failure
/// propagates. Must run strictly before the new image overwrites
/// `image_path`.
pub async fn archive_previous_image(
    pool: &PgPool,
    storage: &StorageLayout,
    scene: &Scene,
    prompt_hint: Option<&str>,
) -> Result<Option<SceneVersion>, sqlx::Error> {
    let Some(current_path) = scene.image_path.as_deref() else {
        return Ok(None);
    };

    let version_number = SceneVersionRepo::next_version_number(pool, scene.id).await?;
    let archive_path = storage.version_image_path(scene.id, version_number);

    if let Some(parent) = archive_path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::warn!(scene_id = scene.id, error = %e, "Skipping version snapshot");
            return Ok(None);
        }
    }

    if let Err(e) = tokio::fs::copy(current_path, &archive_path).await {
        tracing::warn!(
            scene_id = scene.id,
            source = %current_path,
            error = %e,
            "Skipping version snapshot, previous image not readable",
        );
        return Ok(None);
    }

    let prompt = prompt_hint
        .or(scene.last_refinement_prompt.as_deref())
        .or(scene.enriched_prompt.as_deref())
        .unwrap_or("");

    let version = SceneVersionRepo::create_numbered(
        pool,
        scene.id,
        version_number,
        &archive_path.to_string_lossy(),
        prompt,
    )
    .await?;

    tracing::info!(
        scene_id = scene.id,
        version_number,
        "Archived previous rendered image",
    );
    Ok(Some(version))
}

/// Remove a file, logging instead of failing when it is already gone.
/// Used by scene and version deletion.
pub async fn remove_file_best_effort(path: &str) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path, error = %e, "Failed to remove file");
        }
    }
}
