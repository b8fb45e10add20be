//! Integration tests for scene status transitions and the atomic
//! generation claim.

use sqlx::PgPool;

use kolorit_db::models::project::CreateProject;
use kolorit_db::models::scene::{CreateScene, UpdateSceneReview};
use kolorit_db::repositories::{ProjectRepo, SceneRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_scene(project_id: i64, description: &str) -> CreateScene {
    CreateScene {
        project_id,
        description: description.to_string(),
        template_name: None,
        tags: Some(vec!["studio".to_string()]),
        blueprint_path: None,
        motif_paths: None,
        extra_ref_paths: None,
        aspect_ratio: None,
        width_px: None,
        height_px: None,
        material_ids: None,
    }
}

async fn setup_project(pool: &PgPool, name: &str) -> i64 {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_starts_generating(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_create").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Table scene"))
        .await
        .unwrap();

    assert_eq!(scene.image_status, "generating");
    assert_eq!(scene.image_path, None);
    assert_eq!(scene.verification_attempts, 0);
    assert_eq!(scene.aspect_ratio, "1:1");
    assert_eq!(scene.tags, vec!["studio".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_claim_is_exclusive_while_generating(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_claim").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Scene"))
        .await
        .unwrap();

    // Freshly created scenes are already generating: a second claim
    // must lose.
    let second = SceneRepo::try_claim_generation(&pool, scene.id).await.unwrap();
    assert!(second.is_none());

    // After the run finishes, the scene can be claimed again.
    SceneRepo::mark_done(&pool, scene.id).await.unwrap();
    let reclaimed = SceneRepo::try_claim_generation(&pool, scene.id).await.unwrap();
    assert!(reclaimed.is_some());
    assert_eq!(reclaimed.unwrap().image_status, "generating");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_claim_missing_scene_returns_none(pool: PgPool) {
    assert!(SceneRepo::try_claim_generation(&pool, 424242)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failure_records_message_and_clears_on_reclaim(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_fail").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Scene"))
        .await
        .unwrap();

    SceneRepo::mark_failed(&pool, scene.id, "Provider quota exceeded")
        .await
        .unwrap();
    let failed = SceneRepo::find_by_id(&pool, scene.id).await.unwrap().unwrap();
    assert_eq!(failed.image_status, "failed");
    assert_eq!(failed.last_error_message.as_deref(), Some("Provider quota exceeded"));

    // A failed scene stays regenerable; reclaiming clears the error.
    let reclaimed = SceneRepo::try_claim_generation(&pool, scene.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reclaimed.image_status, "generating");
    assert_eq!(reclaimed.last_error_message, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rendered_image_and_verification_fields(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_render").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Scene"))
        .await
        .unwrap();

    SceneRepo::update_rendered_image(&pool, scene.id, "/media/scenes/1.png", "enriched text")
        .await
        .unwrap();
    let issues = serde_json::json!([{ "kind": "label", "severity": "major" }]);
    SceneRepo::record_verification(&pool, scene.id, 72, &issues)
        .await
        .unwrap();

    let loaded = SceneRepo::find_by_id(&pool, scene.id).await.unwrap().unwrap();
    assert_eq!(loaded.image_path.as_deref(), Some("/media/scenes/1.png"));
    assert_eq!(loaded.enriched_prompt.as_deref(), Some("enriched text"));
    assert_eq!(loaded.verification_score, Some(72));
    assert_eq!(loaded.verification_issues, Some(issues));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refinement_counter_increments(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_refine").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Scene"))
        .await
        .unwrap();

    let first = SceneRepo::start_refinement(&pool, scene.id, "fix the label")
        .await
        .unwrap();
    assert_eq!(first, 1);
    let second = SceneRepo::start_refinement(&pool, scene.id, "fix it harder")
        .await
        .unwrap();
    assert_eq!(second, 2);

    let loaded = SceneRepo::find_by_id(&pool, scene.id).await.unwrap().unwrap();
    assert_eq!(loaded.verification_attempts, 2);
    assert_eq!(loaded.last_refinement_prompt.as_deref(), Some("fix it harder"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_recovery_sweep_fails_generating_scenes(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_sweep").await;
    let stuck = SceneRepo::create(&pool, &new_scene(project_id, "Stuck"))
        .await
        .unwrap();
    let finished = SceneRepo::create(&pool, &new_scene(project_id, "Finished"))
        .await
        .unwrap();
    SceneRepo::mark_done(&pool, finished.id).await.unwrap();

    let swept = SceneRepo::sweep_stale_generating(&pool, "server restarted")
        .await
        .unwrap();
    assert_eq!(swept, 1);

    let stuck = SceneRepo::find_by_id(&pool, stuck.id).await.unwrap().unwrap();
    assert_eq!(stuck.image_status, "failed");
    assert_eq!(stuck.last_error_message.as_deref(), Some("server restarted"));

    let finished = SceneRepo::find_by_id(&pool, finished.id).await.unwrap().unwrap();
    assert_eq!(finished.image_status, "done");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_feedback_is_independent(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_review").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Scene"))
        .await
        .unwrap();

    let updated = SceneRepo::update_review(
        &pool,
        scene.id,
        &UpdateSceneReview {
            review_rating: Some(4),
            review_notes: Some("Pot label slightly blurry".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.review_rating, Some(4));
    assert_eq!(updated.verification_score, None);
    // Review feedback does not touch generation state.
    assert_eq!(updated.image_status, "generating");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_cascades(pool: PgPool) {
    let project_id = setup_project(&pool, "SLP_delete").await;
    let scene = SceneRepo::create(&pool, &new_scene(project_id, "Scene"))
        .await
        .unwrap();

    assert!(SceneRepo::delete(&pool, scene.id).await.unwrap());
    assert!(SceneRepo::find_by_id(&pool, scene.id).await.unwrap().is_none());
    assert!(!SceneRepo::delete(&pool, scene.id).await.unwrap());
}
