//! Integration tests for scene version numbering, render job lifecycle,
//! and the verification log.

use sqlx::PgPool;

use kolorit_db::models::project::CreateProject;
use kolorit_db::models::scene::CreateScene;
use kolorit_db::models::status::JobType;
use kolorit_db::repositories::{
    ProjectRepo, RenderJobRepo, SceneRepo, SceneVersionRepo, VerificationLogRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup_scene(pool: &PgPool, suffix: &str) -> i64 {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: format!("VJP_{suffix}"),
        },
    )
    .await
    .unwrap();
    SceneRepo::create(
        pool,
        &CreateScene {
            project_id: project.id,
            description: format!("Scene {suffix}"),
            template_name: None,
            tags: None,
            blueprint_path: None,
            motif_paths: None,
            extra_ref_paths: None,
            aspect_ratio: None,
            width_px: None,
            height_px: None,
            material_ids: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Scene versions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_version_numbers_are_sequential_from_one(pool: PgPool) {
    let scene_id = setup_scene(&pool, "seq").await;

    assert_eq!(
        SceneVersionRepo::next_version_number(&pool, scene_id).await.unwrap(),
        1
    );

    for expected in 1..=3 {
        let version = SceneVersionRepo::create(
            &pool,
            scene_id,
            &format!("/media/versions/{scene_id}_v{expected}.png"),
            "prompt",
        )
        .await
        .unwrap();
        assert_eq!(version.version_number, expected);
    }

    let versions = SceneVersionRepo::list_by_scene(&pool, scene_id).await.unwrap();
    let numbers: Vec<i32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_version_numbering_is_per_scene(pool: PgPool) {
    let first = setup_scene(&pool, "per_a").await;
    let second = setup_scene(&pool, "per_b").await;

    SceneVersionRepo::create(&pool, first, "/v/a1.png", "").await.unwrap();
    SceneVersionRepo::create(&pool, first, "/v/a2.png", "").await.unwrap();
    let other = SceneVersionRepo::create(&pool, second, "/v/b1.png", "").await.unwrap();

    assert_eq!(other.version_number, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_version_delete_and_cascade(pool: PgPool) {
    let scene_id = setup_scene(&pool, "cascade").await;
    let version = SceneVersionRepo::create(&pool, scene_id, "/v/1.png", "").await.unwrap();

    assert!(SceneVersionRepo::delete(&pool, version.id).await.unwrap());
    assert!(SceneVersionRepo::find_by_id(&pool, version.id).await.unwrap().is_none());

    // Remaining versions cascade with the scene.
    SceneVersionRepo::create(&pool, scene_id, "/v/2.png", "").await.unwrap();
    SceneRepo::delete(&pool, scene_id).await.unwrap();
    assert!(SceneVersionRepo::list_by_scene(&pool, scene_id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Render jobs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_job_lifecycle_complete(pool: PgPool) {
    let scene_id = setup_scene(&pool, "job_ok").await;
    let job = RenderJobRepo::create(&pool, scene_id, JobType::Image).await.unwrap();

    assert_eq!(job.status, "processing");
    assert_eq!(job.job_type, "image");
    assert!(job.started_at.is_some());
    assert_eq!(RenderJobRepo::count_in_flight(&pool, scene_id).await.unwrap(), 1);

    RenderJobRepo::complete(&pool, job.id, Some(0.08)).await.unwrap();
    let done = RenderJobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, "completed");
    assert_eq!(done.cost_estimate, Some(0.08));
    assert!(done.completed_at.is_some());
    assert_eq!(RenderJobRepo::count_in_flight(&pool, scene_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_job_lifecycle_fail(pool: PgPool) {
    let scene_id = setup_scene(&pool, "job_fail").await;
    let job = RenderJobRepo::create(&pool, scene_id, JobType::ImageRefinement)
        .await
        .unwrap();

    RenderJobRepo::fail(&pool, job.id, "Safety rejection").await.unwrap();
    let failed = RenderJobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, "failed");
    assert_eq!(failed.job_type, "image_refinement");
    assert_eq!(failed.error_message.as_deref(), Some("Safety rejection"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_job_sweep_fails_in_flight_only(pool: PgPool) {
    let scene_id = setup_scene(&pool, "job_sweep").await;
    let stuck = RenderJobRepo::create(&pool, scene_id, JobType::Image).await.unwrap();
    let done = RenderJobRepo::create(&pool, scene_id, JobType::Image).await.unwrap();
    RenderJobRepo::complete(&pool, done.id, None).await.unwrap();

    let swept = RenderJobRepo::sweep_stale(&pool, "server restarted").await.unwrap();
    assert_eq!(swept, 1);

    let stuck = RenderJobRepo::find_by_id(&pool, stuck.id).await.unwrap().unwrap();
    assert_eq!(stuck.status, "failed");
    let done = RenderJobRepo::find_by_id(&pool, done.id).await.unwrap().unwrap();
    assert_eq!(done.status, "completed");
}

// ---------------------------------------------------------------------------
// Verification log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_verification_log_appends(pool: PgPool) {
    let scene_id = setup_scene(&pool, "vlog").await;
    let issues = serde_json::json!([{ "kind": "label", "severity": "critical" }]);

    VerificationLogRepo::append(&pool, scene_id, "image_consistency", Some(55), &issues)
        .await
        .unwrap();
    VerificationLogRepo::append(&pool, scene_id, "image_consistency", Some(90), &serde_json::json!([]))
        .await
        .unwrap();

    assert_eq!(VerificationLogRepo::count_for_scene(&pool, scene_id).await.unwrap(), 2);
    let logs = VerificationLogRepo::list_by_scene(&pool, scene_id).await.unwrap();
    assert_eq!(logs[0].score, Some(55));
    assert_eq!(logs[0].issues, issues);
    assert_eq!(logs[1].score, Some(90));
}
