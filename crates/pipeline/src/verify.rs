//! Consistency verification driver.
//!
//! Bridges the pure verification logic in `kolorit_core` with the
//! analysis capability and persistence: builds the checklist, invokes
//! the provider, parses the report, and records the outcome. Analysis
//! failures are absorbed into a neutral result — verification is
//! advisory, never a hard gate.

use kolorit_core::context::{compose_verification_checklist, MaterialInfo};
use kolorit_core::types::DbId;
use kolorit_core::verification::{parse_report, VerificationOutcome};
use kolorit_db::repositories::{SceneRepo, VerificationLogRepo};
use kolorit_provider::GenerationProvider;
use sqlx::PgPool;

/// Check type recorded on every image verification log row.
pub const CHECK_TYPE_IMAGE: &str = "image_consistency";

/// Verify a rendered image against material ground truth.
///
/// Appends one verification log row and updates the scene's score and
/// issue list regardless of outcome. Only database errors propagate.
pub async fn run_verification(
    pool: &PgPool,
    provider: &dyn GenerationProvider,
    scene_id: DbId,
    image: &[u8],
    materials: &[MaterialInfo],
    known_materials: &[(DbId, String)],
    scene_description: &str,
) -> Result<VerificationOutcome, sqlx::Error> {
    let checklist = compose_verification_checklist(materials, scene_description);

    let outcome = match provider.analyze_consistency(image, &checklist).await {
        Ok(report) => parse_report(&report, known_materials),
        Err(e) => {
            tracing::warn!(
                scene_id,
                error = %e,
                "Consistency analysis unavailable, falling back to neutral result",
            );
            VerificationOutcome::unavailable(&e.to_string())
        }
    };

    let issues_json =
        serde_json::to_value(&outcome.issues).unwrap_or_else(|_| serde_json::Value::Array(vec![]));

    VerificationLogRepo::append(pool, scene_id, CHECK_TYPE_IMAGE, Some(outcome.score), &issues_json)
        .await?;
    SceneRepo::record_verification(pool, scene_id, outcome.score, &issues_json).await?;

    tracing::info!(
        scene_id,
        score = outcome.score,
        passed = outcome.passed,
        issues = outcome.issues.len(),
        "Verification recorded",
    );
    Ok(outcome)
}
