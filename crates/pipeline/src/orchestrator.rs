//! The generation run state machine.
//!
//! A run owns one scene from claim to terminal state: it composes the
//! instruction, selects and loads reference images, calls the provider,
//! archives and persists results, verifies, and loops through bounded
//! refinement passes. Any error inside the run is caught at the run
//! boundary and converted into a `failed` scene + job — a run never
//! leaves its scene `generating`.

use std::path::PathBuf;

use sqlx::PgPool;

use kolorit_core::aspect::AspectRatio;
use kolorit_core::category::MaterialCategory;
use kolorit_core::context::{compose_generation_instruction, ComposeInput, MaterialInfo};
use kolorit_core::reference::{
    select_references, CandidateImage, MaterialCandidates, ReferenceRole,
};
use kolorit_core::refinement::{evaluate, RefinementDecision};
use kolorit_core::types::DbId;
use kolorit_db::models::render_job::RenderJob;
use kolorit_db::models::scene::Scene;
use kolorit_db::models::status::JobType;
use kolorit_db::repositories::{MaterialRepo, RenderJobRepo, SceneRepo};
use kolorit_provider::rest::RestProvider;
use kolorit_provider::{GenerateImageRequest, GenerationProvider, ProviderSettings};

use crate::archive::archive_previous_image;
use crate::references::load_reference_images;
use crate::storage::StorageLayout;
use crate::verify::run_verification;
use crate::RunError;

/// System instruction for the prompt enrichment call.
const ENRICH_SYSTEM: &str =
    "You expand product photography briefs for a paint-by-numbers catalog. Rewrite the \
     scene description into one vivid, concrete paragraph covering setting, surfaces, \
     lighting, and mood. Never introduce products that are not mentioned. Reply with \
     the expanded description only.";

/// Parameters for one enqueued generation run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub scene_id: DbId,
    /// The `processing` render job created at enqueue time.
    pub job_id: DbId,
    /// Optional user feedback folded into the generation instruction
    /// (feedback-driven regeneration).
    pub feedback: Option<String>,
}

/// What a single generation pass decided. `prompt` is the generation
/// prompt the pass used — the next pass archives the image under it.
enum PassOutcome {
    Done {
        cost: Option<f64>,
    },
    Refine {
        instruction: String,
        cost: Option<f64>,
        prompt: String,
    },
}

/// Input mode of a single pass.
enum PassKind {
    Initial { feedback: Option<String> },
    Refinement { instruction: String },
}

// ---------------------------------------------------------------------------
// Enqueueing
// ---------------------------------------------------------------------------

/// Claim an existing scene for a new run and create its `processing`
/// job. Returns `None` when a run is already in flight for the scene —
/// the claim is an atomic conditional update, so two overlapping
/// requests can never both win.
pub async fn enqueue_regeneration(
    pool: &PgPool,
    scene_id: DbId,
) -> Result<Option<RenderJob>, sqlx::Error> {
    let Some(_scene) = SceneRepo::try_claim_generation(pool, scene_id).await? else {
        return Ok(None);
    };
    let job = RenderJobRepo::create(pool, scene_id, JobType::Image).await?;
    Ok(Some(job))
}

// ---------------------------------------------------------------------------
// Run entry points
// ---------------------------------------------------------------------------

/// Entry point for spawned runs: resolves provider settings once, then
/// drives the run. Missing or placeholder credentials fail the scene
/// with a user-actionable message before any provider call.
pub async fn run_generation(pool: PgPool, storage: StorageLayout, request: RunRequest) {
    let settings = match ProviderSettings::resolve() {
        Ok(settings) => settings,
        Err(e) => {
            fail_run(&pool, request.scene_id, request.job_id, &e.to_string()).await;
            return;
        }
    };
    let provider = RestProvider::new(settings);
    run_generation_with(&pool, &storage, &provider, request).await;
}

/// Drive a run with an already-constructed provider. Loops through
/// refinement passes until the scene reaches a terminal state.
pub async fn run_generation_with(
    pool: &PgPool,
    storage: &StorageLayout,
    provider: &dyn GenerationProvider,
    request: RunRequest,
) {
    let scene_id = request.scene_id;
    let mut job_id = request.job_id;
    let mut pass = PassKind::Initial {
        feedback: request.feedback,
    };
    // Prompt used by the previous pass of this run; the archiver records
    // it against the image that pass produced.
    let mut previous_prompt: Option<String> = None;

    loop {
        match run_single_pass(pool, storage, provider, scene_id, &pass, previous_prompt.as_deref())
            .await
        {
            Ok(PassOutcome::Done { cost }) => {
                finalize_success(pool, scene_id, job_id, cost).await;
                return;
            }
            Ok(PassOutcome::Refine {
                instruction,
                cost,
                prompt,
            }) => {
                match start_refinement_pass(pool, scene_id, job_id, cost, &instruction).await {
                    Ok(new_job_id) => {
                        tracing::info!(scene_id, job_id = new_job_id, "Starting refinement pass");
                        job_id = new_job_id;
                        previous_prompt = Some(prompt);
                        pass = PassKind::Refinement { instruction };
                    }
                    Err(e) => {
                        fail_run(pool, scene_id, job_id, &e.to_string()).await;
                        return;
                    }
                }
            }
            Err(e) => {
                fail_run(pool, scene_id, job_id, &e.to_string()).await;
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Single pass
// ---------------------------------------------------------------------------

async fn run_single_pass(
    pool: &PgPool,
    storage: &StorageLayout,
    provider: &dyn GenerationProvider,
    scene_id: DbId,
    pass: &PassKind,
    previous_prompt: Option<&str>,
) -> Result<PassOutcome, RunError> {
    let scene = SceneRepo::find_by_id(pool, scene_id)
        .await?
        .ok_or(RunError::SceneGone(scene_id))?;

    // Active materials only — defense in depth even if the caller
    // already filtered.
    let (candidates, infos, known) = load_material_context(pool, &scene).await?;

    // Reference selection is pure; decoding skips unreadable files.
    let selection = select_references(
        &candidates,
        scene.blueprint_path.as_deref(),
        &scene.extra_ref_paths,
        &scene.motif_paths,
    );
    let motif_count = selection
        .iter()
        .filter(|r| r.role == ReferenceRole::Motif)
        .count();
    let has_blueprint = selection.iter().any(|r| r.role == ReferenceRole::Blueprint);
    let extra_ref_count = selection
        .iter()
        .filter(|r| r.role == ReferenceRole::ExtraRef)
        .count();
    let reference_images = load_reference_images(&selection).await;

    let (prompt, enriched, source_image) = match pass {
        PassKind::Initial { feedback } => {
            let enriched = match provider.enrich(ENRICH_SYSTEM, &scene.description).await? {
                text if text.trim().is_empty() => {
                    tracing::debug!(scene_id, "Empty enrichment, using raw description");
                    scene.description.clone()
                }
                text => text,
            };

            let compose = ComposeInput {
                description: enriched.clone(),
                tags: scene.tags.clone(),
                materials: infos.clone(),
                motif_count,
                has_blueprint,
                extra_ref_count,
            };
            let mut instruction = compose_generation_instruction(&compose);
            if let Some(feedback) = feedback {
                if !feedback.trim().is_empty() {
                    instruction.push_str("\n\nUser feedback to incorporate:\n");
                    instruction.push_str(feedback);
                }
            }
            (instruction, enriched, None)
        }
        PassKind::Refinement { instruction } => {
            // Edit the prior rendered image instead of generating from
            // scratch.
            let source_path = match scene.image_path.as_deref() {
                Some(path) => PathBuf::from(path),
                None => storage.scene_image_path(scene.id),
            };
            let source = tokio::fs::read(&source_path).await?;
            let enriched = scene
                .enriched_prompt
                .clone()
                .unwrap_or_else(|| scene.description.clone());
            (instruction.clone(), enriched, Some(source))
        }
    };

    let generated = provider
        .generate_image(&GenerateImageRequest {
            prompt: prompt.clone(),
            reference_images,
            aspect_ratio: resolve_aspect(&scene),
            size_hint: scene.width_px.zip(scene.height_px),
            source_image,
        })
        .await?;

    // Snapshot the previous image strictly before overwriting it.
    archive_previous_image(pool, storage, &scene, previous_prompt).await?;

    let image_path = storage.scene_image_path(scene.id);
    if let Some(parent) = image_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&image_path, &generated.bytes).await?;
    SceneRepo::update_rendered_image(pool, scene.id, &image_path.to_string_lossy(), &enriched)
        .await?;

    // Without active materials there is no ground truth to verify
    // against: terminal success.
    if infos.is_empty() {
        return Ok(PassOutcome::Done {
            cost: Some(generated.cost_estimate),
        });
    }

    let outcome = run_verification(
        pool,
        provider,
        scene.id,
        &generated.bytes,
        &infos,
        &known,
        &scene.description,
    )
    .await?;

    match evaluate(&outcome, scene.verification_attempts) {
        RefinementDecision::Retry { instruction } => Ok(PassOutcome::Refine {
            instruction,
            cost: Some(generated.cost_estimate),
            prompt,
        }),
        RefinementDecision::Stop => Ok(PassOutcome::Done {
            cost: Some(generated.cost_estimate),
        }),
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Complete the finished pass's job, bump the attempt counter, remember
/// the corrective instruction, and create the refinement job. Returns
/// the new job id.
async fn start_refinement_pass(
    pool: &PgPool,
    scene_id: DbId,
    job_id: DbId,
    cost: Option<f64>,
    instruction: &str,
) -> Result<DbId, sqlx::Error> {
    RenderJobRepo::complete(pool, job_id, cost).await?;
    let attempts = SceneRepo::start_refinement(pool, scene_id, instruction).await?;
    tracing::info!(scene_id, attempts, "Auto-refinement triggered");
    let job = RenderJobRepo::create(pool, scene_id, JobType::ImageRefinement).await?;
    Ok(job.id)
}

async fn finalize_success(pool: &PgPool, scene_id: DbId, job_id: DbId, cost: Option<f64>) {
    if let Err(e) = RenderJobRepo::complete(pool, job_id, cost).await {
        tracing::error!(scene_id, job_id, error = %e, "Failed to complete render job");
    }
    if let Err(e) = SceneRepo::mark_done(pool, scene_id).await {
        tracing::error!(scene_id, error = %e, "Failed to mark scene done");
    } else {
        tracing::info!(scene_id, job_id, "Scene generation finished");
    }
}

/// Convert any run error into terminal failure state. Logged, never
/// propagated: the spawned task has nobody to propagate to.
async fn fail_run(pool: &PgPool, scene_id: DbId, job_id: DbId, message: &str) {
    tracing::error!(scene_id, job_id, error = %message, "Generation run failed");
    if let Err(e) = SceneRepo::mark_failed(pool, scene_id, message).await {
        tracing::error!(scene_id, error = %e, "Failed to mark scene failed");
    }
    if let Err(e) = RenderJobRepo::fail(pool, job_id, message).await {
        tracing::error!(job_id, error = %e, "Failed to mark render job failed");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_material_context(
    pool: &PgPool,
    scene: &Scene,
) -> Result<(Vec<MaterialCandidates>, Vec<MaterialInfo>, Vec<(DbId, String)>), sqlx::Error> {
    let materials = MaterialRepo::list_for_scene(pool, scene.id).await?;

    let mut candidates = Vec::new();
    let mut infos = Vec::new();
    let mut known = Vec::new();

    for material in materials {
        if !material.is_engaged() {
            tracing::debug!(material_id = material.id, "Skipping idle material");
            continue;
        }
        let category = MaterialCategory::parse(&material.category).unwrap_or_else(|| {
            tracing::warn!(
                material_id = material.id,
                category = %material.category,
                "Unknown material category, treating as accessory",
            );
            MaterialCategory::Accessory
        });

        let images = MaterialRepo::list_images(pool, material.id).await?;
        candidates.push(MaterialCandidates {
            material_id: material.id,
            name: material.name.clone(),
            category,
            images: images
                .into_iter()
                .map(|img| CandidateImage {
                    file_path: img.file_path,
                    perspective: img.perspective,
                })
                .collect(),
        });
        infos.push(MaterialInfo {
            name: material.name.clone(),
            category,
            size_text: material.size_text.clone(),
            color: material.color.clone(),
            surface: material.surface.clone(),
        });
        known.push((material.id, material.name));
    }

    Ok((candidates, infos, known))
}

/// Resolve the scene's target aspect ratio: stored ratio string, then
/// named preset, then nearest match of explicit pixel dimensions, then
/// the square default.
fn resolve_aspect(scene: &Scene) -> AspectRatio {
    AspectRatio::parse(&scene.aspect_ratio)
        .or_else(|| AspectRatio::from_preset(&scene.aspect_ratio))
        .or_else(|| {
            scene
                .width_px
                .zip(scene.height_px)
                .map(|(w, h)| AspectRatio::from_dimensions(w, h))
        })
        .unwrap_or(AspectRatio::Square)
}
