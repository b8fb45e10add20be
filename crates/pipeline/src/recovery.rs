//! Startup recovery sweep.
//!
//! A process restart implicitly aborts every in-flight run. Before the
//! server accepts new requests, anything left non-terminal by the
//! previous lifetime is swept to `failed` so no scene ever sticks in
//! `generating` forever.

use kolorit_db::repositories::{RenderJobRepo, SceneRepo};
use sqlx::PgPool;

/// Message recorded on scenes and jobs orphaned by a restart.
pub const RESTART_MESSAGE: &str = "Generation was interrupted: the server restarted";

/// Sweep scenes left `generating` and jobs left `pending`/`processing`.
/// Call once at startup, before binding the listener.
pub async fn recover_interrupted(pool: &PgPool) -> Result<(), sqlx::Error> {
    let scenes = SceneRepo::sweep_stale_generating(pool, RESTART_MESSAGE).await?;
    let jobs = RenderJobRepo::sweep_stale(pool, RESTART_MESSAGE).await?;
    if scenes > 0 || jobs > 0 {
        tracing::warn!(scenes, jobs, "Swept interrupted generation work to failed");
    }
    Ok(())
}
