mod material_repo;
mod project_repo;
mod render_job_repo;
mod scene_repo;
mod scene_version_repo;
mod verification_log_repo;

pub use material_repo::MaterialRepo;
pub use project_repo::ProjectRepo;
pub use render_job_repo::RenderJobRepo;
pub use scene_repo::SceneRepo;
pub use scene_version_repo::SceneVersionRepo;
pub use verification_log_repo::VerificationLogRepo;
