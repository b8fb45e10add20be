//! Project entity model. Project management is an external concern; the
//! core only needs the owning row for foreign-key integrity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kolorit_core::types::{DbId, Timestamp};

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
}
