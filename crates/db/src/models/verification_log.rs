//! Verification log entity model: append-only record of every
//! consistency verification call, regardless of outcome.

use serde::Serialize;
use sqlx::FromRow;

use kolorit_core::types::{DbId, Timestamp};

/// A row from the `verification_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationLog {
    pub id: DbId,
    pub scene_id: DbId,
    pub check_type: String,
    pub score: Option<i32>,
    /// Serialized issue list, see `kolorit_core::verification`.
    pub issues: serde_json::Value,
    pub created_at: Timestamp,
}
