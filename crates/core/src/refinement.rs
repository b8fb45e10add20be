//! Auto-refinement decision logic and corrective instruction synthesis.
//!
//! After every verification the orchestrator asks this module whether to
//! enqueue another generation pass. The loop is bounded: once a scene has
//! used its attempts, or the result is merely mediocre rather than broken,
//! the scene finalizes with the most recent image. The system never blocks
//! indefinitely on verification.

use crate::verification::{IssueSeverity, VerificationOutcome};

/// Hard cap on automatic refinement passes per scene.
pub const MAX_REFINEMENT_ATTEMPTS: i32 = 3;

/// Below this score a failed verification triggers a retry even without
/// critical issues.
pub const RETRY_SCORE_THRESHOLD: i32 = 70;

/// Whether to run another corrective pass, and with which instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefinementDecision {
    Retry { instruction: String },
    Stop,
}

/// Decide retry vs. stop from the latest verification outcome and the
/// scene's current attempt counter.
///
/// Retry iff the verification failed, attempts remain, and the result is
/// bad enough to be worth another pass (score below
/// [`RETRY_SCORE_THRESHOLD`] or at least one critical issue).
pub fn evaluate(outcome: &VerificationOutcome, attempts: i32) -> RefinementDecision {
    if outcome.passed || attempts >= MAX_REFINEMENT_ATTEMPTS {
        return RefinementDecision::Stop;
    }
    if outcome.score < RETRY_SCORE_THRESHOLD || outcome.critical_count() > 0 {
        RefinementDecision::Retry {
            instruction: build_corrective_instruction(outcome),
        }
    } else {
        RefinementDecision::Stop
    }
}

/// Synthesize the corrective instruction for a refinement pass.
///
/// Critical issues come first, then major ones; minor issues are not
/// worth a pass and are dropped. Free-text suggestions follow, and the
/// closing directive pins everything else in place. Deterministic for
/// identical outcomes: ordering is by severity, then input order.
pub fn build_corrective_instruction(outcome: &VerificationOutcome) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("Correct the following defects in the image:".to_string());

    let mut n = 0;
    for severity in [IssueSeverity::Critical, IssueSeverity::Major] {
        for issue in outcome.issues.iter().filter(|i| i.severity == severity) {
            n += 1;
            let subject = issue
                .material_name
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("the scene");
            lines.push(format!(
                "{n}. [{}] {subject}: {}",
                match severity {
                    IssueSeverity::Critical => "critical",
                    IssueSeverity::Major => "major",
                    IssueSeverity::Minor => "minor",
                },
                issue.description,
            ));
        }
    }

    if !outcome.suggestions.is_empty() {
        lines.push("Suggested corrections:".to_string());
        for suggestion in &outcome.suggestions {
            lines.push(format!("- {suggestion}"));
        }
    }

    lines.push(
        "Apply only these corrections. Preserve the composition, lighting, and \
         camera angle of the image exactly as they are."
            .to_string(),
    );
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
