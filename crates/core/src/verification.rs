//! Consistency verification results and report parsing.
//!
//! The analysis capability returns a semi-structured textual report
//! (`SCORE:` / `ISSUE:` / `SUGGESTION:` lines). The parser here extracts
//! a typed [`VerificationOutcome`] from it, tolerating format drift:
//! every parse miss falls back to an explicit default instead of an
//! error. The parser is lossy and advisory by design, never
//! authoritative.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Minimum score for a verification to pass (absent critical issues).
pub const PASS_SCORE: i32 = 80;

/// Score recorded when the report contains no parseable `SCORE:` line,
/// and by the neutral fallback when analysis is unavailable. Sits above
/// the refinement trigger so a lost score never forces a retry loop.
pub const DEFAULT_SCORE: i32 = 75;

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Label,
    Orientation,
    Material,
    Proportion,
    Color,
    Other,
}

impl IssueKind {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "label" => Self::Label,
            "orientation" => Self::Orientation,
            "material" => Self::Material,
            "proportion" => Self::Proportion,
            "color" => Self::Color,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    Major,
    Minor,
}

impl IssueSeverity {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Self::Critical,
            "major" => Self::Major,
            _ => Self::Minor,
        }
    }
}

/// One defect reported by the analysis capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationIssue {
    /// Best-effort match back to a known material id.
    pub material_id: Option<DbId>,
    /// Material name as reported, verbatim.
    pub material_name: Option<String>,
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub description: String,
}

/// Typed result of one verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub score: i32,
    pub passed: bool,
    pub issues: Vec<VerificationIssue>,
    pub suggestions: Vec<String>,
}

impl VerificationOutcome {
    /// Neutral fallback when the analysis capability is unavailable or
    /// errors. Verification is advisory; its failure never fails the
    /// generation.
    pub fn unavailable(detail: &str) -> Self {
        Self {
            score: DEFAULT_SCORE,
            passed: true,
            issues: vec![VerificationIssue {
                material_id: None,
                material_name: None,
                kind: IssueKind::Other,
                severity: IssueSeverity::Minor,
                description: format!("Verification unavailable: {detail}"),
            }],
            suggestions: Vec::new(),
        }
    }

    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Critical)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Report parsing
// ---------------------------------------------------------------------------

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*SCORE:\s*(\d{1,3})").expect("valid regex"));

/// `ISSUE: [severity] material="name" kind=kind free-text description`.
/// Severity, material, and kind are each optional; anything that fails to
/// match its slot falls back to a default.
static ISSUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^\s*ISSUE:\s*(?:\[(\w+)\]\s*)?(?:material="([^"]*)"\s*)?(?:kind=(\w+)\s*)?(.*)$"#,
    )
    .expect("valid regex")
});

static SUGGESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*SUGGESTION:\s*(.+)$").expect("valid regex"));

/// Case-insensitive best-effort match of a reported material name back to
/// a known material id. Exact match wins, then substring containment in
/// either direction.
pub fn match_material(reported: &str, known: &[(DbId, String)]) -> Option<DbId> {
    let reported = reported.trim().to_lowercase();
    if reported.is_empty() {
        return None;
    }
    if let Some((id, _)) = known
        .iter()
        .find(|(_, name)| name.to_lowercase() == reported)
    {
        return Some(*id);
    }
    known
        .iter()
        .find(|(_, name)| {
            let name = name.to_lowercase();
            name.contains(&reported) || reported.contains(&name)
        })
        .map(|(id, _)| *id)
}

/// Parse an analysis report into a typed outcome.
///
/// Pass rule: `score >= PASS_SCORE` and no critical issue. A report with
/// no parseable score gets [`DEFAULT_SCORE`]; scores outside 0..=100 are
/// clamped. Unrecognised lines are ignored.
pub fn parse_report(report: &str, known_materials: &[(DbId, String)]) -> VerificationOutcome {
    let mut score: Option<i32> = None;
    let mut issues: Vec<VerificationIssue> = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();

    for line in report.lines() {
        if let Some(caps) = SCORE_RE.captures(line) {
            if score.is_none() {
                score = caps[1].parse::<i32>().ok().map(|s| s.clamp(0, 100));
            }
        } else if let Some(caps) = ISSUE_RE.captures(line) {
            let severity = caps
                .get(1)
                .map(|m| IssueSeverity::parse(m.as_str()))
                .unwrap_or(IssueSeverity::Minor);
            let material_name = caps.get(2).map(|m| m.as_str().trim().to_string());
            let kind = caps
                .get(3)
                .map(|m| IssueKind::parse(m.as_str()))
                .unwrap_or(IssueKind::Other);
            let description = caps
                .get(4)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let material_id = material_name
                .as_deref()
                .and_then(|name| match_material(name, known_materials));
            issues.push(VerificationIssue {
                material_id,
                material_name,
                kind,
                severity,
                description,
            });
        } else if let Some(caps) = SUGGESTION_RE.captures(line) {
            suggestions.push(caps[1].trim().to_string());
        }
    }

    let score = score.unwrap_or(DEFAULT_SCORE);
    let passed =
        score >= PASS_SCORE && !issues.iter().any(|i| i.severity == IssueSeverity::Critical);

    VerificationOutcome {
        score,
        passed,
        issues,
        suggestions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
