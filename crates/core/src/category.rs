//! Material categories and the per-category policy table.
//!
//! Ranking weights, reference-image caps, selection ordering, fidelity
//! notes, and absence restrictions all branch on the material category.
//! To keep those call sites consistent they consult a single
//! [`CategoryPolicy`] per category instead of repeating the branching
//! inline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category enumeration
// ---------------------------------------------------------------------------

/// Physical product category of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    /// Pre-printed paint-by-numbers canvas with the motif outline.
    CanvasMotif,
    /// Numbered paint pot / color cup.
    PaintPot,
    Brush,
    /// Blank stretched canvas (format reference, no motif).
    Canvas,
    Frame,
    Tool,
    Packaging,
    Accessory,
}

/// All categories, in declaration order. Used by the restriction builder
/// to find categories absent from a scene.
pub const ALL_CATEGORIES: [MaterialCategory; 8] = [
    MaterialCategory::CanvasMotif,
    MaterialCategory::PaintPot,
    MaterialCategory::Brush,
    MaterialCategory::Canvas,
    MaterialCategory::Frame,
    MaterialCategory::Tool,
    MaterialCategory::Packaging,
    MaterialCategory::Accessory,
];

impl MaterialCategory {
    /// Parse the database representation (`snake_case`). Returns `None`
    /// for unknown values; callers decide how to degrade.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "canvas_motif" => Some(Self::CanvasMotif),
            "paint_pot" => Some(Self::PaintPot),
            "brush" => Some(Self::Brush),
            "canvas" => Some(Self::Canvas),
            "frame" => Some(Self::Frame),
            "tool" => Some(Self::Tool),
            "packaging" => Some(Self::Packaging),
            "accessory" => Some(Self::Accessory),
            _ => None,
        }
    }

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CanvasMotif => "canvas_motif",
            Self::PaintPot => "paint_pot",
            Self::Brush => "brush",
            Self::Canvas => "canvas",
            Self::Frame => "frame",
            Self::Tool => "tool",
            Self::Packaging => "packaging",
            Self::Accessory => "accessory",
        }
    }

    /// The policy governing this category across ranking, selection and
    /// context building.
    pub fn policy(self) -> &'static CategoryPolicy {
        match self {
            Self::CanvasMotif => &CANVAS_MOTIF_POLICY,
            Self::PaintPot => &PAINT_POT_POLICY,
            Self::Brush => &BRUSH_POLICY,
            Self::Canvas => &CANVAS_POLICY,
            Self::Frame => &FRAME_POLICY,
            Self::Tool => &TOOL_POLICY,
            Self::Packaging => &PACKAGING_POLICY,
            Self::Accessory => &ACCESSORY_POLICY,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy table
// ---------------------------------------------------------------------------

/// How perspective labels are weighted for a category.
///
/// See [`crate::perspective::rank_perspective`] for the concrete weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankProfile {
    /// Printed label legibility dominates: detail > front > top > packaged.
    LabelFocus,
    /// Bristle shape dominates: bristles > side > detail.
    BristleFocus,
    /// Paintable face only: front > detail, back views excluded.
    FrontFaceOnly,
    /// Default weighting: front > detail > side > top.
    Generic,
}

/// Which fidelity note the context composer emits for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FidelityNote {
    /// Reference images show the product format and frame only — the
    /// printed motif comes from the uploaded motif images, never from
    /// the material reference.
    FormatOnly,
    /// The small printed alphanumeric label (≈2 characters) must remain
    /// legible and correctly placed.
    LabelLegibility,
    /// Generic appearance-match note.
    Generic,
}

/// Per-category policy consulted by the perspective ranker, the reference
/// image selector, and the context composer.
#[derive(Debug)]
pub struct CategoryPolicy {
    /// Selection ordering: lower tiers are granted reference-image slots
    /// first. Paint pots carry the most diagnostic detail, brushes next,
    /// everything else competes in the last tier.
    pub selection_tier: u8,
    /// Maximum reference images taken from a single material of this
    /// category.
    pub image_cap: usize,
    pub rank_profile: RankProfile,
    pub fidelity_note: FidelityNote,
    /// Negative constraint emitted when NO material of this category is
    /// part of the scene.
    pub absence_rule: &'static str,
}

static CANVAS_MOTIF_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 2,
    image_cap: 2,
    rank_profile: RankProfile::FrontFaceOnly,
    fidelity_note: FidelityNote::FormatOnly,
    absence_rule: "Do not show any pre-printed motif canvases.",
};

static PAINT_POT_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 0,
    image_cap: 5,
    rank_profile: RankProfile::LabelFocus,
    fidelity_note: FidelityNote::LabelLegibility,
    absence_rule: "Do not show any paint pots, color cups, or paint containers.",
};

static BRUSH_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 1,
    image_cap: 3,
    rank_profile: RankProfile::BristleFocus,
    fidelity_note: FidelityNote::Generic,
    absence_rule: "Do not show any brushes.",
};

static CANVAS_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 2,
    image_cap: 2,
    rank_profile: RankProfile::Generic,
    fidelity_note: FidelityNote::Generic,
    absence_rule: "Do not show any blank canvases.",
};

static FRAME_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 2,
    image_cap: 2,
    rank_profile: RankProfile::Generic,
    fidelity_note: FidelityNote::Generic,
    absence_rule: "Do not show any picture frames or stretcher bars.",
};

static TOOL_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 2,
    image_cap: 2,
    rank_profile: RankProfile::Generic,
    fidelity_note: FidelityNote::Generic,
    absence_rule: "Do not show any painting tools or easels.",
};

static PACKAGING_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 2,
    image_cap: 2,
    rank_profile: RankProfile::Generic,
    fidelity_note: FidelityNote::Generic,
    absence_rule: "Do not show any product boxes or packaging.",
};

static ACCESSORY_POLICY: CategoryPolicy = CategoryPolicy {
    selection_tier: 2,
    image_cap: 2,
    rank_profile: RankProfile::Generic,
    fidelity_note: FidelityNote::Generic,
    absence_rule: "Do not show any accessories that are not part of the set.",
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_every_category() {
        for cat in ALL_CATEGORIES {
            assert_eq!(MaterialCategory::parse(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(MaterialCategory::parse("easel"), None);
        assert_eq!(MaterialCategory::parse(""), None);
    }

    #[test]
    fn paint_pots_claim_slots_first() {
        assert_eq!(MaterialCategory::PaintPot.policy().selection_tier, 0);
        assert_eq!(MaterialCategory::Brush.policy().selection_tier, 1);
        assert!(MaterialCategory::Frame.policy().selection_tier > 1);
    }

    #[test]
    fn image_caps_match_category() {
        assert_eq!(MaterialCategory::PaintPot.policy().image_cap, 5);
        assert_eq!(MaterialCategory::Brush.policy().image_cap, 3);
        assert_eq!(MaterialCategory::CanvasMotif.policy().image_cap, 2);
        assert_eq!(MaterialCategory::Tool.policy().image_cap, 2);
    }
}
