//! Perspective ranking for material reference images.
//!
//! Each material photo carries a free-form perspective label ("front",
//! "label detail", "packaged", ...). [`rank_perspective`] maps a label to
//! an integer priority for its category; higher ranks are selected first.
//! A rank of [`EXCLUDED`] removes the image from selection entirely.

use crate::category::{MaterialCategory, RankProfile};

/// Rank meaning "never use this image" (e.g. the back face of a motif
/// canvas, which only shows packaging text).
pub const EXCLUDED: u32 = 0;

/// Rank assigned to labels that match no known perspective for the
/// category. Unknown labels fall through here, never an error.
pub const UNCLASSIFIED: u32 = 10;

/// Rank a perspective label for a material category.
///
/// Pure and total: identical inputs always yield identical output.
/// Matching is case-insensitive substring matching, so "Label close-up"
/// and "close detail of label" land in the same tier.
pub fn rank_perspective(category: MaterialCategory, label: &str) -> u32 {
    let label = label.to_lowercase();
    let has = |needle: &str| label.contains(needle);

    match category.policy().rank_profile {
        // Paint pots: the printed label is the diagnostic detail.
        RankProfile::LabelFocus => {
            if has("detail") || has("label") {
                100
            } else if has("front") {
                90
            } else if has("top") {
                80
            } else if has("packag") {
                70
            } else {
                UNCLASSIFIED
            }
        }
        // Brushes: bristle shape identifies the product.
        RankProfile::BristleFocus => {
            if has("bristle") {
                100
            } else if has("side") {
                90
            } else if has("detail") {
                80
            } else {
                UNCLASSIFIED
            }
        }
        // Motif canvases: the back face only shows packaging text and
        // must never reach the generator.
        RankProfile::FrontFaceOnly => {
            if has("back") {
                EXCLUDED
            } else if has("front") {
                100
            } else if has("detail") {
                90
            } else {
                UNCLASSIFIED
            }
        }
        RankProfile::Generic => {
            if has("front") {
                100
            } else if has("detail") {
                90
            } else if has("side") {
                80
            } else if has("top") {
                70
            } else {
                UNCLASSIFIED
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
