//! Aspect ratio resolution.
//!
//! Generation providers accept a fixed set of aspect ratios. Scenes carry
//! either a named export preset or explicit pixel dimensions; both resolve
//! to the nearest supported ratio.

use serde::{Deserialize, Serialize};

/// Aspect ratios supported by the generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "9:16")]
    Portrait9x16,
}

/// All supported ratios with their numeric width/height value.
const RATIOS: [(AspectRatio, f64); 7] = [
    (AspectRatio::Square, 1.0),
    (AspectRatio::Landscape4x3, 4.0 / 3.0),
    (AspectRatio::Landscape3x2, 3.0 / 2.0),
    (AspectRatio::Landscape16x9, 16.0 / 9.0),
    (AspectRatio::Portrait3x4, 3.0 / 4.0),
    (AspectRatio::Portrait2x3, 2.0 / 3.0),
    (AspectRatio::Portrait9x16, 9.0 / 16.0),
];

impl AspectRatio {
    /// Wire representation, e.g. `"16:9"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape4x3 => "4:3",
            Self::Landscape3x2 => "3:2",
            Self::Landscape16x9 => "16:9",
            Self::Portrait3x4 => "3:4",
            Self::Portrait2x3 => "2:3",
            Self::Portrait9x16 => "9:16",
        }
    }

    /// Parse the wire representation. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        RATIOS.iter().find(|(r, _)| r.as_str() == s).map(|(r, _)| *r)
    }

    /// Nearest supported ratio for explicit pixel dimensions.
    ///
    /// Comparison happens in log space so that 2:1 is as far from 1:1 as
    /// 1:2. Zero or negative dimensions fall back to [`Self::Square`].
    pub fn from_dimensions(width_px: i32, height_px: i32) -> Self {
        if width_px <= 0 || height_px <= 0 {
            return Self::Square;
        }
        let target = (width_px as f64 / height_px as f64).ln();
        RATIOS
            .iter()
            .min_by(|(_, a), (_, b)| {
                let da = (a.ln() - target).abs();
                let db = (b.ln() - target).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(r, _)| *r)
            .unwrap_or(Self::Square)
    }

    /// Resolve a named export preset used by the catalog tooling.
    /// Unknown presets resolve to `None`; callers fall back to pixel
    /// dimensions or the square default.
    pub fn from_preset(preset: &str) -> Option<Self> {
        match preset {
            "catalog_square" => Some(Self::Square),
            "catalog_landscape" => Some(Self::Landscape4x3),
            "web_banner" => Some(Self::Landscape16x9),
            "catalog_portrait" => Some(Self::Portrait3x4),
            "story" => Some(Self::Portrait9x16),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_dimensions_resolve_exactly() {
        assert_eq!(AspectRatio::from_dimensions(1024, 1024), AspectRatio::Square);
        assert_eq!(AspectRatio::from_dimensions(1920, 1080), AspectRatio::Landscape16x9);
        assert_eq!(AspectRatio::from_dimensions(1080, 1920), AspectRatio::Portrait9x16);
    }

    #[test]
    fn near_dimensions_resolve_to_nearest() {
        // 1000x760 is closest to 4:3.
        assert_eq!(AspectRatio::from_dimensions(1000, 760), AspectRatio::Landscape4x3);
        // Portrait equivalent.
        assert_eq!(AspectRatio::from_dimensions(760, 1000), AspectRatio::Portrait3x4);
    }

    #[test]
    fn degenerate_dimensions_fall_back_to_square() {
        assert_eq!(AspectRatio::from_dimensions(0, 100), AspectRatio::Square);
        assert_eq!(AspectRatio::from_dimensions(100, -1), AspectRatio::Square);
    }

    #[test]
    fn parse_roundtrips() {
        for (ratio, _) in RATIOS {
            assert_eq!(AspectRatio::parse(ratio.as_str()), Some(ratio));
        }
        assert_eq!(AspectRatio::parse("5:4"), None);
    }

    #[test]
    fn presets_resolve() {
        assert_eq!(AspectRatio::from_preset("catalog_square"), Some(AspectRatio::Square));
        assert_eq!(AspectRatio::from_preset("story"), Some(AspectRatio::Portrait9x16));
        assert_eq!(AspectRatio::from_preset("unknown"), None);
    }
}
