//! Material/scene context composition.
//!
//! Turns structured material and scene data into the natural-language
//! instruction blocks consumed by the generation provider, and the
//! checklist consumed by the consistency verifier. All builders degrade
//! gracefully: unparseable sizes drop out of the scale computation,
//! empty inputs produce empty blocks.

use std::sync::LazyLock;

use regex::Regex;

use crate::category::{FidelityNote, MaterialCategory, ALL_CATEGORIES};

/// Material attributes the composer cares about. A projection of the
/// `materials` row; the composer never sees idle materials.
#[derive(Debug, Clone)]
pub struct MaterialInfo {
    pub name: String,
    pub category: MaterialCategory,
    /// Free-form declared size, e.g. `"30 × 40 cm"` or `"2 cm"`.
    pub size_text: Option<String>,
    pub color: Option<String>,
    pub surface: Option<String>,
}

// ---------------------------------------------------------------------------
// Size parsing
// ---------------------------------------------------------------------------

/// `"W×H unit"` form, e.g. `30 × 40 cm`, `20x20cm`, `50 * 70 mm`.
static DIMENSIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*[x×*]\s*(\d+(?:[.,]\d+)?)\s*(mm|cm)\b")
        .expect("valid regex")
});

/// `"value unit"` form, e.g. `2 cm`, `750mm`.
static SCALAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(mm|cm)\b").expect("valid regex"));

fn unit_to_mm(unit: &str) -> f64 {
    if unit.eq_ignore_ascii_case("cm") {
        10.0
    } else {
        1.0
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}

/// Parse a declared size string into a millimeter scalar.
///
/// Two-dimensional sizes collapse to their larger dimension, which is the
/// visually dominant extent in a product shot. Only `mm` and `cm` units
/// are recognised; anything else (volumes, weights, free text) returns
/// `None` and the material silently drops out of the scale computation.
pub fn parse_size_mm(size_text: &str) -> Option<f64> {
    if let Some(caps) = DIMENSIONS_RE.captures(size_text) {
        let w = parse_number(&caps[1])?;
        let h = parse_number(&caps[2])?;
        let factor = unit_to_mm(&caps[3]);
        return Some(w.max(h) * factor);
    }
    if let Some(caps) = SCALAR_RE.captures(size_text) {
        let v = parse_number(&caps[1])?;
        return Some(v * unit_to_mm(&caps[2]));
    }
    None
}

// ---------------------------------------------------------------------------
// Restriction builder
// ---------------------------------------------------------------------------

/// Closing rule appended to every restriction block.
const ONLY_REFERENCED_RULE: &str =
    "Only objects shown in the provided reference images and the uploaded \
     motifs may appear in the scene. Do not invent additional products.";

/// Build the negative-constraint block: one rule per category that is
/// absent from the scene's active material set, plus the closing
/// only-referenced-content rule.
pub fn build_restrictions(materials: &[MaterialInfo]) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for category in ALL_CATEGORIES {
        let present = materials.iter().any(|m| m.category == category);
        if !present {
            lines.push(category.policy().absence_rule);
        }
    }
    lines.push(ONLY_REFERENCED_RULE);
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Scale / proportion builder
// ---------------------------------------------------------------------------

/// Build the proportion statement from declared material sizes.
///
/// Requires at least two parseable sizes and a real spread between the
/// smallest and largest; otherwise returns `None` and no statement is
/// emitted.
pub fn build_scale_statement(materials: &[MaterialInfo]) -> Option<String> {
    let mut sized: Vec<(&MaterialInfo, f64)> = materials
        .iter()
        .filter_map(|m| {
            m.size_text
                .as_deref()
                .and_then(parse_size_mm)
                .map(|mm| (m, mm))
        })
        .collect();
    if sized.len() < 2 {
        return None;
    }
    sized.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let (smallest, small_mm) = sized.first()?;
    let (largest, large_mm) = sized.last()?;
    if small_mm >= large_mm {
        return None;
    }

    let ratio = large_mm / small_mm;
    Some(format!(
        "Respect real-world proportions: {} measures about {:.1} cm, {} about {:.1} cm. \
         That is a size ratio of roughly 1 to {:.0}. Keep these relative sizes accurate.",
        smallest.name,
        small_mm / 10.0,
        largest.name,
        large_mm / 10.0,
        ratio,
    ))
}

// ---------------------------------------------------------------------------
// Fidelity notes
// ---------------------------------------------------------------------------

/// Per-material fidelity note, selected via the category policy.
pub fn fidelity_note(material: &MaterialInfo) -> String {
    match material.category.policy().fidelity_note {
        FidelityNote::FormatOnly => format!(
            "The reference images for \"{}\" show the product format and frame only. \
             The printed motif on the canvas must come exclusively from the uploaded \
             motif images, never from the material references.",
            material.name
        ),
        FidelityNote::LabelLegibility => format!(
            "\"{}\" carries a small printed alphanumeric label of about two characters. \
             The label must stay legible, unaltered, and in its original position.",
            material.name
        ),
        FidelityNote::Generic => format!(
            "\"{}\" must match its reference images exactly in shape, color, and surface finish.",
            material.name
        ),
    }
}

// ---------------------------------------------------------------------------
// Full instruction assembly
// ---------------------------------------------------------------------------

/// Everything the composer needs to assemble a generation instruction.
#[derive(Debug, Clone, Default)]
pub struct ComposeInput {
    /// Scene description (the enriched variant when available).
    pub description: String,
    pub tags: Vec<String>,
    pub materials: Vec<MaterialInfo>,
    /// Number of motif images at the tail of the reference list.
    pub motif_count: usize,
    pub has_blueprint: bool,
    pub extra_ref_count: usize,
}

/// Assemble the full generation instruction text.
///
/// Block order: scene intent, style tags, fidelity notes, proportions,
/// restrictions, auxiliary-image directives. The motif directive refers
/// to "the last N images" and relies on the reference selector placing
/// motifs at the tail of the list.
pub fn compose_generation_instruction(input: &ComposeInput) -> String {
    let mut blocks: Vec<String> = Vec::new();

    blocks.push(format!(
        "Create a professional product photograph for a paint-by-numbers catalog.\n{}",
        input.description
    ));

    if !input.tags.is_empty() {
        blocks.push(format!("Visual style: {}.", input.tags.join(", ")));
    }

    if !input.materials.is_empty() {
        let notes: Vec<String> = input.materials.iter().map(fidelity_note).collect();
        blocks.push(format!("Material fidelity rules:\n{}", notes.join("\n")));
    }

    if let Some(scale) = build_scale_statement(&input.materials) {
        blocks.push(scale);
    }

    blocks.push(format!("Restrictions:\n{}", build_restrictions(&input.materials)));

    if input.has_blueprint {
        blocks.push(
            "One reference image is a composition blueprint. Follow its layout and \
             object placement."
                .to_string(),
        );
    }
    if input.extra_ref_count > 0 {
        blocks.push(format!(
            "{} reference image(s) show people or objects to include as depicted.",
            input.extra_ref_count
        ));
    }
    if input.motif_count > 0 {
        blocks.push(format!(
            "The last {} reference image(s) contain the exact motif(s) printed on the \
             canvas. Reproduce them faithfully and completely.",
            input.motif_count
        ));
    }

    blocks.join("\n\n")
}

// ---------------------------------------------------------------------------
// Verification checklist
// ---------------------------------------------------------------------------

/// Build the category-aware checklist handed to the analysis capability,
/// including the report format the verifier parses back.
pub fn compose_verification_checklist(materials: &[MaterialInfo], scene_description: &str) -> String {
    let mut checks: Vec<String> = Vec::new();
    for m in materials {
        let check = match m.category.policy().fidelity_note {
            FidelityNote::LabelLegibility => format!(
                "Check the printed label on \"{}\": is it legible, are the characters \
                 correct, is it in the right position?",
                m.name
            ),
            FidelityNote::FormatOnly => format!(
                "Check that \"{}\" shows only its front, paintable face and that the \
                 canvas format matches the references.",
                m.name
            ),
            FidelityNote::Generic if m.category == MaterialCategory::Brush => format!(
                "Check bristle shape and handle of \"{}\" against the references.",
                m.name
            ),
            FidelityNote::Generic => format!(
                "Check the overall appearance of \"{}\" against its reference images.",
                m.name
            ),
        };
        checks.push(format!("- {check}"));
    }

    format!(
        "Compare the generated product photograph against the material reference \
         images and the scene intent below.\n\nScene intent: {}\n\nChecklist:\n{}\n\n\
         Report format, one statement per line:\n\
         SCORE: <integer 0-100>\n\
         ISSUE: [critical|major|minor] material=\"<name>\" kind=<label|orientation|material|proportion|color|other> <description>\n\
         SUGGESTION: <one concrete correction>",
        scene_description,
        checks.join("\n"),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
