//! Reference image selection.
//!
//! Builds the capacity-bounded, deterministically ordered list of
//! reference image paths handed to the generation provider. Selection is
//! pure — file reading (and skipping of unreadable files) happens in the
//! pipeline crate.

use crate::category::MaterialCategory;
use crate::perspective::{rank_perspective, EXCLUDED};
use crate::types::DbId;

/// Global cap on reference images per generation request. Provider APIs
/// reject larger grounding sets.
pub const REFERENCE_CAPACITY: usize = 14;

/// One candidate photo of a material.
#[derive(Debug, Clone)]
pub struct CandidateImage {
    pub file_path: String,
    pub perspective: String,
}

/// A material together with its candidate photos, already filtered to
/// engaged materials by the caller (the selector does not see idle ones).
#[derive(Debug, Clone)]
pub struct MaterialCandidates {
    pub material_id: DbId,
    pub name: String,
    pub category: MaterialCategory,
    pub images: Vec<CandidateImage>,
}

/// Why a reference image is part of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceRole {
    Material { material_id: DbId },
    Blueprint,
    ExtraRef,
    Motif,
}

/// One selected reference image, in final provider order.
#[derive(Debug, Clone)]
pub struct SelectedReference {
    pub file_path: String,
    pub role: ReferenceRole,
}

/// Select and order reference images for a generation request.
///
/// Slots for the blueprint, extra references, and motifs are reserved up
/// front; materials compete for the remainder, ordered by category tier
/// and ranked per perspective. Motifs always occupy the final positions
/// — prompt text refers to "the last N images" as the exact canvas
/// content to reproduce.
///
/// The result never exceeds [`REFERENCE_CAPACITY`], and is deterministic
/// for identical inputs.
pub fn select_references(
    materials: &[MaterialCandidates],
    blueprint: Option<&str>,
    extra_refs: &[String],
    motifs: &[String],
) -> Vec<SelectedReference> {
    let reserved = usize::from(blueprint.is_some()) + motifs.len() + extra_refs.len();
    let material_budget = REFERENCE_CAPACITY.saturating_sub(reserved);

    let mut selected = Vec::new();

    // Materials first, by category tier. Sorting is stable, so materials
    // within a tier keep their input order.
    let mut ordered: Vec<&MaterialCandidates> = materials.iter().collect();
    ordered.sort_by_key(|m| m.category.policy().selection_tier);

    'materials: for material in ordered {
        let cap = material.category.policy().image_cap;

        // Rank this material's images, dropping excluded views. Stable
        // sort keeps input order for equal ranks.
        let mut ranked: Vec<(&CandidateImage, u32)> = material
            .images
            .iter()
            .map(|img| (img, rank_perspective(material.category, &img.perspective)))
            .filter(|(_, rank)| *rank != EXCLUDED)
            .collect();
        ranked.sort_by_key(|(_, rank)| std::cmp::Reverse(*rank));

        for (img, _) in ranked.into_iter().take(cap) {
            if selected.len() >= material_budget {
                break 'materials;
            }
            selected.push(SelectedReference {
                file_path: img.file_path.clone(),
                role: ReferenceRole::Material {
                    material_id: material.material_id,
                },
            });
        }
    }

    // Auxiliary images in contract order: blueprint, extra references,
    // motifs last. The capacity cap is hard even when reservations alone
    // exceed it.
    if let Some(path) = blueprint {
        if selected.len() < REFERENCE_CAPACITY {
            selected.push(SelectedReference {
                file_path: path.to_string(),
                role: ReferenceRole::Blueprint,
            });
        }
    }
    for path in extra_refs {
        if selected.len() >= REFERENCE_CAPACITY {
            break;
        }
        selected.push(SelectedReference {
            file_path: path.clone(),
            role: ReferenceRole::ExtraRef,
        });
    }
    for path in motifs {
        if selected.len() >= REFERENCE_CAPACITY {
            break;
        }
        selected.push(SelectedReference {
            file_path: path.clone(),
            role: ReferenceRole::Motif,
        });
    }

    selected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::MaterialCategory::*;

    fn img(path: &str, perspective: &str) -> CandidateImage {
        CandidateImage {
            file_path: path.to_string(),
            perspective: perspective.to_string(),
        }
    }

    fn material(id: DbId, category: MaterialCategory, images: Vec<CandidateImage>) -> MaterialCandidates {
        MaterialCandidates {
            material_id: id,
            name: format!("material-{id}"),
            category,
            images,
        }
    }

    fn paths(selection: &[SelectedReference]) -> Vec<&str> {
        selection.iter().map(|s| s.file_path.as_str()).collect()
    }

    #[test]
    fn empty_inputs_yield_empty_selection() {
        assert!(select_references(&[], None, &[], &[]).is_empty());
    }

    #[test]
    fn paint_pot_images_ordered_detail_front_packaged() {
        // Scenario: one paint pot with front / detail / packaged photos.
        let mats = vec![material(
            1,
            PaintPot,
            vec![img("front.jpg", "front"), img("detail.jpg", "detail"), img("packaged.jpg", "packaged")],
        )];
        let selection = select_references(&mats, None, &[], &[]);
        assert_eq!(paths(&selection), ["detail.jpg", "front.jpg", "packaged.jpg"]);
    }

    #[test]
    fn motif_back_face_never_selected() {
        let mats = vec![material(
            1,
            CanvasMotif,
            vec![img("back.jpg", "back"), img("front.jpg", "front")],
        )];
        let selection = select_references(&mats, None, &[], &[]);
        assert_eq!(paths(&selection), ["front.jpg"]);
    }

    #[test]
    fn per_category_caps_apply() {
        let pot_images: Vec<CandidateImage> =
            (0..8).map(|i| img(&format!("pot{i}.jpg"), "front")).collect();
        let brush_images: Vec<CandidateImage> =
            (0..5).map(|i| img(&format!("brush{i}.jpg"), "side")).collect();
        let mats = vec![material(1, PaintPot, pot_images), material(2, Brush, brush_images)];

        let selection = select_references(&mats, None, &[], &[]);
        let pots = selection
            .iter()
            .filter(|s| s.role == ReferenceRole::Material { material_id: 1 })
            .count();
        let brushes = selection
            .iter()
            .filter(|s| s.role == ReferenceRole::Material { material_id: 2 })
            .count();
        assert_eq!(pots, 5);
        assert_eq!(brushes, 3);
    }

    #[test]
    fn paint_pots_selected_before_other_tiers_regardless_of_input_order() {
        let mats = vec![
            material(1, Frame, vec![img("frame.jpg", "front")]),
            material(2, Brush, vec![img("brush.jpg", "bristles")]),
            material(3, PaintPot, vec![img("pot.jpg", "front")]),
        ];
        let selection = select_references(&mats, None, &[], &[]);
        assert_eq!(paths(&selection), ["pot.jpg", "brush.jpg", "frame.jpg"]);
    }

    #[test]
    fn motifs_occupy_final_positions_in_input_order() {
        let mats = vec![material(1, PaintPot, vec![img("pot.jpg", "front")])];
        let motifs = vec!["motif-a.png".to_string(), "motif-b.png".to_string()];
        let extras = vec!["person.jpg".to_string()];

        let selection = select_references(&mats, Some("blueprint.png"), &extras, &motifs);
        assert_eq!(
            paths(&selection),
            ["pot.jpg", "blueprint.png", "person.jpg", "motif-a.png", "motif-b.png"]
        );
    }

    #[test]
    fn capacity_is_never_exceeded() {
        // 6 pots with 8 images each, plus blueprint, extras, and motifs.
        let mats: Vec<MaterialCandidates> = (0..6)
            .map(|m| {
                material(
                    m,
                    PaintPot,
                    (0..8).map(|i| img(&format!("m{m}i{i}.jpg"), "front")).collect(),
                )
            })
            .collect();
        let motifs: Vec<String> = (0..4).map(|i| format!("motif{i}.png")).collect();
        let extras: Vec<String> = (0..3).map(|i| format!("extra{i}.jpg")).collect();

        let selection = select_references(&mats, Some("bp.png"), &extras, &motifs);
        assert_eq!(selection.len(), REFERENCE_CAPACITY);

        // Reserved slots held: all 8 auxiliary images present, materials
        // squeezed into the remaining 6.
        assert_eq!(
            selection.iter().filter(|s| matches!(s.role, ReferenceRole::Material { .. })).count(),
            6
        );
        assert_eq!(selection.last().unwrap().file_path, "motif3.png");
    }

    #[test]
    fn excess_reservations_still_capped_at_capacity() {
        let motifs: Vec<String> = (0..20).map(|i| format!("motif{i}.png")).collect();
        let selection = select_references(&[], None, &[], &motifs);
        assert_eq!(selection.len(), REFERENCE_CAPACITY);
        assert!(selection.iter().all(|s| s.role == ReferenceRole::Motif));
    }

    #[test]
    fn material_budget_floors_at_zero() {
        let mats = vec![material(1, PaintPot, vec![img("pot.jpg", "front")])];
        let motifs: Vec<String> = (0..14).map(|i| format!("motif{i}.png")).collect();
        let selection = select_references(&mats, None, &[], &motifs);
        assert!(selection.iter().all(|s| s.role == ReferenceRole::Motif));
        assert_eq!(selection.len(), REFERENCE_CAPACITY);
    }

    #[test]
    fn selection_is_deterministic() {
        let mats = vec![
            material(1, PaintPot, vec![img("a.jpg", "front"), img("b.jpg", "front")]),
            material(2, Brush, vec![img("c.jpg", "side")]),
        ];
        let first_selection = select_references(&mats, None, &[], &[]);
        let first = paths(&first_selection);
        for _ in 0..3 {
            assert_eq!(paths(&select_references(&mats, None, &[], &[])), first);
        }
    }
}
