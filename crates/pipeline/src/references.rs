//! Loading of selected reference images from disk.
//!
//! The selector decides *which* files; this module reads them. An
//! unreadable file is skipped with a warning — a single missing material
//! photo must never abort a whole generation.

use kolorit_core::reference::SelectedReference;

/// Read the selected reference images, preserving selection order.
/// Unreadable files are dropped from the result.
pub async fn load_reference_images(selection: &[SelectedReference]) -> Vec<Vec<u8>> {
    let mut images = Vec::with_capacity(selection.len());
    for reference in selection {
        match tokio::fs::read(&reference.file_path).await {
            Ok(bytes) => images.push(bytes),
            Err(e) => {
                tracing::warn!(
                    path = %reference.file_path,
                    error = %e,
                    "Skipping unreadable reference image",
                );
            }
        }
    }
    images
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kolorit_core::reference::ReferenceRole;

    fn reference(path: &std::path::Path) -> SelectedReference {
        SelectedReference {
            file_path: path.to_string_lossy().into_owned(),
            role: ReferenceRole::Motif,
        }
    }

    #[tokio::test]
    async fn unreadable_files_are_skipped_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, b"aaa").unwrap();
        std::fs::write(&b, b"bbb").unwrap();

        let selection = vec![
            reference(&a),
            reference(&dir.path().join("missing.png")),
            reference(&b),
        ];
        let images = load_reference_images(&selection).await;
        assert_eq!(images, vec![b"aaa".to_vec(), b"bbb".to_vec()]);
    }
}
