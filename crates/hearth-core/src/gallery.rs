//! Reference gallery construction from a directory tree of labeled photos.
//!
//! Layout: each immediate subdirectory of the root is a household category
//! ("Residents", "Workers", ...); each image file inside is one identity's
//! reference photo, labeled by its file stem.

use crate::encoder::FaceEncoder;
use crate::types::{Gallery, GalleryEntry};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("gallery root not found or unreadable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One reference photo that did not make it into the gallery.
#[derive(Debug, Clone)]
pub struct SkippedPhoto {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome summary of a gallery build.
#[derive(Debug, Default)]
pub struct GalleryReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedPhoto>,
}

impl GalleryReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Build the reference gallery by walking `root`.
///
/// Per-photo failures (unreadable file, undecodable image, zero faces) are
/// soft: logged, recorded in the report, and skipped. Only an unreadable
/// root aborts the build. Directories and files are visited in sorted
/// order, so gallery order — which the matcher's tie-break depends on —
/// is deterministic across runs.
pub fn build_gallery(
    encoder: &mut dyn FaceEncoder,
    root: &Path,
) -> Result<(Gallery, GalleryReport), GalleryError> {
    let mut gallery = Gallery::new();
    let mut report = GalleryReport::default();

    for role_dir in sorted_entries(root).map_err(|source| GalleryError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })? {
        if !role_dir.is_dir() {
            continue;
        }
        let Some(role) = role_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let role = role.to_string();

        let photos = match sorted_entries(&role_dir) {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!(dir = %role_dir.display(), error = %e, "skipping unreadable category directory");
                continue;
            }
        };

        for photo in photos {
            if !photo.is_file() {
                continue;
            }
            let Some(label) = photo.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match load_reference_photo(encoder, &photo) {
                Ok(embedding) => {
                    tracing::debug!(label, role, photo = %photo.display(), "gallery entry added");
                    gallery.push(GalleryEntry {
                        label: label.to_string(),
                        role: role.clone(),
                        embedding,
                    });
                    report.loaded += 1;
                }
                Err(reason) => {
                    tracing::warn!(photo = %photo.display(), reason, "skipping reference photo");
                    report.skipped.push(SkippedPhoto {
                        path: photo.clone(),
                        reason,
                    });
                }
            }
        }
    }

    tracing::info!(
        loaded = report.loaded,
        skipped = report.skipped_count(),
        "gallery built"
    );

    Ok((gallery, report))
}

/// Decode one photo and embed its best face. The error string is the
/// per-photo skip reason; it never aborts the batch.
fn load_reference_photo(
    encoder: &mut dyn FaceEncoder,
    path: &Path,
) -> Result<crate::types::Embedding, String> {
    let img = image::open(path).map_err(|e| format!("unreadable image: {e}"))?;
    let rgb = img.to_rgb8();

    let detections = encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height())
        .map_err(|e| format!("encoding failed: {e}"))?;

    // Detector output is sorted by confidence; the first face is the best.
    detections
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| "no face detected".to_string())
}

/// Directory entries sorted by path for deterministic traversal.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}
