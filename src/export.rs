//! Writes one mask per labelled region plus a copy of the source image.
//!
//! Files land in a fixed layout under the destination root:
//!
//! ```text
//! <root>/extracted/<base>/images/<base>.<ext>
//! <root>/extracted/<base>/masks/<base>-<label>.<ext>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};

use crate::error::ExportError;
use crate::raster::{LabelImage, RasterImage, raster_to_gray};
use crate::region_labelling::max_label;

/// Gray value written for a mask's foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskEncoding {
    /// Foreground `1`, background `0`.
    #[default]
    Unit,
    /// Foreground `255`, background `0`.
    Full,
}

impl MaskEncoding {
    pub fn foreground(self) -> u8 {
        match self {
            MaskEncoding::Unit => 1,
            MaskEncoding::Full => 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Format of every written file; also decides the extension.
    pub format: ImageFormat,
    pub mask_encoding: MaskEncoding,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            mask_encoding: MaskEncoding::default(),
        }
    }
}

impl ExportOptions {
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("png")
    }
}

/// Paths of the export tree for one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    base_name: String,
    extension: &'static str,
    images_dir: PathBuf,
    masks_dir: PathBuf,
}

impl ExportLayout {
    pub fn new(destination_root: &Path, base_name: &str, extension: &'static str) -> Self {
        let root = destination_root.join("extracted").join(base_name);
        Self {
            base_name: base_name.to_owned(),
            extension,
            images_dir: root.join("images"),
            masks_dir: root.join("masks"),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn masks_dir(&self) -> &Path {
        &self.masks_dir
    }

    pub fn image_path(&self) -> PathBuf {
        self.images_dir
            .join(format!("{}.{}", self.base_name, self.extension))
    }

    pub fn mask_path(&self, label: u32) -> PathBuf {
        self.masks_dir
            .join(format!("{}-{label}.{}", self.base_name, self.extension))
    }
}

/// What [`export`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub image_path: PathBuf,
    /// Mask paths in label order.
    pub mask_paths: Vec<PathBuf>,
}

/// Writes `original` and one mask for every label value `1..=max(labels)`.
///
/// Existing directories and files are reused and overwritten.
///
/// # Arguments
///
/// * `original` - Source intensities, written as 8-bit gray.
/// * `labels` - Label grid; `0` is background.
/// * `destination_root` - Directory that receives `extracted/<base_name>`.
/// * `base_name` - Stem shared by every written file.
/// * `options` - File format and mask foreground value.
///
/// # Returns
///
/// The path of the source copy and the mask paths in label order.
///
/// # Errors
///
/// The first failing step stops the export and nothing is cleaned up:
///
/// * [`ExportError::CreateDir`] if either output directory cannot be created.
/// * [`ExportError::WriteImage`] if the source copy cannot be encoded or written.
/// * [`ExportError::WriteMask`] for the first mask that cannot be written. Earlier masks stay.
pub fn export(
    original: &RasterImage,
    labels: &LabelImage,
    destination_root: &Path,
    base_name: &str,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let layout = ExportLayout::new(destination_root, base_name, options.extension());

    for dir in [layout.images_dir(), layout.masks_dir()] {
        fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let image_path = layout.image_path();
    raster_to_gray(original)
        .save_with_format(&image_path, options.format)
        .map_err(|source| ExportError::WriteImage {
            path: image_path.clone(),
            source,
        })?;

    let foreground = options.mask_encoding.foreground();
    let count = max_label(labels);
    let mut mask_paths = Vec::with_capacity(count as usize);
    for label in 1..=count {
        let path = layout.mask_path(label);
        mask_for(labels, label, foreground)
            .save_with_format(&path, options.format)
            .map_err(|source| ExportError::WriteMask {
                label,
                path: path.clone(),
                source,
            })?;
        mask_paths.push(path);
    }

    log::info!(
        "exported {} masks for '{base_name}' under '{}'",
        mask_paths.len(),
        destination_root.display()
    );

    Ok(ExportSummary {
        image_path,
        mask_paths,
    })
}

/// Single-label mask: `foreground` where the label matches, `0` elsewhere.
pub fn mask_for(labels: &LabelImage, label: u32, foreground: u8) -> GrayImage {
    let (width, height) = labels.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([if labels.get_pixel(x, y)[0] == label {
            foreground
        } else {
            0
        }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_labels() -> LabelImage {
        LabelImage::from_fn(12, 6, |x, _| Luma([x / 4 + 1]))
    }

    fn sorted_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn layout_paths() {
        let layout = ExportLayout::new(Path::new("/out"), "sample", "png");
        assert_eq!(layout.images_dir(), Path::new("/out/extracted/sample/images"));
        assert_eq!(layout.masks_dir(), Path::new("/out/extracted/sample/masks"));
        assert_eq!(
            layout.image_path(),
            Path::new("/out/extracted/sample/images/sample.png")
        );
        assert_eq!(
            layout.mask_path(12),
            Path::new("/out/extracted/sample/masks/sample-12.png")
        );
    }

    #[test]
    fn export_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let original = RasterImage::from_pixel(12, 6, Luma([80.0]));
        let labels = three_labels();
        let options = ExportOptions::default();

        for _ in 0..2 {
            let summary = export(&original, &labels, dir.path(), "sample", &options).unwrap();
            assert_eq!(summary.mask_paths.len(), 3);
        }

        let root = dir.path().join("extracted").join("sample");
        assert_eq!(sorted_names(&root.join("images")), vec!["sample.png"]);
        assert_eq!(
            sorted_names(&root.join("masks")),
            vec!["sample-1.png", "sample-2.png", "sample-3.png"]
        );
    }

    #[test]
    fn masks_isolate_one_label() {
        let dir = tempfile::tempdir().unwrap();
        let original = RasterImage::from_pixel(12, 6, Luma([80.0]));
        let summary = export(
            &original,
            &three_labels(),
            dir.path(),
            "sample",
            &ExportOptions::default(),
        )
        .unwrap();

        let mask = image::open(&summary.mask_paths[1]).unwrap().to_luma8();
        for (x, _, pixel) in mask.enumerate_pixels() {
            let expected = if (4..8).contains(&x) { 1 } else { 0 };
            assert_eq!(pixel[0], expected);
        }

        let copy = image::open(&summary.image_path).unwrap().to_luma8();
        assert!(copy.pixels().all(|p| p[0] == 80));
    }

    #[test]
    fn full_encoding_uses_255() {
        let labels = three_labels();
        let mask = mask_for(&labels, 3, MaskEncoding::Full.foreground());
        assert_eq!(mask.get_pixel(10, 0)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn missing_label_values_give_empty_masks() {
        let dir = tempfile::tempdir().unwrap();
        let mut labels = LabelImage::new(4, 4);
        labels.put_pixel(0, 0, Luma([1]));
        labels.put_pixel(3, 3, Luma([3]));
        let original = RasterImage::new(4, 4);

        let summary =
            export(&original, &labels, dir.path(), "gap", &ExportOptions::default()).unwrap();
        assert_eq!(summary.mask_paths.len(), 3);
        let empty = image::open(&summary.mask_paths[1]).unwrap().to_luma8();
        assert!(empty.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn no_labels_writes_only_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let summary = export(
            &RasterImage::new(3, 3),
            &LabelImage::new(3, 3),
            dir.path(),
            "blank",
            &ExportOptions::default(),
        )
        .unwrap();
        assert!(summary.mask_paths.is_empty());
        assert!(summary.image_path.exists());
    }

    #[test]
    fn unwritable_root_reports_directory_step() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let err = export(
            &RasterImage::new(2, 2),
            &LabelImage::new(2, 2),
            &blocker,
            "sample",
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::CreateDir { .. }));
        assert!(err.path().starts_with(&blocker));
    }

    #[test]
    fn blocked_source_path_reports_image_step() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ExportLayout::new(dir.path(), "sample", "png");
        fs::create_dir_all(layout.image_path()).unwrap();

        let err = export(
            &RasterImage::new(2, 2),
            &three_labels(),
            dir.path(),
            "sample",
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::WriteImage { .. }));
        assert_eq!(err.path(), layout.image_path());
        assert!(sorted_names(layout.masks_dir()).is_empty());
    }

    #[test]
    fn blocked_mask_path_reports_label_and_keeps_earlier_masks() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ExportLayout::new(dir.path(), "sample", "png");
        fs::create_dir_all(layout.mask_path(2)).unwrap();

        let err = export(
            &RasterImage::new(12, 6),
            &three_labels(),
            dir.path(),
            "sample",
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::WriteMask { label: 2, .. }));
        assert_eq!(err.path(), layout.mask_path(2));
        assert!(layout.image_path().is_file());
        assert!(layout.mask_path(1).is_file());
        assert!(!layout.mask_path(3).exists());
    }
}
