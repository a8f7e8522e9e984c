//! Connected-component labelling of binary masks, region extraction and the particle ceiling.

use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::raster::{BinaryImage, LabelImage};
use crate::rect::BoundingBox;

/// Component count above which region detail is withheld.
pub const DEFAULT_REGION_CEILING: usize = 500;

/// One labelled component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub bbox: BoundingBox,
    /// Number of pixels carrying `label`.
    pub area: u64,
}

/// Labels 8-connected foreground components.
///
/// Labels run contiguously from 1 in raster order of each component's first pixel; background
/// stays 0.
pub fn label(image: &BinaryImage) -> LabelImage {
    connected_components(image.as_gray(), Connectivity::Eight, Luma([0u8]))
}

/// Highest label in `labels`, which is also the number of components.
pub fn max_label(labels: &LabelImage) -> u32 {
    labels.as_raw().iter().copied().max().unwrap_or(0)
}

/// One [`Region`] per label present in `labels`, ordered by label.
pub fn regions_of(labels: &LabelImage) -> Vec<Region> {
    let mut slots: Vec<Option<Region>> = vec![None; max_label(labels) as usize + 1];

    for (x, y, pixel) in labels.enumerate_pixels() {
        let value = pixel[0];
        if value == 0 {
            continue;
        }
        let slot = value as usize;
        if let Some(region) = &mut slots[slot] {
            region.bbox.expand_to_contain(x, y);
            region.area += 1;
        } else {
            slots[slot] = Some(Region {
                label: value,
                bbox: BoundingBox::from_pixel(x, y),
                area: 1,
            });
        }
    }

    slots.into_iter().flatten().collect()
}

/// Whether region detail is available for a labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionOutcome {
    Regions(Vec<Region>),
    /// More components than the ceiling; callers should show the count only.
    Overload,
}

/// Result of labelling one binary image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeling {
    labels: LabelImage,
    count: u32,
    outcome: RegionOutcome,
}

impl Labeling {
    pub fn labels(&self) -> &LabelImage {
        &self.labels
    }

    /// Number of components. Reported even when overloaded.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn outcome(&self) -> &RegionOutcome {
        &self.outcome
    }

    /// `None` when overloaded.
    pub fn regions(&self) -> Option<&[Region]> {
        match &self.outcome {
            RegionOutcome::Regions(regions) => Some(regions),
            RegionOutcome::Overload => None,
        }
    }

    pub fn is_overloaded(&self) -> bool {
        matches!(self.outcome, RegionOutcome::Overload)
    }

    pub fn into_labels(self) -> LabelImage {
        self.labels
    }
}

/// Labels `image` and derives regions unless the count exceeds `ceiling`.
///
/// # Arguments
///
/// * `image` - The mask to label, 8-connected.
/// * `ceiling` - Largest component count for which regions are computed. A count equal to the
///   ceiling still yields regions.
///
/// # Returns
///
/// A [`Labeling`] whose count is always set. Its outcome is [`RegionOutcome::Overload`] when the
/// count exceeds `ceiling`, otherwise the regions in label order.
///
/// # Examples
///
/// ```
/// use particle_extract::BinaryImage;
/// use particle_extract::region_labelling::label_with_ceiling;
///
/// let image = BinaryImage::from_fn(5, 1, |x, _| x % 2 == 0);
/// assert_eq!(label_with_ceiling(&image, 3).regions().map(<[_]>::len), Some(3));
///
/// let crowded = label_with_ceiling(&image, 2);
/// assert!(crowded.is_overloaded());
/// assert_eq!(crowded.count(), 3);
/// ```
pub fn label_with_ceiling(image: &BinaryImage, ceiling: usize) -> Labeling {
    let labels = label(image);
    let count = max_label(&labels);

    let outcome = if count as usize > ceiling {
        log::warn!("too many particles: {count} components exceed ceiling of {ceiling}");
        RegionOutcome::Overload
    } else {
        RegionOutcome::Regions(regions_of(&labels))
    };
    log::debug!("labelled {count} components");

    Labeling {
        labels,
        count,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{MorphKind, MorphOp};

    fn specks(width: u32, height: u32, n: usize) -> BinaryImage {
        let mut image = BinaryImage::new(width, height);
        let positions = (0..height)
            .step_by(2)
            .flat_map(|y| (0..width).step_by(2).map(move |x| (x, y)));
        for (x, y) in positions.take(n) {
            image.set(x, y, true);
        }
        image
    }

    #[test]
    fn empty_image_has_no_regions() {
        let labeling = label_with_ceiling(&BinaryImage::new(50, 40), DEFAULT_REGION_CEILING);
        assert_eq!(labeling.count(), 0);
        assert_eq!(labeling.regions(), Some(&[][..]));
        assert!(!labeling.is_overloaded());
    }

    #[test]
    fn diagonal_neighbours_join() {
        let mut image = BinaryImage::new(5, 5);
        image.set(1, 1, true);
        image.set(2, 2, true);
        image.set(4, 0, true);

        let labels = label(&image);
        assert_eq!(max_label(&labels), 2);
        assert_eq!(labels.get_pixel(1, 1), labels.get_pixel(2, 2));
    }

    #[test]
    fn labels_follow_raster_order() {
        let mut image = BinaryImage::new(10, 10);
        image.set(7, 1, true);
        image.set(2, 5, true);
        image.set(3, 5, true);
        image.set(0, 9, true);

        let labels = label(&image);
        assert_eq!(labels.get_pixel(7, 1)[0], 1);
        assert_eq!(labels.get_pixel(2, 5)[0], 2);
        assert_eq!(labels.get_pixel(0, 9)[0], 3);

        let regions = regions_of(&labels);
        let got: Vec<u32> = regions.iter().map(|r| r.label).collect();
        assert_eq!(got, vec![1, 2, 3]);
        assert_eq!(regions[1].bbox.as_tuple(), (2, 5, 3, 5));
        assert_eq!(regions[1].area, 2);
    }

    #[test]
    fn square_survives_any_fitting_opening() {
        let image = BinaryImage::from_fn(100, 100, |x, y| (30..40).contains(&x) && (60..70).contains(&y));

        for size in 2..=10 {
            let opened = MorphOp::new(MorphKind::Opening, size)
                .unwrap()
                .apply(&image)
                .unwrap();
            let labeling = label_with_ceiling(&opened, DEFAULT_REGION_CEILING);
            let regions = labeling.regions().unwrap();
            assert_eq!(regions.len(), 1, "opening size {size}");
            assert_eq!(regions[0].bbox.as_tuple(), (30, 60, 39, 69), "opening size {size}");
            assert_eq!(regions[0].area, 100);
        }
    }

    #[test]
    fn too_many_specks_overload_but_keep_count() {
        let labeling = label_with_ceiling(&specks(100, 22, 501), DEFAULT_REGION_CEILING);
        assert_eq!(labeling.count(), 501);
        assert!(labeling.is_overloaded());
        assert_eq!(labeling.regions(), None);
    }

    #[test]
    fn count_at_ceiling_still_yields_regions() {
        let labeling = label_with_ceiling(&specks(100, 22, 500), DEFAULT_REGION_CEILING);
        assert_eq!(labeling.count(), 500);
        assert_eq!(labeling.regions().map(<[Region]>::len), Some(500));
    }

    #[test]
    fn regions_skip_missing_labels() {
        let mut labels = LabelImage::new(4, 4);
        labels.put_pixel(0, 0, Luma([1]));
        labels.put_pixel(3, 3, Luma([3]));

        let regions = regions_of(&labels);
        let got: Vec<u32> = regions.iter().map(|r| r.label).collect();
        assert_eq!(got, vec![1, 3]);
    }
}
