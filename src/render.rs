//! Display bitmaps for a host UI: the filtered mask, region outlines and label colouring.

use image::{DynamicImage, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use palette::{FromColor, Hsl, Srgb};

use crate::raster::{BinaryImage, LabelImage};
use crate::region_labelling::{Labeling, max_label};

/// Outline colour used for region boxes in the particle counter view.
pub const REGION_OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);

/// Black background, white foreground.
pub fn binary_to_gray(image: &BinaryImage) -> GrayImage {
    image.as_gray().clone()
}

/// Draws a hollow box around every region on top of `base`.
///
/// When `labeling` is overloaded the base is returned without overlays.
pub fn draw_region_boxes(base: &GrayImage, labeling: &Labeling, color: Rgb<u8>) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(base.clone()).to_rgb8();
    if let Some(regions) = labeling.regions() {
        for region in regions {
            draw_hollow_rect_mut(&mut canvas, region.bbox.to_drawing_rect(), color);
        }
    }
    canvas
}

/// Paints each label in its own colour, spreading hues evenly over the label count.
pub fn draw_labels(labels: &LabelImage, background: Rgba<u8>) -> RgbaImage {
    let palette = label_palette(max_label(labels) as usize, 255);
    let (width, height) = labels.dimensions();
    RgbaImage::from_fn(width, height, |x, y| match labels.get_pixel(x, y)[0] {
        0 => background,
        label => palette[label as usize - 1],
    })
}

/// `n` saturated colours with evenly spaced hues, in label order.
pub fn label_palette(n: usize, alpha: u8) -> Vec<Rgba<u8>> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * 360.0) / n as f32;
            let rgb: Srgb<u8> = Srgb::<f32>::from_color(Hsl::new(hue, 0.9, 0.5)).into_format();
            Rgba([rgb.red, rgb.green, rgb.blue, alpha])
        })
        .collect()
}
