//! Structuring elements for the binary morphology operators.

use image::imageops::rotate180;
use imageproc::morphology::Mask;

use crate::error::{Error, Result};
use crate::raster::BinaryImage;

/// Largest element side `imageproc` masks can hold.
pub const MAX_ELEMENT_SIZE: u32 = 511;

/// A `size`×`size` element with every cell set.
///
/// The element's origin is `(size / 2, size / 2)`.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `size` is 0 or larger than [`MAX_ELEMENT_SIZE`].
pub fn square(size: u32) -> Result<BinaryImage> {
    if size < 1 {
        return Err(Error::invalid(
            "structuring_size",
            "square structuring element needs a side of at least 1",
        ));
    }
    if size > MAX_ELEMENT_SIZE {
        return Err(Error::invalid(
            "structuring_size",
            format!("square structuring element side {size} exceeds {MAX_ELEMENT_SIZE}"),
        ));
    }
    Ok(BinaryImage::filled(size, size))
}

/// Mask for `imageproc` erosion, anchored at the element's origin.
pub(crate) fn erosion_mask(element: &BinaryImage) -> Result<Mask> {
    let (cx, cy) = origin(element)?;
    Ok(Mask::from_image(element.as_gray(), cx, cy))
}

/// Mask for `imageproc` dilation: the element rotated half a turn about its origin.
pub(crate) fn dilation_mask(element: &BinaryImage) -> Result<Mask> {
    let (cx, cy) = origin(element)?;
    let (width, height) = element.dimensions();
    let reflected = rotate180(element.as_gray());
    Ok(Mask::from_image(
        &reflected,
        (width - 1 - u32::from(cx)) as u8,
        (height - 1 - u32::from(cy)) as u8,
    ))
}

fn origin(element: &BinaryImage) -> Result<(u8, u8)> {
    let (width, height) = element.dimensions();
    if width == 0 || height == 0 || width > MAX_ELEMENT_SIZE || height > MAX_ELEMENT_SIZE {
        return Err(Error::invalid(
            "structuring_size",
            format!("element of {width}x{height} must have sides in 1..={MAX_ELEMENT_SIZE}"),
        ));
    }
    Ok(((width / 2) as u8, (height / 2) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_is_fully_set() {
        let element = square(3).unwrap();
        assert_eq!(element.dimensions(), (3, 3));
        assert_eq!(element.foreground_count(), 9);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            square(0),
            Err(Error::InvalidParameter {
                name: "structuring_size",
                ..
            })
        ));
    }

    #[test]
    fn oversized_square_is_rejected_without_allocating() {
        assert!(square(MAX_ELEMENT_SIZE).is_ok());
        for size in [MAX_ELEMENT_SIZE + 1, 65_537, u32::MAX] {
            assert!(matches!(
                square(size),
                Err(Error::InvalidParameter {
                    name: "structuring_size",
                    ..
                })
            ));
        }
    }

    #[test]
    fn masks_reject_oversized_elements() {
        let wide = BinaryImage::filled(MAX_ELEMENT_SIZE + 1, 1);
        assert!(erosion_mask(&wide).is_err());
        assert!(dilation_mask(&wide).is_err());
        assert!(erosion_mask(&BinaryImage::new(0, 0)).is_err());
        assert!(dilation_mask(&square(2).unwrap()).is_ok());
    }
}
