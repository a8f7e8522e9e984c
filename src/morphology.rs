//! Binary morphology and the ordered chain of shape filters applied after thresholding.

use std::fmt;

use imageproc::morphology::{grayscale_dilate, grayscale_erode};

use crate::error::{Error, Result};
use crate::raster::BinaryImage;
use crate::structuring::{MAX_ELEMENT_SIZE, dilation_mask, erosion_mask, square};

/// Smallest side a chained structuring element may have.
pub const MIN_CHAIN_ELEMENT: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphKind {
    Erosion,
    Dilation,
    /// Erosion followed by dilation.
    Opening,
    /// Dilation followed by erosion.
    Closing,
}

impl fmt::Display for MorphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MorphKind::Erosion => "Erosion",
            MorphKind::Dilation => "Dilation",
            MorphKind::Opening => "Opening",
            MorphKind::Closing => "Closing",
        };
        f.write_str(name)
    }
}

/// One shape filter: an operator and the side of its square structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MorphOp {
    pub kind: MorphKind,
    pub structuring_size: u32,
}

impl MorphOp {
    /// Fails if `structuring_size` is outside `MIN_CHAIN_ELEMENT..=MAX_ELEMENT_SIZE`.
    pub fn new(kind: MorphKind, structuring_size: u32) -> Result<Self> {
        let op = Self {
            kind,
            structuring_size,
        };
        op.validate()?;
        Ok(op)
    }

    fn validate(&self) -> Result<()> {
        if self.structuring_size < MIN_CHAIN_ELEMENT {
            return Err(Error::invalid(
                "structuring_size",
                format!(
                    "{} needs a structuring element of at least {MIN_CHAIN_ELEMENT}, got {}",
                    self.kind, self.structuring_size
                ),
            ));
        }
        if self.structuring_size > MAX_ELEMENT_SIZE {
            return Err(Error::invalid(
                "structuring_size",
                format!(
                    "{} structuring element {} exceeds {MAX_ELEMENT_SIZE}",
                    self.kind, self.structuring_size
                ),
            ));
        }
        Ok(())
    }

    /// Applies this single operation.
    pub fn apply(&self, image: &BinaryImage) -> Result<BinaryImage> {
        self.validate()?;
        let element = square(self.structuring_size)?;
        match self.kind {
            MorphKind::Erosion => erode(image, &element),
            MorphKind::Dilation => dilate(image, &element),
            MorphKind::Opening => open(image, &element),
            MorphKind::Closing => close(image, &element),
        }
    }
}

impl fmt::Display for MorphOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.structuring_size)
    }
}

/// Append-only sequence of [`MorphOp`]s. The only way to remove entries is [`MorphChain::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MorphChain {
    ops: Vec<MorphOp>,
}

impl MorphChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: MorphOp) {
        self.ops.push(op);
    }

    /// Drops every operation.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn ops(&self) -> &[MorphOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// One line per operation in application order, e.g. `"Opening: 3"`.
    pub fn descriptions(&self) -> Vec<String> {
        self.ops.iter().map(ToString::to_string).collect()
    }

    pub fn apply(&self, image: &BinaryImage) -> Result<BinaryImage> {
        apply(image, &self.ops)
    }
}

impl From<Vec<MorphOp>> for MorphChain {
    fn from(ops: Vec<MorphOp>) -> Self {
        Self { ops }
    }
}

impl Extend<MorphOp> for MorphChain {
    fn extend<I: IntoIterator<Item = MorphOp>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}

/// Runs `chain` in order, each operation consuming the previous one's output.
///
/// An empty chain returns a copy of `image`.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if any operation's structuring size is below 2 or above
/// [`MAX_ELEMENT_SIZE`]. The whole chain is validated before any work is done.
///
/// # Examples
///
/// ```
/// use particle_extract::{BinaryImage, MorphKind, MorphOp};
/// use particle_extract::morphology::apply;
///
/// let mut image = BinaryImage::new(9, 9);
/// image.set(4, 4, true);
/// let chain = [MorphOp::new(MorphKind::Dilation, 3).unwrap()];
/// assert_eq!(apply(&image, &chain).unwrap().foreground_count(), 9);
/// ```
pub fn apply(image: &BinaryImage, chain: &[MorphOp]) -> Result<BinaryImage> {
    for op in chain {
        op.validate()?;
    }

    let mut current = image.clone();
    for op in chain {
        log::debug!("applying {op}");
        current = op.apply(&current)?;
    }
    Ok(current)
}

/// Keeps a pixel only if the element placed at it fits inside the foreground.
///
/// Element cells falling outside the image do not count against the pixel.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if a side of `element` is 0 or above
/// [`MAX_ELEMENT_SIZE`].
pub fn erode(image: &BinaryImage, element: &BinaryImage) -> Result<BinaryImage> {
    let mask = erosion_mask(element)?;
    Ok(BinaryImage::from_gray_unchecked(grayscale_erode(
        image.as_gray(),
        &mask,
    )))
}

/// Sets a pixel if the reflected element placed at it touches any foreground pixel.
///
/// # Errors
///
/// Same conditions as [`erode`].
pub fn dilate(image: &BinaryImage, element: &BinaryImage) -> Result<BinaryImage> {
    let mask = dilation_mask(element)?;
    Ok(BinaryImage::from_gray_unchecked(grayscale_dilate(
        image.as_gray(),
        &mask,
    )))
}

pub fn open(image: &BinaryImage, element: &BinaryImage) -> Result<BinaryImage> {
    dilate(&erode(image, element)?, element)
}

pub fn close(image: &BinaryImage, element: &BinaryImage) -> Result<BinaryImage> {
    erode(&dilate(image, element)?, element)
}
