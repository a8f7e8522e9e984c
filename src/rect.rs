use image::math::Rect;

/// Inclusive pixel extents of a region.
///
/// Both `min_*` and `max_*` name pixels that belong to the region, so a single pixel has
/// `min_col == max_col` and a width of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_col: u32,
    pub min_row: u32,
    pub max_col: u32,
    pub max_row: u32,
}

impl BoundingBox {
    pub fn from_pixel(col: u32, row: u32) -> Self {
        Self {
            min_col: col,
            min_row: row,
            max_col: col,
            max_row: row,
        }
    }

    /// Grows the box so it also covers `(col, row)`.
    pub fn expand_to_contain(&mut self, col: u32, row: u32) {
        self.min_col = self.min_col.min(col);
        self.min_row = self.min_row.min(row);
        self.max_col = self.max_col.max(col);
        self.max_row = self.max_row.max(row);
    }

    pub fn width(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        (self.min_col..=self.max_col).contains(&col) && (self.min_row..=self.max_row).contains(&row)
    }

    /// The `(min_col, min_row, max_col, max_row)` tuple handed to display code.
    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.min_col, self.min_row, self.max_col, self.max_row)
    }

    /// Converts to the `image` crate's origin-plus-size rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use particle_extract::rect::BoundingBox;
    ///
    /// let mut bbox = BoundingBox::from_pixel(10, 20);
    /// bbox.expand_to_contain(14, 22);
    ///
    /// let rect = bbox.to_rect();
    /// assert_eq!((rect.x, rect.y), (10, 20));
    /// assert_eq!((rect.width, rect.height), (5, 3));
    /// ```
    pub fn to_rect(&self) -> Rect {
        Rect {
            x: self.min_col,
            y: self.min_row,
            width: self.width(),
            height: self.height(),
        }
    }

    /// Rectangle accepted by the `imageproc` drawing routines.
    pub fn to_drawing_rect(&self) -> imageproc::rect::Rect {
        imageproc::rect::Rect::at(self.min_col as i32, self.min_row as i32)
            .of_size(self.width(), self.height())
    }
}
