//! Affine pixel-to-world transform

use geo::{Coord, Rect};

/// Six-coefficient affine transform from grid space to world space
///
/// ```text
/// x = x_scale * col + x_shear * row + x_origin
/// y = y_shear * col + y_scale * row + y_origin
/// ```
///
/// `col`/`row` are continuous grid coordinates, so the centre of cell
/// (row, col) sits at (col + 0.5, row + 0.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub x_scale: f64,
    pub x_shear: f64,
    pub x_origin: f64,
    pub y_shear: f64,
    pub y_scale: f64,
    pub y_origin: f64,
}

impl GeoTransform {
    /// Builds a transform from coefficients in
    /// (x-scale, x-shear, x-origin, y-shear, y-scale, y-origin) order
    pub fn new(coefficients: [f64; 6]) -> Self {
        let [x_scale, x_shear, x_origin, y_shear, y_scale, y_origin] = coefficients;
        Self {
            x_scale,
            x_shear,
            x_origin,
            y_shear,
            y_scale,
            y_origin,
        }
    }

    /// North-up transform with the upper-left corner at (`x_origin`, `y_origin`)
    pub fn north_up(x_origin: f64, y_origin: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new([pixel_width, 0.0, x_origin, 0.0, -pixel_height.abs(), y_origin])
    }

    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.x_scale,
            self.x_shear,
            self.x_origin,
            self.y_shear,
            self.y_scale,
            self.y_origin,
        ]
    }

    /// Applies the transform to continuous grid coordinates
    pub fn apply(&self, col: f64, row: f64) -> Coord<f64> {
        Coord {
            x: self.x_scale * col + self.x_shear * row + self.x_origin,
            y: self.y_shear * col + self.y_scale * row + self.y_origin,
        }
    }

    /// World coordinate of the centre of cell (row, col)
    pub fn pixel_center(&self, row: usize, col: usize) -> Coord<f64> {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    pub fn pixel_width(&self) -> f64 {
        self.x_scale
    }

    pub fn pixel_height(&self) -> f64 {
        self.y_scale.abs()
    }

    /// Axis-aligned square of pixel width x height centred on the cell centre
    pub fn pixel_footprint(&self, row: usize, col: usize) -> Rect<f64> {
        let center = self.pixel_center(row, col);
        let half_w = self.pixel_width() / 2.0;
        let half_h = self.pixel_height() / 2.0;
        Rect::new(
            Coord { x: center.x - half_w, y: center.y - half_h },
            Coord { x: center.x + half_w, y: center.y + half_h },
        )
    }

    /// Area of one cell in squared native units
    pub fn pixel_area(&self) -> f64 {
        (self.x_scale * self.y_scale - self.x_shear * self.y_shear).abs()
    }
}
