//! Rasterizer: turns an `IconSpec` into a fully populated pixel grid

use crate::rendering::paint::{IconSpec, PixelOverride};
use crate::{Error, Result, Rgb};
use image::RgbImage;

/// A W×H grid of RGB cells. Every cell always holds a color.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    /// Canvas of the given size with every cell set to `background`.
    pub fn filled(width: u32, height: u32, background: Rgb) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            image: RgbImage::from_pixel(width, height, image::Rgb(background.to_array())),
        })
    }

    pub(crate) fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    fn index(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < self.width() && y < self.height()).then_some((x, y))
    }

    /// Color at (x, y), or `None` off-canvas.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        let (x, y) = self.index(x, y)?;
        Some(Rgb::from(self.image.get_pixel(x, y).0))
    }

    /// Apply one override. Returns false (and changes nothing) when the
    /// coordinate is outside the canvas.
    pub fn paint(&mut self, o: &PixelOverride) -> bool {
        match self.index(o.x, o.y) {
            Some((x, y)) => {
                self.image.put_pixel(x, y, image::Rgb(o.color.to_array()));
                true
            }
            None => false,
        }
    }

    /// Cells in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.image.pixels().map(|p| Rgb::from(p.0))
    }

    /// Distinct colors in first-seen row-major order.
    pub fn distinct_colors(&self) -> Vec<Rgb> {
        let mut seen = std::collections::HashSet::new();
        self.pixels().filter(|c| seen.insert(*c)).collect()
    }

    /// One text line per row; cells equal to `background` print as `.`,
    /// anything else as `#`.
    pub fn to_ascii(&self, background: Rgb) -> String {
        let mut out = String::with_capacity(((self.width() + 1) * self.height()) as usize);
        for row in self.image.rows() {
            for p in row {
                out.push(if Rgb::from(p.0) == background { '.' } else { '#' });
            }
            out.push('\n');
        }
        out
    }
}

/// Render `spec` onto a fresh `width`×`height` canvas filled with `background`.
///
/// Overrides are applied in sequence; out-of-range ones are skipped.
pub fn render(spec: &IconSpec<'_>, width: u32, height: u32, background: Rgb) -> Result<Raster> {
    let mut raster = Raster::filled(width, height, background)?;
    for o in spec.overrides {
        raster.paint(o);
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::paint::px;

    const A: Rgb = Rgb(10, 20, 30);
    const B: Rgb = Rgb(200, 100, 50);

    #[test]
    fn fresh_canvas_is_background_everywhere() {
        let r = Raster::filled(8, 8, A).unwrap();
        assert_eq!(r.pixels().count(), 64);
        assert!(r.pixels().all(|c| c == A));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            Raster::filled(0, 8, A),
            Err(Error::InvalidDimensions { width: 0, height: 8 })
        ));
        assert!(Raster::filled(8, 0, A).is_err());
    }

    #[test]
    fn last_override_wins() {
        let overrides = [px(2, 3, A), px(2, 3, B)];
        let r = render(&IconSpec::new("dup", &overrides), 8, 8, Rgb::BLACK).unwrap();
        assert_eq!(r.get(2, 3), Some(B));
    }

    #[test]
    fn out_of_bounds_overrides_are_ignored() {
        let overrides = [px(-1, 0, A), px(0, -1, A), px(8, 0, A), px(0, 8, A), px(100, 100, A)];
        let r = render(&IconSpec::new("oob", &overrides), 8, 8, Rgb::BLACK).unwrap();
        assert!(r.pixels().all(|c| c == Rgb::BLACK));
    }

    #[test]
    fn non_square_canvas_bounds() {
        let overrides = [px(15, 3, A), px(3, 15, A)];
        let r = render(&IconSpec::new("wide", &overrides), 16, 4, Rgb::BLACK).unwrap();
        assert_eq!(r.get(15, 3), Some(A));
        assert_eq!(r.get(3, 15), None);
        assert_eq!(r.distinct_colors(), vec![Rgb::BLACK, A]);
    }

    #[test]
    fn ascii_preview_marks_painted_cells() {
        let overrides = [px(0, 0, A), px(1, 1, B)];
        let r = render(&IconSpec::new("p", &overrides), 3, 2, Rgb::BLACK).unwrap();
        assert_eq!(r.to_ascii(Rgb::BLACK), "#..\n.#.\n");
    }
}
