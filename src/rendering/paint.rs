//! Declarative pixel maps: the data an icon is drawn from

use crate::Rgb;

/// Paint one cell. Coordinates are signed so that off-canvas entries can be
/// expressed; they are skipped when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOverride {
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

/// Shorthand used by the icon tables.
pub const fn px(x: i32, y: i32, color: Rgb) -> PixelOverride {
    PixelOverride { x, y, color }
}

/// A named, ordered list of overrides.
///
/// Order matters: when two overrides hit the same cell the later one wins,
/// which the icon tables use to layer detail over a base shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSpec<'a> {
    pub name: &'a str,
    pub overrides: &'a [PixelOverride],
}

impl<'a> IconSpec<'a> {
    pub const fn new(name: &'a str, overrides: &'a [PixelOverride]) -> Self {
        Self { name, overrides }
    }
}
