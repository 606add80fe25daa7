//! Built-in icon kinds for the flight tracker screens

use crate::rendering::paint::{px, IconSpec, PixelOverride};
use crate::Rgb;

const SILVER: Rgb = Rgb(200, 200, 200);
const SILVER_LIGHT: Rgb = Rgb(220, 220, 220);
const SILVER_DARK: Rgb = Rgb(180, 180, 180);
const GREY: Rgb = Rgb(150, 150, 150);
const WING: Rgb = Rgb(100, 150, 255);
const WING_LIGHT: Rgb = Rgb(120, 170, 255);
const WING_DARK: Rgb = Rgb(80, 130, 255);

/// Side view, nose pointing left.
const AIRPLANE_PIXELS: &[PixelOverride] = &[
    // fuselage
    px(3, 3, SILVER),
    px(4, 3, SILVER_LIGHT),
    px(5, 3, SILVER),
    px(6, 3, SILVER_DARK),
    // wings
    px(2, 3, WING),
    px(3, 2, WING),
    px(4, 2, WING_LIGHT),
    px(5, 2, WING),
    px(6, 2, WING_DARK),
    px(5, 4, WING),
    px(6, 4, WING_DARK),
    // tail
    px(6, 1, WING),
    px(7, 2, WING_DARK),
    // nose, repaints (2,3) over the wing root
    px(2, 3, SILVER_DARK),
    px(1, 3, GREY),
];

const OCEAN: Rgb = Rgb(50, 150, 255);
const SHALLOW: Rgb = Rgb(100, 180, 255);
const GLARE: Rgb = Rgb(150, 200, 255);

const GLOBE_PIXELS: &[PixelOverride] = &[
    // rim
    px(2, 1, OCEAN),
    px(3, 1, OCEAN),
    px(4, 1, OCEAN),
    px(5, 1, OCEAN),
    px(1, 2, OCEAN),
    px(6, 2, OCEAN),
    px(1, 3, OCEAN),
    px(6, 3, OCEAN),
    px(1, 4, OCEAN),
    px(6, 4, OCEAN),
    px(1, 5, OCEAN),
    px(6, 5, OCEAN),
    px(2, 6, OCEAN),
    px(3, 6, OCEAN),
    px(4, 6, OCEAN),
    px(5, 6, OCEAN),
    // face
    px(3, 2, SHALLOW),
    px(4, 2, SHALLOW),
    px(2, 3, SHALLOW),
    px(3, 3, GLARE),
    px(4, 3, GLARE),
    px(5, 3, SHALLOW),
    px(2, 4, SHALLOW),
    px(3, 4, GLARE),
    px(4, 4, GLARE),
    px(5, 4, SHALLOW),
    px(3, 5, SHALLOW),
    px(4, 5, SHALLOW),
];

const BLIP: Rgb = Rgb(100, 255, 100);
const INNER_WAVE: Rgb = Rgb(50, 200, 50);
const OUTER_WAVE: Rgb = Rgb(30, 150, 30);

const RADAR_PIXELS: &[PixelOverride] = &[
    px(3, 4, BLIP),
    px(4, 4, BLIP),
    px(3, 3, BLIP),
    px(4, 3, BLIP),
    px(2, 2, INNER_WAVE),
    px(5, 2, INNER_WAVE),
    px(2, 5, INNER_WAVE),
    px(5, 5, INNER_WAVE),
    px(2, 3, INNER_WAVE),
    px(5, 3, INNER_WAVE),
    px(2, 4, INNER_WAVE),
    px(5, 4, INNER_WAVE),
    px(1, 1, OUTER_WAVE),
    px(6, 1, OUTER_WAVE),
    px(1, 6, OUTER_WAVE),
    px(6, 6, OUTER_WAVE),
    px(1, 2, OUTER_WAVE),
    px(6, 2, OUTER_WAVE),
    px(1, 5, OUTER_WAVE),
    px(6, 5, OUTER_WAVE),
];

pub const AIRPLANE: IconSpec<'static> = IconSpec::new("airplane", AIRPLANE_PIXELS);
pub const GLOBE: IconSpec<'static> = IconSpec::new("globe", GLOBE_PIXELS);
pub const RADAR: IconSpec<'static> = IconSpec::new("radar", RADAR_PIXELS);

static BUILTIN: [IconSpec<'static>; 3] = [AIRPLANE, GLOBE, RADAR];

/// All built-in icon kinds, in output order.
pub fn builtin() -> &'static [IconSpec<'static>] {
    &BUILTIN
}

pub fn find(name: &str) -> Option<&'static IconSpec<'static>> {
    BUILTIN.iter().find(|s| s.name == name)
}
