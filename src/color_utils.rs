//! Color conversion and generation utilities used when classifying.

use crate::model::Color;

/// Hue step between consecutive generated colors, in degrees.
const GOLDEN_ANGLE: f32 = 137.507_77;

/// Opaque color from hue in degrees, saturation and value in `0.0..=1.0`.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Color {
    let hue = hue.rem_euclid(360.0);
    let chroma = value * saturation;
    let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let (r, g, b) = match (hue / 60.0) as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let channel = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::rgb(channel(r), channel(g), channel(b))
}

/// `count` visually distinct opaque colors.
///
/// Hues advance by the golden angle so neighbouring classes never get
/// similar colors; saturation and value alternate slightly to separate
/// hues that come around again.
pub fn generate_palette(count: usize) -> Vec<Color> {
    (0..count)
        .map(|i| {
            let hue = (i as f32 * GOLDEN_ANGLE) % 360.0;
            let (s, v) = match i % 3 {
                0 => (0.75, 0.95),
                1 => (0.60, 0.80),
                _ => (0.90, 0.70),
            };
            hsv_to_rgb(hue, s, v)
        })
        .collect()
}
