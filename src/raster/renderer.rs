//! Renderer model: how the host currently classifies and colors a raster.

use crate::model::Color;

/// One class of a paletted renderer: an exact raster value.
#[derive(Debug, Clone, PartialEq)]
pub struct PalettedClass {
    /// Raster value
    pub value: f64,
    /// Legend label
    pub label: String,
    /// Class color
    pub color: Color,
}

impl PalettedClass {
    /// Create a paletted class.
    pub fn new(value: f64, label: impl Into<String>, color: Color) -> Self {
        Self {
            value,
            label: label.into(),
            color,
        }
    }
}

/// How a color ramp maps values between its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampType {
    /// Each item colors the values up to and including its own value
    #[default]
    Discrete,
    /// Only exact item values are colored
    Exact,
    /// Colors are linearly interpolated between items
    Interpolated,
}

/// One entry of a color ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRampItem {
    /// Upper bound (discrete), exact value, or interpolation stop
    pub value: f64,
    /// Legend label
    pub label: String,
    /// Color at this stop
    pub color: Color,
}

impl ColorRampItem {
    /// Create a ramp item.
    pub fn new(value: f64, label: impl Into<String>, color: Color) -> Self {
        Self {
            value,
            label: label.into(),
            color,
        }
    }
}

/// A color ramp shader, items sorted by value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorRampShader {
    /// Value mapping mode
    pub ramp_type: RampType,
    /// Ramp stops
    pub items: Vec<ColorRampItem>,
    /// Lower bound of the classified range
    pub minimum: f64,
    /// Upper bound of the classified range
    pub maximum: f64,
}

impl ColorRampShader {
    /// Color for `value`, `None` when the ramp does not cover it.
    pub fn color_for(&self, value: f64) -> Option<Color> {
        match self.ramp_type {
            RampType::Exact => self.items.iter().find(|i| i.value == value).map(|i| i.color),
            RampType::Discrete => self
                .items
                .iter()
                .find(|i| value <= i.value)
                .map(|i| i.color),
            RampType::Interpolated => self.interpolate(value),
        }
    }

    fn interpolate(&self, value: f64) -> Option<Color> {
        let first = self.items.first()?;
        let last = self.items.last()?;
        if value <= first.value {
            return Some(first.color);
        }
        if value >= last.value {
            return Some(last.color);
        }
        let window = self
            .items
            .windows(2)
            .find(|w| value >= w[0].value && value <= w[1].value)?;
        let (lo, hi) = (&window[0], &window[1]);
        let span = hi.value - lo.value;
        let t = if span > 0.0 { (value - lo.value) / span } else { 0.0 };
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Some(Color::rgba(
            mix(lo.color.r, hi.color.r),
            mix(lo.color.g, hi.color.g),
            mix(lo.color.b, hi.color.b),
            mix(lo.color.a, hi.color.a),
        ))
    }
}

/// Renderer currently installed on a raster.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderer {
    /// Unique value classes
    Paletted {
        /// Rendered band
        band: usize,
        /// Classes in legend order
        classes: Vec<PalettedClass>,
    },
    /// Single band color ramp
    PseudoColor {
        /// Rendered band
        band: usize,
        /// The color ramp
        shader: ColorRampShader,
    },
    /// Plain grayscale
    SingleBandGray {
        /// Rendered band
        band: usize,
    },
    /// RGB composite of several bands
    MultiBandColor,
}

impl Renderer {
    /// Whether the renderer assigns classes, which a RAT can describe.
    pub fn is_classifiable(&self) -> bool {
        matches!(self, Renderer::Paletted { .. } | Renderer::PseudoColor { .. })
    }

    /// Band being rendered, for single band renderers.
    pub fn band(&self) -> Option<usize> {
        match self {
            Renderer::Paletted { band, .. }
            | Renderer::PseudoColor { band, .. }
            | Renderer::SingleBandGray { band } => Some(*band),
            Renderer::MultiBandColor => None,
        }
    }

    /// Color the renderer gives to raster `value`.
    pub fn color_for(&self, value: f64) -> Option<Color> {
        match self {
            Renderer::Paletted { classes, .. } => classes
                .iter()
                .find(|c| c.value == value)
                .map(|c| c.color),
            Renderer::PseudoColor { shader, .. } => shader.color_for(value),
            _ => None,
        }
    }

    /// `(label, color)` of every class, in legend order.
    pub fn class_entries(&self) -> Vec<(&str, Color)> {
        match self {
            Renderer::Paletted { classes, .. } => {
                classes.iter().map(|c| (c.label.as_str(), c.color)).collect()
            }
            Renderer::PseudoColor { shader, .. } => shader
                .items
                .iter()
                .map(|i| (i.label.as_str(), i.color))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Mutable colors of every class, in legend order.
    pub(crate) fn class_colors_mut(&mut self) -> Vec<(&str, &mut Color)> {
        match self {
            Renderer::Paletted { classes, .. } => classes
                .iter_mut()
                .map(|c| (c.label.as_str(), &mut c.color))
                .collect(),
            Renderer::PseudoColor { shader, .. } => shader
                .items
                .iter_mut()
                .map(|i| (i.label.as_str(), &mut i.color))
                .collect(),
            _ => Vec::new(),
        }
    }
}
