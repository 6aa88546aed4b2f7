//! Class colors and the synthesizer that derives them from RGB(A) columns.
//!
//! The table stores colors only as separate numeric channel columns. The
//! virtual color column is computed on read by [`ColorFields::compose`] and
//! written back through [`ColorFields::decompose`], so the channel columns
//! stay the single source of truth.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RatResult;
use crate::model::{CellValue, Column, FieldType, FieldUsage, RatField};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel (255 = opaque)
    pub a: u8,
}

impl Color {
    /// Opaque black, the color of freshly inserted color fields.
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb` name of the color, alpha ignored.
    pub fn name(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Usage families that can carry a complete color, in resolution order.
const COLOR_FAMILIES: [[FieldUsage; 4]; 3] = [
    [
        FieldUsage::Red,
        FieldUsage::Green,
        FieldUsage::Blue,
        FieldUsage::Alpha,
    ],
    [
        FieldUsage::RedMin,
        FieldUsage::GreenMin,
        FieldUsage::BlueMin,
        FieldUsage::AlphaMin,
    ],
    [
        FieldUsage::RedMax,
        FieldUsage::GreenMax,
        FieldUsage::BlueMax,
        FieldUsage::AlphaMax,
    ],
];

/// Schema positions of the channel fields making up a table's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorFields {
    /// Index of the red field
    pub red: usize,
    /// Index of the green field
    pub green: usize,
    /// Index of the blue field
    pub blue: usize,
    /// Index of the alpha field, when the table has one
    pub alpha: Option<usize>,
}

impl ColorFields {
    /// Find the first complete RGB triplet in `fields`.
    pub fn resolve(fields: &[RatField]) -> Option<Self> {
        let position = |usage: FieldUsage| fields.iter().position(|f| f.usage() == usage);
        COLOR_FAMILIES.iter().find_map(|[r, g, b, a]| {
            Some(Self {
                red: position(*r)?,
                green: position(*g)?,
                blue: position(*b)?,
                alpha: position(*a),
            })
        })
    }

    /// Compose the color of `row`; alpha defaults to opaque.
    pub fn compose(&self, columns: &[Column], row: usize) -> Option<Color> {
        let channel = |index: usize| columns.get(index).and_then(|c| c.get_f64(row));
        let r = channel(self.red)?;
        let g = channel(self.green)?;
        let b = channel(self.blue)?;
        let a = match self.alpha {
            Some(index) => channel(index)?,
            None => 255.0,
        };
        Some(Color::rgba(
            to_channel(r),
            to_channel(g),
            to_channel(b),
            to_channel(a),
        ))
    }

    /// Write `color` into the channel columns of `row`.
    ///
    /// Alpha is only written when the table has an alpha field.
    pub fn decompose(&self, columns: &mut [Column], row: usize, color: Color) -> RatResult<()> {
        let mut targets = vec![(self.red, color.r), (self.green, color.g), (self.blue, color.b)];
        if let Some(alpha) = self.alpha {
            targets.push((alpha, color.a));
        }
        for (index, value) in targets {
            if let Some(column) = columns.get_mut(index) {
                let cell = channel_cell(column.field_type(), value);
                column.set(row, cell)?;
            }
        }
        Ok(())
    }

    /// Schema indexes of every channel field.
    pub fn indexes(&self) -> Vec<usize> {
        let mut indexes = vec![self.red, self.green, self.blue];
        indexes.extend(self.alpha);
        indexes
    }
}

fn to_channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

fn channel_cell(field_type: FieldType, value: u8) -> CellValue {
    match field_type {
        FieldType::Integer => CellValue::Integer(i64::from(value)),
        FieldType::Real => CellValue::Real(f64::from(value)),
        FieldType::String => CellValue::Text(value.to_string()),
    }
}
