//! Creating a new table from a raster's classification.

use std::collections::HashMap;

use crate::constants::COLOR_FIELD_NAMES;
use crate::error::{RatError, RatResult};
use crate::model::{Color, Column, FieldType, FieldUsage, RatField};
use crate::raster::{RampType, Renderer};
use crate::table::{RatOrigin, RatTable};

impl RatTable {
    /// Build an embedded table holding one row per class of `renderer`.
    ///
    /// Paletted renderers produce a thematic table (`Value`, `Count`,
    /// `Class`, RGBA) with counts looked up in `pixel_counts`; color ramps
    /// produce an athematic table (`Value Min`, `Value Max`, `Class`, RGBA).
    pub fn from_renderer(renderer: &Renderer, pixel_counts: &HashMap<i64, i64>) -> RatResult<Self> {
        let mut fields = Vec::new();
        let mut columns = Vec::new();
        let colors: Vec<Color>;

        match renderer {
            Renderer::Paletted { classes, .. } => {
                let values: Vec<i64> = classes.iter().map(|c| c.value.round() as i64).collect();
                let counts = values
                    .iter()
                    .map(|v| pixel_counts.get(v).copied().unwrap_or(0))
                    .collect();
                fields.push(RatField::new("Value", FieldUsage::MinMax, FieldType::Integer));
                columns.push(Column::Integer(values));
                fields.push(RatField::new("Count", FieldUsage::PixelCount, FieldType::Integer));
                columns.push(Column::Integer(counts));
                fields.push(RatField::new("Class", FieldUsage::Name, FieldType::String));
                columns.push(Column::Text(classes.iter().map(|c| c.label.clone()).collect()));
                colors = classes.iter().map(|c| c.color).collect();
            }
            Renderer::PseudoColor { shader, .. } => {
                let mut minimums = Vec::with_capacity(shader.items.len());
                let mut previous = shader.minimum;
                for item in &shader.items {
                    minimums.push(match shader.ramp_type {
                        RampType::Exact => item.value,
                        RampType::Discrete | RampType::Interpolated => previous,
                    });
                    previous = item.value;
                }
                fields.push(RatField::new("Value Min", FieldUsage::Min, FieldType::Real));
                columns.push(Column::Real(minimums));
                fields.push(RatField::new("Value Max", FieldUsage::Max, FieldType::Real));
                columns.push(Column::Real(shader.items.iter().map(|i| i.value).collect()));
                fields.push(RatField::new("Class", FieldUsage::Name, FieldType::String));
                columns.push(Column::Text(shader.items.iter().map(|i| i.label.clone()).collect()));
                colors = shader.items.iter().map(|i| i.color).collect();
            }
            _ => {
                return Err(RatError::validation(
                    "A RAT can only be created from a paletted or pseudocolor renderer",
                ));
            }
        }

        let channels: [fn(&Color) -> u8; 4] = [|c| c.r, |c| c.g, |c| c.b, |c| c.a];
        let usages = [
            FieldUsage::Red,
            FieldUsage::Green,
            FieldUsage::Blue,
            FieldUsage::Alpha,
        ];
        for ((name, usage), channel) in COLOR_FIELD_NAMES.iter().zip(usages).zip(channels) {
            fields.push(RatField::new(*name, usage, FieldType::Integer));
            columns.push(Column::Integer(
                colors.iter().map(|c| i64::from(channel(c))).collect(),
            ));
        }

        let table = Self::from_parts(fields, columns, RatOrigin::Embedded)?;
        log::info!("Created RAT with {} rows from renderer", table.row_count());
        Ok(table)
    }
}
