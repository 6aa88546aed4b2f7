//! Color field lifecycle and the virtual color column.

use crate::constants::COLOR_FIELD_NAMES;
use crate::error::{RatError, RatResult};
use crate::model::{Color, ColorFields, FieldType, FieldUsage, RatField};
use crate::raster::{RasterSource, Renderer};
use crate::table::RatTable;

const COLOR_USAGES: [FieldUsage; 4] = [
    FieldUsage::Red,
    FieldUsage::Green,
    FieldUsage::Blue,
    FieldUsage::Alpha,
];

impl RatTable {
    /// Insert `R`, `G`, `B` and `A` fields starting at `start_index`, filled
    /// with opaque black.
    pub fn insert_color_fields(&mut self, start_index: usize) -> RatResult<()> {
        self.insert_color_fields_named(start_index, COLOR_FIELD_NAMES)
    }

    /// Insert red, green, blue and alpha fields with the given names.
    ///
    /// Either all four fields are inserted or, on error, none.
    pub fn insert_color_fields_named<S: AsRef<str>>(
        &mut self,
        start_index: usize,
        names: [S; 4],
    ) -> RatResult<()> {
        if self.has_color() {
            return Err(RatError::validation("Table already has color fields"));
        }

        let mut staged = self.clone();
        for (offset, (name, usage)) in names.iter().zip(COLOR_USAGES).enumerate() {
            let field = RatField::new(name.as_ref(), usage, FieldType::Integer);
            staged
                .insert_column(start_index + offset, field)
                .map_err(|e| RatError::validation(format!("Cannot insert color fields: {}", e)))?;
        }

        let Some(color_fields) = ColorFields::resolve(&staged.fields) else {
            return Err(RatError::validation("Color fields could not be resolved"));
        };
        for row in 0..staged.row_count() {
            color_fields.decompose(&mut staged.columns, row, Color::BLACK)?;
        }

        *self = staged;
        log::info!("Inserted color fields at {}", start_index);
        Ok(())
    }

    /// Remove every color channel field. Returns false when there was none.
    pub fn remove_color_fields(&mut self) -> bool {
        let color_indexes: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_color())
            .map(|(i, _)| i)
            .collect();
        if color_indexes.is_empty() {
            return false;
        }

        for index in color_indexes.iter().rev() {
            self.fields.remove(*index);
            self.columns.remove(*index);
        }
        log::info!("Removed {} color fields", color_indexes.len());
        true
    }

    /// Color of `row`, composed from the channel fields.
    ///
    /// `None` when the row is out of range or the table has no color.
    pub fn get_color(&self, row: usize) -> Option<Color> {
        if row >= self.row_count() {
            return None;
        }
        ColorFields::resolve(&self.fields)?.compose(&self.columns, row)
    }

    /// Decompose `color` into the channel fields of `row`.
    pub fn set_color(&mut self, row: usize, color: Color) -> bool {
        if row >= self.row_count() {
            return false;
        }
        let Some(color_fields) = ColorFields::resolve(&self.fields) else {
            return false;
        };
        match color_fields.decompose(&mut self.columns, row, color) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to set color of row {}: {}", row, e);
                false
            }
        }
    }

    /// The virtual color column; empty when the table has no color.
    pub fn colors(&self) -> Vec<Color> {
        let Some(color_fields) = ColorFields::resolve(&self.fields) else {
            return Vec::new();
        };
        (0..self.row_count())
            .filter_map(|row| color_fields.compose(&self.columns, row))
            .collect()
    }

    /// Schema indexes of the channel fields behind the color column.
    pub fn color_field_indexes(&self) -> Vec<usize> {
        ColorFields::resolve(&self.fields)
            .map(|c| c.indexes())
            .unwrap_or_default()
    }

    /// Copy the colors of the raster's current classification into the
    /// table.
    ///
    /// Paletted renderers are matched on the first value column, color ramps
    /// on the last one (the class range maximum for athematic tables). Rows
    /// whose value is not covered by the renderer keep their color. Fails
    /// when the table has no color or value column, or the raster has no
    /// classified renderer.
    pub fn update_colors_from_raster(&mut self, raster: &dyn RasterSource) -> bool {
        let Some(color_fields) = ColorFields::resolve(&self.fields) else {
            log::warn!("Cannot update colors: the table has no color fields");
            return false;
        };
        let Some(renderer) = raster.renderer() else {
            log::warn!("Cannot update colors: the raster has no renderer");
            return false;
        };

        let value_columns = self.value_columns();
        let key = match renderer {
            Renderer::Paletted { .. } => value_columns.first(),
            Renderer::PseudoColor { .. } => value_columns.last(),
            _ => {
                log::warn!("Cannot update colors: the raster is not classified");
                return false;
            }
        };
        let Some(key_index) = key.and_then(|name| self.field_index(name)) else {
            log::warn!("Cannot update colors: the table has no value column");
            return false;
        };

        let mut updated = 0;
        for row in 0..self.row_count() {
            let Some(value) = self.columns[key_index].get_f64(row) else {
                continue;
            };
            if let Some(color) = renderer.color_for(value) {
                if color_fields.decompose(&mut self.columns, row, color).is_ok() {
                    updated += 1;
                }
            }
        }
        log::info!(
            "Updated {} of {} row colors from the raster renderer",
            updated,
            self.row_count()
        );
        true
    }
}
