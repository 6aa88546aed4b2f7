//! The in-memory raster attribute table.
//!
//! A [`RatTable`] owns an ordered schema of [`RatField`]s and one typed
//! [`Column`] per field, all of the same length. When the schema contains a
//! complete set of RGB(A) fields the table also exposes a virtual color
//! column, computed from the channel columns on every read.
//!
//! Every mutation validates the whole request before touching the table, so
//! a rejected edit leaves schema and data exactly as they were.

mod color;
mod create;
mod features;
mod persist;
mod schema;


use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::constants::RAT_COLOR_HEADER_NAME;
use crate::error::{RatError, RatResult};
use crate::model::{CellValue, ColorFields, Column, FieldUsage, RatField};

pub use features::{FeatureIter, RowFeature};

/// Where a table was loaded from, and where `save` writes it back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RatOrigin {
    /// No table was found, or it could not be parsed.
    #[default]
    Invalid,
    /// Stored in the raster's own metadata, keyed by band.
    Embedded,
    /// Stored in a dBase sidecar file.
    Dbf(PathBuf),
}

/// A raster attribute table.
#[derive(Debug, Clone, Default)]
pub struct RatTable {
    fields: Vec<RatField>,
    columns: Vec<Column>,
    origin: RatOrigin,
    classification_criteria: Option<String>,
}

impl RatTable {
    /// An invalid, empty table: the result of a failed lookup.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Build a table from a schema and its columns.
    ///
    /// Fails when the column count or types do not match the fields, when
    /// columns differ in length, or when names or singleton usages repeat.
    pub fn from_parts(
        fields: Vec<RatField>,
        columns: Vec<Column>,
        origin: RatOrigin,
    ) -> RatResult<Self> {
        if fields.len() != columns.len() {
            return Err(RatError::format(format!(
                "{} fields but {} columns",
                fields.len(),
                columns.len()
            )));
        }

        let mut names = BTreeSet::new();
        let mut usages = BTreeSet::new();
        for (field, column) in fields.iter().zip(&columns) {
            if !names.insert(field.name()) {
                return Err(RatError::format(format!(
                    "Duplicate field name '{}'",
                    field.name()
                )));
            }
            if field.usage().is_singleton() && !usages.insert(field.usage()) {
                return Err(RatError::format(format!(
                    "Duplicate field usage '{}' on '{}'",
                    field.usage(),
                    field.name()
                )));
            }
            if field.field_type() != column.field_type() {
                return Err(RatError::format(format!(
                    "Field '{}' is declared {} but holds {} data",
                    field.name(),
                    field.field_type().type_name(),
                    column.field_type().type_name()
                )));
            }
        }

        if let Some(first) = columns.first() {
            let len = first.len();
            if let Some((field, column)) = fields
                .iter()
                .zip(&columns)
                .find(|(_, column)| column.len() != len)
            {
                return Err(RatError::format(format!(
                    "Column '{}' has {} rows, expected {}",
                    field.name(),
                    column.len(),
                    len
                )));
            }
        }

        Ok(Self {
            fields,
            columns,
            origin,
            classification_criteria: None,
        })
    }

    /// Whether the table was found and holds a schema.
    pub fn is_valid(&self) -> bool {
        self.origin != RatOrigin::Invalid && !self.fields.is_empty()
    }

    /// Origin of the table.
    pub fn origin(&self) -> &RatOrigin {
        &self.origin
    }

    /// Path of the sidecar file; empty for embedded tables.
    pub fn path(&self) -> &Path {
        match &self.origin {
            RatOrigin::Dbf(path) => path,
            _ => Path::new(""),
        }
    }

    /// Whether the table lives in a sidecar file.
    pub fn is_sidecar(&self) -> bool {
        matches!(self.origin, RatOrigin::Dbf(_))
    }

    /// The schema, in column order.
    pub fn fields(&self) -> &[RatField] {
        &self.fields
    }

    /// The stored columns, aligned with [`RatTable::fields`].
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&RatField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Schema index of the field `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Column of the field `name`.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.field_index(name).map(|i| &self.columns[i])
    }

    /// Cell of field `name` at `row`.
    pub fn value(&self, name: &str, row: usize) -> Option<CellValue> {
        self.column(name).and_then(|c| c.get(row))
    }

    /// Number of rows (0 when the table has no columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of stored fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Number of columns, the virtual color column included.
    pub fn column_count(&self) -> usize {
        self.fields.len() + usize::from(self.has_color())
    }

    /// Field names followed by the virtual color header when present.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.fields.iter().map(|f| f.name().to_string()).collect();
        if self.has_color() {
            keys.push(RAT_COLOR_HEADER_NAME.to_string());
        }
        keys
    }

    /// Set of usages present in the schema.
    pub fn field_usages(&self) -> BTreeSet<FieldUsage> {
        self.fields.iter().map(RatField::usage).collect()
    }

    /// Name of the first field with `usage`, or an empty string.
    pub fn field_name(&self, usage: FieldUsage) -> &str {
        self.fields
            .iter()
            .find(|f| f.usage() == usage)
            .map_or("", RatField::name)
    }

    /// Whether the schema holds a complete RGB(A) color set.
    pub fn has_color(&self) -> bool {
        ColorFields::resolve(&self.fields).is_some()
    }

    /// Whether classes are single values (MinMax) rather than ranges.
    pub fn is_thematic(&self) -> bool {
        self.fields.iter().any(|f| f.usage() == FieldUsage::MinMax)
    }

    /// Names of the fields that key a row to raster values.
    ///
    /// Thematic tables are keyed by their MinMax field; athematic ones by
    /// Min and Max, or whichever of the two exists.
    pub fn value_columns(&self) -> Vec<String> {
        let usages = self.field_usages();
        let candidates: &[FieldUsage] = if usages.contains(&FieldUsage::MinMax) {
            &[FieldUsage::MinMax]
        } else {
            &[FieldUsage::Min, FieldUsage::Max]
        };
        candidates
            .iter()
            .filter(|u| usages.contains(u))
            .map(|u| self.field_name(*u).to_string())
            .collect()
    }

    /// Column last used to classify the raster, if any.
    pub fn classification_criteria(&self) -> Option<&str> {
        self.classification_criteria.as_deref()
    }

    /// Record the column used to classify the raster.
    pub fn set_classification_criteria(&mut self, criteria: Option<String>) {
        self.classification_criteria = criteria;
    }

    /// Overwrite one cell, converting `value` to the field type.
    pub fn set_value(&mut self, name: &str, row: usize, value: CellValue) -> RatResult<()> {
        let index = self
            .field_index(name)
            .ok_or_else(|| RatError::validation(format!("Field '{}' does not exist", name)))?;
        let field_type = self.fields[index].field_type();
        let value = value.convert(field_type)?;
        self.columns[index].set(row, value)?;
        log::trace!("Set {}[{}]", name, row);
        Ok(())
    }

    /// Insert a default-valued row before `index` (`row_count` appends).
    pub fn insert_row(&mut self, index: usize) -> RatResult<()> {
        if self.fields.is_empty() {
            return Err(RatError::validation("Cannot insert a row into a table without columns"));
        }
        let row_count = self.row_count();
        if index > row_count {
            return Err(RatError::validation(format!(
                "Row index {} is out of range (0-{})",
                index, row_count
            )));
        }
        for column in &mut self.columns {
            column.insert_default(index);
        }
        log::debug!("Inserted row {}, row count is {}", index, self.row_count());
        Ok(())
    }

    /// Remove the row at `index` from every column.
    pub fn remove_row(&mut self, index: usize) -> RatResult<()> {
        let row_count = self.row_count();
        if index >= row_count {
            return Err(RatError::validation(format!(
                "Row index {} is out of range (0-{})",
                index,
                row_count.saturating_sub(1)
            )));
        }
        for column in &mut self.columns {
            column.remove(index);
        }
        log::debug!("Removed row {}, row count is {}", index, self.row_count());
        Ok(())
    }

    /// Length of the run of mandatory value/count fields at the front of the
    /// schema. New columns can only be inserted after it.
    fn leading_mandatory_count(&self) -> usize {
        self.fields
            .iter()
            .take_while(|f| f.usage().is_mandatory())
            .count()
    }

    pub(crate) fn set_origin(&mut self, origin: RatOrigin) {
        self.origin = origin;
    }
}
