//! Schema mutation: inserting and removing typed columns.

use crate::error::{RatError, RatResult};
use crate::model::{Column, FieldUsage, RatField};
use crate::table::RatTable;

impl RatTable {
    /// Check whether `field` could be inserted at schema position `index`.
    pub fn validate_insert_column(&self, index: usize, field: &RatField) -> RatResult<()> {
        let field_count = self.fields.len();
        if index > field_count {
            return Err(RatError::validation(format!(
                "Column index {} is out of range (0-{})",
                index, field_count
            )));
        }

        let leading = self.leading_mandatory_count();
        if index < leading {
            return Err(RatError::validation(format!(
                "Cannot insert a column before index {}: the value and count columns must stay first",
                leading
            )));
        }

        if index > 0
            && index < field_count
            && self.fields[index - 1].usage().is_mandatory()
            && self.fields[index].usage().is_mandatory()
        {
            return Err(RatError::validation(format!(
                "Cannot insert a column between '{}' and '{}'",
                self.fields[index - 1].name(),
                self.fields[index].name()
            )));
        }

        if self.field_index(field.name()).is_some() {
            return Err(RatError::validation(format!(
                "A field named '{}' already exists",
                field.name()
            )));
        }

        if field.usage().is_singleton() && self.fields.iter().any(|f| f.usage() == field.usage()) {
            return Err(RatError::validation(format!(
                "A field with usage '{}' already exists",
                field.usage()
            )));
        }

        Ok(())
    }

    /// Insert `field` before schema position `index`, with a column of
    /// default values as long as the table.
    pub fn insert_column(&mut self, index: usize, field: RatField) -> RatResult<()> {
        self.validate_insert_column(index, &field)?;
        let column = Column::with_defaults(field.field_type(), self.row_count());
        log::debug!(
            "Inserting column '{}' ({}, {}) at {}",
            field.name(),
            field.usage(),
            field.field_type().type_name(),
            index
        );
        self.fields.insert(index, field);
        self.columns.insert(index, column);
        Ok(())
    }

    /// Check whether the field `name` could be removed.
    pub fn validate_remove_column(&self, name: &str) -> RatResult<usize> {
        let index = self
            .field_index(name)
            .ok_or_else(|| RatError::validation(format!("Field '{}' does not exist", name)))?;

        let usage = self.fields[index].usage();
        match usage {
            FieldUsage::MinMax | FieldUsage::PixelCount => Err(RatError::validation(format!(
                "Field '{}' ({}) is mandatory and cannot be removed",
                name, usage
            ))),
            FieldUsage::Min | FieldUsage::Max
                if !self
                    .fields
                    .iter()
                    .enumerate()
                    .any(|(i, f)| i != index && f.usage().is_value()) =>
            {
                Err(RatError::validation(format!(
                    "Field '{}' is the last value field and cannot be removed",
                    name
                )))
            }
            _ => Ok(index),
        }
    }

    /// Remove the field `name` and its data.
    pub fn remove_column(&mut self, name: &str) -> RatResult<()> {
        let index = self.validate_remove_column(name)?;
        self.fields.remove(index);
        self.columns.remove(index);
        log::debug!("Removed column '{}'", name);
        Ok(())
    }
}
