//! Row projections handed to host feature layers.

use std::iter::FusedIterator;

use crate::model::{CellValue, Color};
use crate::table::RatTable;

/// One table row as a feature: its index, every field value and its color.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFeature {
    /// Row index in the table
    pub row: usize,
    /// `(field name, value)` pairs in schema order
    pub attributes: Vec<(String, CellValue)>,
    /// Row color when the table has color fields
    pub color: Option<Color>,
}

impl RowFeature {
    /// Value of the attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&CellValue> {
        self.attributes
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// Iterator over the rows of a table as [`RowFeature`]s.
///
/// Cloning the iterator, or calling [`RatTable::features`] again, restarts
/// the sequence.
#[derive(Debug, Clone)]
pub struct FeatureIter<'a> {
    table: &'a RatTable,
    row: usize,
}

impl Iterator for FeatureIter<'_> {
    type Item = RowFeature;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.table.row_count() {
            return None;
        }
        let row = self.row;
        self.row += 1;

        let attributes = self
            .table
            .fields()
            .iter()
            .zip(self.table.columns())
            .filter_map(|(field, column)| {
                column.get(row).map(|value| (field.name().to_string(), value))
            })
            .collect();

        Some(RowFeature {
            row,
            attributes,
            color: self.table.get_color(row),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.row_count().saturating_sub(self.row);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FeatureIter<'_> {}

impl FusedIterator for FeatureIter<'_> {}

impl RatTable {
    /// Lazily project every row into a [`RowFeature`].
    pub fn features(&self) -> FeatureIter<'_> {
        FeatureIter {
            table: self,
            row: 0,
        }
    }
}
