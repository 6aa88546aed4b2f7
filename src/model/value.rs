//! Cell values and the typed, row-aligned column storage behind each field.

use std::fmt;

use crate::error::{RatError, RatResult};
use crate::model::FieldType;

/// A single cell; the variant always matches the field's storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Integer cell
    Integer(i64),
    /// Floating point cell
    Real(f64),
    /// Text cell
    Text(String),
}

impl CellValue {
    /// Default value of a freshly inserted cell.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Integer => CellValue::Integer(0),
            FieldType::Real => CellValue::Real(0.0),
            FieldType::String => CellValue::Text(String::new()),
        }
    }

    /// Storage type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            CellValue::Integer(_) => FieldType::Integer,
            CellValue::Real(_) => FieldType::Real,
            CellValue::Text(_) => FieldType::String,
        }
    }

    /// Numeric view of the value; text is parsed when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Real(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Convert an incoming value to `field_type`.
    ///
    /// Integer targets accept integers, finite reals (truncated toward zero)
    /// and integer text. Real targets accept any number and numeric text.
    /// String targets accept anything through its display form.
    pub fn convert(self, field_type: FieldType) -> RatResult<CellValue> {
        match (field_type, self) {
            (FieldType::Integer, CellValue::Integer(v)) => Ok(CellValue::Integer(v)),
            (FieldType::Integer, CellValue::Real(v)) => {
                if v.is_finite() && v.abs() < i64::MAX as f64 {
                    Ok(CellValue::Integer(v.trunc() as i64))
                } else {
                    Err(RatError::conversion(v.to_string(), field_type))
                }
            }
            (FieldType::Integer, CellValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(CellValue::Integer)
                .map_err(|_| RatError::conversion(s, field_type)),
            (FieldType::Real, CellValue::Integer(v)) => Ok(CellValue::Real(v as f64)),
            (FieldType::Real, CellValue::Real(v)) => Ok(CellValue::Real(v)),
            (FieldType::Real, CellValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(CellValue::Real)
                .map_err(|_| RatError::conversion(s, field_type)),
            (FieldType::String, CellValue::Text(s)) => Ok(CellValue::Text(s)),
            (FieldType::String, other) => Ok(CellValue::Text(other.to_string())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Real(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// Row-aligned data of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Integer column
    Integer(Vec<i64>),
    /// Floating point column
    Real(Vec<f64>),
    /// Text column
    Text(Vec<String>),
}

impl Column {
    /// An empty column of `field_type`.
    pub fn new(field_type: FieldType) -> Self {
        Self::with_defaults(field_type, 0)
    }

    /// A column of `len` default values.
    pub fn with_defaults(field_type: FieldType, len: usize) -> Self {
        match field_type {
            FieldType::Integer => Column::Integer(vec![0; len]),
            FieldType::Real => Column::Real(vec![0.0; len]),
            FieldType::String => Column::Text(vec![String::new(); len]),
        }
    }

    /// Storage type of the column.
    pub fn field_type(&self) -> FieldType {
        match self {
            Column::Integer(_) => FieldType::Integer,
            Column::Real(_) => FieldType::Real,
            Column::Text(_) => FieldType::String,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Integer(v) => v.len(),
            Column::Real(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row`.
    pub fn get(&self, row: usize) -> Option<CellValue> {
        match self {
            Column::Integer(v) => v.get(row).copied().map(CellValue::Integer),
            Column::Real(v) => v.get(row).copied().map(CellValue::Real),
            Column::Text(v) => v.get(row).cloned().map(CellValue::Text),
        }
    }

    /// Numeric value at `row`; text cells are parsed.
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        match self {
            Column::Integer(v) => v.get(row).map(|v| *v as f64),
            Column::Real(v) => v.get(row).copied(),
            Column::Text(v) => v.get(row).and_then(|s| s.trim().parse().ok()),
        }
    }

    /// Overwrite the value at `row`; the value must already have the
    /// column's type.
    pub fn set(&mut self, row: usize, value: CellValue) -> RatResult<()> {
        let len = self.len();
        if row >= len {
            return Err(RatError::validation(format!(
                "Row {} is out of range (0-{})",
                row,
                len.saturating_sub(1)
            )));
        }
        match (self, value) {
            (Column::Integer(v), CellValue::Integer(x)) => v[row] = x,
            (Column::Real(v), CellValue::Real(x)) => v[row] = x,
            (Column::Text(v), CellValue::Text(x)) => v[row] = x,
            (column, value) => {
                return Err(RatError::conversion(
                    value.to_string(),
                    column.field_type(),
                ));
            }
        }
        Ok(())
    }

    /// Insert a default value before `row` (`row == len` appends).
    pub fn insert_default(&mut self, row: usize) {
        match self {
            Column::Integer(v) => v.insert(row, 0),
            Column::Real(v) => v.insert(row, 0.0),
            Column::Text(v) => v.insert(row, String::new()),
        }
    }

    /// Remove the value at `row`.
    pub fn remove(&mut self, row: usize) {
        match self {
            Column::Integer(v) => {
                v.remove(row);
            }
            Column::Real(v) => {
                v.remove(row);
            }
            Column::Text(v) => {
                v.remove(row);
            }
        }
    }

    /// Append a value, converting it to the column type.
    pub fn push(&mut self, value: CellValue) -> RatResult<()> {
        let value = value.convert(self.field_type())?;
        match (self, value) {
            (Column::Integer(v), CellValue::Integer(x)) => v.push(x),
            (Column::Real(v), CellValue::Real(x)) => v.push(x),
            (Column::Text(v), CellValue::Text(x)) => v.push(x),
            (column, value) => {
                return Err(RatError::conversion(
                    value.to_string(),
                    column.field_type(),
                ));
            }
        }
        Ok(())
    }

    /// Iterate over the cells.
    pub fn iter(&self) -> impl Iterator<Item = CellValue> + '_ {
        (0..self.len()).filter_map(move |row| self.get(row))
    }
}
