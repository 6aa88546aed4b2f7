//! Data models for raster attribute tables.

mod color;
mod field;
mod value;

pub use color::{Color, ColorFields};
pub use field::{FieldType, FieldUsage, RatField};
pub use value::{CellValue, Column};
