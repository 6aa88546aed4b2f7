//! Persisted RAT formats.
//!
//! Tables are read from and written to two on-disk formats:
//!
//! - **dBase sidecar** (`<raster>.vat.dbf`): a dBase III table with one record
//!   per class. Field usages are not stored and are inferred from column
//!   names on load.
//! - **PAM XML** (`<raster>.aux.xml`): the GDAL persistent auxiliary
//!   metadata file, holding one `GDALRasterAttributeTable` per band with the
//!   full schema (name, type, usage) and row data.
//!
//! Every write goes through a temporary file that atomically replaces the
//! destination, so a failed save never leaves a truncated file behind.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raster_rat::format::{aux_xml, dbf, DbfReadOptions};
//!
//! let table = dbf::read_file(path, &DbfReadOptions::default())?;
//! aux_xml::write_band_table(aux_path, 1, &table)?;
//! ```

mod atomic;
pub mod aux_xml;
pub mod dbf;

#[cfg(test)]
mod tests;

pub use dbf::DbfReadOptions;

pub(crate) use atomic::write_atomic;
