//! Raster attribute tables.
//!
//! A raster attribute table (RAT) describes the classes of a raster band:
//! one row per raster value or value range, with a count, a name, a color
//! and any number of user columns. This crate holds the table model, its
//! two on-disk formats and the glue a host GIS needs around them:
//!
//! - [`table`]: the [`RatTable`] model and its schema, row and color edits
//! - [`format`]: dBase sidecars and GDAL PAM auxiliary XML
//! - [`loader`]: finding the table of a raster band
//! - [`classify`]: turning a table column into a raster renderer
//! - [`view`]: a grid model with change notifications for table editors
//! - [`config`]: configurable column name conventions and logging
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raster_rat::loader::load_rat;
//! use raster_rat::raster::{BandDataType, BandInfo, PamRaster};
//!
//! let mut raster = PamRaster::open("landcover.img", vec![BandInfo::new(BandDataType::Byte)])?;
//! let mut table = load_rat(&raster, 1, None);
//! raster_rat::classify::classify(&mut raster, 1, &mut table, "EVT_NAME")?;
//! table.save(&mut raster, 1)?;
//! ```

pub mod classify;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod loader;
pub mod model;
pub mod raster;
pub mod table;
pub mod view;

#[cfg(test)]
mod test_data;

pub use error::{RatError, RatResult};
pub use model::{CellValue, Color, Column, FieldType, FieldUsage, RatField};
pub use raster::{MemoryRaster, PamRaster, RasterSource, Renderer};
pub use table::{RatOrigin, RatTable};
pub use view::RatModel;
