//! Raster sources: the host collaborator a RAT is attached to.
//!
//! The core never decodes pixels. A [`RasterSource`] tells it where the raster
//! lives, what its bands are, how it is currently rendered, and gives access
//! to the format-native metadata block that may embed an attribute table.
//!
//! ## Implementations
//!
//! - [`PamRaster`]: a raster file whose native metadata is the GDAL PAM
//!   auxiliary file (`<raster>.aux.xml`)
//! - [`MemoryRaster`]: metadata held in memory, for hosts that manage
//!   storage themselves and for tests

mod memory;
mod pam;
mod renderer;

use std::path::Path;

use crate::error::RatResult;
use crate::table::RatTable;

pub use memory::MemoryRaster;
pub use pam::PamRaster;
pub use renderer::{ColorRampItem, ColorRampShader, PalettedClass, RampType, Renderer};

/// Pixel data type of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandDataType {
    /// Unsigned 8-bit
    #[default]
    Byte,
    /// Unsigned 16-bit
    UInt16,
    /// Signed 16-bit
    Int16,
    /// Unsigned 32-bit
    UInt32,
    /// Signed 32-bit
    Int32,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
}

impl BandDataType {
    /// Whether pixels are integers, the precondition for a thematic RAT.
    pub fn is_integer(self) -> bool {
        !matches!(self, BandDataType::Float32 | BandDataType::Float64)
    }
}

/// Description of one raster band, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandInfo {
    /// Pixel data type
    pub data_type: BandDataType,
}

impl BandInfo {
    /// Create a band description.
    pub fn new(data_type: BandDataType) -> Self {
        Self { data_type }
    }
}

/// A raster dataset as seen by the RAT core.
///
/// Bands are numbered from 1, as in GDAL.
pub trait RasterSource {
    /// Path of the raster file.
    fn path(&self) -> &Path;

    /// Whether the host could open the raster.
    fn is_valid(&self) -> bool;

    /// Number of bands.
    fn band_count(&self) -> usize;

    /// Pixel type of `band`, if it exists.
    fn band_data_type(&self, band: usize) -> Option<BandDataType>;

    /// Attribute table stored in the raster's own metadata for `band`.
    ///
    /// `Ok(None)` when the band has no embedded table.
    fn embedded_rat(&self, band: usize) -> RatResult<Option<RatTable>>;

    /// Store `table` in the raster's own metadata for `band`.
    fn write_embedded_rat(&mut self, band: usize, table: &RatTable) -> RatResult<()>;

    /// Current renderer, if the raster is displayed.
    fn renderer(&self) -> Option<&Renderer>;

    /// Replace the renderer.
    fn set_renderer(&mut self, renderer: Renderer);

    /// Mutable access to the renderer.
    fn renderer_mut(&mut self) -> Option<&mut Renderer>;

    /// Opaque host property attached to the raster.
    fn custom_property(&self, key: &str) -> Option<String>;

    /// Attach a host property.
    fn set_custom_property(&mut self, key: &str, value: String);

    /// Detach a host property.
    fn remove_custom_property(&mut self, key: &str);
}
