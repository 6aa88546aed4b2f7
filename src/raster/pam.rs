//! File-backed raster with GDAL PAM auxiliary metadata.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{RatError, RatResult};
use crate::format::aux_xml;
use crate::loader::aux_xml_path;
use crate::raster::{BandDataType, BandInfo, RasterSource, Renderer};
use crate::table::RatTable;

/// A raster file whose native metadata block is its `<raster>.aux.xml`.
///
/// The auxiliary file is read on every lookup and rewritten on every save;
/// nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct PamRaster {
    path: PathBuf,
    bands: Vec<BandInfo>,
    renderer: Option<Renderer>,
    properties: HashMap<String, String>,
}

impl PamRaster {
    /// Open the raster at `path`. Band descriptions come from the host,
    /// which decodes the raster header.
    pub fn open(path: impl Into<PathBuf>, bands: Vec<BandInfo>) -> RatResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(RatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Raster not found: {}", path.display()),
            )));
        }
        log::debug!("Opened raster {:?} with {} bands", path, bands.len());
        Ok(Self {
            path,
            bands,
            renderer: None,
            properties: HashMap::new(),
        })
    }

    /// Path of the auxiliary metadata file.
    pub fn aux_path(&self) -> PathBuf {
        aux_xml_path(&self.path)
    }

    fn check_band(&self, band: usize) -> RatResult<()> {
        if band == 0 || band > self.bands.len() {
            return Err(RatError::validation(format!(
                "Band {} does not exist (1-{})",
                band,
                self.bands.len()
            )));
        }
        Ok(())
    }
}

impl RasterSource for PamRaster {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self) -> bool {
        !self.bands.is_empty() && self.path.is_file()
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn band_data_type(&self, band: usize) -> Option<BandDataType> {
        band.checked_sub(1)
            .and_then(|i| self.bands.get(i))
            .map(|b| b.data_type)
    }

    fn embedded_rat(&self, band: usize) -> RatResult<Option<RatTable>> {
        if band == 0 || band > self.bands.len() {
            return Ok(None);
        }
        aux_xml::read_band_table(&self.aux_path(), band)
    }

    fn write_embedded_rat(&mut self, band: usize, table: &RatTable) -> RatResult<()> {
        self.check_band(band)?;
        aux_xml::write_band_table(&self.aux_path(), band, table)
    }

    fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    fn set_renderer(&mut self, renderer: Renderer) {
        self.renderer = Some(renderer);
    }

    fn renderer_mut(&mut self) -> Option<&mut Renderer> {
        self.renderer.as_mut()
    }

    fn custom_property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn set_custom_property(&mut self, key: &str, value: String) {
        self.properties.insert(key.to_string(), value);
    }

    fn remove_custom_property(&mut self, key: &str) {
        self.properties.remove(key);
    }
}
