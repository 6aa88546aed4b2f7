//! A raster whose metadata lives in memory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{RatError, RatResult};
use crate::raster::{BandDataType, BandInfo, RasterSource, Renderer};
use crate::table::{RatOrigin, RatTable};

/// In-memory [`RasterSource`].
///
/// Embedded tables are kept per band in a map; writing one stores a copy.
/// The path is only used to locate sidecar files.
#[derive(Debug, Clone, Default)]
pub struct MemoryRaster {
    path: PathBuf,
    bands: Vec<BandInfo>,
    tables: BTreeMap<usize, RatTable>,
    renderer: Option<Renderer>,
    properties: HashMap<String, String>,
}

impl MemoryRaster {
    /// Create a raster at `path` with the given bands.
    pub fn new(path: impl Into<PathBuf>, bands: Vec<BandInfo>) -> Self {
        Self {
            path: path.into(),
            bands,
            ..Default::default()
        }
    }

    /// Single band raster of `data_type`.
    pub fn single_band(path: impl Into<PathBuf>, data_type: BandDataType) -> Self {
        Self::new(path, vec![BandInfo::new(data_type)])
    }

    /// Attach an embedded table to `band`.
    pub fn with_embedded_rat(mut self, band: usize, mut table: RatTable) -> Self {
        table.set_origin(RatOrigin::Embedded);
        self.tables.insert(band, table);
        self
    }

    /// Install a renderer.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
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

impl RasterSource for MemoryRaster {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self) -> bool {
        !self.bands.is_empty()
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
        Ok(self.tables.get(&band).cloned())
    }

    fn write_embedded_rat(&mut self, band: usize, table: &RatTable) -> RatResult<()> {
        self.check_band(band)?;
        let mut stored = table.clone();
        stored.set_origin(RatOrigin::Embedded);
        stored.set_classification_criteria(None);
        self.tables.insert(band, stored);
        Ok(())
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
