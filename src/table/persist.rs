//! Saving a table back to its origin or to an explicit format.

use std::path::Path;

use crate::error::{RatError, RatResult};
use crate::format::{aux_xml, dbf};
use crate::loader::{aux_xml_path, sidecar_dbf_path};
use crate::raster::RasterSource;
use crate::table::{RatOrigin, RatTable};

impl RatTable {
    /// Write the table back to where it was loaded from.
    ///
    /// Sidecar tables overwrite their dBase file; embedded tables are
    /// stored in `raster`'s metadata under `band`.
    pub fn save(&self, raster: &mut dyn RasterSource, band: usize) -> RatResult<()> {
        match &self.origin {
            RatOrigin::Dbf(path) => {
                dbf::write_file(self, path)?;
                log::info!("Saved RAT to {:?}", path);
            }
            RatOrigin::Embedded => {
                raster.write_embedded_rat(band, self)?;
                log::info!("Saved RAT to band {} of {:?}", band, raster.path());
            }
            RatOrigin::Invalid => {
                return Err(RatError::validation("Cannot save an invalid table"));
            }
        }
        Ok(())
    }

    /// Write the table as the dBase sidecar of `raster_path`.
    ///
    /// On success the table's origin becomes the new sidecar file.
    pub fn save_as_dbf(&mut self, raster_path: &Path) -> RatResult<()> {
        let path = sidecar_dbf_path(raster_path);
        dbf::write_file(self, &path)?;
        log::info!("Saved RAT as dBase sidecar {:?}", path);
        self.set_origin(RatOrigin::Dbf(path));
        Ok(())
    }

    /// Write the table into the PAM auxiliary file of `raster_path` as the
    /// table of `band`.
    ///
    /// `band` is independent of the band the table was loaded from. On
    /// success the table's origin becomes embedded.
    pub fn save_as_xml(&mut self, raster_path: &Path, band: usize) -> RatResult<()> {
        let path = aux_xml_path(raster_path);
        aux_xml::write_band_table(&path, band, self)?;
        log::info!("Saved RAT as band {} of {:?}", band, path);
        self.set_origin(RatOrigin::Embedded);
        Ok(())
    }
}
