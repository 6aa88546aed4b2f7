//! Locating the attribute table of a raster band.
//!
//! A band's table is looked up in the raster's own metadata first. Band 1
//! may also have a dBase sidecar next to the raster file, named after the
//! full raster filename: `landcover.img` pairs with `landcover.img.vat.dbf`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::{AUX_XML_SUFFIX, DBF_SIDECAR_SUFFIX};
use crate::error::RatResult;
use crate::format::{DbfReadOptions, dbf};
use crate::raster::RasterSource;
use crate::table::RatTable;

/// Band whose table may live in a dBase sidecar.
pub const SIDECAR_BAND: usize = 1;

fn with_suffix(raster_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(raster_path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Path of the dBase sidecar of `raster_path`.
pub fn sidecar_dbf_path(raster_path: &Path) -> PathBuf {
    with_suffix(raster_path, DBF_SIDECAR_SUFFIX)
}

/// Path of the PAM auxiliary metadata file of `raster_path`.
pub fn aux_xml_path(raster_path: &Path) -> PathBuf {
    with_suffix(raster_path, AUX_XML_SUFFIX)
}

/// Find and load the table of `band`.
///
/// `Ok(None)` means the band has no table. An unreadable embedded table
/// falls back to the sidecar and is only returned when there is none.
pub fn read_rat(
    raster: &dyn RasterSource,
    band: usize,
    options: &DbfReadOptions,
) -> RatResult<Option<RatTable>> {
    if !raster.is_valid() {
        log::debug!("Raster {:?} is not valid, no RAT", raster.path());
        return Ok(None);
    }

    let embedded_error = match raster.embedded_rat(band) {
        Ok(Some(table)) if table.is_valid() => {
            log::debug!("Found embedded RAT for band {} of {:?}", band, raster.path());
            return Ok(Some(table));
        }
        Ok(_) => None,
        Err(e) => Some(e),
    };

    if band == SIDECAR_BAND {
        let path = sidecar_dbf_path(raster.path());
        if path.is_file() {
            if let Some(e) = &embedded_error {
                log::warn!(
                    "Ignoring unreadable embedded RAT of {:?}: {}",
                    raster.path(),
                    e
                );
            }
            log::debug!("Found dBase RAT {:?}", path);
            return dbf::read_file(&path, options).map(Some);
        }
    }

    embedded_error.map_or(Ok(None), Err)
}

/// Load the table of `band`, trying `rgb_names` before the default dBase
/// color column names.
///
/// Never fails: a missing or unreadable table yields an invalid one, with
/// the reason logged.
pub fn load_rat(raster: &dyn RasterSource, band: usize, rgb_names: Option<[&str; 3]>) -> RatTable {
    let options = match rgb_names {
        Some(names) => DbfReadOptions::default().with_rgb_names(names),
        None => DbfReadOptions::default(),
    };
    load_rat_with(raster, band, &options)
}

/// [`load_rat`] with explicit dBase read options, such as
/// [`RatConfig::dbf_read_options`](crate::config::RatConfig::dbf_read_options).
pub fn load_rat_with(raster: &dyn RasterSource, band: usize, options: &DbfReadOptions) -> RatTable {
    match read_rat(raster, band, options) {
        Ok(Some(table)) => table,
        Ok(None) => {
            log::debug!("No RAT for band {} of {:?}", band, raster.path());
            RatTable::invalid()
        }
        Err(e) => {
            log::warn!(
                "Could not read the RAT of band {} of {:?}: {}",
                band,
                raster.path(),
                e
            );
            RatTable::invalid()
        }
    }
}

/// Whether any band of the raster has a table.
pub fn has_rat(raster: &dyn RasterSource) -> bool {
    if !raster.is_valid() {
        return false;
    }
    let embedded = (1..=raster.band_count()).any(|band| match raster.embedded_rat(band) {
        Ok(table) => table.is_some_and(|t| t.is_valid()),
        Err(e) => {
            log::warn!("Could not inspect band {} of {:?}: {}", band, raster.path(), e);
            false
        }
    });
    embedded || sidecar_dbf_path(raster.path()).is_file()
}

/// Whether a new table can be built from the raster's renderer: the raster
/// is valid, classified and has no table yet.
pub fn can_create_rat(raster: &dyn RasterSource) -> bool {
    raster.is_valid()
        && raster.renderer().is_some_and(|r| r.is_classifiable())
        && !has_rat(raster)
}
