//! Round trips through a raster: save a table, locate it again through the
//! loader, edit it and save it back to where it came from.

use std::path::{Path, PathBuf};

use crate::format::tests::assert_same_table;
use crate::format::DbfReadOptions;
use crate::loader::{has_rat, load_rat, read_rat, sidecar_dbf_path};
use crate::model::{CellValue, Color, FieldUsage};
use crate::raster::{BandDataType, BandInfo, MemoryRaster, PamRaster, RasterSource};
use crate::table::RatOrigin;
use crate::test_data;

/// Create an empty raster file in `dir`.
fn raster_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

fn open_pam(path: &Path, bands: usize) -> PamRaster {
    PamRaster::open(path, vec![BandInfo::new(BandDataType::Int32); bands]).unwrap()
}

#[test]
fn test_embedded_table_through_aux_xml() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "bathy.tiff");
    let raster = open_pam(&path, 1);
    assert!(!has_rat(&raster));

    let mut table = test_data::embedded_table();
    table.save_as_xml(&path, 1).unwrap();
    assert_eq!(table.origin(), &RatOrigin::Embedded);
    assert!(raster.aux_path().is_file());

    let loaded = load_rat(&raster, 1, None);
    assert!(loaded.is_valid());
    assert!(!loaded.is_sidecar());
    assert_same_table(&loaded, &table);
    assert!(has_rat(&raster));
}

#[test]
fn test_sidecar_table_through_dbf() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "ExistingVegetationTypes_sample.img");

    let mut table = test_data::dbf_table();
    table.save_as_dbf(&path).unwrap();
    let sidecar = sidecar_dbf_path(&path);
    assert_eq!(table.path(), sidecar.as_path());

    let raster = MemoryRaster::single_band(&path, BandDataType::Byte);
    let loaded = load_rat(&raster, 1, None);
    assert!(loaded.is_sidecar());
    assert_eq!(loaded.path(), sidecar.as_path());
    assert_same_table(&loaded, &table);
    assert!(loaded.has_color());

    // Only band 1 can have a sidecar.
    let two_bands = MemoryRaster::new(&path, vec![BandInfo::default(); 2]);
    assert!(!load_rat(&two_bands, 2, None).is_valid());
}

#[test]
fn test_embedded_table_as_dbf_truncates_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "bathy.tiff");

    let mut table = test_data::embedded_table();
    table.save_as_dbf(&path).unwrap();

    let loaded = load_rat(&MemoryRaster::single_band(&path, BandDataType::Int32), 1, None);
    assert_eq!(loaded.field_count(), test_data::EMBEDDED_KEYS.len());
    assert_eq!(loaded.field_name(FieldUsage::MinMax), "Value");
    assert_eq!(loaded.field_name(FieldUsage::PixelCount), "Count");
    assert!(loaded.field("horizontal").is_some());
    assert!(loaded.field("horizont_1").is_some());
    assert_eq!(loaded.column("Value"), table.column("Value"));
    assert_eq!(
        loaded.column("horizontal"),
        table.column("horizontal_uncert_fixed")
    );
}

#[test]
fn test_edit_and_save_to_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "bathy.tiff");
    let mut raster = open_pam(&path, 1);
    test_data::embedded_table().save_as_xml(&path, 1).unwrap();

    let mut table = load_rat(&raster, 1, None);
    table
        .set_value("Source_Institution", 2, CellValue::from("NGS"))
        .unwrap();
    table.remove_row(0).unwrap();
    table.save(&mut raster, 1).unwrap();

    let reloaded = load_rat(&raster, 1, None);
    assert_eq!(reloaded.row_count(), test_data::EMBEDDED_ROWS - 1);
    assert_eq!(
        reloaded.value("Source_Institution", 1),
        Some(CellValue::from("NGS"))
    );
    assert_eq!(reloaded.value("Value", 0), Some(CellValue::Integer(15)));
}

#[test]
fn test_edit_and_save_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "landcover.img");
    test_data::dbf_table().save_as_dbf(&path).unwrap();

    let mut raster = MemoryRaster::single_band(&path, BandDataType::Byte);
    let mut table = load_rat(&raster, 1, None);
    assert!(table.set_color(0, Color::rgb(1, 2, 3)));
    table.save(&mut raster, 1).unwrap();

    // Sidecar saves never touch the raster's own metadata.
    assert!(raster.embedded_rat(1).unwrap().is_none());
    let reloaded = load_rat(&raster, 1, None);
    assert_eq!(reloaded.get_color(0), Some(Color::rgb(1, 2, 3)));
}

#[test]
fn test_writing_one_band_keeps_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "multi.tiff");
    let mut raster = open_pam(&path, 2);

    let thematic = test_data::embedded_table();
    let ranges = test_data::athematic_table();
    raster.write_embedded_rat(1, &thematic).unwrap();
    raster.write_embedded_rat(2, &ranges).unwrap();
    assert!(raster.write_embedded_rat(3, &ranges).is_err());

    assert_same_table(&load_rat(&raster, 1, None), &thematic);
    assert_same_table(&load_rat(&raster, 2, None), &ranges);

    let mut edited = load_rat(&raster, 2, None);
    edited.remove_color_fields();
    edited.save(&mut raster, 2).unwrap();
    assert!(!load_rat(&raster, 2, None).has_color());
    assert_same_table(&load_rat(&raster, 1, None), &thematic);
}

#[test]
fn test_corrupt_aux_xml_falls_back_to_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = raster_file(dir.path(), "landcover.img");
    let raster = open_pam(&path, 1);
    std::fs::write(
        raster.aux_path(),
        r#"<PAMDataset><PAMRasterBand band="1"><GDALRasterAttributeTable>
        <FieldDefn index="0"><Name>Value</Name><Type>9</Type><Usage>5</Usage></FieldDefn>
        </GDALRasterAttributeTable></PAMRasterBand></PAMDataset>"#,
    )
    .unwrap();
    let options = DbfReadOptions::default();

    // Without a sidecar the embedded error is reported.
    assert!(raster.embedded_rat(1).is_err());
    assert!(read_rat(&raster, 1, &options).is_err());
    assert!(!load_rat(&raster, 1, None).is_valid());
    assert!(!has_rat(&raster));

    let mut table = test_data::dbf_table();
    table.save_as_dbf(&path).unwrap();

    assert!(has_rat(&raster));
    let loaded = load_rat(&raster, 1, None);
    assert!(loaded.is_valid());
    assert!(loaded.is_sidecar());
    assert_same_table(&loaded, &table);
    assert!(read_rat(&raster, 1, &options).unwrap().is_some());
}
