//! Fixture tables shared by the unit tests.
//!
//! The shapes follow real world tables: a bathymetry source-information
//! table embedded in a GeoTIFF, a LANDFIRE vegetation dBase sidecar and a
//! small athematic range table.

use std::path::PathBuf;

use crate::model::{Column, FieldType, FieldUsage, RatField};
use crate::table::{RatOrigin, RatTable};

/// Schema of the embedded bathymetry table, in column order.
pub(crate) const EMBEDDED_KEYS: [&str; 16] = [
    "Value",
    "Count",
    "data_assessment",
    "feature_least_depth",
    "significant_features",
    "feature_size",
    "full_coverage",
    "bathy_coverage",
    "horizontal_uncert_fixed",
    "horizontal_uncert_var",
    "License_Name",
    "License_URL",
    "Source_Survey_ID",
    "Source_Institution",
    "survey_date_start",
    "survey_date_end",
];

/// Leading raster values of the embedded table.
pub(crate) const EMBEDDED_VALUES: [i64; 10] = [7, 15, 23, 24, 49, 54, 61, 63, 65, 79];

/// Row count of the embedded table.
pub(crate) const EMBEDDED_ROWS: usize = 27;

/// Schema of the vegetation sidecar table, in column order.
pub(crate) const DBF_KEYS: [&str; 16] = [
    "VALUE",
    "COUNT",
    "EVT_NAME",
    "SYSTEMGROU",
    "SYSTMGRPNA",
    "SAF_SRM",
    "NVCSORDER",
    "NVCSCLASS",
    "NVCSSUBCLA",
    "SYSTMGRPPH",
    "R",
    "G",
    "B",
    "RED",
    "GREEN",
    "BLUE",
];

/// Raster values of the vegetation table.
pub(crate) const DBF_VALUES: [i64; 10] = [11, 12, 13, 14, 16, 17, 21, 22, 23, 24];

fn field(name: &str, usage: FieldUsage, field_type: FieldType) -> RatField {
    RatField::new(name, usage, field_type)
}

fn text(values: impl IntoIterator<Item = impl Into<String>>) -> Column {
    Column::Text(values.into_iter().map(Into::into).collect())
}

/// Thematic table with Value/Count and fourteen generic fields, no color.
pub(crate) fn embedded_table() -> RatTable {
    use FieldType::{Integer, Real, String as Text};
    use FieldUsage::{Generic, MinMax, PixelCount};

    let types = [
        Integer, Integer, Integer, Real, Real, Real, Integer, Integer, Real, Real, Text, Text, Text,
        Text, Text, Text,
    ];
    let fields: Vec<RatField> = EMBEDDED_KEYS
        .iter()
        .zip(types)
        .enumerate()
        .map(|(i, (name, t))| {
            let usage = match i {
                0 => MinMax,
                1 => PixelCount,
                _ => Generic,
            };
            field(name, usage, t)
        })
        .collect();

    let rows = 0..EMBEDDED_ROWS;
    let value = |i: usize| {
        EMBEDDED_VALUES
            .get(i)
            .copied()
            .unwrap_or(80 + 3 * i as i64)
    };
    let uncert = [0.5, 1.0, 2.0, 5.0];
    let columns = vec![
        Column::Integer(rows.clone().map(value).collect()),
        Column::Integer(rows.clone().map(|i| 100 + 7 * i as i64).collect()),
        Column::Integer(rows.clone().map(|i| 1 + (i % 3) as i64).collect()),
        Column::Real(rows.clone().map(|_| 0.0).collect()),
        Column::Real(rows.clone().map(|i| (i % 2) as f64).collect()),
        Column::Real(rows.clone().map(|i| 1.5 * i as f64).collect()),
        Column::Integer(rows.clone().map(|i| (i % 2) as i64).collect()),
        Column::Integer(rows.clone().map(|_| 1).collect()),
        Column::Real(rows.clone().map(|i| uncert[i % 4]).collect()),
        Column::Real(rows.clone().map(|i| 0.01 * (i % 5) as f64).collect()),
        text(rows.clone().map(|_| "CC0 1.0")),
        text(rows.clone().map(|_| "https://creativecommons.org/publicdomain/zero/1.0/")),
        text(rows.clone().map(|i| format!("H{:05}", 12000 + i))),
        text(rows.clone().map(|i| {
            if i % 3 == 0 {
                "NOAA & USACE <Pacific>"
            } else {
                "NOAA"
            }
        })),
        text(rows.clone().map(|i| format!("2019-{:02}-01", 1 + i % 12))),
        text(rows.map(|i| format!("2020-{:02}-28", 1 + i % 12))),
    ];

    RatTable::from_parts(fields, columns, RatOrigin::Embedded).unwrap()
}

/// Thematic sidecar table with R,G,B color channels and a generic
/// RED,GREEN,BLUE copy of them.
pub(crate) fn dbf_table() -> RatTable {
    use FieldType::{Integer, String as Text};
    use FieldUsage::{Blue, Generic, Green, MinMax, PixelCount, Red};

    let schema = [
        (MinMax, Integer),
        (PixelCount, Integer),
        (Generic, Text),
        (Generic, Integer),
        (Generic, Text),
        (Generic, Text),
        (Generic, Text),
        (Generic, Text),
        (Generic, Text),
        (Generic, Text),
        (Red, Integer),
        (Green, Integer),
        (Blue, Integer),
        (Generic, Integer),
        (Generic, Integer),
        (Generic, Integer),
    ];
    let fields: Vec<RatField> = DBF_KEYS
        .iter()
        .zip(schema)
        .map(|(name, (usage, t))| field(name, usage, t))
        .collect();

    let names = [
        "Open Water",
        "Snow-Ice",
        "Developed-Open Space",
        "Developed-Low Intensity",
        "Developed-High Intensity",
        "Barren",
        "Quarries-Strip Mines",
        "Sparsely Vegetated",
        "Agriculture",
        "Rocky Mountain Subalpine Forest",
    ];
    let physiognomy = [
        "Open Water",
        "Snow-Ice",
        "Developed",
        "Developed",
        "Developed",
        "Sparse",
        "Sparse",
        "Sparse",
        "Agricultural",
        "Conifer",
    ];
    let rgb: [(i64, i64, i64); 10] = [
        (0, 0, 255),
        (159, 161, 240),
        (253, 204, 211),
        (255, 122, 143),
        (255, 0, 0),
        (179, 174, 163),
        (120, 120, 120),
        (210, 200, 180),
        (255, 255, 0),
        (0, 96, 0),
    ];
    let rows = 0..DBF_VALUES.len();

    let columns = vec![
        Column::Integer(DBF_VALUES.to_vec()),
        Column::Integer(rows.clone().map(|i| 1000 + 37 * i as i64).collect()),
        text(names),
        Column::Integer(rows.clone().map(|i| 10 + (i / 3) as i64).collect()),
        text(physiognomy.iter().map(|p| format!("{} Group", p))),
        text(rows.clone().map(|i| if i % 2 == 0 { "N/A" } else { "SAF 206" })),
        text(rows.clone().map(|_| "Tree-dominated")),
        text(rows.clone().map(|_| "Open tree canopy")),
        text(rows.clone().map(|_| "Temperate forest")),
        text(physiognomy),
        Column::Integer(rgb.iter().map(|c| c.0).collect()),
        Column::Integer(rgb.iter().map(|c| c.1).collect()),
        Column::Integer(rgb.iter().map(|c| c.2).collect()),
        Column::Integer(rgb.iter().map(|c| c.0).collect()),
        Column::Integer(rgb.iter().map(|c| c.1).collect()),
        Column::Integer(rgb.iter().map(|c| c.2).collect()),
    ];

    let origin = RatOrigin::Dbf(PathBuf::from("ExistingVegetationTypes_sample.img.vat.dbf"));
    RatTable::from_parts(fields, columns, origin).unwrap()
}

/// Athematic range table with Min/Max, a class name and RGBA.
pub(crate) fn athematic_table() -> RatTable {
    use FieldType::{Integer, Real, String as Text};

    let fields = vec![
        field("Value Min", FieldUsage::Min, Real),
        field("Value Max", FieldUsage::Max, Real),
        field("Class", FieldUsage::Name, Text),
        field("Red", FieldUsage::Red, Integer),
        field("Green", FieldUsage::Green, Integer),
        field("Blue", FieldUsage::Blue, Integer),
        field("Alpha", FieldUsage::Alpha, Integer),
    ];
    let columns = vec![
        Column::Real(vec![0.0, 1.0, 2.5]),
        Column::Real(vec![1.0, 2.5, 10.0]),
        text(["low", "mid", "high"]),
        Column::Integer(vec![0, 100, 200]),
        Column::Integer(vec![0, 50, 250]),
        Column::Integer(vec![255, 0, 10]),
        Column::Integer(vec![255, 255, 128]),
    ];

    RatTable::from_parts(fields, columns, RatOrigin::Embedded).unwrap()
}
