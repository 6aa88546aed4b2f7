//! Classifying a raster by one column of its attribute table.
//!
//! Classification turns the table into a renderer: every row becomes a
//! class labelled with its criteria value, and rows sharing a label share
//! one color. The criteria column is remembered both on the table and as a
//! custom property of the raster, which marks the raster style as managed
//! by its table.

use std::collections::HashMap;

use crate::color_utils::generate_palette;
use crate::constants::RAT_CUSTOM_PROPERTY_CLASSIFICATION_CRITERIA;
use crate::error::{RatError, RatResult};
use crate::loader::has_rat;
use crate::model::{Color, FieldUsage};
use crate::raster::{ColorRampItem, ColorRampShader, PalettedClass, RampType, RasterSource, Renderer};
use crate::table::RatTable;

/// Classify `band` of `raster` by the values of column `criteria`.
///
/// Thematic tables produce a paletted renderer with one class per row,
/// keyed on the MinMax value. Athematic tables produce a discrete color
/// ramp keyed on the range maximum. Each distinct label takes the color of
/// its first row: the table's own color when it has one, otherwise a
/// generated one.
///
/// Returns the index of the first class of every distinct label, in the
/// order the labels first appear in the table.
pub fn classify(
    raster: &mut dyn RasterSource,
    band: usize,
    table: &mut RatTable,
    criteria: &str,
) -> RatResult<Vec<usize>> {
    let criteria_index = table
        .field_index(criteria)
        .ok_or_else(|| RatError::validation(format!("Field '{}' does not exist", criteria)))?;
    let value_columns = table.value_columns();
    let Some(key) = value_columns.last() else {
        return Err(RatError::validation(
            "The table has no value column to classify on",
        ));
    };
    let key_column = table
        .column(key)
        .ok_or_else(|| RatError::validation(format!("Field '{}' does not exist", key)))?;

    let criteria_column = &table.columns()[criteria_index];
    let labels: Vec<String> = criteria_column.iter().map(|v| v.to_string()).collect();

    let mut label_order: Vec<&str> = Vec::new();
    let mut first_rows: HashMap<&str, usize> = HashMap::new();
    for (row, label) in labels.iter().enumerate() {
        if !first_rows.contains_key(label.as_str()) {
            first_rows.insert(label.as_str(), row);
            label_order.push(label.as_str());
        }
    }

    let palette = generate_palette(label_order.len());
    let label_colors: HashMap<&str, Color> = label_order
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let color = table.get_color(first_rows[label]).unwrap_or(palette[i]);
            (*label, color)
        })
        .collect();

    let mut keyed: Vec<(f64, usize)> = (0..table.row_count())
        .filter_map(|row| key_column.get_f64(row).map(|v| (v, row)))
        .collect();

    let renderer = if table.is_thematic() {
        Renderer::Paletted {
            band,
            classes: keyed
                .iter()
                .map(|(value, row)| {
                    let label = labels[*row].as_str();
                    PalettedClass::new(*value, label, label_colors[label])
                })
                .collect(),
        }
    } else {
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        let minimum = table
            .column(table.field_name(FieldUsage::Min))
            .unwrap_or(key_column)
            .iter()
            .filter_map(|v| v.as_f64())
            .fold(f64::INFINITY, f64::min);
        let maximum = keyed.last().map_or(f64::NEG_INFINITY, |(v, _)| *v);
        Renderer::PseudoColor {
            band,
            shader: ColorRampShader {
                ramp_type: RampType::Discrete,
                items: keyed
                    .iter()
                    .map(|(value, row)| {
                        let label = labels[*row].as_str();
                        ColorRampItem::new(*value, label, label_colors[label])
                    })
                    .collect(),
                minimum,
                maximum,
            },
        }
    };

    let class_labels: Vec<&str> = keyed.iter().map(|(_, row)| labels[*row].as_str()).collect();
    let first_classes: Vec<usize> = label_order
        .iter()
        .filter_map(|label| class_labels.iter().position(|l| l == label))
        .collect();

    log::info!(
        "Classified band {} of {:?} by '{}': {} classes, {} labels",
        band,
        raster.path(),
        criteria,
        class_labels.len(),
        first_classes.len()
    );

    raster.set_renderer(renderer);
    raster.set_custom_property(RAT_CUSTOM_PROPERTY_CLASSIFICATION_CRITERIA, criteria.to_string());
    table.set_classification_criteria(Some(criteria.to_string()));

    Ok(first_classes)
}

/// Give every class the color of the first class sharing its label.
///
/// Returns true when a color changed.
pub fn homogenize_colors(renderer: &mut Renderer) -> bool {
    let mut first_colors: HashMap<String, Color> = HashMap::new();
    let mut changed = false;
    for (label, color) in renderer.class_colors_mut() {
        let first = *first_colors.entry(label.to_string()).or_insert(*color);
        if *color != first {
            *color = first;
            changed = true;
        }
    }
    if changed {
        log::debug!("Homogenized class colors by label");
    }
    changed
}

/// Legend entries with one entry per label, in class order.
pub fn legend_entries(renderer: &Renderer) -> Vec<(String, Color)> {
    let mut entries: Vec<(String, Color)> = Vec::new();
    for (label, color) in renderer.class_entries() {
        if !entries.iter().any(|(l, _)| l == label) {
            entries.push((label.to_string(), color));
        }
    }
    entries
}

/// The criteria recorded on the raster, if it is managed by its table.
pub fn criteria_property(raster: &dyn RasterSource) -> Option<String> {
    raster
        .custom_property(RAT_CUSTOM_PROPERTY_CLASSIFICATION_CRITERIA)
        .filter(|c| !c.is_empty())
}

/// Drop the classification marker of a raster that lost its table.
///
/// Returns true when the marker was removed.
pub fn sync_classification_marker(raster: &mut dyn RasterSource) -> bool {
    if criteria_property(raster).is_none() || has_rat(raster) {
        return false;
    }
    raster.remove_custom_property(RAT_CUSTOM_PROPERTY_CLASSIFICATION_CRITERIA);
    log::info!(
        "Raster {:?} was classified by its RAT but the RAT got lost",
        raster.path()
    );
    true
}

/// React to a renderer change on a raster styled by its table: colors of
/// classes sharing a label are homogenized again.
///
/// Returns true when colors were reset.
pub fn on_renderer_changed(raster: &mut dyn RasterSource) -> bool {
    sync_classification_marker(raster);
    if criteria_property(raster).is_none() || !has_rat(raster) {
        return false;
    }
    match raster.renderer_mut() {
        Some(renderer) => homogenize_colors(renderer),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{BandDataType, MemoryRaster};
    use crate::test_data;

    fn raster_with(table: RatTable) -> MemoryRaster {
        MemoryRaster::single_band("classified.tif", BandDataType::Int32).with_embedded_rat(1, table)
    }

    fn assert_groups_share_first_color(renderer: &Renderer, first_classes: &[usize]) {
        let entries = renderer.class_entries();
        let colors: HashMap<&str, Color> = first_classes
            .iter()
            .map(|i| (entries[*i].0, entries[*i].1))
            .collect();
        for (label, color) in &entries {
            assert_eq!(colors[label], *color, "class '{}'", label);
        }
    }

    #[test]
    fn test_classify_embedded() {
        let mut table = test_data::embedded_table();
        let mut raster = raster_with(table.clone());

        let first_classes = classify(&mut raster, 1, &mut table, "horizontal_uncert_fixed").unwrap();
        assert_eq!(first_classes, vec![0, 1, 2, 3]);

        let renderer = raster.renderer().unwrap();
        assert!(matches!(renderer, Renderer::Paletted { band: 1, .. }));
        assert_eq!(renderer.class_entries().len(), test_data::EMBEDDED_ROWS);
        assert_eq!(renderer.color_for(7.0), renderer.class_entries().first().map(|e| e.1));
        assert_groups_share_first_color(renderer, &first_classes);

        assert_eq!(table.classification_criteria(), Some("horizontal_uncert_fixed"));
        assert_eq!(
            criteria_property(&raster).as_deref(),
            Some("horizontal_uncert_fixed")
        );
    }

    #[test]
    fn test_classify_sidecar_uses_table_colors() {
        let mut table = test_data::dbf_table();
        let mut raster = MemoryRaster::single_band("veg.img", BandDataType::Int16);

        let first_classes = classify(&mut raster, 1, &mut table, "SYSTMGRPPH").unwrap();
        assert_eq!(first_classes, vec![0, 1, 2, 5, 8, 9]);

        let renderer = raster.renderer().unwrap();
        assert_groups_share_first_color(renderer, &first_classes);
        // "Developed" covers rows 2 to 4 and keeps the color of row 2.
        assert_eq!(renderer.color_for(14.0), Some(Color::rgb(253, 204, 211)));
        assert_eq!(renderer.color_for(11.0), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn test_classify_athematic_builds_ramp() {
        let mut table = test_data::athematic_table();
        let mut raster = raster_with(table.clone());

        let first_classes = classify(&mut raster, 1, &mut table, "Class").unwrap();
        assert_eq!(first_classes, vec![0, 1, 2]);

        let Some(Renderer::PseudoColor { shader, .. }) = raster.renderer() else {
            panic!("expected a color ramp");
        };
        assert_eq!(shader.ramp_type, RampType::Discrete);
        assert_eq!(shader.minimum, 0.0);
        assert_eq!(shader.maximum, 10.0);
        let values: Vec<f64> = shader.items.iter().map(|i| i.value).collect();
        assert_eq!(values, vec![1.0, 2.5, 10.0]);
        assert_eq!(shader.color_for(2.0), Some(Color::rgba(100, 50, 0, 255)));
    }

    #[test]
    fn test_classify_without_color_generates_palette() {
        let mut table = test_data::embedded_table();
        let mut raster = raster_with(table.clone());
        classify(&mut raster, 1, &mut table, "data_assessment").unwrap();

        let legend = legend_entries(raster.renderer().unwrap());
        assert_eq!(legend.len(), 3);
        let palette = generate_palette(3);
        let colors: Vec<Color> = legend.iter().map(|(_, c)| *c).collect();
        assert_eq!(colors, palette);
    }

    #[test]
    fn test_classify_rejects_unknown_criteria() {
        let mut table = test_data::embedded_table();
        let mut raster = raster_with(table.clone());
        let err = classify(&mut raster, 1, &mut table, "not found").unwrap_err();
        assert!(err.is_validation());
        assert!(raster.renderer().is_none());
        assert_eq!(table.classification_criteria(), None);
    }

    #[test]
    fn test_homogenize_colors() {
        let mut renderer = Renderer::Paletted {
            band: 1,
            classes: vec![
                PalettedClass::new(1.0, "a", Color::rgb(1, 2, 3)),
                PalettedClass::new(2.0, "b", Color::rgb(4, 5, 6)),
                PalettedClass::new(3.0, "a", Color::rgb(7, 8, 9)),
            ],
        };
        assert!(homogenize_colors(&mut renderer));
        assert_eq!(renderer.color_for(3.0), Some(Color::rgb(1, 2, 3)));
        assert!(!homogenize_colors(&mut renderer));
        assert_eq!(
            legend_entries(&renderer),
            vec![
                ("a".to_string(), Color::rgb(1, 2, 3)),
                ("b".to_string(), Color::rgb(4, 5, 6)),
            ]
        );
    }

    #[test]
    fn test_marker_removed_when_rat_is_lost() {
        let mut raster = MemoryRaster::single_band("lost.tif", BandDataType::Byte);
        assert!(criteria_property(&raster).is_none());
        assert!(!sync_classification_marker(&mut raster));

        raster.set_custom_property(RAT_CUSTOM_PROPERTY_CLASSIFICATION_CRITERIA, "Class".into());
        assert!(sync_classification_marker(&mut raster));
        assert!(criteria_property(&raster).is_none());
    }

    #[test]
    fn test_renderer_change_homogenizes_managed_style() {
        let mut table = test_data::embedded_table();
        let mut raster = raster_with(table.clone());
        classify(&mut raster, 1, &mut table, "data_assessment").unwrap();
        assert!(!on_renderer_changed(&mut raster));

        if let Some(Renderer::Paletted { classes, .. }) = raster.renderer_mut() {
            classes[3].color = Color::rgb(1, 1, 1);
        }
        assert!(on_renderer_changed(&mut raster));
        let renderer = raster.renderer().unwrap();
        assert_eq!(renderer.class_entries()[3].1, renderer.class_entries()[0].1);
    }
}
