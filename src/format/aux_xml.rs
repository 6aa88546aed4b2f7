//! GDAL PAM auxiliary metadata (`.aux.xml`).
//!
//! Each band's table is stored under its `PAMRasterBand` element:
//!
//! ```xml
//! <PAMDataset>
//!   <PAMRasterBand band="1">
//!     <GDALRasterAttributeTable tableType="thematic">
//!       <FieldDefn index="0">
//!         <Name>Value</Name>
//!         <Type>0</Type>
//!         <Usage>5</Usage>
//!       </FieldDefn>
//!       <Row index="0">
//!         <F>7</F>
//!       </Row>
//!     </GDALRasterAttributeTable>
//!   </PAMRasterBand>
//! </PAMDataset>
//! ```
//!
//! Writing only replaces the target band's table; everything else in an
//! existing file is passed through unchanged.

use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{RatError, RatResult};
use crate::format::write_atomic;
use crate::model::{CellValue, Column, FieldType, FieldUsage, RatField};
use crate::table::{RatOrigin, RatTable};

const DATASET: &str = "PAMDataset";
const BAND: &[u8] = b"PAMRasterBand";
const TABLE: &[u8] = b"GDALRasterAttributeTable";
const FIELD_DEFN: &[u8] = b"FieldDefn";
const ROW: &[u8] = b"Row";
const CELL: &[u8] = b"F";
const INDENT: &str = "  ";

/// Read the table of `band` from the auxiliary file at `path`.
///
/// A missing file, or a file without a table for `band`, yields `None`.
pub fn read_band_table(path: &Path, band: usize) -> RatResult<Option<RatTable>> {
    let xml = match std::fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let table = parse_band_table(&xml, band)?;
    if let Some(table) = &table {
        log::info!(
            "Read band {} RAT from {:?}: {} fields, {} rows",
            band,
            path,
            table.field_count(),
            table.row_count()
        );
    }
    Ok(table)
}

#[derive(Default)]
struct FieldDefn {
    name: String,
    field_type: String,
    usage: String,
}

#[derive(Clone, Copy, PartialEq)]
enum FieldPart {
    Name,
    Type,
    Usage,
}

/// Parse the table of `band` out of auxiliary XML content.
pub fn parse_band_table(xml: &str, band: usize) -> RatResult<Option<RatTable>> {
    let mut reader = Reader::from_str(xml);

    let mut in_band = false;
    let mut in_table = false;
    let mut found = false;
    let mut defns: Vec<FieldDefn> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_defn: Option<FieldDefn> = None;
    let mut current_part: Option<FieldPart> = None;
    let mut current_row: Option<Vec<String>> = None;
    let mut current_cell: Option<String> = None;

    loop {
        match reader.read_event().map_err(|e| RatError::Xml(e.into()))? {
            Event::Start(e) => {
                let name = e.name();
                match name.as_ref() {
                    BAND if !found => in_band = band_attribute(&e)? == Some(band),
                    TABLE if in_band => in_table = true,
                    FIELD_DEFN if in_table => current_defn = Some(FieldDefn::default()),
                    b"Name" if current_defn.is_some() => current_part = Some(FieldPart::Name),
                    b"Type" if current_defn.is_some() => current_part = Some(FieldPart::Type),
                    b"Usage" if current_defn.is_some() => current_part = Some(FieldPart::Usage),
                    ROW if in_table => current_row = Some(Vec::new()),
                    CELL if current_row.is_some() => current_cell = Some(String::new()),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                match name.as_ref() {
                    CELL => {
                        if let Some(row) = current_row.as_mut() {
                            row.push(String::new());
                        }
                    }
                    TABLE if in_band => {
                        found = true;
                        in_band = false;
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| RatError::Xml(e.into()))?;
                if let Some(cell) = current_cell.as_mut() {
                    cell.push_str(&text);
                } else if let (Some(defn), Some(part)) = (current_defn.as_mut(), current_part) {
                    match part {
                        FieldPart::Name => defn.name.push_str(&text),
                        FieldPart::Type => defn.field_type.push_str(&text),
                        FieldPart::Usage => defn.usage.push_str(&text),
                    }
                }
            }
            Event::CData(e) => {
                if let Some(cell) = current_cell.as_mut() {
                    cell.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = e.name();
                match name.as_ref() {
                    CELL => {
                        if let (Some(row), Some(cell)) = (current_row.as_mut(), current_cell.take())
                        {
                            row.push(cell);
                        }
                    }
                    ROW => {
                        if let Some(row) = current_row.take() {
                            rows.push(row);
                        }
                    }
                    b"Name" | b"Type" | b"Usage" => current_part = None,
                    FIELD_DEFN => {
                        if let Some(defn) = current_defn.take() {
                            defns.push(defn);
                        }
                    }
                    TABLE if in_table => {
                        in_table = false;
                        in_band = false;
                        found = true;
                    }
                    BAND => in_band = false,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !found || defns.is_empty() {
        return Ok(None);
    }

    let fields = defns
        .iter()
        .enumerate()
        .map(|(index, defn)| build_field(index, defn))
        .collect::<RatResult<Vec<_>>>()?;

    let mut columns: Vec<Column> = fields
        .iter()
        .map(|f| Column::new(f.field_type()))
        .collect();
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != fields.len() {
            return Err(RatError::format(format!(
                "Row {} has {} values, expected {}",
                row_index,
                row.len(),
                fields.len()
            )));
        }
        for ((field, column), text) in fields.iter().zip(columns.iter_mut()).zip(row) {
            column.push(parse_cell(field, text, row_index)?)?;
        }
    }

    RatTable::from_parts(fields, columns, RatOrigin::Embedded).map(Some)
}

fn build_field(index: usize, defn: &FieldDefn) -> RatResult<RatField> {
    let name = defn.name.trim();
    if name.is_empty() {
        return Err(RatError::format(format!("Field {} has no name", index)));
    }

    let field_type = defn
        .field_type
        .trim()
        .parse()
        .ok()
        .and_then(FieldType::from_code)
        .ok_or_else(|| {
            RatError::format(format!(
                "Field '{}' has invalid type '{}'",
                name,
                defn.field_type.trim()
            ))
        })?;

    let usage = match defn.usage.trim() {
        "" => FieldUsage::Generic,
        code => code
            .parse()
            .ok()
            .and_then(FieldUsage::from_code)
            .unwrap_or_else(|| {
                log::warn!(
                    "Field '{}' has unknown usage '{}', treating it as generic",
                    name,
                    code
                );
                FieldUsage::Generic
            }),
    };

    Ok(RatField::new(name, usage, field_type))
}

fn parse_cell(field: &RatField, text: &str, row: usize) -> RatResult<CellValue> {
    let field_type = field.field_type();
    if field_type.is_numeric() && text.trim().is_empty() {
        return Ok(CellValue::default_for(field_type));
    }
    CellValue::from(text)
        .convert(field_type)
        .or_else(|_| CellValue::from(text).convert(FieldType::Real)?.convert(field_type))
        .map_err(|_| {
            RatError::format(format!(
                "Invalid value '{}' for field '{}' in row {}",
                text,
                field.name(),
                row
            ))
        })
}

fn band_attribute(e: &BytesStart<'_>) -> RatResult<Option<usize>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| RatError::Xml(e.into()))?;
        if attr.key.as_ref() == b"band" {
            let value = attr.unescape_value().map_err(|e| RatError::Xml(e.into()))?;
            return Ok(value.trim().parse().ok());
        }
    }
    Ok(None)
}

/// Bands that carry a table in auxiliary XML content.
pub fn bands_with_tables(xml: &str) -> RatResult<Vec<usize>> {
    let mut reader = Reader::from_str(xml);
    let mut band = None;
    let mut bands = Vec::new();

    loop {
        match reader.read_event().map_err(|e| RatError::Xml(e.into()))? {
            Event::Start(e) if e.name().as_ref() == BAND => band = band_attribute(&e)?,
            Event::End(e) if e.name().as_ref() == BAND => band = None,
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == TABLE => {
                if let Some(band) = band.filter(|b| !bands.contains(b)) {
                    bands.push(band);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(bands)
}

/// Store `table` as the table of `band` in the auxiliary file at `path`,
/// creating the file when needed.
pub fn write_band_table(path: &Path, band: usize, table: &RatTable) -> RatResult<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(xml) => Some(xml),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    let xml = merge_band_table(existing.as_deref(), band, table)?;
    write_atomic(path, xml.as_bytes())?;
    log::info!(
        "Wrote band {} RAT to {:?}: {} fields, {} rows",
        band,
        path,
        table.field_count(),
        table.row_count()
    );
    Ok(())
}

/// Produce auxiliary XML holding `table` for `band`.
///
/// With `existing` content, the band's previous table is replaced in place
/// (or a table, and if needed a band element, is added) and every other
/// element is kept verbatim.
pub fn merge_band_table(existing: Option<&str>, band: usize, table: &RatTable) -> RatResult<String> {
    if table.fields().is_empty() {
        return Err(RatError::validation("Cannot write a table without fields"));
    }

    let mut writer = Writer::new(Vec::new());
    match existing.filter(|xml| !xml.trim().is_empty()) {
        Some(xml) => merge_into(&mut writer, xml, band, table)?,
        None => {
            write_start(&mut writer, BytesStart::new(DATASET))?;
            newline(&mut writer, 1)?;
            write_band(&mut writer, band, table, 1)?;
            newline(&mut writer, 0)?;
            write_end(&mut writer, DATASET)?;
            newline(&mut writer, 0)?;
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|_| RatError::format("Invalid UTF-8 in XML"))
}

fn merge_into(writer: &mut Writer<Vec<u8>>, xml: &str, band: usize, table: &RatTable) -> RatResult<()> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut written = false;
    let mut in_target_band = false;
    let mut skip_until: Option<usize> = None;
    let mut after_whitespace = false;

    loop {
        let event = reader.read_event().map_err(|e| RatError::Xml(e.into()))?;

        if let Some(level) = skip_until {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == level {
                        skip_until = None;
                    }
                }
                Event::Eof => return Err(RatError::format("Unterminated attribute table")),
                _ => {}
            }
            continue;
        }

        let whitespace = matches!(&event, Event::Text(t) if t.iter().all(u8::is_ascii_whitespace));

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    root_seen = true;
                }
                if depth == 1 && e.name().as_ref() == BAND {
                    in_target_band = band_attribute(&e)? == Some(band);
                }
                if depth == 2 && in_target_band && !written && e.name().as_ref() == TABLE {
                    write_table(writer, table, depth)?;
                    written = true;
                    skip_until = Some(depth);
                    depth += 1;
                    continue;
                }
                depth += 1;
                write_event(writer, Event::Start(e))?;
            }
            Event::Empty(e) => {
                let name = e.name();
                let is_band = depth == 1 && name.as_ref() == BAND;
                let is_table = depth == 2 && in_target_band && name.as_ref() == TABLE;
                if depth == 0 {
                    root_seen = true;
                    let root = String::from_utf8_lossy(name.as_ref()).into_owned();
                    write_start(writer, e.to_owned())?;
                    newline(writer, 1)?;
                    write_band(writer, band, table, 1)?;
                    newline(writer, 0)?;
                    write_end(writer, &root)?;
                    written = true;
                } else if is_band && !written && band_attribute(&e)? == Some(band) {
                    write_start(writer, e.to_owned())?;
                    newline(writer, depth + 1)?;
                    write_table(writer, table, depth + 1)?;
                    newline(writer, depth)?;
                    write_end(writer, "PAMRasterBand")?;
                    written = true;
                } else if is_table && !written {
                    write_table(writer, table, depth)?;
                    written = true;
                } else {
                    write_event(writer, Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let name = e.name();
                if !written && depth == 1 && in_target_band && name.as_ref() == BAND {
                    indent_for_insert(writer, after_whitespace, depth + 1)?;
                    write_table(writer, table, depth + 1)?;
                    newline(writer, depth)?;
                    written = true;
                } else if !written && depth == 0 {
                    indent_for_insert(writer, after_whitespace, 1)?;
                    write_band(writer, band, table, 1)?;
                    newline(writer, 0)?;
                    written = true;
                }
                if depth == 1 && name.as_ref() == BAND {
                    in_target_band = false;
                }
                write_event(writer, Event::End(e))?;
            }
            Event::Eof => break,
            other => write_event(writer, other)?,
        }

        after_whitespace = whitespace;
    }

    if !root_seen {
        return Err(RatError::format("Auxiliary XML has no root element"));
    }
    if !written {
        return Err(RatError::format(format!(
            "Could not place the band {} table in the auxiliary XML",
            band
        )));
    }
    Ok(())
}

fn write_band<W: Write>(writer: &mut Writer<W>, band: usize, table: &RatTable, level: usize) -> RatResult<()> {
    let band_text = band.to_string();
    let mut start = BytesStart::new("PAMRasterBand");
    start.push_attribute(("band", band_text.as_str()));
    write_start(writer, start)?;
    newline(writer, level + 1)?;
    write_table(writer, table, level + 1)?;
    newline(writer, level)?;
    write_end(writer, "PAMRasterBand")
}

/// Write the `GDALRasterAttributeTable` element, its start tag at the
/// current position and its children indented below `level`.
fn write_table<W: Write>(writer: &mut Writer<W>, table: &RatTable, level: usize) -> RatResult<()> {
    let table_type = if table.is_thematic() {
        "thematic"
    } else {
        "athematic"
    };
    let mut start = BytesStart::new("GDALRasterAttributeTable");
    start.push_attribute(("tableType", table_type));
    write_start(writer, start)?;

    for (index, field) in table.fields().iter().enumerate() {
        let index = index.to_string();
        let mut defn = BytesStart::new("FieldDefn");
        defn.push_attribute(("index", index.as_str()));
        newline(writer, level + 1)?;
        write_start(writer, defn)?;
        newline(writer, level + 2)?;
        write_text_element(writer, "Name", field.name())?;
        newline(writer, level + 2)?;
        write_text_element(writer, "Type", &field.field_type().code().to_string())?;
        newline(writer, level + 2)?;
        write_text_element(writer, "Usage", &field.usage().code().to_string())?;
        newline(writer, level + 1)?;
        write_end(writer, "FieldDefn")?;
    }

    for row in 0..table.row_count() {
        let index = row.to_string();
        let mut start = BytesStart::new("Row");
        start.push_attribute(("index", index.as_str()));
        newline(writer, level + 1)?;
        write_start(writer, start)?;
        for column in table.columns() {
            let value = column.get(row).map(|v| v.to_string()).unwrap_or_default();
            newline(writer, level + 2)?;
            write_text_element(writer, "F", &value)?;
        }
        newline(writer, level + 1)?;
        write_end(writer, "Row")?;
    }

    newline(writer, level)?;
    write_end(writer, "GDALRasterAttributeTable")
}

/// Write a simple text element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> RatResult<()> {
    write_start(writer, BytesStart::new(name))?;
    if !value.is_empty() {
        write_event(writer, Event::Text(BytesText::new(value)))?;
    }
    write_end(writer, name)
}

fn write_start<W: Write>(writer: &mut Writer<W>, start: BytesStart<'_>) -> RatResult<()> {
    write_event(writer, Event::Start(start))
}

fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> RatResult<()> {
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> RatResult<()> {
    writer
        .write_event(event)
        .map_err(|e| RatError::Xml(e.into()))
}

fn newline<W: Write>(writer: &mut Writer<W>, level: usize) -> RatResult<()> {
    let text = format!("\n{}", INDENT.repeat(level));
    write_event(writer, Event::Text(BytesText::from_escaped(text)))
}

/// Whitespace before an element inserted ahead of a closing tag. When the
/// closing tag is already on its own indented line, one extra indent level
/// is enough.
fn indent_for_insert<W: Write>(writer: &mut Writer<W>, after_whitespace: bool, level: usize) -> RatResult<()> {
    if after_whitespace {
        write_event(writer, Event::Text(BytesText::from_escaped(INDENT)))
    } else {
        newline(writer, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_attribute() {
        let mut start = BytesStart::new("PAMRasterBand");
        start.push_attribute(("band", " 3 "));
        assert_eq!(band_attribute(&start).unwrap(), Some(3));
        assert_eq!(band_attribute(&BytesStart::new("PAMRasterBand")).unwrap(), None);
    }

    #[test]
    fn test_unknown_usage_is_generic() {
        let defn = FieldDefn {
            name: " Label ".into(),
            field_type: "2".into(),
            usage: "99".into(),
        };
        let field = build_field(0, &defn).unwrap();
        assert_eq!(field.name(), "Label");
        assert_eq!(field.usage(), FieldUsage::Generic);
        assert_eq!(field.field_type(), FieldType::String);
    }

    #[test]
    fn test_invalid_type_is_rejected() {
        let defn = FieldDefn {
            name: "Value".into(),
            field_type: "7".into(),
            usage: "5".into(),
        };
        assert!(build_field(0, &defn).is_err());
    }
}
