//! dBase III sidecar format.
//!
//! Layout: a 32-byte header, one 32-byte descriptor per field, a `0x0D`
//! terminator, then fixed-width records each preceded by a deletion flag,
//! and a trailing `0x1A`. All integers are little-endian.

use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::Datelike;

use crate::constants::{
    ALPHA_FIELD_NAMES, ALTERNATE_RGB_FIELD_NAMES, DBF_COUNT_FIELD, DBF_MAX_FIELD_NAME_LEN,
    DBF_VALUE_FIELD, DEFAULT_RGB_FIELD_NAMES,
};
use crate::error::{RatError, RatResult};
use crate::format::write_atomic;
use crate::model::{CellValue, Column, FieldType, FieldUsage, RatField};
use crate::table::{RatOrigin, RatTable};

const VERSION: u8 = 0x03;
const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0D;
const EOF_MARKER: u8 = 0x1A;
const RECORD_ACTIVE: u8 = b' ';
const RECORD_DELETED: u8 = b'*';
const MAX_CHARACTER_LEN: usize = 254;

/// Column name conventions used to infer field usages on load.
#[derive(Debug, Clone)]
pub struct DbfReadOptions {
    /// Candidate red/green/blue column names, tried in order
    pub rgb_names: Vec<[String; 3]>,
    /// Candidate alpha column names, tried in order
    pub alpha_names: Vec<String>,
}

impl Default for DbfReadOptions {
    fn default() -> Self {
        Self {
            rgb_names: vec![
                DEFAULT_RGB_FIELD_NAMES.map(String::from),
                ALTERNATE_RGB_FIELD_NAMES.map(String::from),
            ],
            alpha_names: ALPHA_FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DbfReadOptions {
    /// Create options with the default name conventions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try `names` before the default RGB conventions.
    pub fn with_rgb_names(mut self, names: [&str; 3]) -> Self {
        self.rgb_names.insert(0, names.map(String::from));
        self
    }
}

#[derive(Debug)]
struct Descriptor {
    name: String,
    kind: u8,
    length: usize,
    decimals: u8,
}

impl Descriptor {
    fn field_type(&self) -> FieldType {
        match self.kind {
            b'N' if self.decimals == 0 => FieldType::Integer,
            b'N' | b'F' => FieldType::Real,
            _ => FieldType::String,
        }
    }
}

/// Read the dBase file at `path` into a sidecar table.
pub fn read_file(path: &Path, options: &DbfReadOptions) -> RatResult<RatTable> {
    let bytes = std::fs::read(path)?;
    let (fields, columns) = parse(&bytes, options)?;
    let table = RatTable::from_parts(fields, columns, RatOrigin::Dbf(path.to_path_buf()))?;
    log::info!(
        "Read dBase RAT {:?}: {} fields, {} rows",
        path,
        table.field_count(),
        table.row_count()
    );
    Ok(table)
}

/// Parse dBase content into a schema and its columns.
pub fn parse(bytes: &[u8], options: &DbfReadOptions) -> RatResult<(Vec<RatField>, Vec<Column>)> {
    let mut cursor = Cursor::new(bytes);
    let version = cursor.read_u8().map_err(truncated)?;
    if version & 0x07 != VERSION {
        return Err(RatError::format(format!(
            "Unsupported dBase version 0x{:02x}",
            version
        )));
    }
    let mut date = [0u8; 3];
    cursor.read_exact(&mut date).map_err(truncated)?;
    let record_count = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
    let header_len = usize::from(cursor.read_u16::<LittleEndian>().map_err(truncated)?);
    let record_len = usize::from(cursor.read_u16::<LittleEndian>().map_err(truncated)?);

    let descriptors = parse_descriptors(bytes, header_len)?;
    let expected_len = 1 + descriptors.iter().map(|d| d.length).sum::<usize>();
    if record_len != expected_len {
        return Err(RatError::format(format!(
            "Record length {} does not match field widths ({})",
            record_len, expected_len
        )));
    }

    let mut columns: Vec<Column> = descriptors
        .iter()
        .map(|d| Column::new(d.field_type()))
        .collect();

    for record in 0..record_count {
        let start = header_len + record * record_len;
        let data = bytes
            .get(start..start + record_len)
            .ok_or_else(|| RatError::format(format!("Record {} is truncated", record)))?;
        match data[0] {
            RECORD_DELETED => continue,
            RECORD_ACTIVE => {}
            flag => {
                return Err(RatError::format(format!(
                    "Record {} has invalid deletion flag 0x{:02x}",
                    record, flag
                )));
            }
        }

        let mut offset = 1;
        for (descriptor, column) in descriptors.iter().zip(columns.iter_mut()) {
            let raw = &data[offset..offset + descriptor.length];
            offset += descriptor.length;
            column.push(parse_cell(raw, descriptor, record)?)?;
        }
    }

    let fields = infer_fields(&descriptors, options);
    Ok((fields, columns))
}

fn parse_descriptors(bytes: &[u8], header_len: usize) -> RatResult<Vec<Descriptor>> {
    if header_len < HEADER_LEN + 1 || header_len > bytes.len() {
        return Err(RatError::format(format!(
            "Invalid header length {}",
            header_len
        )));
    }

    let mut descriptors = Vec::new();
    let mut offset = HEADER_LEN;
    while offset < header_len && bytes[offset] != HEADER_TERMINATOR {
        let raw = bytes
            .get(offset..offset + DESCRIPTOR_LEN)
            .ok_or_else(|| RatError::format("Field descriptor is truncated"))?;
        let name_end = raw[..11].iter().position(|b| *b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&raw[..name_end]).trim().to_string();
        if name.is_empty() {
            return Err(RatError::format(format!(
                "Field {} has an empty name",
                descriptors.len()
            )));
        }
        descriptors.push(Descriptor {
            name,
            kind: raw[11],
            length: usize::from(raw[16]),
            decimals: raw[17],
        });
        offset += DESCRIPTOR_LEN;
    }

    if descriptors.is_empty() {
        return Err(RatError::format("dBase file has no fields"));
    }
    Ok(descriptors)
}

fn parse_cell(raw: &[u8], descriptor: &Descriptor, record: usize) -> RatResult<CellValue> {
    let text = String::from_utf8_lossy(raw);
    match descriptor.field_type() {
        FieldType::String => Ok(CellValue::Text(
            text.trim_end_matches([' ', '\0']).to_string(),
        )),
        field_type => {
            let trimmed = text.trim_matches([' ', '\0']);
            if trimmed.is_empty() {
                return Ok(CellValue::default_for(field_type));
            }
            CellValue::from(trimmed)
                .convert(field_type)
                .or_else(|_| CellValue::from(trimmed).convert(FieldType::Real)?.convert(field_type))
                .map_err(|_| {
                    RatError::format(format!(
                        "Invalid numeric value '{}' in field '{}' of record {}",
                        trimmed, descriptor.name, record
                    ))
                })
        }
    }
}

/// Assign usages from column names: `VALUE`, `COUNT`, the first complete
/// RGB name triplet and a matching alpha column.
fn infer_fields(descriptors: &[Descriptor], options: &DbfReadOptions) -> Vec<RatField> {
    let find = |name: &str| {
        descriptors
            .iter()
            .position(|d| d.name.eq_ignore_ascii_case(name))
    };

    let mut usages = vec![FieldUsage::Generic; descriptors.len()];
    if let Some(index) = find(DBF_VALUE_FIELD) {
        usages[index] = FieldUsage::MinMax;
    }
    if let Some(index) = find(DBF_COUNT_FIELD) {
        usages[index] = FieldUsage::PixelCount;
    }

    let rgb = options.rgb_names.iter().find_map(|[r, g, b]| {
        let indexes = [find(r)?, find(g)?, find(b)?];
        indexes
            .iter()
            .all(|i| usages[*i] == FieldUsage::Generic)
            .then_some(indexes)
    });
    if let Some([r, g, b]) = rgb {
        usages[r] = FieldUsage::Red;
        usages[g] = FieldUsage::Green;
        usages[b] = FieldUsage::Blue;
        if let Some(a) = options
            .alpha_names
            .iter()
            .filter_map(|name| find(name))
            .find(|i| usages[*i] == FieldUsage::Generic)
        {
            usages[a] = FieldUsage::Alpha;
        }
    }

    descriptors
        .iter()
        .zip(usages)
        .map(|(d, usage)| RatField::new(d.name.clone(), usage, d.field_type()))
        .collect()
}

fn truncated(_: std::io::Error) -> RatError {
    RatError::format("dBase header is truncated")
}

/// Write `table` to `path` as a dBase file.
pub fn write_file(table: &RatTable, path: &Path) -> RatResult<()> {
    let bytes = to_bytes(table)?;
    write_atomic(path, &bytes)
}

/// Serialize `table` as dBase content.
///
/// Names longer than ten bytes are truncated (and de-duplicated); the
/// dBase format cannot store more. Text cells are space padded, so trailing
/// spaces of a value do not survive a reload.
pub fn to_bytes(table: &RatTable) -> RatResult<Vec<u8>> {
    if table.fields().is_empty() {
        return Err(RatError::validation("Cannot write a table without fields"));
    }

    let names = dbf_field_names(table.fields());
    let mut descriptors = Vec::with_capacity(table.field_count());
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(table.field_count());
    for (name, column) in names.into_iter().zip(table.columns()) {
        let (descriptor, texts) = encode_column(name, column)?;
        descriptors.push(descriptor);
        cells.push(texts);
    }

    let header_len = HEADER_LEN + DESCRIPTOR_LEN * descriptors.len() + 1;
    let record_len = 1 + descriptors.iter().map(|d| d.length).sum::<usize>();
    let header_len = u16::try_from(header_len)
        .map_err(|_| RatError::format("Too many fields for a dBase file"))?;
    let record_len = u16::try_from(record_len)
        .map_err(|_| RatError::format("Records are too wide for a dBase file"))?;
    let record_count = u32::try_from(table.row_count())
        .map_err(|_| RatError::format("Too many rows for a dBase file"))?;

    let mut out = Vec::new();
    let today = chrono::Local::now().date_naive();
    out.write_u8(VERSION)?;
    out.write_u8(u8::try_from(today.year() - 1900).unwrap_or(u8::MAX))?;
    out.write_u8(today.month() as u8)?;
    out.write_u8(today.day() as u8)?;
    out.write_u32::<LittleEndian>(record_count)?;
    out.write_u16::<LittleEndian>(header_len)?;
    out.write_u16::<LittleEndian>(record_len)?;
    out.write_all(&[0; 20])?;

    for descriptor in &descriptors {
        let mut name = [0u8; 11];
        name[..descriptor.name.len()].copy_from_slice(descriptor.name.as_bytes());
        out.write_all(&name)?;
        out.write_u8(descriptor.kind)?;
        out.write_all(&[0; 4])?;
        out.write_u8(descriptor.length as u8)?;
        out.write_u8(descriptor.decimals)?;
        out.write_all(&[0; 14])?;
    }
    out.write_u8(HEADER_TERMINATOR)?;

    for row in 0..table.row_count() {
        out.write_u8(RECORD_ACTIVE)?;
        for (descriptor, texts) in descriptors.iter().zip(&cells) {
            let text = &texts[row];
            let padding = " ".repeat(descriptor.length - text.len());
            if descriptor.kind == b'C' {
                out.write_all(text.as_bytes())?;
                out.write_all(padding.as_bytes())?;
            } else {
                out.write_all(padding.as_bytes())?;
                out.write_all(text.as_bytes())?;
            }
        }
    }
    out.write_u8(EOF_MARKER)?;

    Ok(out)
}

fn encode_column(name: String, column: &Column) -> RatResult<(Descriptor, Vec<String>)> {
    let (kind, texts, decimals): (u8, Vec<String>, u8) = match column {
        Column::Integer(values) => (b'N', values.iter().map(|v| v.to_string()).collect(), 0),
        Column::Real(values) => {
            let texts: Vec<String> = values.iter().map(|v| format_real(*v)).collect();
            (b'N', texts.clone(), fraction_digits(&texts).max(1) as u8)
        }
        Column::Text(values) => {
            let padded = values.iter().filter(|v| v.ends_with(' ')).count();
            if padded > 0 {
                log::warn!(
                    "Trailing spaces of {} values in field '{}' will be lost",
                    padded,
                    name
                );
            }
            (b'C', values.clone(), 0)
        }
    };

    let widest = texts.iter().map(String::len).max().unwrap_or(0);
    let length = match kind {
        b'C' => widest.max(1),
        _ => widest.max(usize::from(decimals) + 2),
    };
    if length > MAX_CHARACTER_LEN {
        return Err(RatError::format(format!(
            "Values of field '{}' are too long for dBase ({} bytes)",
            name, length
        )));
    }

    Ok((
        Descriptor {
            name,
            kind,
            length,
            decimals,
        },
        texts,
    ))
}

/// Most digits after the decimal point among `texts`, exponents excluded.
fn fraction_digits(texts: &[String]) -> usize {
    texts
        .iter()
        .filter_map(|t| t.split_once('.'))
        .map(|(_, frac)| frac.chars().take_while(char::is_ascii_digit).count())
        .max()
        .unwrap_or(0)
}

/// Text that parses back to the same `f64`, in exponent form when long.
fn format_real(value: f64) -> String {
    let plain = value.to_string();
    if plain.len() > 24 {
        format!("{:e}", value)
    } else {
        plain
    }
}

fn dbf_field_names(fields: &[RatField]) -> Vec<String> {
    let mut used = HashSet::new();
    fields
        .iter()
        .map(|field| {
            let mut name = truncate(field.name(), DBF_MAX_FIELD_NAME_LEN);
            let mut suffix = 1;
            while !used.insert(name.to_ascii_uppercase()) {
                let tag = format!("_{}", suffix);
                name = format!(
                    "{}{}",
                    truncate(field.name(), DBF_MAX_FIELD_NAME_LEN - tag.len()),
                    tag
                );
                suffix += 1;
            }
            if name != field.name() {
                log::warn!(
                    "dBase field name '{}' stored as '{}'",
                    field.name(),
                    name
                );
            }
            name
        })
        .collect()
}

fn truncate(name: &str, max_len: usize) -> String {
    let mut end = name.len().min(max_len);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_descriptor() {
        let descriptor = |kind, decimals| Descriptor {
            name: "X".into(),
            kind,
            length: 10,
            decimals,
        };
        assert_eq!(descriptor(b'N', 0).field_type(), FieldType::Integer);
        assert_eq!(descriptor(b'N', 3).field_type(), FieldType::Real);
        assert_eq!(descriptor(b'F', 0).field_type(), FieldType::Real);
        assert_eq!(descriptor(b'C', 0).field_type(), FieldType::String);
        assert_eq!(descriptor(b'D', 0).field_type(), FieldType::String);
    }

    #[test]
    fn test_format_real_roundtrips() {
        for value in [0.0, 0.1, -2.5, 1.0 / 3.0, 1e300, 6.02e-23] {
            let text = format_real(value);
            assert!(text.len() <= 24, "{} too long", text);
            assert_eq!(text.parse::<f64>().unwrap(), value);
        }
    }

    #[test]
    fn test_long_names_are_truncated_uniquely() {
        let fields = vec![
            RatField::new("horizontal_uncert_fixed", FieldUsage::Generic, FieldType::Real),
            RatField::new("horizontal_uncert_var", FieldUsage::Generic, FieldType::Real),
            RatField::new("Value", FieldUsage::MinMax, FieldType::Integer),
        ];
        let names = dbf_field_names(&fields);
        assert_eq!(names, vec!["horizontal", "horizont_1", "Value"]);
        assert!(names.iter().all(|n| n.len() <= DBF_MAX_FIELD_NAME_LEN));
    }
}
