//! Table view adapter.
//!
//! [`RatModel`] presents a [`RatTable`] the way grid widgets expect it:
//! the virtual color column comes first, cells are read by role and every
//! change is announced through a [`ModelListener`]. The channel columns
//! behind the color are shown but edited only through the color column.

mod listener;

pub use listener::{ModelEvent, ModelListener, NoopListener, RecordingListener};

use crate::constants::RAT_COLOR_HEADER_NAME;
use crate::error::{RatError, RatResult};
use crate::model::{CellValue, Color, RatField};
use crate::table::RatTable;

/// What a cell is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRole {
    /// Value shown in the cell
    Display,
    /// Value handed to the cell editor
    Edit,
    /// Cell background
    Background,
    /// Text alignment
    Alignment,
    /// Hover text
    ToolTip,
}

/// What a header is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRole {
    /// Header title
    Display,
    /// Hover text describing the column role and type
    ToolTip,
    /// Header icon
    Decoration,
}

/// Horizontal alignment of a cell, vertically centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Header icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    /// The column holds or derives the class color
    Palette,
}

/// Answer to a data or header query.
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    Value(CellValue),
    Color(Color),
    Alignment(Alignment),
    Text(String),
    Decoration(Decoration),
}

/// An edit submitted by the cell editor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellEdit {
    /// New color for the virtual color column
    Color(Color),
    /// New value for a data column, converted to the column type
    Value(CellValue),
}

/// Interaction flags of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellFlags {
    pub enabled: bool,
    pub selectable: bool,
    pub editable: bool,
}

const COLOR_TOOLTIP: &str = "Virtual color field generated from the values in RGB(A) data columns";

/// Grid model over a borrowed table.
pub struct RatModel<'a, L = NoopListener> {
    table: &'a mut RatTable,
    listener: L,
    editable: bool,
}

impl<'a> RatModel<'a> {
    /// Model without change notifications.
    pub fn new(table: &'a mut RatTable) -> Self {
        Self::with_listener(table, NoopListener)
    }
}

impl<'a, L: ModelListener> RatModel<'a, L> {
    /// Model reporting changes to `listener`. Models start read-only.
    pub fn with_listener(table: &'a mut RatTable, listener: L) -> Self {
        Self {
            table,
            listener,
            editable: false,
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &RatTable {
        self.table
    }

    /// The change listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the change listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Allow or forbid cell edits.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Whether cell edits are allowed.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Whether the table has a virtual color column.
    pub fn has_color(&self) -> bool {
        self.table.has_color()
    }

    /// Column titles: the color column first when present, then the fields.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.column_count());
        if self.has_color() {
            headers.push(RAT_COLOR_HEADER_NAME.to_string());
        }
        headers.extend(self.table.fields().iter().map(|f| f.name().to_string()));
        headers
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Number of columns, the color column included.
    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    fn color_offset(&self) -> usize {
        usize::from(self.has_color())
    }

    fn is_color_column(&self, column: usize) -> bool {
        self.has_color() && column == 0
    }

    /// Schema index and descriptor of the field shown in `column`.
    fn field_at(&self, column: usize) -> Option<(usize, &RatField)> {
        let index = column.checked_sub(self.color_offset())?;
        self.table.fields().get(index).map(|f| (index, f))
    }

    fn model_column(&self, schema_index: usize) -> usize {
        schema_index + self.color_offset()
    }

    /// Whether `column` holds one channel of the color.
    pub fn column_is_rgb_data(&self, column: usize) -> bool {
        self.field_at(column).is_some_and(|(_, f)| f.is_color())
    }

    /// Whether cells of `column` can be edited when the model is editable.
    pub fn column_is_editable(&self, column: usize) -> bool {
        if self.is_color_column(column) {
            return true;
        }
        self.field_at(column).is_some_and(|(_, f)| !f.is_color())
    }

    /// Interaction flags of `column`.
    pub fn flags(&self, column: usize) -> CellFlags {
        if column >= self.column_count() {
            return CellFlags::default();
        }
        CellFlags {
            enabled: true,
            selectable: true,
            editable: self.editable && self.column_is_editable(column),
        }
    }

    /// Cell content for `role`.
    pub fn data(&self, row: usize, column: usize, role: DataRole) -> Option<CellData> {
        if row >= self.row_count() {
            return None;
        }

        if self.is_color_column(column) {
            return match role {
                DataRole::Display | DataRole::Edit | DataRole::Background => {
                    self.table.get_color(row).map(CellData::Color)
                }
                DataRole::Alignment | DataRole::ToolTip => None,
            };
        }

        let (index, field) = self.field_at(column)?;
        match role {
            DataRole::Display | DataRole::Edit => {
                self.table.columns()[index].get(row).map(CellData::Value)
            }
            DataRole::Alignment if field.field_type().is_numeric() => {
                Some(CellData::Alignment(Alignment::Right))
            }
            DataRole::Alignment => Some(CellData::Alignment(Alignment::Left)),
            DataRole::ToolTip if field.is_color() => Some(CellData::Text(format!(
                "This data is part of a color definition: click on \"{}\" column to edit.",
                RAT_COLOR_HEADER_NAME
            ))),
            _ => None,
        }
    }

    /// Header content of `section` for `role`.
    pub fn header_data(&self, section: usize, role: HeaderRole) -> Option<CellData> {
        if section >= self.column_count() {
            return None;
        }
        let is_color = self.is_color_column(section);
        match role {
            HeaderRole::Display => self.headers().into_iter().nth(section).map(CellData::Text),
            HeaderRole::ToolTip if is_color => Some(CellData::Text(COLOR_TOOLTIP.to_string())),
            HeaderRole::ToolTip => self.field_at(section).map(|(_, field)| {
                CellData::Text(format!(
                    "Role: {}\nType: {}",
                    field.usage().description(),
                    field.field_type().type_name()
                ))
            }),
            HeaderRole::Decoration if is_color || self.column_is_rgb_data(section) => {
                Some(CellData::Decoration(Decoration::Palette))
            }
            HeaderRole::Decoration => None,
        }
    }

    /// Apply a cell edit.
    ///
    /// A color edit rewrites every channel of the row and is announced for
    /// each channel column. Value edits are converted to the column type;
    /// on failure the cell keeps its value.
    pub fn set_data(&mut self, row: usize, column: usize, edit: CellEdit) -> RatResult<()> {
        if self.is_color_column(column) {
            let CellEdit::Color(color) = edit else {
                return Err(RatError::validation("The color column only accepts colors"));
            };
            if !self.table.set_color(row, color) {
                return Err(RatError::validation(format!(
                    "Could not set the color of row {}",
                    row
                )));
            }
            for index in self.table.color_field_indexes() {
                let column = self.model_column(index);
                self.listener.data_changed(row, column);
            }
            return Ok(());
        }

        let Some((_, field)) = self.field_at(column) else {
            return Err(RatError::validation(format!(
                "Column {} is out of range",
                column
            )));
        };
        let name = field.name().to_string();
        let CellEdit::Value(value) = edit else {
            return Err(RatError::validation(format!(
                "Column '{}' only accepts values",
                name
            )));
        };
        self.table.set_value(&name, row, value)?;
        self.listener.data_changed(row, column);
        Ok(())
    }

    fn schema_insert_index(&self, column: usize) -> usize {
        column.saturating_sub(self.color_offset())
    }

    /// Insert `field` so that it shows at model `column`.
    pub fn insert_column(&mut self, column: usize, field: RatField) -> RatResult<()> {
        let index = self.schema_insert_index(column);
        self.table.validate_insert_column(index, &field)?;

        // A channel may complete the color set, which adds the color column.
        let resets = field.is_color();
        if resets {
            self.listener.begin_reset();
        } else {
            self.listener.begin_insert_columns(column, column);
        }
        let result = self.table.insert_column(index, field);
        if resets {
            self.listener.end_reset();
        } else {
            self.listener.end_insert_columns();
        }
        result
    }

    /// Remove the field shown at model `column`.
    pub fn remove_column(&mut self, column: usize) -> RatResult<()> {
        if self.is_color_column(column) {
            return Err(RatError::validation(
                "The color column is virtual: remove the color instead",
            ));
        }
        let Some((_, field)) = self.field_at(column) else {
            return Err(RatError::validation(format!(
                "Column {} is out of range",
                column
            )));
        };
        let name = field.name().to_string();
        let resets = field.is_color();
        self.table.validate_remove_column(&name)?;

        if resets {
            self.listener.begin_reset();
        } else {
            self.listener.begin_remove_columns(column, column);
        }
        let result = self.table.remove_column(&name);
        if resets {
            self.listener.end_reset();
        } else {
            self.listener.end_remove_columns();
        }
        result
    }

    /// Insert a default-valued row before `row`.
    pub fn insert_row(&mut self, row: usize) -> RatResult<()> {
        if self.table.fields().is_empty() || row > self.row_count() {
            return Err(RatError::validation(format!(
                "Row index {} is out of range (0-{})",
                row,
                self.row_count()
            )));
        }
        self.listener.begin_insert_rows(row, row);
        let result = self.table.insert_row(row);
        self.listener.end_insert_rows();
        result
    }

    /// Remove the row at `row`.
    pub fn remove_row(&mut self, row: usize) -> RatResult<()> {
        if row >= self.row_count() {
            return Err(RatError::validation(format!(
                "Row index {} is out of range",
                row
            )));
        }
        self.listener.begin_remove_rows(row, row);
        let result = self.table.remove_row(row);
        self.listener.end_remove_rows();
        result
    }

    /// Add RGBA fields so that they start at model `column`.
    pub fn insert_color(&mut self, column: usize) -> RatResult<()> {
        if self.has_color() {
            return Err(RatError::validation("The table already has color fields"));
        }
        let mut staged = self.table.clone();
        if let Err(e) = staged.insert_color_fields(self.schema_insert_index(column)) {
            log::warn!("Error inserting color columns: {}", e);
            return Err(e);
        }

        self.listener.begin_reset();
        *self.table = staged;
        self.listener.end_reset();
        Ok(())
    }

    /// Remove every color field. Returns false when there was no color.
    pub fn remove_color(&mut self) -> bool {
        if !self.has_color() {
            return false;
        }
        self.listener.begin_reset();
        let removed = self.table.remove_color_fields();
        self.listener.end_reset();
        removed
    }
}
