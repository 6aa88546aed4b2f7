//! Field descriptors: the name, usage role and storage type of a RAT column.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Semantic role of a RAT column.
///
/// The numeric codes match the GDAL field usage enumeration and are what the
/// PAM XML format stores in `<Usage>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldUsage {
    /// General purpose field
    Generic,
    /// Histogram pixel count
    PixelCount,
    /// Class name
    Name,
    /// Class range minimum
    Min,
    /// Class range maximum
    Max,
    /// Class value (min = max)
    MinMax,
    /// Red class color
    Red,
    /// Green class color
    Green,
    /// Blue class color
    Blue,
    /// Alpha class color
    Alpha,
    /// Red class range minimum color
    RedMin,
    /// Green class range minimum color
    GreenMin,
    /// Blue class range minimum color
    BlueMin,
    /// Alpha class range minimum color
    AlphaMin,
    /// Red class range maximum color
    RedMax,
    /// Green class range maximum color
    GreenMax,
    /// Blue class range maximum color
    BlueMax,
    /// Alpha class range maximum color
    AlphaMax,
}

impl FieldUsage {
    /// All usages in code order.
    pub const ALL: [FieldUsage; 18] = [
        FieldUsage::Generic,
        FieldUsage::PixelCount,
        FieldUsage::Name,
        FieldUsage::Min,
        FieldUsage::Max,
        FieldUsage::MinMax,
        FieldUsage::Red,
        FieldUsage::Green,
        FieldUsage::Blue,
        FieldUsage::Alpha,
        FieldUsage::RedMin,
        FieldUsage::GreenMin,
        FieldUsage::BlueMin,
        FieldUsage::AlphaMin,
        FieldUsage::RedMax,
        FieldUsage::GreenMax,
        FieldUsage::BlueMax,
        FieldUsage::AlphaMax,
    ];

    /// Numeric usage code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Usage for a numeric code, if known.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Whether the field holds a color channel (min/max variants included).
    pub fn is_color(self) -> bool {
        matches!(
            self,
            FieldUsage::Red
                | FieldUsage::Green
                | FieldUsage::Blue
                | FieldUsage::Alpha
                | FieldUsage::RedMin
                | FieldUsage::GreenMin
                | FieldUsage::BlueMin
                | FieldUsage::AlphaMin
                | FieldUsage::RedMax
                | FieldUsage::GreenMax
                | FieldUsage::BlueMax
                | FieldUsage::AlphaMax
        )
    }

    /// Whether at most one field of a table may carry this usage.
    pub fn is_singleton(self) -> bool {
        self != FieldUsage::Generic
    }

    /// Whether the field holds the class value or one end of its range.
    pub fn is_value(self) -> bool {
        matches!(self, FieldUsage::MinMax | FieldUsage::Min | FieldUsage::Max)
    }

    /// Whether the field belongs to the mandatory value/count block.
    pub fn is_mandatory(self) -> bool {
        self.is_value() || self == FieldUsage::PixelCount
    }

    /// Short display name of the usage.
    pub fn name(self) -> &'static str {
        match self {
            FieldUsage::Generic => "Generic",
            FieldUsage::PixelCount => "Pixel Count",
            FieldUsage::Name => "Name",
            FieldUsage::Min => "Min",
            FieldUsage::Max => "Max",
            FieldUsage::MinMax => "Min Max",
            FieldUsage::Red => "Red",
            FieldUsage::Green => "Green",
            FieldUsage::Blue => "Blue",
            FieldUsage::Alpha => "Alpha",
            FieldUsage::RedMin => "Red Min",
            FieldUsage::GreenMin => "Green Min",
            FieldUsage::BlueMin => "Blue Min",
            FieldUsage::AlphaMin => "Alpha Min",
            FieldUsage::RedMax => "Red Max",
            FieldUsage::GreenMax => "Green Max",
            FieldUsage::BlueMax => "Blue Max",
            FieldUsage::AlphaMax => "Alpha Max",
        }
    }

    /// Longer description, shown in header tooltips.
    pub fn description(self) -> &'static str {
        match self {
            FieldUsage::Generic => "General purpose field",
            FieldUsage::PixelCount => "Histogram pixel count",
            FieldUsage::Name => "Class name",
            FieldUsage::Min => "Class range minimum",
            FieldUsage::Max => "Class range maximum",
            FieldUsage::MinMax => "Class value (min=max)",
            FieldUsage::Red => "Red class color (0-255)",
            FieldUsage::Green => "Green class color (0-255)",
            FieldUsage::Blue => "Blue class color (0-255)",
            FieldUsage::Alpha => "Alpha (0=transparent, 255=opaque)",
            FieldUsage::RedMin => "Color range red minimum",
            FieldUsage::GreenMin => "Color range green minimum",
            FieldUsage::BlueMin => "Color range blue minimum",
            FieldUsage::AlphaMin => "Color range alpha minimum",
            FieldUsage::RedMax => "Color range red maximum",
            FieldUsage::GreenMax => "Color range green maximum",
            FieldUsage::BlueMax => "Color range blue maximum",
            FieldUsage::AlphaMax => "Color range alpha maximum",
        }
    }
}

impl fmt::Display for FieldUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage type of a RAT column.
///
/// Codes match the GDAL field type enumeration stored in `<Type>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed integer
    Integer,
    /// Floating point
    Real,
    /// Text
    String,
}

impl FieldType {
    /// Numeric type code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Type for a numeric code, if known.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(FieldType::Integer),
            1 => Some(FieldType::Real),
            2 => Some(FieldType::String),
            _ => None,
        }
    }

    /// Display-friendly type name.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldType::Integer => "Integer",
            FieldType::Real => "Floating point",
            FieldType::String => "String",
        }
    }

    /// Whether values of this type are numbers.
    pub fn is_numeric(self) -> bool {
        self != FieldType::String
    }
}

/// Descriptor of one RAT column.
///
/// Descriptors are immutable: to change the role or type of a column remove
/// it and insert a new one. Two descriptors are equal when their names are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatField {
    name: String,
    usage: FieldUsage,
    field_type: FieldType,
}

impl RatField {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, usage: FieldUsage, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            usage,
            field_type,
        }
    }

    /// Field name, unique within a table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usage role.
    pub fn usage(&self) -> FieldUsage {
        self.usage
    }

    /// Storage type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Whether the field holds a color channel.
    pub fn is_color(&self) -> bool {
        self.usage.is_color()
    }
}

impl PartialEq for RatField {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RatField {}

impl Hash for RatField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
