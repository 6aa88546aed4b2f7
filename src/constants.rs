//! Global constants for raster attribute tables

/// Header of the virtual color column synthesized from the RGB(A) fields
pub const RAT_COLOR_HEADER_NAME: &str = "RAT Color";

/// Raster custom property holding the column last used to classify
pub const RAT_CUSTOM_PROPERTY_CLASSIFICATION_CRITERIA: &str = "classification_criteria";

/// Suffix appended to the raster file name to locate the dBase sidecar
pub const DBF_SIDECAR_SUFFIX: &str = ".vat.dbf";

/// Suffix appended to the raster file name to locate the PAM auxiliary file
pub const AUX_XML_SUFFIX: &str = ".aux.xml";

/// Names given to the fields created by `insert_color_fields`
pub const COLOR_FIELD_NAMES: [&str; 4] = ["R", "G", "B", "A"];

/// Default dBase column names recognized as red, green and blue
pub const DEFAULT_RGB_FIELD_NAMES: [&str; 3] = ["R", "G", "B"];

/// Alternate dBase column names recognized as red, green and blue
pub const ALTERNATE_RGB_FIELD_NAMES: [&str; 3] = ["RED", "GREEN", "BLUE"];

/// dBase column names recognized as alpha
pub const ALPHA_FIELD_NAMES: [&str; 2] = ["A", "ALPHA"];

/// dBase column recognized as the class value
pub const DBF_VALUE_FIELD: &str = "VALUE";

/// dBase column recognized as the pixel count
pub const DBF_COUNT_FIELD: &str = "COUNT";

/// Maximum length of a dBase field name
pub const DBF_MAX_FIELD_NAME_LEN: usize = 10;
