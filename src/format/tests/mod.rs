//! Unit tests for the persisted table formats.
//!
//! These cover parsing of hand-built files, the exact layout of written
//! files and round trips through a raster's sidecar and auxiliary file.

mod roundtrip_tests;

use crate::table::RatTable;

/// Assert that two tables have the same schema (name, usage and type of
/// every field) and the same data.
pub(super) fn assert_same_table(actual: &RatTable, expected: &RatTable) {
    assert_eq!(actual.field_count(), expected.field_count());
    for (a, e) in actual.fields().iter().zip(expected.fields()) {
        assert_eq!(a.name(), e.name());
        assert_eq!(a.usage(), e.usage(), "usage of '{}'", e.name());
        assert_eq!(a.field_type(), e.field_type(), "type of '{}'", e.name());
    }
    assert_eq!(actual.columns(), expected.columns());
}
