pub use crate::parser::{parse_tle_set, ParseError, ParseErrorExt};
pub use crate::tle_set::{MalformedGroup, MalformedReason, TleSet};

pub mod parser;
pub mod tle_set;

pub const LINE1_TAG: char = '1';
pub const LINE2_TAG: char = '2';

/// Shortest line still treated as an element line. Full lines are 69 chars,
/// some sources drop the trailing checksum and padding.
pub const MIN_ELEMENT_LINE_LEN: usize = 64;

/// Width of the catalog number field following the line tag
pub const CATALOG_FIELD_LEN: usize = 5;
