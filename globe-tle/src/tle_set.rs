pub use globe_types::prelude::UnstructuredTle;
use std::fmt;

/// The groups found in a raw TLE text blob, in input order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TleSet {
    pub entries: Vec<UnstructuredTle>,
    pub malformed: Vec<MalformedGroup>,
}

impl TleSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A group that can't be turned into an [`UnstructuredTle`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedGroup {
    /// Raw name line, if the group had one
    pub name: Option<String>,
    pub reason: MalformedReason,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// Element lines with no name line in front of them
    MissingName,
    /// Anything other than exactly two element lines
    WrongLineCount(usize),
    /// Line 2 before line 1, or two of the same
    LineOrder,
    /// Line 1 and line 2 describe different catalog numbers
    CatalogMismatch,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingName => f.write_str("element lines without a name line"),
            MalformedReason::WrongLineCount(n) => write!(f, "expected 2 element lines, found {n}"),
            MalformedReason::LineOrder => f.write_str("element lines out of order"),
            MalformedReason::CatalogMismatch => f.write_str("catalog numbers differ between lines"),
        }
    }
}
