use derive_more::Display;

/// Unstructured TLE, one object's name line and its two element lines
/// https://en.wikipedia.org/wiki/Two-line_element_set
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(fmt = "{}", "name")]
pub struct UnstructuredTle {
    /// The raw name line, untrimmed
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl UnstructuredTle {
    pub const ELEMENT_LINE_LEN: usize = 69;

    /// Returns true if both element lines have the fixed TLE width
    pub fn has_fixed_width_lines(&self) -> bool {
        self.line1.len() == Self::ELEMENT_LINE_LEN && self.line2.len() == Self::ELEMENT_LINE_LEN
    }
}
