//! Source line numbers.

use std::fmt;
use std::num::NonZeroUsize;

/// A 1-based line in the markdown source.
///
/// Zero is unrepresentable, so any `SourceLine` that reaches the line index
/// is already a valid key.
///
/// ```
/// use marksync::SourceLine;
///
/// assert!(SourceLine::new(0).is_none());
/// assert_eq!(SourceLine::new(7).map(SourceLine::get), Some(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLine(NonZeroUsize);

impl SourceLine {
    /// The first line of a document.
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// Create a line number, rejecting zero.
    pub const fn new(line: usize) -> Option<Self> {
        match NonZeroUsize::new(line) {
            Some(line) => Some(Self(line)),
            None => None,
        }
    }

    /// Create a line number from a signed value, rejecting zero and negatives.
    pub fn from_signed(line: i64) -> Option<Self> {
        usize::try_from(line).ok().and_then(Self::new)
    }

    /// The 1-based line value.
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
