//! The page record: one frame of the encoded sequence.

use crate::field::Field;
use crate::piece::Operation;

/// Display flags carried by every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// The operation locks into the field when the page advances.
    pub lock: bool,
    /// The field mirrors after locking.
    pub mirror: bool,
    /// Guideline coloring is enabled.
    pub colorize: bool,
    /// Garbage rises after locking.
    pub rise: bool,
    /// The page's effective comment is quiz notation.
    pub quiz: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            lock: true,
            mirror: false,
            colorize: true,
            rise: false,
            quiz: false,
        }
    }
}

/// Backward indices into the page sequence, pointing at the most recent
/// earlier page that fully specifies a value. Absent when the page defines
/// the value itself; page 0 anchors both at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Refs {
    /// Index of the page defining the field.
    pub field: Option<usize>,
    /// Index of the page defining the comment.
    pub comment: Option<usize>,
}

/// One frame: a board snapshot, a piece placement, display flags, and an
/// optional comment. Field snapshots are independent copies; the only
/// sharing mechanism is the index-based [`Refs`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// The board before this page's operation applies; `None` reuses the
    /// running field from the previous page.
    pub field: Option<Field>,
    /// The piece placed on this page, if any.
    pub operation: Option<Operation>,
    /// The comment; `None` derives it from the running quiz/previous page.
    pub comment: Option<String>,
    /// Display flags; `None` encodes as the defaults.
    pub flags: Option<Flags>,
    /// Back-references resolved during decode.
    pub refs: Refs,
}

impl Page {
    /// The flags this page encodes with.
    pub fn effective_flags(&self) -> Flags {
        self.flags.unwrap_or_default()
    }
}
