//! Error types for fumen codec operations.
//!
//! Every error is fatal and synchronous: the wire format carries no
//! redundancy, so a single corrupted digit invalidates everything after it.
//! Variants fall into three groups: malformed wire data, geometrically
//! illegal placements, and quiz-notation inconsistencies.

use thiserror::Error;

/// The main error type for fumen codec operations.
#[derive(Debug, Error)]
pub enum FumenError {
    // --- malformed wire data ---
    /// No recognized version marker (`v115`, `m115`, `d115`, `v110`, ...).
    #[error("Unsupported fumen version in input")]
    UnsupportedVersion,

    /// A character outside the relevant alphabet.
    #[error("Invalid character {found:?} in {alphabet} alphabet")]
    InvalidCharacter {
        /// The offending character.
        found: char,
        /// Name of the alphabet that rejected it.
        alphabet: &'static str,
    },

    /// Buffer exhausted before a required read completed.
    #[error("Truncated fumen data: needed {needed} digits, {available} available")]
    UnexpectedEof {
        /// Number of digits the read required.
        needed: usize,
        /// Number of digits left in the buffer.
        available: usize,
    },

    /// A comment group decoded to a value outside the comment alphabet.
    #[error("Comment character index {index} outside the 95-symbol table")]
    InvalidCommentIndex {
        /// The out-of-range character index.
        index: u32,
    },

    /// A field delta produced a cell value outside the piece table.
    #[error("Field delta produced invalid cell value {value}")]
    InvalidCellValue {
        /// The out-of-range cell value.
        value: i32,
    },

    /// A field run-length extends past the end of the grid.
    #[error("Field run of {run} cells overflows the {total}-cell grid")]
    FieldRunOverflow {
        /// Cells the run claimed.
        run: usize,
        /// Cells the grid holds.
        total: usize,
    },

    // --- geometric illegality ---
    /// Locking onto an occupied or out-of-bounds cell without forcing.
    #[error("Cannot lock piece on field at ({x}, {y})")]
    Unplaceable {
        /// X position of the rejected operation.
        x: i32,
        /// Y position of the rejected operation.
        y: i32,
    },

    /// A drop found no legal landing row.
    #[error("Cannot drop piece on field from ({x}, {y})")]
    NoLanding {
        /// X position of the rejected operation.
        x: i32,
        /// Y position of the rejected operation.
        y: i32,
    },

    // --- quiz notation ---
    /// A comment failed the quiz grammar when quiz parsing was required.
    #[error("Not a quiz comment: {comment:?}")]
    InvalidQuizComment {
        /// The rejected comment text.
        comment: String,
    },

    /// A placement is inconsistent with the declared upcoming pieces.
    #[error("Piece {used} does not match the declared quiz {quiz:?}")]
    QuizMismatch {
        /// Name of the piece that was placed.
        used: char,
        /// The quiz state that rejected it.
        quiz: String,
    },

    /// A lower-level error, annotated with the page index being processed.
    #[error("Page {page}: {source}")]
    AtPage {
        /// Index of the failing page.
        page: usize,
        /// The underlying error.
        source: Box<FumenError>,
    },
}

/// Result type alias for fumen codec operations.
pub type Result<T> = std::result::Result<T, FumenError>;

impl FumenError {
    /// Create an invalid character error.
    pub fn invalid_character(found: char, alphabet: &'static str) -> Self {
        Self::InvalidCharacter { found, alphabet }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(needed: usize, available: usize) -> Self {
        Self::UnexpectedEof { needed, available }
    }

    /// Create an invalid comment index error.
    pub fn invalid_comment_index(index: u32) -> Self {
        Self::InvalidCommentIndex { index }
    }

    /// Annotate an error with the page index it occurred on.
    pub fn at_page(self, page: usize) -> Self {
        match self {
            Self::AtPage { .. } => self,
            other => Self::AtPage {
                page,
                source: Box::new(other),
            },
        }
    }
}
