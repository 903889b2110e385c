//! # OxiFumen
//!
//! Pure Rust codec for the fumen interchange format: a compact ASCII string
//! encoding an ordered sequence of Tetris-style board snapshots ("pages"),
//! each with a piece placement, display flags, and an optional comment.
//!
//! The format is delta-encoded: pages reuse earlier pages' fields and
//! comments through backward indices instead of repeating data, comments may
//! carry a "quiz" upcoming-piece notation that later pages advance
//! implicitly, and all values ride a mixed-radix base-64 digit stream.
//! Supported wire versions: `v115` (and the `m`/`d` marker variants) and the
//! legacy `v110`; encoding always emits `v115`.
//!
//! ## Example
//!
//! ```rust
//! use oxifumen::{decode, encode};
//!
//! // The canonical single-page empty fumen.
//! let pages = decode("v115@vhAAgH").unwrap();
//! assert_eq!(pages.len(), 1);
//! assert!(pages[0].operation.is_none());
//! assert_eq!(pages[0].comment.as_deref(), Some(""));
//!
//! // Round-trip back to the identical string.
//! assert_eq!(encode(&pages).unwrap(), "v115@vhAAgH");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod action;
pub mod buffer;
pub mod comment;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod field;
pub mod page;
pub mod piece;
pub mod quiz;

// Re-exports
pub use decoder::{decode, resolve_payload};
pub use encoder::encode;
pub use error::{FumenError, Result};
pub use field::{Field, FieldConsts};
pub use page::{Flags, Page, Refs};
pub use piece::{Mino, Operation, Rotation};
pub use quiz::Quiz;
