//! Decode orchestration: version resolution plus the sequential page fold.
//!
//! Decoding is one forward pass. Each iteration pulls a field delta, an
//! action value, and optionally a comment, threading the cross-page
//! accumulators (running field, running quiz, previous lock and piece,
//! last defining indices) from left to right. Back-references only point
//! backward, so the fold never revisits a page.

use crate::action::{ACTION_WIDTH, decode_action};
use crate::buffer::FumenBuffer;
use crate::comment;
use crate::error::{FumenError, Result};
use crate::field::{Field, FieldConsts};
use crate::page::{Flags, Page, Refs};
use crate::piece::Mino;
use crate::quiz::Quiz;

/// Locate the version marker and strip the wire dressing.
///
/// Markers are one of `{v,m,d}` x `{115,110}`, checked 115 first; the
/// payload is everything after the 5-character `Xnnn@` marker, with any
/// `&...` suffix dropped and interleaved `?` characters removed.
pub fn resolve_payload(raw: &str) -> Result<(FieldConsts, String)> {
    let head = raw.split('&').next().unwrap_or_default();
    for (version, consts) in [("115", FieldConsts::V115), ("110", FieldConsts::V110)] {
        for prefix in ['v', 'm', 'd'] {
            let marker = format!("{prefix}{version}");
            if let Some(pos) = head.find(&marker) {
                let payload = head
                    .get(pos + marker.len() + 1..)
                    .unwrap_or_default()
                    .trim()
                    .chars()
                    .filter(|&c| c != '?')
                    .collect();
                return Ok((consts, payload));
            }
        }
    }
    Err(FumenError::UnsupportedVersion)
}

/// Decode a fumen string into its ordered page sequence.
pub fn decode(input: &str) -> Result<Vec<Page>> {
    let (consts, payload) = resolve_payload(input)?;
    let buffer = FumenBuffer::from_payload(&payload)?;
    let mut decoder = Decoder::new(consts, buffer);

    // A trailing repeat counter may still owe unchanged pages when the
    // stream runs out of actions; the surplus is dropped, not rejected.
    while !decoder.buffer.is_empty() {
        let index = decoder.pages.len();
        decoder.next_page().map_err(|e| e.at_page(index))?;
    }

    if decoder.pages.is_empty() {
        // An empty payload is the degenerate single-page fumen.
        decoder.pages.push(Page {
            field: Some(Field::empty(consts)),
            operation: None,
            comment: Some(String::new()),
            flags: Some(Flags {
                lock: false,
                mirror: false,
                colorize: false,
                rise: false,
                quiz: false,
            }),
            refs: Refs {
                field: Some(0),
                comment: Some(0),
            },
        });
    }

    Ok(decoder.pages)
}

/// The left-to-right fold state of one decode pass.
struct Decoder {
    buffer: FumenBuffer,
    consts: FieldConsts,
    /// Running field: the previous page's snapshot with its action applied.
    field: Field,
    /// Unchanged-field pages still owed by the last repeat counter.
    repeat_left: u32,
    /// Quiz state implied by the previous page's effective comment.
    quiz: Option<Quiz>,
    prev_lock: bool,
    prev_mino: Mino,
    /// Most recent page index that defined the field.
    field_ref: usize,
    /// Most recent page index with an explicit comment.
    comment_ref: usize,
    pages: Vec<Page>,
}

impl Decoder {
    fn new(consts: FieldConsts, buffer: FumenBuffer) -> Self {
        Self {
            buffer,
            consts,
            field: Field::empty(consts),
            repeat_left: 0,
            quiz: None,
            prev_lock: false,
            prev_mino: Mino::Empty,
            field_ref: 0,
            comment_ref: 0,
            pages: Vec::new(),
        }
    }

    /// Apply one field delta onto the running field. Returns whether the
    /// delta modified anything.
    fn read_field(&mut self) -> Result<bool> {
        if self.repeat_left > 0 {
            self.repeat_left -= 1;
            return Ok(false);
        }

        let total = self.consts.total_blocks();
        let mut modified = false;
        let mut index = 0;
        while index < total {
            let value = self.buffer.poll(2)? as usize;
            let diff = (value / total) as i32;
            let run = value % total + 1;
            if index + run > total {
                return Err(FumenError::FieldRunOverflow { run, total });
            }
            if diff != 8 {
                modified = true;
                for i in index..index + run {
                    let (x, y) = self.consts.cell_position(i);
                    let raw = self.field.at(x, y).to_wire() as i32 + diff - 8;
                    let mino = u32::try_from(raw)
                        .ok()
                        .and_then(Mino::from_wire)
                        .ok_or(FumenError::InvalidCellValue { value: raw })?;
                    self.field.fill(x, y, mino);
                }
            }
            index += run;
        }

        if !modified {
            self.repeat_left = self.buffer.poll(1)?;
        }
        Ok(modified)
    }

    /// Read one explicit comment payload and unescape it.
    fn read_comment(&mut self) -> Result<String> {
        let length = self.buffer.poll(comment::LENGTH_WIDTH)? as usize;
        let mut values = Vec::with_capacity(length.div_ceil(comment::CHARS_PER_GROUP));
        for _ in 0..length.div_ceil(comment::CHARS_PER_GROUP) {
            values.push(self.buffer.poll(comment::GROUP_WIDTH)?);
        }
        Ok(comment::unescape(&comment::decode(&values, length)?))
    }

    /// Decode one page and fold it into the accumulator state.
    fn next_page(&mut self) -> Result<()> {
        let modified = self.read_field()?;
        let action = decode_action(self.buffer.poll(ACTION_WIDTH)?, self.consts)?;

        // Advance the quiz for the piece the previous page locked.
        if self.prev_lock && self.prev_mino.is_piece() {
            if let Some(quiz) = self.quiz.take() {
                self.quiz = Some(quiz.step(self.prev_mino)?);
            }
        }

        let index = self.pages.len();
        let comment = if action.comment {
            let text = self.read_comment()?;
            self.quiz = Quiz::parse(&text).ok();
            Some(text)
        } else if index == 0 {
            Some(String::new())
        } else {
            self.quiz.as_ref().map(Quiz::to_string)
        };

        let operation = action.operation.mino.is_piece().then_some(action.operation);
        let refs = if index == 0 {
            Refs {
                field: Some(0),
                comment: Some(0),
            }
        } else {
            Refs {
                field: (!modified).then_some(self.field_ref),
                comment: (!action.comment).then_some(self.comment_ref),
            }
        };

        self.pages.push(Page {
            field: Some(self.field.clone()),
            operation,
            comment,
            flags: Some(Flags {
                lock: action.lock,
                mirror: action.mirror,
                colorize: action.colorize,
                rise: action.rise,
                quiz: self.quiz.is_some(),
            }),
            refs,
        });

        // Seed the next iteration's running field. The wire is
        // authoritative about occupancy, so the lock is forced, but the
        // operation still has to fit the grid.
        if action.lock {
            if let Some(op) = &operation {
                if !op.is_inside(self.consts) {
                    return Err(FumenError::Unplaceable { x: op.x, y: op.y });
                }
            }
            self.field.lock(operation.as_ref(), true)?;
            self.field.clear_line();
            if action.rise {
                self.field.rise();
            }
            if action.mirror {
                self.field.mirror(false);
            }
        }

        if modified || index == 0 {
            self.field_ref = index;
        }
        if action.comment || index == 0 {
            self.comment_ref = index;
        }
        self.prev_lock = action.lock;
        self.prev_mino = operation.map(|op| op.mino).unwrap_or_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_payload_markers() {
        for marker in ["v115", "m115", "d115"] {
            let (consts, payload) = resolve_payload(&format!("{marker}@AbC")).unwrap();
            assert_eq!(consts, FieldConsts::V115);
            assert_eq!(payload, "AbC");
        }
        let (consts, _) = resolve_payload("v110@xyz").unwrap();
        assert_eq!(consts, FieldConsts::V110);
    }

    #[test]
    fn test_resolve_payload_strips_dressing() {
        let (_, payload) = resolve_payload("https://fumen.example/?v115@ab?cd&m=1").unwrap();
        assert_eq!(payload, "abcd");
    }

    #[test]
    fn test_resolve_payload_rejects_unmarked() {
        assert!(matches!(
            resolve_payload("hello world"),
            Err(FumenError::UnsupportedVersion)
        ));
    }

    #[test]
    fn test_decode_truncated_payload() {
        // A field run but no action behind it.
        let err = decode("v115@vh").unwrap_err();
        assert!(matches!(err, FumenError::AtPage { page: 0, .. }));
    }

    #[test]
    fn test_decode_rejects_out_of_grid_lock() {
        // Parseable actions whose anchor correction pushes a locked cell
        // off the grid: S/Right at wire position 0 resolves to x = -1,
        // S/Spawn at position 230 reaches below the garbage row.
        for input in ["v115@vhAPAA", "v115@vhAXzB"] {
            match decode(input) {
                Err(FumenError::AtPage { page: 0, source }) => {
                    assert!(matches!(*source, FumenError::Unplaceable { .. }));
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_tolerates_overlong_repeat_counter() {
        // The counter promises two more unchanged pages but only one
        // action follows; the owed surplus is dropped.
        let pages = decode("v115@vhCAgHAgH").unwrap();
        assert_eq!(pages.len(), 2);
    }
}
