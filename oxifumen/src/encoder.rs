//! Encode orchestration: the mirror of the decode fold.
//!
//! Walks the page sequence once, deriving the same quiz-implied comments
//! the decoder would, and appends field deltas, packed actions, and
//! explicit comment payloads to the output buffer. Field data is staged in
//! a pending buffer and compacted ahead of each page's trailing metadata
//! (`move_field_buffer`), which also lets a run of unchanged fields
//! collapse into one repeat counter patched in place.

use crate::action::{ACTION_WIDTH, Action, encode_action};
use crate::buffer::{FumenBuffer, TABLE_LENGTH};
use crate::comment;
use crate::error::{FumenError, Result};
use crate::field::{Field, FieldConsts};
use crate::page::Page;
use crate::piece::Mino;
use crate::quiz::Quiz;

/// Payload characters between the `?` separators of the emitted string.
const DRESS_INTERVAL: usize = 47;

/// Encode a page sequence into a fumen string (always v115).
pub fn encode(pages: &[Page]) -> Result<String> {
    let consts = FieldConsts::V115;
    let mut writer = Writer::new(consts);
    let mut prev_comment = String::new();
    let mut prev_lock = false;
    let mut prev_mino = Mino::Empty;

    for (index, page) in pages.iter().enumerate() {
        let flags = page.effective_flags();
        let operation = page.operation.filter(|op| op.mino.is_piece());
        if let Some(op) = &operation {
            if !op.is_inside(consts) {
                return Err(FumenError::Unplaceable { x: op.x, y: op.y }.at_page(index));
            }
        }
        let current = match &page.field {
            Some(field) if field.consts() != consts => field.resized(consts),
            Some(field) => field.clone(),
            None => writer.running.clone(),
        };

        // The comment the decoder would derive on its own for this page.
        let implied = implied_comment(&prev_comment, prev_lock, prev_mino)
            .map_err(|e| e.at_page(index))?;
        let effective = page.comment.clone().unwrap_or_else(|| implied.clone());
        let explicit = page.comment.is_some()
            && !comment::escaped_eq(&effective, &implied, comment::MAX_COMMENT_LENGTH);

        let action = Action {
            operation: operation.unwrap_or(Action::no_operation(consts).operation),
            rise: flags.rise,
            mirror: flags.mirror,
            colorize: flags.colorize,
            comment: explicit,
            lock: flags.lock,
        };

        writer.write_field(&current);
        writer.write_action(&action);
        if explicit {
            writer.write_comment(&effective).map_err(|e| e.at_page(index))?;
        }
        writer
            .apply_action(current, &action)
            .map_err(|e| e.at_page(index))?;

        prev_comment = effective;
        prev_lock = flags.lock;
        prev_mino = operation.map(|op| op.mino).unwrap_or_default();
    }

    writer.move_field_buffer();
    Ok(format!("v115@{}", dress(&writer.buffer.to_payload())))
}

/// Derive the comment a page carries when it declares none: the previous
/// effective comment, advanced through the quiz when it was one.
fn implied_comment(prev_comment: &str, prev_lock: bool, prev_mino: Mino) -> Result<String> {
    if !Quiz::is_quiz_comment(prev_comment) {
        return Ok(prev_comment.to_string());
    }
    let mut quiz = Quiz::parse(prev_comment)?;
    if prev_lock && prev_mino.is_piece() {
        quiz = quiz.step(prev_mino)?;
    }
    Ok(quiz.to_string())
}

/// Insert a `?` after every 47 payload characters.
fn dress(payload: &str) -> String {
    payload
        .as_bytes()
        .chunks(DRESS_INTERVAL)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("?")
}

/// The write-side fold state.
struct Writer {
    consts: FieldConsts,
    /// Committed digits: field data, actions, comments of finished pages.
    buffer: FumenBuffer,
    /// Field delta staged for the current page.
    field_buffer: FumenBuffer,
    /// Offset in `field_buffer` of a freshly staged repeat digit.
    staged_repeat: Option<usize>,
    /// Committed-buffer index of the active repeat counter, if any.
    repeat_index: Option<usize>,
    /// The field the next page's delta diffs against.
    running: Field,
}

impl Writer {
    fn new(consts: FieldConsts) -> Self {
        Self {
            consts,
            buffer: FumenBuffer::new(),
            field_buffer: FumenBuffer::new(),
            staged_repeat: None,
            repeat_index: None,
            running: Field::empty(consts),
        }
    }

    /// Stage one page's field delta.
    ///
    /// An unchanged field extends the active repeat counter when one is
    /// live and below its ceiling; otherwise it stages the unchanged run
    /// followed by a fresh zero counter.
    fn write_field(&mut self, current: &Field) {
        let total = self.consts.total_blocks();
        let delta = |i: usize| {
            let (x, y) = self.consts.cell_position(i);
            current.at(x, y).to_wire() as i32 - self.running.at(x, y).to_wire() as i32 + 8
        };

        let mut changed = false;
        let mut index = 0;
        let mut runs = FumenBuffer::new();
        while index < total {
            let diff = delta(index);
            let mut run = 1;
            while index + run < total && delta(index + run) == diff {
                run += 1;
            }
            if diff != 8 {
                changed = true;
            }
            runs.push((diff as usize * total + run - 1) as u32, 2);
            index += run;
        }

        if changed {
            self.repeat_index = None;
            self.field_buffer.append(&mut runs);
            return;
        }

        let ceiling = TABLE_LENGTH as u8 - 1;
        match self.repeat_index {
            Some(at) if self.buffer.digit(at).unwrap_or(ceiling) < ceiling => {
                let count = self.buffer.digit(at).unwrap_or_default();
                self.buffer.set_digit(at, count + 1);
            }
            _ => {
                self.field_buffer.append(&mut runs);
                self.field_buffer.push(0, 1);
                self.staged_repeat = Some(self.field_buffer.len() - 1);
            }
        }
    }

    /// Compact staged field data into the committed buffer, so field data
    /// always precedes the page's trailing metadata.
    fn move_field_buffer(&mut self) {
        if let Some(offset) = self.staged_repeat.take() {
            self.repeat_index = Some(self.buffer.len() + offset);
        }
        self.buffer.append(&mut self.field_buffer);
    }

    fn write_action(&mut self, action: &Action) {
        self.move_field_buffer();
        self.buffer
            .push(encode_action(action, self.consts), ACTION_WIDTH);
    }

    /// Append an explicit comment payload: escaped length, then the
    /// 4-character groups.
    fn write_comment(&mut self, text: &str) -> Result<()> {
        let escaped = comment::escape_capped(text, comment::MAX_COMMENT_LENGTH);
        let (length, values) = comment::encode(&escaped)?;
        self.buffer.push(length as u32, comment::LENGTH_WIDTH);
        for value in values {
            self.buffer.push(value, comment::GROUP_WIDTH);
        }
        Ok(())
    }

    /// Advance the running field past this page, the same way the decoder
    /// seeds its next iteration.
    fn apply_action(&mut self, current: Field, action: &Action) -> Result<()> {
        self.running = current;
        if action.lock {
            let operation = action.operation.mino.is_piece().then_some(&action.operation);
            self.running.lock(operation, false)?;
            self.running.clear_line();
            if action.rise {
                self.running.rise();
            }
            if action.mirror {
                self.running.mirror(false);
            }
        }
        Ok(())
    }
}
