//! The "quiz" upcoming-piece notation embedded in comments.
//!
//! A quiz comment `#Q=[H](A)N1N2...;free_text` declares a hold slot, an
//! active piece, and the upcoming queue. The declaration is a claim about
//! future pieces: [`Quiz::step`] advances it for each placement and rejects
//! any placement the declared queue could not have produced.

use std::fmt;

use crate::error::{FumenError, Result};
use crate::piece::Mino;

const QUIZ_PREFIX: &str = "#Q=[";

/// Parsed quiz state: hold, active piece, declared queue, free-text tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    hold: Option<Mino>,
    active: Option<Mino>,
    queue: Vec<Mino>,
    trailing: String,
}

fn quiz_piece(c: char) -> Option<Mino> {
    Mino::from_name(c).filter(|m| m.is_piece())
}

impl Quiz {
    /// Whether a comment matches the quiz grammar at all. Non-matching
    /// comments are opaque free text.
    pub fn is_quiz_comment(comment: &str) -> bool {
        Self::parse(comment).is_ok()
    }

    /// Parse a quiz comment, or fail with a quiz error.
    pub fn parse(comment: &str) -> Result<Self> {
        let invalid = || FumenError::InvalidQuizComment {
            comment: comment.to_string(),
        };

        let rest = comment.strip_prefix(QUIZ_PREFIX).ok_or_else(invalid)?;
        let (hold, rest) = Self::take_slot(rest, ']').ok_or_else(invalid)?;
        let rest = rest.strip_prefix('(').ok_or_else(invalid)?;
        let (active, rest) = Self::take_slot(rest, ')').ok_or_else(invalid)?;

        let mut queue = Vec::new();
        let mut chars = rest.char_indices();
        let trailing = loop {
            match chars.next() {
                None => break String::new(),
                Some((i, ';')) => break rest[i + 1..].to_string(),
                Some((_, c)) => queue.push(quiz_piece(c).ok_or_else(invalid)?),
            }
        };

        Ok(Self {
            hold,
            active,
            queue,
            trailing,
        })
    }

    /// Read one optional-piece slot terminated by `close`.
    fn take_slot(text: &str, close: char) -> Option<(Option<Mino>, &str)> {
        if let Some(rest) = text.strip_prefix(close) {
            return Some((None, rest));
        }
        let mut chars = text.chars();
        let piece = quiz_piece(chars.next()?)?;
        let rest = chars.as_str().strip_prefix(close)?;
        Some((Some(piece), rest))
    }

    /// The hold slot, if declared.
    pub fn hold(&self) -> Option<Mino> {
        self.hold
    }

    /// The active piece, if not elided.
    pub fn active(&self) -> Option<Mino> {
        self.active
    }

    /// The declared upcoming queue.
    pub fn queue(&self) -> &[Mino] {
        &self.queue
    }

    /// The free text after the queue.
    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    fn mismatch(&self, used: Mino) -> FumenError {
        FumenError::QuizMismatch {
            used: used.name(),
            quiz: self.to_string(),
        }
    }

    /// The successor state after placing `used`.
    ///
    /// Placement order is reconstructed deterministically: place the active
    /// piece, or swap in the held piece, or consume the queue head when the
    /// active slot is elided (stocking it into an empty hold). Anything
    /// else is inconsistent with the declared queue.
    pub fn step(&self, used: Mino) -> Result<Quiz> {
        let advanced = |hold: Option<Mino>| Self {
            hold,
            active: self.queue.first().copied(),
            queue: self.queue.get(1..).unwrap_or_default().to_vec(),
            trailing: self.trailing.clone(),
        };
        let consumed_head = |hold: Option<Mino>| Self {
            hold,
            active: self.queue.get(1).copied(),
            queue: self.queue.get(2..).unwrap_or_default().to_vec(),
            trailing: self.trailing.clone(),
        };

        if self.active == Some(used) {
            return Ok(advanced(self.hold));
        }
        match self.hold {
            Some(hold) => {
                if used == hold {
                    Ok(advanced(self.hold))
                } else if self.active.is_none() && self.queue.first() == Some(&used) {
                    Ok(consumed_head(self.hold))
                } else {
                    Err(self.mismatch(used))
                }
            }
            None => {
                if self.active.is_none() && self.queue.first() == Some(&used) {
                    Ok(consumed_head(Some(used)))
                } else {
                    Err(self.mismatch(used))
                }
            }
        }
    }
}

impl fmt::Display for Quiz {
    /// Canonical rendering; empty slots render empty, the trailing segment
    /// is omitted when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#Q=[")?;
        if let Some(hold) = self.hold {
            write!(f, "{}", hold.name())?;
        }
        write!(f, "](")?;
        if let Some(active) = self.active {
            write!(f, "{}", active.name())?;
        }
        write!(f, ")")?;
        for piece in &self.queue {
            write!(f, "{}", piece.name())?;
        }
        if !self.trailing.is_empty() {
            write!(f, ";{}", self.trailing)?;
        }
        Ok(())
    }
}
