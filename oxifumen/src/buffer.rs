//! Mixed-radix digit buffer over the fumen base-64 alphabet.
//!
//! The buffer is a FIFO queue of base-64 digits: `poll` drains fixed-width
//! values from the front, `push` appends them to the back, least significant
//! digit first. Every layer of the format reads from and writes onto this
//! queue.

use std::collections::VecDeque;

use crate::error::{FumenError, Result};

/// The 64-symbol digit alphabet, index = digit value.
pub const ENCODE_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Radix of the digit alphabet.
pub const TABLE_LENGTH: u32 = 64;

fn digit_of(c: char) -> Result<u8> {
    match c {
        'A'..='Z' => Ok(c as u8 - b'A'),
        'a'..='z' => Ok(c as u8 - b'a' + 26),
        '0'..='9' => Ok(c as u8 - b'0' + 52),
        '+' => Ok(62),
        '/' => Ok(63),
        _ => Err(FumenError::invalid_character(c, "base64")),
    }
}

/// FIFO queue of base-64 digits backing the fumen wire string.
#[derive(Debug, Clone, Default)]
pub struct FumenBuffer {
    digits: VecDeque<u8>,
}

impl FumenBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a payload string into a digit queue.
    ///
    /// Fails on any character outside the 64-symbol alphabet.
    pub fn from_payload(data: &str) -> Result<Self> {
        let digits = data.chars().map(digit_of).collect::<Result<VecDeque<u8>>>()?;
        Ok(Self { digits })
    }

    /// Number of digits currently buffered.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Whether the buffer holds no digits.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Remove the first `n` digits and combine them into one value,
    /// first-removed digit least significant.
    pub fn poll(&mut self, n: usize) -> Result<u32> {
        if self.digits.len() < n {
            return Err(FumenError::unexpected_eof(n, self.digits.len()));
        }
        let mut value = 0u32;
        for weight in 0..n {
            let digit = u32::from(self.digits.pop_front().unwrap_or_default());
            value += digit * TABLE_LENGTH.pow(weight as u32);
        }
        Ok(value)
    }

    /// Append exactly `n` digits encoding `value`, least significant first.
    ///
    /// `value` must fit in `n` base-64 digits; any high-order remainder is
    /// silently lost, matching the fixed-width wire fields. Callers
    /// range-check before pushing.
    pub fn push(&mut self, value: u32, n: usize) {
        let mut value = value;
        for _ in 0..n {
            self.digits.push_back((value % TABLE_LENGTH) as u8);
            value /= TABLE_LENGTH;
        }
    }

    /// Read one raw digit by position, for in-place patching.
    pub fn digit(&self, index: usize) -> Option<u8> {
        self.digits.get(index).copied()
    }

    /// Overwrite one raw digit by position. Out-of-range indices are ignored.
    pub fn set_digit(&mut self, index: usize, value: u8) {
        if let Some(slot) = self.digits.get_mut(index) {
            *slot = value % TABLE_LENGTH as u8;
        }
    }

    /// Drain every digit out of `other` onto the back of this buffer.
    pub fn append(&mut self, other: &mut FumenBuffer) {
        self.digits.append(&mut other.digits);
    }

    /// Render the buffered digits back through the alphabet, in queue order.
    pub fn to_payload(&self) -> String {
        self.digits
            .iter()
            .map(|&d| ENCODE_TABLE[d as usize] as char)
            .collect()
    }
}
