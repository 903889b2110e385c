//! The two-region playfield grid and its geometric operations.
//!
//! A `Field` is a playfield of `height` rows above a small garbage region,
//! addressed by one signed row index: `0..height` is the playfield (0 =
//! bottom), `-1..=-garbage_height` is the garbage region (-1 closest to the
//! playfield). Every row holds exactly `width` cells at all times.

use crate::error::{FumenError, Result};
use crate::piece::{Mino, Operation};

/// Grid dimensions for one wire-format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConsts {
    /// Playfield columns.
    pub width: usize,
    /// Playfield rows.
    pub height: usize,
    /// Garbage rows below the playfield.
    pub garbage_height: usize,
}

impl FieldConsts {
    /// Dimensions for v115 fumens (the current format).
    pub const V115: Self = Self {
        width: 10,
        height: 23,
        garbage_height: 1,
    };

    /// Dimensions for legacy v110 fumens.
    pub const V110: Self = Self {
        width: 10,
        height: 21,
        garbage_height: 1,
    };

    /// Playfield plus garbage rows.
    pub fn total_height(self) -> usize {
        self.height + self.garbage_height
    }

    /// Total cell count across both regions.
    pub fn total_blocks(self) -> usize {
        self.total_height() * self.width
    }

    /// Map a wire cell index (top-left to bottom-right, playfield rows
    /// first, garbage rows last) to unified `(x, y)` addressing.
    pub fn cell_position(self, index: usize) -> (usize, i32) {
        let x = index % self.width;
        let row_from_top = index / self.width;
        let y = if row_from_top < self.height {
            self.height as i32 - 1 - row_from_top as i32
        } else {
            -((row_from_top - self.height) as i32) - 1
        };
        (x, y)
    }
}

/// A playfield-plus-garbage grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    consts: FieldConsts,
    /// Playfield rows, index 0 = bottom.
    field: Vec<Vec<Mino>>,
    /// Garbage rows, index 0 = row -1 (closest to the playfield).
    garbage: Vec<Vec<Mino>>,
}

impl Field {
    /// Create an all-empty field with the given dimensions.
    pub fn empty(consts: FieldConsts) -> Self {
        Self {
            consts,
            field: vec![vec![Mino::Empty; consts.width]; consts.height],
            garbage: vec![vec![Mino::Empty; consts.width]; consts.garbage_height],
        }
    }

    /// Build a v115 field from text renderings of the two regions.
    ///
    /// Rows are newline-separated, top row first, and may be shorter than
    /// the full dimensions; missing rows and cells are empty. `field` is
    /// bottom-aligned (its last line is playfield row 0); `garbage` starts
    /// at row -1.
    pub fn from_strings(field: &str, garbage: &str) -> Result<Self> {
        let mut result = Self::empty(FieldConsts::V115);
        let lines: Vec<&str> = if field.is_empty() {
            Vec::new()
        } else {
            field.lines().collect()
        };
        for (i, line) in lines.iter().rev().enumerate() {
            if i >= result.consts.height {
                break;
            }
            result.parse_row(line, i as i32)?;
        }
        for (i, line) in garbage.lines().enumerate() {
            if i >= result.consts.garbage_height {
                break;
            }
            result.parse_row(line, -1 - i as i32)?;
        }
        Ok(result)
    }

    fn parse_row(&mut self, line: &str, y: i32) -> Result<()> {
        for (x, c) in line.chars().take(self.consts.width).enumerate() {
            let mino =
                Mino::from_name(c).ok_or(FumenError::invalid_character(c, "field"))?;
            self.fill(x, y, mino);
        }
        Ok(())
    }

    /// The dimensions of this field.
    pub fn consts(&self) -> FieldConsts {
        self.consts
    }

    fn row(&self, y: i32) -> &[Mino] {
        if y >= 0 {
            &self.field[y as usize]
        } else {
            &self.garbage[(-y - 1) as usize]
        }
    }

    fn row_mut(&mut self, y: i32) -> &mut Vec<Mino> {
        if y >= 0 {
            &mut self.field[y as usize]
        } else {
            &mut self.garbage[(-y - 1) as usize]
        }
    }

    /// Read one cell by unified signed addressing.
    pub fn at(&self, x: usize, y: i32) -> Mino {
        self.row(y)[x]
    }

    /// Write one cell by unified signed addressing.
    pub fn fill(&mut self, x: usize, y: i32, mino: Mino) {
        self.row_mut(y)[x] = mino;
    }

    /// Whether the operation can occupy its cells: absent operations always
    /// can; present ones must be inside the grid and over empty cells only.
    pub fn is_placeable(&self, operation: Option<&Operation>) -> bool {
        let Some(op) = operation else { return true };
        op.is_inside(self.consts)
            && op
                .shape()
                .iter()
                .all(|&(x, y)| self.at(x as usize, y) == Mino::Empty)
    }

    /// Whether the operation rests on something: placeable here, but not
    /// one row further down.
    pub fn is_grounded(&self, operation: Option<&Operation>) -> bool {
        let Some(op) = operation else { return true };
        self.is_placeable(Some(op)) && !self.is_placeable(Some(&op.shifted(0, -1)))
    }

    /// Write the operation's piece into its cells.
    ///
    /// Unless `force` is set, the operation must be placeable.
    pub fn lock(&mut self, operation: Option<&Operation>, force: bool) -> Result<()> {
        let Some(op) = operation else { return Ok(()) };
        if !force && !self.is_placeable(Some(op)) {
            return Err(FumenError::Unplaceable { x: op.x, y: op.y });
        }
        for (x, y) in op.shape() {
            self.fill(x as usize, y, op.mino);
        }
        Ok(())
    }

    /// Hard-drop: the operation shifted straight down as far as it stays
    /// placeable. The descent stops at the playfield floor; the garbage
    /// region is not droppable space. Fails if even the starting position
    /// is not placeable.
    pub fn hard_drop(&self, operation: &Operation) -> Result<Operation> {
        if !self.is_placeable(Some(operation)) {
            return Err(FumenError::NoLanding {
                x: operation.x,
                y: operation.y,
            });
        }
        let mut landed = *operation;
        loop {
            let below = landed.shifted(0, -1);
            if below.shape().iter().any(|&(_, y)| y < 0) || !self.is_placeable(Some(&below)) {
                return Ok(landed);
            }
            landed = below;
        }
    }

    /// Garbage rises into the stack: playfield shifts up by the garbage
    /// height, the garbage rows become the new bottom playfield rows, and
    /// the garbage region is backfilled with empty rows.
    pub fn rise(&mut self) {
        let g = self.consts.garbage_height;
        for y in (g..self.consts.height).rev() {
            self.field[y] = self.field[y - g].clone();
        }
        // Unified order -g..0 maps the farthest garbage row to playfield row 0.
        for i in 0..g {
            self.field[i] = std::mem::replace(
                &mut self.garbage[g - 1 - i],
                vec![Mino::Empty; self.consts.width],
            );
        }
    }

    /// Reverse every playfield row left-to-right; with `colorize`, also swap
    /// each cell for its mirror-color counterpart.
    pub fn mirror(&mut self, colorize: bool) {
        for row in &mut self.field {
            row.reverse();
            if colorize {
                for cell in row.iter_mut() {
                    *cell = cell.mirrored();
                }
            }
        }
    }

    /// Shift all playfield rows up, filling the bottom with empty rows.
    pub fn shift_up(&mut self, amount: usize) {
        let amount = amount.min(self.consts.height);
        for y in (amount..self.consts.height).rev() {
            self.field[y] = self.field[y - amount].clone();
        }
        for y in 0..amount {
            self.field[y] = vec![Mino::Empty; self.consts.width];
        }
    }

    /// Shift all playfield rows down, filling the top with empty rows.
    pub fn shift_down(&mut self, amount: usize) {
        let amount = amount.min(self.consts.height);
        for y in 0..self.consts.height - amount {
            self.field[y] = self.field[y + amount].clone();
        }
        for y in self.consts.height - amount..self.consts.height {
            self.field[y] = vec![Mino::Empty; self.consts.width];
        }
    }

    /// Shift playfield content left; with `warp`, pushed-off cells wrap to
    /// the right edge instead of being discarded.
    pub fn shift_left(&mut self, amount: usize, warp: bool) {
        let amount = amount.min(self.consts.width);
        for row in &mut self.field {
            if warp {
                row.rotate_left(amount);
            } else {
                row.drain(..amount);
                row.extend(std::iter::repeat_n(Mino::Empty, amount));
            }
        }
    }

    /// Shift playfield content right; with `warp`, pushed-off cells wrap to
    /// the left edge instead of being discarded.
    pub fn shift_right(&mut self, amount: usize, warp: bool) {
        let amount = amount.min(self.consts.width);
        for row in &mut self.field {
            if warp {
                row.rotate_right(amount);
            } else {
                row.truncate(row.len() - amount);
                row.splice(0..0, std::iter::repeat_n(Mino::Empty, amount));
            }
        }
    }

    /// Remove every fully-occupied playfield row, compact the rest downward,
    /// and pad the top with empty rows. Returns the number removed.
    pub fn clear_line(&mut self) -> usize {
        let width = self.consts.width;
        let before = self.field.len();
        self.field.retain(|row| row.contains(&Mino::Empty));
        let cleared = before - self.field.len();
        self.field
            .extend(std::iter::repeat_n(vec![Mino::Empty; width], cleared));
        cleared
    }

    /// Copy this field into a grid of different dimensions; cells that do
    /// not fit the target are dropped, missing ones are empty.
    pub fn resized(&self, consts: FieldConsts) -> Field {
        let mut result = Field::empty(consts);
        for y in -(self.consts.garbage_height.min(consts.garbage_height) as i32)
            ..self.consts.height.min(consts.height) as i32
        {
            for x in 0..self.consts.width.min(consts.width) {
                result.fill(x, y, self.at(x, y));
            }
        }
        result
    }

    /// Render rows top-to-bottom, one character per cell.
    ///
    /// With `truncated`, leading all-empty rows are omitted; with
    /// `with_garbage`, the garbage region is included below the playfield.
    pub fn string(&self, truncated: bool, with_garbage: bool, separator: &str) -> String {
        let floor = if with_garbage {
            -(self.consts.garbage_height as i32)
        } else {
            0
        };
        let mut top = self.consts.height as i32 - 1;
        if truncated {
            while top >= floor && self.row(top).iter().all(|&m| m == Mino::Empty) {
                top -= 1;
            }
        }
        let mut rows = Vec::new();
        let mut y = top;
        while y >= floor {
            rows.push(self.row(y).iter().map(|m| m.name()).collect::<String>());
            y -= 1;
        }
        rows.join(separator)
    }

    /// The playfield region rendered top-to-bottom, untruncated.
    pub fn field_string(&self) -> String {
        self.string(false, false, "\n")
    }

    /// The garbage region rendered top-to-bottom.
    pub fn garbage_string(&self) -> String {
        self.garbage
            .iter()
            .map(|row| row.iter().map(|m| m.name()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
