//! Piece identities, rotation states, and positioned-piece operations.
//!
//! The piece set is a small closed enum with a static shape-offset table;
//! all behavior is data-driven lookup.

use crate::field::FieldConsts;

/// A cell value: a piece identity, the garbage block, or the empty sentinel.
///
/// Discriminants are the wire values of the field/action encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mino {
    /// Unfilled cell / "no piece".
    #[default]
    Empty = 0,
    /// I piece.
    I = 1,
    /// L piece.
    L = 2,
    /// O piece.
    O = 3,
    /// Z piece.
    Z = 4,
    /// T piece.
    T = 5,
    /// J piece.
    J = 6,
    /// S piece.
    S = 7,
    /// Garbage (gray) block.
    Garbage = 8,
}

impl Mino {
    /// Map a wire value (0..=8) back to a cell value.
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::I),
            2 => Some(Self::L),
            3 => Some(Self::O),
            4 => Some(Self::Z),
            5 => Some(Self::T),
            6 => Some(Self::J),
            7 => Some(Self::S),
            8 => Some(Self::Garbage),
            _ => None,
        }
    }

    /// The wire value of this cell.
    pub fn to_wire(self) -> u32 {
        self as u32
    }

    /// Single-character rendering used by field strings and quiz notation.
    pub fn name(self) -> char {
        match self {
            Self::Empty => '_',
            Self::I => 'I',
            Self::L => 'L',
            Self::O => 'O',
            Self::Z => 'Z',
            Self::T => 'T',
            Self::J => 'J',
            Self::S => 'S',
            Self::Garbage => 'X',
        }
    }

    /// Parse the single-character rendering.
    pub fn from_name(c: char) -> Option<Self> {
        match c {
            '_' => Some(Self::Empty),
            'I' => Some(Self::I),
            'L' => Some(Self::L),
            'O' => Some(Self::O),
            'Z' => Some(Self::Z),
            'T' => Some(Self::T),
            'J' => Some(Self::J),
            'S' => Some(Self::S),
            'X' => Some(Self::Garbage),
            _ => None,
        }
    }

    /// Whether this is an actual tetromino (not Empty or Garbage).
    pub fn is_piece(self) -> bool {
        !matches!(self, Self::Empty | Self::Garbage)
    }

    /// The mirror-color counterpart: S and Z swap, L and J swap.
    pub fn mirrored(self) -> Self {
        match self {
            Self::S => Self::Z,
            Self::Z => Self::S,
            Self::L => Self::J,
            Self::J => Self::L,
            other => other,
        }
    }
}

/// One of the four discrete piece orientations. No kick tables in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// Spawn orientation.
    #[default]
    Spawn,
    /// Clockwise from spawn.
    Right,
    /// 180 degrees from spawn.
    Reverse,
    /// Counter-clockwise from spawn.
    Left,
}

/// Spawn-orientation cell offsets, relative to the operation anchor.
fn spawn_offsets(mino: Mino) -> [(i32, i32); 4] {
    match mino {
        Mino::I => [(0, 0), (-1, 0), (1, 0), (2, 0)],
        Mino::T => [(0, 0), (-1, 0), (1, 0), (0, 1)],
        Mino::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
        Mino::L => [(0, 0), (-1, 0), (1, 0), (1, 1)],
        Mino::J => [(0, 0), (-1, 0), (1, 0), (-1, 1)],
        Mino::S => [(0, 0), (-1, 0), (0, 1), (1, 1)],
        Mino::Z => [(0, 0), (1, 0), (0, 1), (-1, 1)],
        // Empty and Garbage never appear as placed pieces; give them a
        // degenerate single-cell footprint.
        Mino::Empty | Mino::Garbage => [(0, 0); 4],
    }
}

/// An immutable positioned piece: identity, orientation, anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Piece identity.
    pub mino: Mino,
    /// Orientation.
    pub rotation: Rotation,
    /// Anchor column.
    pub x: i32,
    /// Anchor row (0 = playfield bottom; negative rows are garbage).
    pub y: i32,
}

impl Operation {
    /// Create a positioned piece.
    pub fn new(mino: Mino, rotation: Rotation, x: i32, y: i32) -> Self {
        Self {
            mino,
            rotation,
            x,
            y,
        }
    }

    /// The four occupied absolute cells of this operation.
    pub fn shape(&self) -> [(i32, i32); 4] {
        let mut cells = spawn_offsets(self.mino);
        for cell in &mut cells {
            let (dx, dy) = *cell;
            *cell = match self.rotation {
                Rotation::Spawn => (dx, dy),
                Rotation::Right => (dy, -dx),
                Rotation::Reverse => (-dx, -dy),
                Rotation::Left => (-dy, dx),
            };
            cell.0 += self.x;
            cell.1 += self.y;
        }
        cells
    }

    /// Whether every occupied cell lies inside the addressable grid.
    pub fn is_inside(&self, consts: FieldConsts) -> bool {
        self.shape().iter().all(|&(x, y)| {
            0 <= x
                && x < consts.width as i32
                && -(consts.garbage_height as i32) <= y
                && y < consts.height as i32
        })
    }

    /// The same operation translated by `(dx, dy)`.
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
