//! Per-page action packing: piece, rotation, position, and display flags in
//! one fixed-width buffer value.
//!
//! The layout is a wire contract shared with every other fumen
//! implementation: a single 3-digit value packs, least significant first,
//! the piece (mod 8), rotation (mod 4), coordinate (mod total block count),
//! then the rise, mirror, colorize and has-comment bits, and finally the
//! lock flag stored inverted.

use crate::error::Result;
use crate::field::FieldConsts;
use crate::piece::{Mino, Operation, Rotation};

/// Buffer digits occupied by one packed action.
pub const ACTION_WIDTH: usize = 3;

/// One page's non-field metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// The placed piece; `Mino::Empty` means no operation on this page.
    pub operation: Operation,
    /// Garbage rises after this page locks.
    pub rise: bool,
    /// The field mirrors after this page locks.
    pub mirror: bool,
    /// Guideline coloring is enabled.
    pub colorize: bool,
    /// An explicit comment payload follows this action.
    pub comment: bool,
    /// The operation locks into the field.
    pub lock: bool,
}

impl Action {
    /// The action a page without an operation encodes: the Empty piece at
    /// the coordinate origin slot.
    pub fn no_operation(consts: FieldConsts) -> Self {
        Self {
            operation: Operation::new(
                Mino::Empty,
                Rotation::Reverse,
                0,
                consts.height as i32 - 1,
            ),
            rise: false,
            mirror: false,
            colorize: true,
            comment: false,
            lock: true,
        }
    }
}

fn rotation_from_wire(value: u32) -> Rotation {
    match value & 3 {
        0 => Rotation::Reverse,
        1 => Rotation::Right,
        2 => Rotation::Spawn,
        _ => Rotation::Left,
    }
}

fn rotation_to_wire(rotation: Rotation) -> u32 {
    match rotation {
        Rotation::Reverse => 0,
        Rotation::Right => 1,
        Rotation::Spawn => 2,
        Rotation::Left => 3,
    }
}

/// Per-piece anchor corrections between the wire coordinate and the shape
/// table's anchor, applied on decode; encode applies the inverse.
fn anchor_correction(mino: Mino, rotation: Rotation) -> (i32, i32) {
    match (mino, rotation) {
        (Mino::O, Rotation::Left) => (1, -1),
        (Mino::O, Rotation::Reverse) => (1, 0),
        (Mino::O, Rotation::Spawn) => (0, -1),
        (Mino::I, Rotation::Reverse) => (1, 0),
        (Mino::I, Rotation::Left) => (0, -1),
        (Mino::S, Rotation::Spawn) => (0, -1),
        (Mino::S, Rotation::Right) => (-1, 0),
        (Mino::Z, Rotation::Spawn) => (0, -1),
        (Mino::Z, Rotation::Left) => (1, 0),
        _ => (0, 0),
    }
}

/// Unpack one action value.
pub fn decode_action(value: u32, consts: FieldConsts) -> Result<Action> {
    let total = consts.total_blocks() as u32;
    let mut value = value;

    // Mod 8 keeps the piece in table range; Garbage (8) never appears in actions.
    let mino = Mino::from_wire(value % 8).unwrap_or_default();
    value /= 8;
    let rotation = rotation_from_wire(value % 4);
    value /= 4;
    let position = value % total;
    value /= total;
    let rise = value % 2 == 1;
    value /= 2;
    let mirror = value % 2 == 1;
    value /= 2;
    let colorize = value % 2 == 1;
    value /= 2;
    let comment = value % 2 == 1;
    value /= 2;
    let lock = value % 2 == 0;

    let width = consts.width as u32;
    let (dx, dy) = anchor_correction(mino, rotation);
    let x = (position % width) as i32 + dx;
    let y = consts.height as i32 - 1 - (position / width) as i32 + dy;

    Ok(Action {
        operation: Operation::new(mino, rotation, x, y),
        rise,
        mirror,
        colorize,
        comment,
        lock,
    })
}

/// Pack one action into its wire value.
pub fn encode_action(action: &Action, consts: FieldConsts) -> u32 {
    let op = &action.operation;
    let (dx, dy) = anchor_correction(op.mino, op.rotation);
    let x = op.x - dx;
    let y = op.y - dy;
    let position = (consts.height as i32 - 1 - y) as u32 * consts.width as u32 + x as u32;

    let mut value = u32::from(!action.lock);
    value = value * 2 + u32::from(action.comment);
    value = value * 2 + u32::from(action.colorize);
    value = value * 2 + u32::from(action.mirror);
    value = value * 2 + u32::from(action.rise);
    value = value * consts.total_blocks() as u32 + position;
    value = value * 4 + rotation_to_wire(op.rotation);
    value * 8 + op.mino.to_wire()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_operation_packs_to_canonical_value() {
        // The empty single-page fumen v115@vhAAgH carries action value 30720.
        let action = Action::no_operation(FieldConsts::V115);
        assert_eq!(encode_action(&action, FieldConsts::V115), 30720);
    }

    #[test]
    fn test_decode_canonical_empty_action() {
        let action = decode_action(30720, FieldConsts::V115).unwrap();
        assert_eq!(action.operation.mino, Mino::Empty);
        assert!(action.lock);
        assert!(action.colorize);
        assert!(!action.comment);
        assert!(!action.rise);
        assert!(!action.mirror);
    }

    #[test]
    fn test_roundtrip_every_piece_and_rotation() {
        let consts = FieldConsts::V115;
        for mino in [Mino::I, Mino::L, Mino::O, Mino::Z, Mino::T, Mino::J, Mino::S] {
            for rotation in [
                Rotation::Spawn,
                Rotation::Right,
                Rotation::Reverse,
                Rotation::Left,
            ] {
                let action = Action {
                    operation: Operation::new(mino, rotation, 4, 8),
                    rise: false,
                    mirror: true,
                    colorize: true,
                    comment: false,
                    lock: true,
                };
                let value = encode_action(&action, consts);
                assert!(value < 64u32.pow(ACTION_WIDTH as u32));
                assert_eq!(decode_action(value, consts).unwrap(), action);
            }
        }
    }

    #[test]
    fn test_roundtrip_flags() {
        let consts = FieldConsts::V110;
        for bits in 0..32 {
            let action = Action {
                operation: Operation::new(Mino::T, Rotation::Spawn, 5, 3),
                rise: bits & 1 != 0,
                mirror: bits & 2 != 0,
                colorize: bits & 4 != 0,
                comment: bits & 8 != 0,
                lock: bits & 16 != 0,
            };
            let value = encode_action(&action, consts);
            assert_eq!(decode_action(value, consts).unwrap(), action);
        }
    }

    #[test]
    fn test_lock_bit_is_inverted_on_the_wire() {
        let consts = FieldConsts::V115;
        let mut action = Action::no_operation(consts);
        action.lock = true;
        let locked = encode_action(&action, consts);
        action.lock = false;
        let unlocked = encode_action(&action, consts);
        assert!(unlocked > locked);
    }
}
