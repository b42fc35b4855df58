//! Opcode bit-field decomposition.
//!
//! ```text
//!   7 6 5 4 3 2 1 0
//!  [ x ][  y  ][ z ]
//!      [ p ][q]
//! ```

/// The x/y/z/p/q fields of an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeFields {
    /// Bits 7-6: instruction class.
    pub x: u8,
    /// Bits 5-3: destination register, ALU operation, condition or bit number.
    pub y: u8,
    /// Bits 2-0: source register or sub-group.
    pub z: u8,
    /// Bits 5-4: register pair.
    pub p: u8,
    /// Bit 3.
    pub q: u8,
}

impl OpcodeFields {
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        Self {
            x: opcode >> 6,
            y: (opcode >> 3) & 7,
            z: opcode & 7,
            p: (opcode >> 4) & 3,
            q: (opcode >> 3) & 1,
        }
    }
}
