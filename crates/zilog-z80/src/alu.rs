//! ALU operations for the Z80.
//!
//! Every function takes the current flags byte by `&mut` and leaves each
//! flag it documents fully determined by its inputs. Bits 5 and 3 are
//! never touched.

use crate::flags::{CF, HF, NF, PF, SF, UNDEFINED, ZF, parity};

/// Flags that survive operations which only report carry-type results.
const KEEP_SZP: u8 = SF | ZF | PF | UNDEFINED;

fn sign_zero(result: u8) -> u8 {
    let mut f = 0;
    if result & 0x80 != 0 {
        f |= SF;
    }
    if result == 0 {
        f |= ZF;
    }
    f
}

fn sign_zero_parity(result: u8) -> u8 {
    let mut f = sign_zero(result);
    if parity(result) {
        f |= PF;
    }
    f
}

/// The one 8-bit adder. Everything additive goes through here.
fn add_with_carry(a: u8, b: u8, carry_in: bool, flags: &mut u8) -> u8 {
    let wide = u16::from(a) + u16::from(b) + u16::from(carry_in);
    let result = wide as u8;

    // Bit n of `carries` is the carry into bit n; bit 8 is the carry out.
    let carries = wide ^ u16::from(a) ^ u16::from(b);
    let carry_out = carries & 0x100 != 0;
    let carry_into_sign = carries & 0x80 != 0;

    let mut f = (*flags & UNDEFINED) | sign_zero(result);
    if carries & 0x10 != 0 {
        f |= HF;
    }
    if carry_into_sign != carry_out {
        f |= PF;
    }
    if carry_out {
        f |= CF;
    }
    *flags = f;
    result
}

/// ADD / ADC: `a + b`, plus the carry flag when `use_carry_in` is set.
pub fn add(a: u8, b: u8, flags: &mut u8, use_carry_in: bool) -> u8 {
    let carry_in = use_carry_in && *flags & CF != 0;
    add_with_carry(a, b, carry_in, flags)
}

/// SUB / SBC / CP: `a - b`, minus the carry flag when `use_carry_in` is set.
///
/// Computed as `a + !b + (1 - borrow)`. The adder reports carry and
/// half-carry where subtraction wants borrows, so both are inverted
/// afterwards.
pub fn subtract(a: u8, b: u8, flags: &mut u8, use_carry_in: bool) -> u8 {
    let borrow = use_carry_in && *flags & CF != 0;
    let result = add_with_carry(a, !b, !borrow, flags);
    *flags ^= CF | HF;
    *flags |= NF;
    result
}

/// INC: add one, carry preserved.
pub fn increment(value: u8, flags: &mut u8) -> u8 {
    let carry = *flags & CF;
    let result = add(value, 1, flags, false);
    *flags = (*flags & !CF) | carry;
    result
}

/// DEC: subtract one, carry preserved.
pub fn decrement(value: u8, flags: &mut u8) -> u8 {
    let carry = *flags & CF;
    let result = subtract(value, 1, flags, false);
    *flags = (*flags & !CF) | carry;
    result
}

/// Shared flag tail for the logical operations.
///
/// S and Z from the result, H set, N and C cleared, P/V = even parity.
pub fn bitwise(result: u8, flags: &mut u8) -> u8 {
    *flags = (*flags & UNDEFINED) | sign_zero_parity(result) | HF;
    result
}

pub fn and(a: u8, b: u8, flags: &mut u8) -> u8 {
    bitwise(a & b, flags)
}

/// OR leaves half-carry clear.
pub fn or(a: u8, b: u8, flags: &mut u8) -> u8 {
    let result = bitwise(a | b, flags);
    *flags &= !HF;
    result
}

/// XOR leaves half-carry clear.
pub fn xor(a: u8, b: u8, flags: &mut u8) -> u8 {
    let result = bitwise(a ^ b, flags);
    *flags &= !HF;
    result
}

/// The eight accumulator operations selected by `y` in `alu[y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    /// # Panics
    ///
    /// Panics if `index` is not in 0..=7; that is a decoder bug.
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            7 => Self::Cp,
            _ => unreachable!("ALU selector {index} out of range"),
        }
    }

    /// Apply to the accumulator. Returns the new accumulator value; CP
    /// returns `a` unchanged.
    pub fn apply(self, a: u8, operand: u8, flags: &mut u8) -> u8 {
        match self {
            Self::Add => add(a, operand, flags, false),
            Self::Adc => add(a, operand, flags, true),
            Self::Sub => subtract(a, operand, flags, false),
            Self::Sbc => subtract(a, operand, flags, true),
            Self::And => and(a, operand, flags),
            Self::Xor => xor(a, operand, flags),
            Self::Or => or(a, operand, flags),
            Self::Cp => {
                subtract(a, operand, flags, false);
                a
            }
        }
    }
}

/// BIT: Z is the inverse of the tested bit, H set, N cleared, C kept.
///
/// S and P/V are not specified by the documentation. Here P/V mirrors Z
/// and S reports a set bit 7, which is what the silicon does.
pub fn bit_test(value: u8, bit: u8, flags: &mut u8) {
    let set = value & (1 << bit) != 0;
    let mut f = (*flags & (CF | UNDEFINED)) | HF;
    if !set {
        f |= ZF | PF;
    }
    if bit == 7 && set {
        f |= SF;
    }
    *flags = f;
}

/// Rotate and shift operations of the CB page, selected by `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

impl Shift {
    /// # Panics
    ///
    /// Panics if `index` is not in 0..=7; that is a decoder bug.
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Rlc,
            1 => Self::Rrc,
            2 => Self::Rl,
            3 => Self::Rr,
            4 => Self::Sla,
            5 => Self::Sra,
            6 => Self::Sll,
            7 => Self::Srl,
            _ => unreachable!("shift selector {index} out of range"),
        }
    }

    /// Returns (result, bit shifted out).
    fn compute(self, value: u8, carry: bool) -> (u8, bool) {
        let top = value & 0x80 != 0;
        let bottom = value & 0x01 != 0;
        let result = match self {
            Self::Rlc => value.rotate_left(1),
            Self::Rrc => value.rotate_right(1),
            Self::Rl => (value << 1) | u8::from(carry),
            Self::Rr => (value >> 1) | (u8::from(carry) << 7),
            Self::Sla => value << 1,
            Self::Sra => (value >> 1) | (value & 0x80),
            Self::Sll => (value << 1) | 1,
            Self::Srl => value >> 1,
        };
        let out = match self {
            Self::Rlc | Self::Rl | Self::Sla | Self::Sll => top,
            Self::Rrc | Self::Rr | Self::Sra | Self::Srl => bottom,
        };
        (result, out)
    }
}

/// CB-page rotate/shift: S, Z, P/V from the result, H and N cleared,
/// C = the bit shifted out.
pub fn shift(op: Shift, value: u8, flags: &mut u8) -> u8 {
    let (result, out) = op.compute(value, *flags & CF != 0);
    *flags = (*flags & UNDEFINED) | sign_zero_parity(result) | if out { CF } else { 0 };
    result
}

/// RLCA / RRCA / RLA / RRA: like the CB forms but S, Z and P/V are kept.
pub fn rotate_accumulator(op: Shift, a: u8, flags: &mut u8) -> u8 {
    let (result, out) = op.compute(a, *flags & CF != 0);
    *flags = (*flags & KEEP_SZP) | if out { CF } else { 0 };
    result
}

/// Flags for IN r,(C), RRD and RLD: S, Z and P/V from the value, H and N
/// cleared, C kept.
pub fn load_flags(value: u8, flags: &mut u8) {
    *flags = (*flags & (CF | UNDEFINED)) | sign_zero_parity(value);
}

/// DAA: correct the accumulator to packed BCD after an add or subtract.
pub fn decimal_adjust(a: u8, flags: &mut u8) -> u8 {
    let subtracting = *flags & NF != 0;
    let half = *flags & HF != 0;
    let mut carry = *flags & CF != 0;

    let mut correction = 0;
    if half || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }

    let result = if subtracting {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    let half_out = if subtracting {
        half && a & 0x0F < 6
    } else {
        a & 0x0F > 9
    };

    let mut f = (*flags & (NF | UNDEFINED)) | sign_zero_parity(result);
    if half_out {
        f |= HF;
    }
    if carry {
        f |= CF;
    }
    *flags = f;
    result
}

/// CPL: invert the accumulator, H and N set.
pub fn complement(a: u8, flags: &mut u8) -> u8 {
    *flags |= HF | NF;
    !a
}

/// SCF: C set, H and N cleared.
pub fn set_carry(flags: &mut u8) {
    *flags = (*flags & KEEP_SZP) | CF;
}

/// CCF: H takes the old carry, C inverted, N cleared.
pub fn complement_carry(flags: &mut u8) {
    let old = *flags & CF != 0;
    *flags = (*flags & KEEP_SZP) | if old { HF } else { CF };
}

/// ADD HL/IX/IY,rr: H from bit 11, C from bit 15, N cleared, S/Z/P kept.
pub fn add16(a: u16, b: u16, flags: &mut u8) -> u16 {
    let wide = u32::from(a) + u32::from(b);
    let carries = wide ^ u32::from(a) ^ u32::from(b);

    let mut f = *flags & KEEP_SZP;
    if carries & 0x1000 != 0 {
        f |= HF;
    }
    if carries & 0x1_0000 != 0 {
        f |= CF;
    }
    *flags = f;
    wide as u16
}

fn add16_with_carry(a: u16, b: u16, carry_in: bool, flags: &mut u8) -> u16 {
    let wide = u32::from(a) + u32::from(b) + u32::from(carry_in);
    let result = wide as u16;
    let carries = wide ^ u32::from(a) ^ u32::from(b);
    let carry_out = carries & 0x1_0000 != 0;
    let carry_into_sign = carries & 0x8000 != 0;

    let mut f = *flags & UNDEFINED;
    if result & 0x8000 != 0 {
        f |= SF;
    }
    if result == 0 {
        f |= ZF;
    }
    if carries & 0x1000 != 0 {
        f |= HF;
    }
    if carry_into_sign != carry_out {
        f |= PF;
    }
    if carry_out {
        f |= CF;
    }
    *flags = f;
    result
}

/// ADC HL,rr: full 16-bit flags.
pub fn adc16(a: u16, b: u16, flags: &mut u8) -> u16 {
    let carry_in = *flags & CF != 0;
    add16_with_carry(a, b, carry_in, flags)
}

/// SBC HL,rr: full 16-bit flags, borrows in C and H.
pub fn sbc16(a: u16, b: u16, flags: &mut u8) -> u16 {
    let borrow = *flags & CF != 0;
    let result = add16_with_carry(a, !b, !borrow, flags);
    *flags ^= CF | HF;
    *flags |= NF;
    result
}
