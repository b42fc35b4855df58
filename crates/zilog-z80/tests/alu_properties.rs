//! Property-based tests for ALU and register invariants.
//!
//! proptest covers the random-input properties; the 8-bit operand space is
//! small enough that the flag contracts are also checked exhaustively.

use emu_core::{Bus, Ram};
use proptest::prelude::*;
use zilog_z80::alu::{self, Shift};
use zilog_z80::{CF, HF, NF, PF, Reg8, Reg16, Registers, SF, ZF, parity};

/// Subtraction flags computed from first principles with signed arithmetic.
fn reference_subtract(a: u8, b: u8, borrow: bool) -> (u8, u8) {
    let c = i16::from(borrow);
    let diff = i16::from(a) - i16::from(b) - c;
    let result = diff as u8;

    let mut f = NF;
    if result & 0x80 != 0 {
        f |= SF;
    }
    if result == 0 {
        f |= ZF;
    }
    if i16::from(a & 0x0F) - i16::from(b & 0x0F) - c < 0 {
        f |= HF;
    }
    let signed = i16::from(a as i8) - i16::from(b as i8) - c;
    if !(-128..=127).contains(&signed) {
        f |= PF;
    }
    if diff < 0 {
        f |= CF;
    }
    (result, f)
}

#[test]
fn subtract_matches_borrow_reference_for_all_operands() {
    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            for borrow in [false, true] {
                let mut f = if borrow { CF } else { 0 };
                let result = alu::subtract(a, b, &mut f, true);
                let (want, want_flags) = reference_subtract(a, b, borrow);
                assert_eq!(result, want, "{a:#04X} - {b:#04X} - {borrow}");
                assert_eq!(f, want_flags, "{a:#04X} - {b:#04X} - {borrow}");
            }
        }
    }
}

#[test]
fn logical_parity_matches_popcount_for_all_values() {
    for value in 0..=u8::MAX {
        let even = value.count_ones() % 2 == 0;

        let mut f = 0;
        alu::and(value, 0xFF, &mut f);
        assert_eq!(f & PF != 0, even, "AND {value:#04X}");

        let mut f = 0;
        alu::or(value, 0x00, &mut f);
        assert_eq!(f & PF != 0, even, "OR {value:#04X}");

        let mut f = 0;
        alu::xor(value, 0x00, &mut f);
        assert_eq!(f & PF != 0, even, "XOR {value:#04X}");

        assert_eq!(parity(value), even);
    }
}

#[test]
fn bit_test_reports_every_bit() {
    for value in 0..=u8::MAX {
        for bit in 0..8 {
            let mut f = 0;
            alu::bit_test(value, bit, &mut f);
            let set = value & (1 << bit) != 0;
            assert_eq!(f & ZF == 0, set, "BIT {bit},{value:#04X}");
            assert_eq!(f & (HF | NF), HF);
        }
    }
}

proptest! {
    #[test]
    fn adding_zero_is_identity(a: u8, flags: u8) {
        let mut f = flags;
        prop_assert_eq!(alu::add(a, 0, &mut f, false), a);
        prop_assert_eq!(f & (CF | HF | PF | NF), 0);
        prop_assert_eq!(f & ZF != 0, a == 0);
        prop_assert_eq!(f & SF != 0, a & 0x80 != 0);
    }

    #[test]
    fn add_undoes_subtract(a: u8, b: u8) {
        let mut f = 0;
        let diff = alu::subtract(a, b, &mut f, false);
        prop_assert_eq!(alu::add(diff, b, &mut f, false), a);
    }

    #[test]
    fn carry_in_adds_one(a: u8, b: u8) {
        let mut with_carry = CF;
        let mut without = 0;
        let r1 = alu::add(a, b, &mut with_carry, true);
        let r2 = alu::add(a, b, &mut without, false);
        prop_assert_eq!(r1, r2.wrapping_add(1));
    }

    #[test]
    fn increment_and_decrement_keep_carry(value: u8, carry: bool) {
        let c = if carry { CF } else { 0 };
        let mut f = c;
        let up = alu::increment(value, &mut f);
        prop_assert_eq!(up, value.wrapping_add(1));
        prop_assert_eq!(f & CF, c);

        let mut f = c;
        let down = alu::decrement(value, &mut f);
        prop_assert_eq!(down, value.wrapping_sub(1));
        prop_assert_eq!(f & CF, c);
        prop_assert_eq!(f & NF, NF);
    }

    #[test]
    fn rotate_left_then_right_restores(value: u8) {
        let mut f = 0;
        let left = alu::shift(Shift::Rlc, value, &mut f);
        prop_assert_eq!(alu::shift(Shift::Rrc, left, &mut f), value);
    }

    #[test]
    fn sixteen_bit_sbc_undoes_add(a: u16, b: u16) {
        let mut f = 0;
        let sum = alu::add16(a, b, &mut f);
        f &= !CF;
        prop_assert_eq!(alu::sbc16(sum, b, &mut f), a);
    }

    #[test]
    fn pair_write_splits_into_halves(value: u16) {
        let mut regs = Registers::default();
        regs.set16(Reg16::HL, value);
        prop_assert_eq!(regs.get8(Reg8::H), (value >> 8) as u8);
        prop_assert_eq!(regs.get8(Reg8::L), value as u8);
    }

    #[test]
    fn half_write_keeps_other_half(pair: u16, low: u8) {
        let mut regs = Registers::default();
        regs.set16(Reg16::BC, pair);
        regs.set8(Reg8::C, low);
        prop_assert_eq!(regs.get16(Reg16::BC), (pair & 0xFF00) | u16::from(low));
    }

    #[test]
    fn push_then_pop_restores(sp: u16, value: u16) {
        let mut ram = Ram::new();
        let mut cursor = sp;
        ram.push_word(&mut cursor, value).unwrap();
        prop_assert_eq!(cursor, sp.wrapping_sub(2));
        prop_assert_eq!(ram.pop_word(&mut cursor).unwrap(), value);
        prop_assert_eq!(cursor, sp);
    }
}
