//! Z80 flag register bits and branch conditions.

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// Bits 5 and 3 carry no documented meaning. ALU operations leave them alone.
pub(crate) const UNDEFINED: u8 = 0b0010_1000;

/// True if the byte has an even number of set bits.
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// A branch condition: holds when `flags & mask == pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    mask: u8,
    pattern: u8,
}

impl Condition {
    pub const NON_ZERO: Self = Self::new(ZF, 0);
    pub const ZERO: Self = Self::new(ZF, ZF);
    pub const NO_CARRY: Self = Self::new(CF, 0);
    pub const CARRY: Self = Self::new(CF, CF);
    pub const PARITY_ODD: Self = Self::new(PF, 0);
    pub const PARITY_EVEN: Self = Self::new(PF, PF);
    pub const SIGN_POSITIVE: Self = Self::new(SF, 0);
    pub const SIGN_NEGATIVE: Self = Self::new(SF, SF);

    /// Conditions in opcode order: NZ, Z, NC, C, PO, PE, P, M.
    const TABLE: [Self; 8] = [
        Self::NON_ZERO,
        Self::ZERO,
        Self::NO_CARRY,
        Self::CARRY,
        Self::PARITY_ODD,
        Self::PARITY_EVEN,
        Self::SIGN_POSITIVE,
        Self::SIGN_NEGATIVE,
    ];

    #[must_use]
    pub const fn new(mask: u8, pattern: u8) -> Self {
        Self { mask, pattern }
    }

    /// Look up the condition named by a 3-bit `cc` field.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in 0..=7; that is a decoder bug.
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        match Self::TABLE.get(usize::from(index)) {
            Some(&condition) => condition,
            None => unreachable!("condition selector {index} out of range"),
        }
    }

    /// Evaluate against a flags byte.
    #[must_use]
    pub const fn evaluate(self, flags: u8) -> bool {
        flags & self.mask == self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_test_their_flag() {
        let cases = [
            (Condition::NON_ZERO, 0, true),
            (Condition::NON_ZERO, ZF, false),
            (Condition::ZERO, ZF, true),
            (Condition::ZERO, 0, false),
            (Condition::NO_CARRY, 0, true),
            (Condition::NO_CARRY, CF, false),
            (Condition::CARRY, CF, true),
            (Condition::CARRY, 0, false),
            (Condition::PARITY_ODD, 0, true),
            (Condition::PARITY_ODD, PF, false),
            (Condition::PARITY_EVEN, PF, true),
            (Condition::PARITY_EVEN, 0, false),
            (Condition::SIGN_POSITIVE, 0, true),
            (Condition::SIGN_POSITIVE, SF, false),
            (Condition::SIGN_NEGATIVE, SF, true),
            (Condition::SIGN_NEGATIVE, 0, false),
        ];

        for (condition, flags, expected) in cases {
            assert_eq!(
                condition.evaluate(flags),
                expected,
                "{condition:?} with flags {flags:#04X}"
            );
        }
    }

    #[test]
    fn unrelated_flags_do_not_matter() {
        assert!(Condition::ZERO.evaluate(0xFF));
        assert!(Condition::NON_ZERO.evaluate(!ZF));
    }

    #[test]
    fn table_follows_opcode_order() {
        assert_eq!(Condition::from_index(0), Condition::NON_ZERO);
        assert_eq!(Condition::from_index(3), Condition::CARRY);
        assert_eq!(Condition::from_index(4), Condition::PARITY_ODD);
        assert_eq!(Condition::from_index(7), Condition::SIGN_NEGATIVE);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn selector_past_seven_is_a_fault() {
        let _ = Condition::from_index(8);
    }

    #[test]
    fn parity_counts_bits() {
        assert!(parity(0x00));
        assert!(parity(0x03));
        assert!(!parity(0x01));
        assert!(!parity(0x80));
        assert!(parity(0xFF));
    }
}
