//! Z80 register file.
//!
//! Every pair is one owned `u16`. The 8-bit registers are views onto its
//! halves, so a write at either width is visible at the other immediately.

use std::fmt;

use crate::flags::{CF, HF, NF, PF, SF, ZF};

/// A 16-bit register addressable as two 8-bit halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    /// High byte (bits 8-15).
    #[must_use]
    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte (bits 0-7).
    #[must_use]
    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    pub fn set_hi(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_lo(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

/// One bank of the swappable registers: AF, BC, DE, HL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterBank {
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
}

/// Named 8-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
    I,
    R,
}

/// Named 16-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    IX,
    IY,
    SP,
    PC,
}

/// Which register stands in for HL, as selected by a DD/FD prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    #[default]
    Hl,
    Ix,
    Iy,
}

impl IndexMode {
    /// The 16-bit register this mode substitutes for HL.
    #[must_use]
    pub const fn pair(self) -> Reg16 {
        match self {
            Self::Hl => Reg16::HL,
            Self::Ix => Reg16::IX,
            Self::Iy => Reg16::IY,
        }
    }

    #[must_use]
    pub const fn is_indexed(self) -> bool {
        !matches!(self, Self::Hl)
    }
}

impl Reg8 {
    /// Decode the 3-bit `r` selector: B, C, D, E, H, L, (HL), A.
    ///
    /// Returns `None` for 6, which names a memory operand rather than a
    /// register. Under an index prefix, H and L become the halves of IX/IY.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in 0..=7; that is a decoder bug.
    #[must_use]
    pub fn from_selector(index: u8, mode: IndexMode) -> Option<Self> {
        let reg = match (index, mode) {
            (0, _) => Self::B,
            (1, _) => Self::C,
            (2, _) => Self::D,
            (3, _) => Self::E,
            (4, IndexMode::Hl) => Self::H,
            (4, IndexMode::Ix) => Self::Ixh,
            (4, IndexMode::Iy) => Self::Iyh,
            (5, IndexMode::Hl) => Self::L,
            (5, IndexMode::Ix) => Self::Ixl,
            (5, IndexMode::Iy) => Self::Iyl,
            (6, _) => return None,
            (7, _) => Self::A,
            _ => unreachable!("8-bit register selector {index} out of range"),
        };
        Some(reg)
    }
}

impl Reg16 {
    /// Decode the 2-bit pair selector.
    ///
    /// 0-2 name BC, DE and HL (or the active index register); 3 names AF
    /// for the stack group (`with_af`) and SP everywhere else.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in 0..=3; that is a decoder bug.
    #[must_use]
    pub fn from_selector(index: u8, mode: IndexMode, with_af: bool) -> Self {
        match index {
            0 => Self::BC,
            1 => Self::DE,
            2 => mode.pair(),
            3 if with_af => Self::AF,
            3 => Self::SP,
            _ => unreachable!("16-bit register selector {index} out of range"),
        }
    }

    /// The `rp` table: BC, DE, HL, SP.
    #[must_use]
    pub fn rp(index: u8, mode: IndexMode) -> Self {
        Self::from_selector(index, mode, false)
    }

    /// The `rp2` table used by PUSH and POP: BC, DE, HL, AF.
    #[must_use]
    pub fn rp2(index: u8, mode: IndexMode) -> Self {
        Self::from_selector(index, mode, true)
    }
}

/// The complete Z80 register file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    /// Active bank.
    pub main: RegisterBank,
    /// Alternate bank, swapped in by EX AF,AF' and EXX.
    pub alt: RegisterBank,
    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub sp: u16,
    pub pc: u16,
    /// Interrupt vector base.
    pub i: u8,
    /// Memory refresh counter.
    pub r: u8,
}

impl Registers {
    #[must_use]
    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.main.af.hi(),
            Reg8::F => self.main.af.lo(),
            Reg8::B => self.main.bc.hi(),
            Reg8::C => self.main.bc.lo(),
            Reg8::D => self.main.de.hi(),
            Reg8::E => self.main.de.lo(),
            Reg8::H => self.main.hl.hi(),
            Reg8::L => self.main.hl.lo(),
            Reg8::Ixh => self.ix.hi(),
            Reg8::Ixl => self.ix.lo(),
            Reg8::Iyh => self.iy.hi(),
            Reg8::Iyl => self.iy.lo(),
            Reg8::I => self.i,
            Reg8::R => self.r,
        }
    }

    pub fn set8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.main.af.set_hi(value),
            Reg8::F => self.main.af.set_lo(value),
            Reg8::B => self.main.bc.set_hi(value),
            Reg8::C => self.main.bc.set_lo(value),
            Reg8::D => self.main.de.set_hi(value),
            Reg8::E => self.main.de.set_lo(value),
            Reg8::H => self.main.hl.set_hi(value),
            Reg8::L => self.main.hl.set_lo(value),
            Reg8::Ixh => self.ix.set_hi(value),
            Reg8::Ixl => self.ix.set_lo(value),
            Reg8::Iyh => self.iy.set_hi(value),
            Reg8::Iyl => self.iy.set_lo(value),
            Reg8::I => self.i = value,
            Reg8::R => self.r = value,
        }
    }

    #[must_use]
    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.main.af.get(),
            Reg16::BC => self.main.bc.get(),
            Reg16::DE => self.main.de.get(),
            Reg16::HL => self.main.hl.get(),
            Reg16::IX => self.ix.get(),
            Reg16::IY => self.iy.get(),
            Reg16::SP => self.sp,
            Reg16::PC => self.pc,
        }
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::AF => self.main.af.set(value),
            Reg16::BC => self.main.bc.set(value),
            Reg16::DE => self.main.de.set(value),
            Reg16::HL => self.main.hl.set(value),
            Reg16::IX => self.ix.set(value),
            Reg16::IY => self.iy.set(value),
            Reg16::SP => self.sp = value,
            Reg16::PC => self.pc = value,
        }
    }

    /// Accumulator.
    #[must_use]
    pub fn a(&self) -> u8 {
        self.main.af.hi()
    }

    pub fn set_a(&mut self, value: u8) {
        self.main.af.set_hi(value);
    }

    /// Flags.
    #[must_use]
    pub fn f(&self) -> u8 {
        self.main.af.lo()
    }

    pub fn set_f(&mut self, value: u8) {
        self.main.af.set_lo(value);
    }

    /// EX AF,AF'.
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.main.af, &mut self.alt.af);
    }

    /// EXX: swap BC, DE and HL with the alternate bank.
    pub fn exchange_banks(&mut self) {
        std::mem::swap(&mut self.main.bc, &mut self.alt.bc);
        std::mem::swap(&mut self.main.de, &mut self.alt.de);
        std::mem::swap(&mut self.main.hl, &mut self.alt.hl);
    }
}

fn flag_letters(f: u8) -> String {
    [(SF, 'S'), (ZF, 'Z'), (HF, 'H'), (PF, 'P'), (NF, 'N'), (CF, 'C')]
        .iter()
        .map(|&(bit, letter)| if f & bit != 0 { letter } else { '-' })
        .collect()
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.main;
        writeln!(f, "PC: {:04X}  SP: {:04X}", self.pc, self.sp)?;
        writeln!(
            f,
            " A: {:02X}  F: {:02X}  B: {:02X}  C: {:02X}  D: {:02X}  E: {:02X}  H: {:02X}  L: {:02X}  [{}]",
            m.af.hi(),
            m.af.lo(),
            m.bc.hi(),
            m.bc.lo(),
            m.de.hi(),
            m.de.lo(),
            m.hl.hi(),
            m.hl.lo(),
            flag_letters(m.af.lo()),
        )?;
        writeln!(
            f,
            "AF: {:04X} BC: {:04X} DE: {:04X} HL: {:04X} IX: {:04X} IY: {:04X}",
            m.af.get(),
            m.bc.get(),
            m.de.get(),
            m.hl.get(),
            self.ix.get(),
            self.iy.get(),
        )?;
        write!(
            f,
            "AF': {:04X} BC': {:04X} DE': {:04X} HL': {:04X}  I: {:02X}  R: {:02X}",
            self.alt.af.get(),
            self.alt.bc.get(),
            self.alt.de.get(),
            self.alt.hl.get(),
            self.i,
            self.r,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_write_is_visible_in_halves() {
        let mut regs = Registers::default();
        regs.set16(Reg16::HL, 0x1234);
        assert_eq!(regs.get8(Reg8::H), 0x12);
        assert_eq!(regs.get8(Reg8::L), 0x34);
    }

    #[test]
    fn half_write_is_visible_in_pair() {
        let mut regs = Registers::default();
        regs.set16(Reg16::BC, 0xAA00);
        regs.set8(Reg8::C, 0xFF);
        assert_eq!(regs.get16(Reg16::BC), 0xAAFF);
        regs.set8(Reg8::B, 0x01);
        assert_eq!(regs.get16(Reg16::BC), 0x01FF);
    }

    #[test]
    fn pair_increment_wraps() {
        let mut regs = Registers::default();
        regs.set16(Reg16::DE, 0xFFFF);
        regs.set16(Reg16::DE, regs.get16(Reg16::DE).wrapping_add(1));
        assert_eq!(regs.get16(Reg16::DE), 0x0000);
        assert_eq!(regs.get8(Reg8::D), 0);
        assert_eq!(regs.get8(Reg8::E), 0);
    }

    #[test]
    fn index_halves_alias_index_registers() {
        let mut regs = Registers::default();
        regs.set16(Reg16::IX, 0xBEEF);
        assert_eq!(regs.get8(Reg8::Ixh), 0xBE);
        assert_eq!(regs.get8(Reg8::Ixl), 0xEF);
        regs.set8(Reg8::Iyl, 0x42);
        assert_eq!(regs.get16(Reg16::IY), 0x0042);
    }

    #[test]
    fn accumulator_and_flags_share_af() {
        let mut regs = Registers::default();
        regs.set_a(0x12);
        regs.set_f(0x34);
        assert_eq!(regs.get16(Reg16::AF), 0x1234);
    }

    #[test]
    fn selector_table_maps_opcode_order() {
        let expected = [
            Some(Reg8::B),
            Some(Reg8::C),
            Some(Reg8::D),
            Some(Reg8::E),
            Some(Reg8::H),
            Some(Reg8::L),
            None,
            Some(Reg8::A),
        ];
        for (index, want) in (0u8..8).zip(expected) {
            assert_eq!(Reg8::from_selector(index, IndexMode::Hl), want);
        }
        assert_eq!(Reg8::from_selector(4, IndexMode::Ix), Some(Reg8::Ixh));
        assert_eq!(Reg8::from_selector(5, IndexMode::Iy), Some(Reg8::Iyl));
    }

    #[test]
    fn pair_selector_switches_sp_and_af() {
        assert_eq!(Reg16::rp(3, IndexMode::Hl), Reg16::SP);
        assert_eq!(Reg16::rp2(3, IndexMode::Hl), Reg16::AF);
        assert_eq!(Reg16::rp(2, IndexMode::Hl), Reg16::HL);
        assert_eq!(Reg16::rp(2, IndexMode::Iy), Reg16::IY);
        assert_eq!(Reg16::rp2(0, IndexMode::Ix), Reg16::BC);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn eight_bit_selector_past_seven_is_a_fault() {
        let _ = Reg8::from_selector(8, IndexMode::Hl);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn pair_selector_past_three_is_a_fault() {
        let _ = Reg16::rp(4, IndexMode::Hl);
    }

    #[test]
    fn exchanges_swap_with_alternate_bank() {
        let mut regs = Registers::default();
        regs.set16(Reg16::AF, 0x1111);
        regs.set16(Reg16::HL, 0x2222);
        regs.alt.af.set(0x3333);
        regs.alt.hl.set(0x4444);

        regs.exchange_af();
        assert_eq!(regs.get16(Reg16::AF), 0x3333);
        assert_eq!(regs.get16(Reg16::HL), 0x2222);

        regs.exchange_banks();
        assert_eq!(regs.get16(Reg16::HL), 0x4444);
        assert_eq!(regs.alt.hl.get(), 0x2222);
        assert_eq!(regs.get16(Reg16::AF), 0x3333);
    }

    #[test]
    fn display_lists_flag_letters() {
        let mut regs = Registers::default();
        regs.set_f(ZF | CF);
        let dump = regs.to_string();
        assert!(dump.contains("[-Z---C]"));
        assert!(dump.starts_with("PC: 0000  SP: 0000"));
    }
}
