//! Z80 CPU core with per-instruction execution.

mod bits;
mod execute;
mod extended;

use emu_core::{Bus, BusError, Cpu, IoDevice, Observable, Value};
use tracing::trace;

use crate::flags::{CF, HF, NF, PF, SF, ZF};
use crate::operand::Operand;
use crate::registers::{IndexMode, Reg8, Registers};

/// Z80 CPU.
///
/// The CPU does not own memory or I/O. Both are passed to `step()`, which
/// executes one complete instruction, prefixes included.
#[derive(Debug, Clone, Default)]
pub struct Z80 {
    pub(crate) regs: Registers,
    /// Set by HALT. A halted CPU ignores `step()` until reset.
    halted: bool,
    /// Interrupt enable, toggled by EI/DI. Nothing delivers interrupts.
    iff: bool,
    /// Interrupt mode selected by IM; recorded only.
    im: u8,
}

impl Z80 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the register file.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    #[must_use]
    pub fn interrupts_enabled(&self) -> bool {
        self.iff
    }

    #[must_use]
    pub fn interrupt_mode(&self) -> u8 {
        self.im
    }

    /// Pop the return address into PC.
    ///
    /// Trap handlers use this to finish a call they serviced themselves.
    pub fn force_ret<B: Bus>(&mut self, bus: &mut B) -> Result<(), BusError> {
        self.regs.pc = bus.pop_word(&mut self.regs.sp)?;
        Ok(())
    }

    /// Opcode fetch: read at PC, advance PC, bump the refresh counter.
    fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> Result<u8, BusError> {
        let opcode = bus.fetch(&mut self.regs.pc)?;
        self.regs.r = (self.regs.r & 0x80) | (self.regs.r.wrapping_add(1) & 0x7F);
        Ok(opcode)
    }

    fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> Result<u8, BusError> {
        bus.fetch(&mut self.regs.pc)
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> Result<u16, BusError> {
        bus.fetch_word(&mut self.regs.pc)
    }

    /// Fetch a signed displacement byte.
    fn fetch_displacement<B: Bus>(&mut self, bus: &mut B) -> Result<i8, BusError> {
        Ok(self.fetch_byte(bus)? as i8)
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u16) -> Result<(), BusError> {
        bus.push_word(&mut self.regs.sp, value)
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> Result<u16, BusError> {
        bus.pop_word(&mut self.regs.sp)
    }

    /// Address of the `(HL)` operand: HL itself, or IX/IY plus a freshly
    /// fetched displacement.
    fn memory_address<B: Bus>(&mut self, mode: IndexMode, bus: &mut B) -> Result<u16, BusError> {
        let base = self.regs.get16(mode.pair());
        if mode.is_indexed() {
            let d = self.fetch_displacement(bus)?;
            Ok(base.wrapping_add_signed(i16::from(d)))
        } else {
            Ok(base)
        }
    }

    /// Resolve the `r[index]` selector to an operand location.
    fn operand<B: Bus>(&mut self, index: u8, mode: IndexMode, bus: &mut B) -> Result<Operand, BusError> {
        match Reg8::from_selector(index, mode) {
            Some(reg) => Ok(Operand::Reg(reg)),
            None => self.memory_address(mode, bus).map(Operand::Mem),
        }
    }

    /// Run an ALU function against the flags register.
    fn with_flags<T>(&mut self, op: impl FnOnce(&mut u8) -> T) -> T {
        let mut f = self.regs.f();
        let out = op(&mut f);
        self.regs.set_f(f);
        out
    }

    fn relative_jump(&mut self, displacement: i8) {
        self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(displacement));
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn step<B: Bus>(&mut self, bus: &mut B, io: &mut dyn IoDevice) -> Result<(), BusError> {
        if self.halted {
            return Ok(());
        }

        let pc = self.regs.pc;
        let mut opcode = self.fetch_opcode(bus)?;
        let mode = match opcode {
            0xDD => IndexMode::Ix,
            0xFD => IndexMode::Iy,
            _ => IndexMode::Hl,
        };
        if mode.is_indexed() {
            // A prefix followed by another prefix acts alone; the next one
            // starts the following step.
            if matches!(bus.read(self.regs.pc)?, 0xDD | 0xFD) {
                trace!(pc, opcode, "redundant prefix");
                return Ok(());
            }
            opcode = self.fetch_opcode(bus)?;
        }
        trace!(pc, opcode, ?mode, "step");

        match opcode {
            0xCB if mode.is_indexed() => self.execute_indexed_bits(mode, bus),
            0xCB => {
                let opcode = self.fetch_opcode(bus)?;
                self.execute_bits(opcode, bus)
            }
            // An index prefix has no effect on the extended page.
            0xED => {
                let opcode = self.fetch_opcode(bus)?;
                self.execute_extended(opcode, bus, io)
            }
            _ => self.execute_main(opcode, mode, bus, io),
        }
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// All query paths supported by the Z80.
const Z80_QUERY_PATHS: &[&str] = &[
    // Main registers
    "a", "f", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "af", "bc", "de", "hl",
    // Alternate pairs
    "af'", "bc'", "de'", "hl'",
    // Index registers
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    // Other registers
    "sp", "pc", "i", "r",
    // Flags (individual)
    "flags.s", "flags.z", "flags.h", "flags.p", "flags.n", "flags.c",
    // Interrupt and CPU state
    "iff", "im", "halted",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        let f = regs.f();
        let value = match path {
            "a" => regs.a().into(),
            "f" => f.into(),
            "b" => regs.get8(Reg8::B).into(),
            "c" => regs.get8(Reg8::C).into(),
            "d" => regs.get8(Reg8::D).into(),
            "e" => regs.get8(Reg8::E).into(),
            "h" => regs.get8(Reg8::H).into(),
            "l" => regs.get8(Reg8::L).into(),

            "af" => regs.main.af.get().into(),
            "bc" => regs.main.bc.get().into(),
            "de" => regs.main.de.get().into(),
            "hl" => regs.main.hl.get().into(),

            "af'" => regs.alt.af.get().into(),
            "bc'" => regs.alt.bc.get().into(),
            "de'" => regs.alt.de.get().into(),
            "hl'" => regs.alt.hl.get().into(),

            "ix" => regs.ix.get().into(),
            "iy" => regs.iy.get().into(),
            "ixh" => regs.ix.hi().into(),
            "ixl" => regs.ix.lo().into(),
            "iyh" => regs.iy.hi().into(),
            "iyl" => regs.iy.lo().into(),

            "sp" => regs.sp.into(),
            "pc" => regs.pc.into(),
            "i" => regs.i.into(),
            "r" => regs.r.into(),

            "flags.s" => (f & SF != 0).into(),
            "flags.z" => (f & ZF != 0).into(),
            "flags.h" => (f & HF != 0).into(),
            "flags.p" => (f & PF != 0).into(),
            "flags.n" => (f & NF != 0).into(),
            "flags.c" => (f & CF != 0).into(),

            "iff" => self.iff.into(),
            "im" => self.im.into(),
            "halted" => self.halted.into(),

            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
