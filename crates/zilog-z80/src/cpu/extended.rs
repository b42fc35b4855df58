//! ED-prefixed instructions.

use emu_core::{Bus, BusError, IoDevice};
use tracing::debug;

use crate::alu;
use crate::decode::OpcodeFields;
use crate::flags::{CF, HF, NF, PF, SF, ZF};
use crate::registers::{IndexMode, Reg8, Reg16};

use super::Z80;

/// Interrupt modes selected by `IM` for each `y`.
const INTERRUPT_MODES: [u8; 8] = [0, 0, 1, 2, 0, 0, 1, 2];

/// Direction and repetition of a block instruction.
#[derive(Debug, Clone, Copy)]
struct Block {
    step: i16,
    repeat: bool,
}

impl Z80 {
    pub(super) fn execute_extended<B: Bus>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        io: &mut dyn IoDevice,
    ) -> Result<(), BusError> {
        let OpcodeFields { x, y, z, p, q } = OpcodeFields::decode(opcode);

        match (x, z) {
            // IN r,(C); y = 6 sets flags only
            (1, 0) => {
                let value = io.read(self.regs.get8(Reg8::C));
                self.with_flags(|f| alu::load_flags(value, f));
                if let Some(reg) = Reg8::from_selector(y, IndexMode::Hl) {
                    self.regs.set8(reg, value);
                }
            }

            // OUT (C),r; y = 6 outputs zero
            (1, 1) => {
                let value = Reg8::from_selector(y, IndexMode::Hl).map_or(0, |reg| self.regs.get8(reg));
                io.write(self.regs.get8(Reg8::C), value);
            }

            // SBC HL,rr / ADC HL,rr
            (1, 2) => {
                let hl = self.regs.get16(Reg16::HL);
                let rr = self.regs.get16(Reg16::rp(p, IndexMode::Hl));
                let result = if q == 0 {
                    self.with_flags(|f| alu::sbc16(hl, rr, f))
                } else {
                    self.with_flags(|f| alu::adc16(hl, rr, f))
                };
                self.regs.set16(Reg16::HL, result);
            }

            // LD (nn),rr / LD rr,(nn)
            (1, 3) => {
                let rp = Reg16::rp(p, IndexMode::Hl);
                let addr = self.fetch_word(bus)?;
                if q == 0 {
                    bus.write_word(addr, self.regs.get16(rp))?;
                } else {
                    let value = bus.read_word(addr)?;
                    self.regs.set16(rp, value);
                }
            }

            // NEG
            (1, 4) => {
                let a = self.regs.a();
                let result = self.with_flags(|f| alu::subtract(0, a, f, false));
                self.regs.set_a(result);
            }

            // RETN / RETI
            (1, 5) => self.regs.pc = self.pop(bus)?,

            // IM 0/1/2
            (1, 6) => self.im = INTERRUPT_MODES[usize::from(y)],

            (1, 7) => match y {
                // LD I,A
                0 => self.regs.i = self.regs.a(),
                // LD R,A
                1 => self.regs.r = self.regs.a(),
                // LD A,I
                2 => self.load_a_special(self.regs.i),
                // LD A,R
                3 => self.load_a_special(self.regs.r),
                // RRD
                4 => self.rotate_decimal(bus, false)?,
                // RLD
                5 => self.rotate_decimal(bus, true)?,
                _ => {}
            },

            // Block transfer, compare, input and output
            (2, 0..=3) if y >= 4 => {
                let block = Block {
                    step: if y & 1 == 0 { 1 } else { -1 },
                    repeat: y >= 6,
                };
                match z {
                    0 => self.block_load(block, bus)?,
                    1 => self.block_compare(block, bus)?,
                    2 => self.block_input(block, bus, io)?,
                    _ => self.block_output(block, bus, io)?,
                }
            }

            _ => debug!(opcode, "ED no-op"),
        }

        Ok(())
    }

    /// LD A,I / LD A,R: P/V reports the interrupt enable.
    fn load_a_special(&mut self, value: u8) {
        self.regs.set_a(value);
        let iff = self.iff;
        self.with_flags(|f| {
            let mut out = *f & CF;
            if value & 0x80 != 0 {
                out |= SF;
            }
            if value == 0 {
                out |= ZF;
            }
            if iff {
                out |= PF;
            }
            *f = (*f & !(SF | ZF | HF | PF | NF | CF)) | out;
        });
    }

    /// RLD (`left`) / RRD: rotate a BCD digit between A and (HL).
    fn rotate_decimal<B: Bus>(&mut self, bus: &mut B, left: bool) -> Result<(), BusError> {
        let addr = self.regs.get16(Reg16::HL);
        let memory = bus.read(addr)?;
        let a = self.regs.a();

        let (memory, low) = if left {
            ((memory << 4) | (a & 0x0F), memory >> 4)
        } else {
            ((a << 4) | (memory >> 4), memory & 0x0F)
        };
        let a = (a & 0xF0) | low;

        bus.write(addr, memory)?;
        self.regs.set_a(a);
        self.with_flags(|f| alu::load_flags(a, f));
        Ok(())
    }

    /// Step a block pointer pair once its memory access has succeeded.
    fn advance(&mut self, reg: Reg16, block: Block) {
        let value = self.regs.get16(reg);
        self.regs.set16(reg, value.wrapping_add_signed(block.step));
    }

    /// Decrement BC and report whether it is still non-zero.
    fn count_down(&mut self) -> bool {
        let bc = self.regs.get16(Reg16::BC).wrapping_sub(1);
        self.regs.set16(Reg16::BC, bc);
        bc != 0
    }

    /// Rewind PC over the two opcode bytes so the instruction runs again.
    fn repeat(&mut self) {
        self.regs.pc = self.regs.pc.wrapping_sub(2);
    }

    /// LDI / LDD / LDIR / LDDR
    fn block_load<B: Bus>(&mut self, block: Block, bus: &mut B) -> Result<(), BusError> {
        let value = bus.read(self.regs.get16(Reg16::HL))?;
        bus.write(self.regs.get16(Reg16::DE), value)?;
        self.advance(Reg16::HL, block);
        self.advance(Reg16::DE, block);

        let more = self.count_down();
        self.with_flags(|f| {
            *f &= !(HF | NF | PF);
            if more {
                *f |= PF;
            }
        });
        if block.repeat && more {
            self.repeat();
        }
        Ok(())
    }

    /// CPI / CPD / CPIR / CPDR: repeat until BC runs out or A matches.
    fn block_compare<B: Bus>(&mut self, block: Block, bus: &mut B) -> Result<(), BusError> {
        let value = bus.read(self.regs.get16(Reg16::HL))?;
        self.advance(Reg16::HL, block);
        let a = self.regs.a();

        let more = self.count_down();
        let matched = self.with_flags(|f| {
            let carry = *f & CF;
            alu::subtract(a, value, f, false);
            *f = (*f & !(CF | PF)) | carry;
            if more {
                *f |= PF;
            }
            *f & ZF != 0
        });
        if block.repeat && more && !matched {
            self.repeat();
        }
        Ok(())
    }

    /// INI / IND / INIR / INDR: B counts, Z set when it reaches zero.
    fn block_input<B: Bus>(
        &mut self,
        block: Block,
        bus: &mut B,
        io: &mut dyn IoDevice,
    ) -> Result<(), BusError> {
        let value = io.read(self.regs.get8(Reg8::C));
        bus.write(self.regs.get16(Reg16::HL), value)?;
        self.advance(Reg16::HL, block);
        self.block_count(block);
        Ok(())
    }

    /// OUTI / OUTD / OTIR / OTDR: B is decremented before the write.
    fn block_output<B: Bus>(
        &mut self,
        block: Block,
        bus: &mut B,
        io: &mut dyn IoDevice,
    ) -> Result<(), BusError> {
        let value = bus.read(self.regs.get16(Reg16::HL))?;
        self.advance(Reg16::HL, block);
        self.block_count(block);
        io.write(self.regs.get8(Reg8::C), value);
        Ok(())
    }

    fn block_count(&mut self, block: Block) {
        let b = self.regs.get8(Reg8::B);
        let b = self.with_flags(|f| {
            let result = alu::decrement(b, f);
            *f |= NF;
            result
        });
        self.regs.set8(Reg8::B, b);
        if block.repeat && b != 0 {
            self.repeat();
        }
    }
}
