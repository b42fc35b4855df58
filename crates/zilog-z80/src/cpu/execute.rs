//! Unprefixed (and DD/FD-prefixed) instructions.

use emu_core::{Bus, BusError, IoDevice};
use tracing::debug;

use crate::alu::{self, AluOp, Shift};
use crate::decode::OpcodeFields;
use crate::flags::Condition;
use crate::operand::Operand;
use crate::registers::{IndexMode, Reg8, Reg16};

use super::Z80;

impl Z80 {
    /// Execute one main-page instruction. `mode` substitutes IX or IY for
    /// HL when the opcode came behind an index prefix.
    pub(super) fn execute_main<B: Bus>(
        &mut self,
        opcode: u8,
        mode: IndexMode,
        bus: &mut B,
        io: &mut dyn IoDevice,
    ) -> Result<(), BusError> {
        let OpcodeFields { x, y, z, p, q } = OpcodeFields::decode(opcode);
        let hl = mode.pair();

        match (x, z) {
            // =================================================================
            // x = 0: relative jumps, 16-bit loads, indirect loads, INC/DEC,
            // immediate loads, accumulator operations
            // =================================================================
            (0, 0) => match y {
                // NOP
                0 => {}
                // EX AF,AF'
                1 => self.regs.exchange_af(),
                // DJNZ d
                2 => {
                    let d = self.fetch_displacement(bus)?;
                    let b = self.regs.get8(Reg8::B).wrapping_sub(1);
                    self.regs.set8(Reg8::B, b);
                    if b != 0 {
                        self.relative_jump(d);
                    }
                }
                // JR d
                3 => {
                    let d = self.fetch_displacement(bus)?;
                    self.relative_jump(d);
                }
                // JR cc,d (NZ, Z, NC, C only)
                _ => {
                    let d = self.fetch_displacement(bus)?;
                    if Condition::from_index(y - 4).evaluate(self.regs.f()) {
                        self.relative_jump(d);
                    }
                }
            },

            (0, 1) => {
                let rp = Reg16::rp(p, mode);
                if q == 0 {
                    // LD rr,nn
                    let value = self.fetch_word(bus)?;
                    self.regs.set16(rp, value);
                } else {
                    // ADD HL,rr
                    let a = self.regs.get16(hl);
                    let b = self.regs.get16(rp);
                    let result = self.with_flags(|f| alu::add16(a, b, f));
                    self.regs.set16(hl, result);
                }
            }

            (0, 2) => match (q, p) {
                // LD (BC),A / LD (DE),A
                (0, 0 | 1) => {
                    let addr = self.regs.get16(Reg16::rp(p, mode));
                    bus.write(addr, self.regs.a())?;
                }
                // LD (nn),HL
                (0, 2) => {
                    let addr = self.fetch_word(bus)?;
                    bus.write_word(addr, self.regs.get16(hl))?;
                }
                // LD (nn),A
                (0, _) => {
                    let addr = self.fetch_word(bus)?;
                    bus.write(addr, self.regs.a())?;
                }
                // LD A,(BC) / LD A,(DE)
                (_, 0 | 1) => {
                    let addr = self.regs.get16(Reg16::rp(p, mode));
                    let value = bus.read(addr)?;
                    self.regs.set_a(value);
                }
                // LD HL,(nn)
                (_, 2) => {
                    let addr = self.fetch_word(bus)?;
                    let value = bus.read_word(addr)?;
                    self.regs.set16(hl, value);
                }
                // LD A,(nn)
                _ => {
                    let addr = self.fetch_word(bus)?;
                    let value = bus.read(addr)?;
                    self.regs.set_a(value);
                }
            },

            // INC rr / DEC rr: no flags
            (0, 3) => {
                let rp = Reg16::rp(p, mode);
                let value = self.regs.get16(rp);
                let value = if q == 0 {
                    value.wrapping_add(1)
                } else {
                    value.wrapping_sub(1)
                };
                self.regs.set16(rp, value);
            }

            // INC r / DEC r
            (0, 4 | 5) => {
                let target = self.operand(y, mode, bus)?;
                let value = target.read(&self.regs, bus)?;
                let result = if z == 4 {
                    self.with_flags(|f| alu::increment(value, f))
                } else {
                    self.with_flags(|f| alu::decrement(value, f))
                };
                target.write(&mut self.regs, bus, result)?;
            }

            // LD r,n
            (0, 6) => {
                // The displacement of (IX+d) comes before n.
                let target = self.operand(y, mode, bus)?;
                let value = self.fetch_byte(bus)?;
                target.write(&mut self.regs, bus, value)?;
            }

            (0, 7) => {
                let a = self.regs.a();
                let result = match y {
                    0..=3 => self.with_flags(|f| alu::rotate_accumulator(Shift::from_index(y), a, f)),
                    4 => self.with_flags(|f| alu::decimal_adjust(a, f)),
                    5 => self.with_flags(|f| alu::complement(a, f)),
                    6 => {
                        self.with_flags(alu::set_carry);
                        a
                    }
                    _ => {
                        self.with_flags(alu::complement_carry);
                        a
                    }
                };
                self.regs.set_a(result);
            }

            // =================================================================
            // x = 1: LD r,r' and HALT
            // =================================================================
            (1, _) if y == 6 && z == 6 => {
                debug!(pc = self.regs.pc.wrapping_sub(1), "halted");
                self.halted = true;
            }

            (1, _) => {
                // With (IX+d) on one side, the other side means plain H/L.
                let reg_mode = if y == 6 || z == 6 { IndexMode::Hl } else { mode };
                let source = self.register_or_memory(z, mode, reg_mode, bus)?;
                let value = source.read(&self.regs, bus)?;
                let target = self.register_or_memory(y, mode, reg_mode, bus)?;
                target.write(&mut self.regs, bus, value)?;
            }

            // =================================================================
            // x = 2: ALU A,r
            // =================================================================
            (2, _) => {
                let source = self.operand(z, mode, bus)?;
                let value = source.read(&self.regs, bus)?;
                self.accumulate(AluOp::from_index(y), value);
            }

            // =================================================================
            // x = 3: control flow, stack, I/O, immediate ALU
            // =================================================================
            // RET cc
            (3, 0) => {
                if Condition::from_index(y).evaluate(self.regs.f()) {
                    self.regs.pc = self.pop(bus)?;
                }
            }

            (3, 1) => match (q, p) {
                // POP rr
                (0, _) => {
                    let value = self.pop(bus)?;
                    self.regs.set16(Reg16::rp2(p, mode), value);
                }
                // RET
                (_, 0) => self.regs.pc = self.pop(bus)?,
                // EXX
                (_, 1) => self.regs.exchange_banks(),
                // JP (HL)
                (_, 2) => self.regs.pc = self.regs.get16(hl),
                // LD SP,HL
                _ => self.regs.sp = self.regs.get16(hl),
            },

            // JP cc,nn
            (3, 2) => {
                let target = self.fetch_word(bus)?;
                if Condition::from_index(y).evaluate(self.regs.f()) {
                    self.regs.pc = target;
                }
            }

            (3, 3) => match y {
                // JP nn
                0 => self.regs.pc = self.fetch_word(bus)?,
                // OUT (n),A
                2 => {
                    let port = self.fetch_byte(bus)?;
                    io.write(port, self.regs.a());
                }
                // IN A,(n): flags unaffected
                3 => {
                    let port = self.fetch_byte(bus)?;
                    let value = io.read(port);
                    self.regs.set_a(value);
                }
                // EX (SP),HL
                4 => {
                    let sp = self.regs.sp;
                    let stacked = bus.read_word(sp)?;
                    bus.write_word(sp, self.regs.get16(hl))?;
                    self.regs.set16(hl, stacked);
                }
                // EX DE,HL: never indexed
                5 => {
                    let de = self.regs.main.de.get();
                    self.regs.main.de.set(self.regs.main.hl.get());
                    self.regs.main.hl.set(de);
                }
                // DI
                6 => self.iff = false,
                // EI
                7 => self.iff = true,
                _ => unreachable!("prefix {opcode:#04X} reached the main page"),
            },

            // CALL cc,nn
            (3, 4) => {
                let target = self.fetch_word(bus)?;
                if Condition::from_index(y).evaluate(self.regs.f()) {
                    self.call(target, bus)?;
                }
            }

            (3, 5) => match (q, p) {
                // PUSH rr
                (0, _) => {
                    let value = self.regs.get16(Reg16::rp2(p, mode));
                    self.push(bus, value)?;
                }
                // CALL nn
                (_, 0) => {
                    let target = self.fetch_word(bus)?;
                    self.call(target, bus)?;
                }
                _ => unreachable!("prefix {opcode:#04X} reached the main page"),
            },

            // ALU A,n
            (3, 6) => {
                let value = self.fetch_byte(bus)?;
                self.accumulate(AluOp::from_index(y), value);
            }

            // RST y*8
            (3, _) => {
                let pc = self.regs.pc;
                self.push(bus, pc)?;
                self.regs.pc = u16::from(y) * 8;
            }

            _ => unreachable!("opcode field x = {x} out of range"),
        }

        Ok(())
    }

    /// Resolve an `r` selector where register halves follow `reg_mode`
    /// while selector 6 still follows the prefix.
    fn register_or_memory<B: Bus>(
        &mut self,
        index: u8,
        mode: IndexMode,
        reg_mode: IndexMode,
        bus: &mut B,
    ) -> Result<Operand, BusError> {
        if index == 6 {
            self.operand(index, mode, bus)
        } else {
            self.operand(index, reg_mode, bus)
        }
    }

    /// Apply an accumulator ALU operation.
    fn accumulate(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a();
        let result = self.with_flags(|f| op.apply(a, value, f));
        self.regs.set_a(result);
    }

    fn call<B: Bus>(&mut self, target: u16, bus: &mut B) -> Result<(), BusError> {
        debug!(from = self.regs.pc, target, "call");
        let pc = self.regs.pc;
        self.push(bus, pc)?;
        self.regs.pc = target;
        Ok(())
    }
}
