//! CB-prefixed instructions: rotates, shifts, BIT, RES, SET.

use emu_core::{Bus, BusError};

use crate::alu::{self, Shift};
use crate::decode::OpcodeFields;
use crate::operand::Operand;
use crate::registers::IndexMode;

use super::Z80;

impl Z80 {
    /// `CB op`: operand selected by `z`, never indexed.
    pub(super) fn execute_bits<B: Bus>(&mut self, opcode: u8, bus: &mut B) -> Result<(), BusError> {
        let fields = OpcodeFields::decode(opcode);
        let target = self.operand(fields.z, IndexMode::Hl, bus)?;
        self.apply_bits(fields, target, bus)
    }

    /// `DD CB d op` / `FD CB d op`: the displacement precedes the opcode and
    /// the operand is always `(IX+d)` / `(IY+d)`.
    pub(super) fn execute_indexed_bits<B: Bus>(
        &mut self,
        mode: IndexMode,
        bus: &mut B,
    ) -> Result<(), BusError> {
        let address = self.memory_address(mode, bus)?;
        let opcode = self.fetch_byte(bus)?;
        self.apply_bits(OpcodeFields::decode(opcode), Operand::Mem(address), bus)
    }

    fn apply_bits<B: Bus>(
        &mut self,
        fields: OpcodeFields,
        target: Operand,
        bus: &mut B,
    ) -> Result<(), BusError> {
        let OpcodeFields { x, y, .. } = fields;
        let value = target.read(&self.regs, bus)?;
        let mask = 1u8 << y;

        let result = match x {
            0 => self.with_flags(|f| alu::shift(Shift::from_index(y), value, f)),
            1 => {
                self.with_flags(|f| alu::bit_test(value, y, f));
                return Ok(());
            }
            2 => value & !mask,
            _ => value | mask,
        };
        target.write(&mut self.regs, bus, result)
    }
}
