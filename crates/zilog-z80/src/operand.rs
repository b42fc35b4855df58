//! 8-bit operand locations.

use emu_core::{Bus, BusError};

use crate::registers::{Reg8, Registers};

/// Where an 8-bit operand lives once its selector has been resolved.
///
/// Selector 6 names memory: `(HL)`, or `(IX+d)` / `(IY+d)` under an index
/// prefix. Every other selector names a register. Resolution happens once
/// per instruction, so a displacement byte is fetched exactly once even
/// for read-modify-write instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg8),
    Mem(u16),
}

impl Operand {
    pub fn read<B: Bus>(self, regs: &Registers, bus: &mut B) -> Result<u8, BusError> {
        match self {
            Self::Reg(reg) => Ok(regs.get8(reg)),
            Self::Mem(addr) => bus.read(addr),
        }
    }

    pub fn write<B: Bus>(self, regs: &mut Registers, bus: &mut B, value: u8) -> Result<(), BusError> {
        match self {
            Self::Reg(reg) => {
                regs.set8(reg, value);
                Ok(())
            }
            Self::Mem(addr) => bus.write(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use emu_core::Ram;

    use super::*;

    #[test]
    fn register_and_memory_share_call_shape() {
        let mut regs = Registers::default();
        let mut ram = Ram::new();

        for operand in [Operand::Reg(Reg8::D), Operand::Mem(0x4000)] {
            operand.write(&mut regs, &mut ram, 0x5A).unwrap();
            assert_eq!(operand.read(&regs, &mut ram).unwrap(), 0x5A);
        }
        assert_eq!(regs.get8(Reg8::D), 0x5A);
        assert_eq!(ram.read(0x4000).unwrap(), 0x5A);
    }

    #[test]
    fn memory_fault_propagates() {
        let mut regs = Registers::default();
        let mut ram = Ram::with_size(0x100);
        let err = Operand::Mem(0x0200).read(&regs, &mut ram).unwrap_err();
        assert!(matches!(err, BusError::OutOfBounds { address: 0x0200, .. }));
        assert!(Operand::Mem(0x0200).write(&mut regs, &mut ram, 1).is_err());
    }
}
