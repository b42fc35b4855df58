//! Instruction-level Z80 CPU emulator.
//!
//! Each call to `step()` decodes and executes exactly one instruction.
//! Timing is not modelled; side effects on registers, flags, memory and
//! ports match the documented instruction set.

pub mod alu;
mod cpu;
mod decode;
mod flags;
mod machine;
mod operand;
mod registers;

pub use cpu::Z80;
pub use decode::OpcodeFields;
pub use flags::{CF, Condition, HF, NF, PF, SF, ZF, parity};
pub use machine::Machine;
pub use operand::Operand;
pub use registers::{IndexMode, Reg8, Reg16, RegisterBank, RegisterPair, Registers};
