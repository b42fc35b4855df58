//! CPU core trait.

use crate::{Bus, BusError, IoDevice};

/// A CPU core driven one instruction at a time.
///
/// Memory and I/O are passed in, not owned, so the caller decides what
/// backs them. Faults from the bus propagate out of `step` unchanged.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute exactly one instruction.
    ///
    /// A halted CPU does nothing and returns `Ok`.
    fn step<B: Bus>(&mut self, bus: &mut B, io: &mut dyn IoDevice) -> Result<(), BusError>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its initial state.
    fn reset(&mut self);
}
