//! A Z80 with its memory and I/O device attached.

use emu_core::{BusError, Cpu, IoDevice, NullDevice, Ram};

use crate::cpu::Z80;

/// Processor instance: CPU, 64K of RAM and one I/O device.
///
/// The device type is a parameter so a machine is `Send` whenever its
/// device is. Drivers that pick the device at run time can use
/// `Machine<Box<dyn IoDevice>>`.
#[derive(Debug)]
pub struct Machine<D = NullDevice> {
    cpu: Z80,
    memory: Ram,
    device: D,
}

impl Machine<NullDevice> {
    /// A machine with 64K of zeroed RAM and no device.
    #[must_use]
    pub fn new() -> Self {
        Self::with_memory(Ram::new())
    }

    #[must_use]
    pub fn with_memory(memory: Ram) -> Self {
        Self {
            cpu: Z80::new(),
            memory,
            device: NullDevice,
        }
    }
}

impl Default for Machine<NullDevice> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: IoDevice> Machine<D> {
    /// Replace the I/O device, keeping CPU and memory state.
    #[must_use]
    pub fn attach<E: IoDevice>(self, device: E) -> Machine<E> {
        Machine {
            cpu: self.cpu,
            memory: self.memory,
            device,
        }
    }

    /// Copy a binary image into memory at `base`.
    pub fn load(&mut self, base: u16, bytes: &[u8]) -> Result<(), BusError> {
        self.memory.load(base, bytes)
    }

    pub fn set_pc(&mut self, address: u16) {
        self.cpu.set_pc(address);
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    /// Execute one instruction. Does nothing once halted.
    pub fn step(&mut self) -> Result<(), BusError> {
        self.cpu.step(&mut self.memory, &mut self.device)
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Human-readable register dump.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = self.cpu.registers().to_string();
        if self.is_halted() {
            out.push_str("\nHALTED");
        }
        out
    }

    /// Finish a call the driver serviced itself: pop PC.
    pub fn force_ret(&mut self) -> Result<(), BusError> {
        self.cpu.force_ret(&mut self.memory)
    }

    #[must_use]
    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    #[must_use]
    pub fn memory(&self) -> &Ram {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Ram {
        &mut self.memory
    }

    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
