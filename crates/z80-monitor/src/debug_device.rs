//! Port-space tracer.

use emu_core::IoDevice;
use tracing::info;

/// Logs every IN and OUT. Reads return 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugDevice;

impl IoDevice for DebugDevice {
    fn read(&mut self, port: u8) -> u8 {
        info!("IO: read from {port:#04x}");
        0
    }

    fn write(&mut self, port: u8, value: u8) {
        info!("IO: write {value:#04x} to {port:#04x}");
    }
}
