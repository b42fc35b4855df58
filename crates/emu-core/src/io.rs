//! Port-mapped I/O device interface.

/// A device on the CPU's I/O port space.
///
/// The Z80 reaches these through IN and OUT. Accesses complete
/// synchronously; a device that has nothing to say returns 0.
pub trait IoDevice {
    /// Read a byte from the given port.
    fn read(&mut self, port: u8) -> u8;

    /// Write a byte to the given port.
    fn write(&mut self, port: u8, value: u8);
}

impl<D: IoDevice + ?Sized> IoDevice for Box<D> {
    fn read(&mut self, port: u8) -> u8 {
        (**self).read(port)
    }

    fn write(&mut self, port: u8, value: u8) {
        (**self).write(port, value);
    }
}

/// Stand-in for an empty port space: reads return 0, writes vanish.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDevice;

impl IoDevice for NullDevice {
    fn read(&mut self, _port: u8) -> u8 {
        0
    }

    fn write(&mut self, _port: u8, _value: u8) {}
}
