//! Memory bus interface.

use thiserror::Error;

/// A memory access the backing store cannot satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// A single-byte access fell outside the addressable space.
    #[error("address {address:#06X} is outside memory of {size} bytes")]
    OutOfBounds { address: u16, size: usize },

    /// A bulk load would run past the end of memory.
    #[error("loading {len} bytes at {base:#06X} overruns memory of {size} bytes")]
    LoadOverflow { base: u16, len: usize, size: usize },
}

/// Byte-addressable memory as seen by a CPU.
///
/// Implementors provide single-byte access; the word and stack helpers are
/// built on top of it. Words are little-endian and addresses wrap at the
/// 16-bit boundary.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> Result<u8, BusError>;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError>;

    /// Read a byte at `cursor` and advance the cursor by one.
    fn fetch(&mut self, cursor: &mut u16) -> Result<u8, BusError> {
        let value = self.read(*cursor)?;
        *cursor = cursor.wrapping_add(1);
        Ok(value)
    }

    /// Read a little-endian word.
    fn read_word(&mut self, address: u16) -> Result<u16, BusError> {
        let lo = self.read(address)?;
        let hi = self.read(address.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Read a little-endian word at `cursor` and advance the cursor by two.
    fn fetch_word(&mut self, cursor: &mut u16) -> Result<u16, BusError> {
        let value = self.read_word(*cursor)?;
        *cursor = cursor.wrapping_add(2);
        Ok(value)
    }

    /// Write a little-endian word.
    fn write_word(&mut self, address: u16, value: u16) -> Result<(), BusError> {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo)?;
        self.write(address.wrapping_add(1), hi)
    }

    /// Push a word: decrement SP, store the high byte, decrement, store the low.
    fn push_word(&mut self, sp: &mut u16, value: u16) -> Result<(), BusError> {
        let [lo, hi] = value.to_le_bytes();
        *sp = sp.wrapping_sub(1);
        self.write(*sp, hi)?;
        *sp = sp.wrapping_sub(1);
        self.write(*sp, lo)
    }

    /// Pop a word: low byte at SP, high byte at SP+1, SP advances by two.
    fn pop_word(&mut self, sp: &mut u16) -> Result<u16, BusError> {
        let lo = self.fetch(sp)?;
        let hi = self.fetch(sp)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}
