//! Flat RAM backing store.

use std::fmt::Write as _;

use crate::bus::{Bus, BusError};

/// Size of a full 16-bit address space.
pub const RAM_SIZE: usize = 0x1_0000;

/// Flat, bounds-checked RAM.
///
/// A full 64K space can never fault on a 16-bit address; smaller spaces
/// report accesses past their end as [`BusError::OutOfBounds`].
#[derive(Debug, Clone)]
pub struct Ram {
    data: Vec<u8>,
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    /// Create a zeroed 64K RAM.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(RAM_SIZE)
    }

    /// Create a zeroed RAM of `size` bytes (clamped to the 16-bit space).
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            data: vec![0; size.min(RAM_SIZE)],
        }
    }

    /// Capacity in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Copy `bytes` into memory starting at `base`.
    ///
    /// Fails without writing anything if the range runs past the end.
    pub fn load(&mut self, base: u16, bytes: &[u8]) -> Result<(), BusError> {
        let start = usize::from(base);
        let end = start + bytes.len();
        if end > self.data.len() {
            return Err(BusError::LoadOverflow {
                base,
                len: bytes.len(),
                size: self.data.len(),
            });
        }
        self.data[start..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Mutable handle to a single byte.
    pub fn byte_mut(&mut self, address: u16) -> Result<&mut u8, BusError> {
        let size = self.data.len();
        self.data
            .get_mut(usize::from(address))
            .ok_or(BusError::OutOfBounds { address, size })
    }

    /// Hex dump of `len` bytes starting at `start`, 16 bytes per line.
    ///
    /// The range is clipped to the end of memory.
    #[must_use]
    pub fn dump(&self, start: u16, len: usize) -> String {
        let from = usize::from(start).min(self.data.len());
        let to = (from + len).min(self.data.len());
        let mut out = String::new();

        for (row, chunk) in self.data[from..to].chunks(16).enumerate() {
            let _ = write!(out, "{:04x} ", from + row * 16);
            for i in 0..16 {
                match chunk.get(i) {
                    Some(byte) => {
                        let _ = write!(out, " {byte:02x}");
                    }
                    None => out.push_str("   "),
                }
                if i == 7 {
                    out.push(' ');
                }
            }
            out.push_str("  |");
            for &byte in chunk {
                out.push(if byte.is_ascii_graphic() || byte == b' ' {
                    byte as char
                } else {
                    '.'
                });
            }
            out.push_str("|\n");
        }

        out
    }
}

impl Bus for Ram {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        self.data
            .get(usize::from(address))
            .copied()
            .ok_or(BusError::OutOfBounds {
                address,
                size: self.data.len(),
            })
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        *self.byte_mut(address)? = value;
        Ok(())
    }
}
