//! Z80 SIO/2 serial controller, channel A only.
//!
//! Port map (base 0x20):
//!
//! | Port | Access                  |
//! |------|-------------------------|
//! | 0x20 | channel A data          |
//! | 0x21 | channel B data          |
//! | 0x22 | channel A control       |
//! | 0x23 | channel B control       |

use std::collections::VecDeque;
use std::io::Write;

use emu_core::IoDevice;
use tracing::{info, warn};

pub const SIO_BASE: u8 = 0x20;
pub const SIO_A_DATA: u8 = SIO_BASE;
pub const SIO_B_DATA: u8 = SIO_BASE + 1;
pub const SIO_A_CTRL: u8 = SIO_BASE + 2;
pub const SIO_B_CTRL: u8 = SIO_BASE + 3;

/// RR0 bit 0: a received character is available.
pub const RX_AVAILABLE: u8 = 1 << 0;
/// RR0 bit 2: the transmit buffer is empty.
pub const TX_EMPTY: u8 = 1 << 2;

/// Channel A is wired to a byte sink for transmit and a queue for receive.
#[derive(Debug)]
pub struct Sio<W: Write> {
    rx: VecDeque<u8>,
    tx: W,
}

impl<W: Write> Sio<W> {
    pub fn new(tx: W) -> Self {
        Self {
            rx: VecDeque::new(),
            tx,
        }
    }

    /// Queue bytes for the CPU to receive on channel A.
    pub fn queue_input(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// The transmit sink.
    pub fn output(&self) -> &W {
        &self.tx
    }

    fn status(&self) -> u8 {
        let mut rr0 = TX_EMPTY;
        if !self.rx.is_empty() {
            rr0 |= RX_AVAILABLE;
        }
        rr0
    }

    fn transmit(&mut self, value: u8) {
        info!(value, ch = %char::from(value).escape_default(), "SIO transmit");
        // A failed console write must not stop the CPU; the byte is lost.
        if let Err(e) = self.tx.write_all(&[value]).and_then(|()| self.tx.flush()) {
            warn!(error = %e, "SIO transmit failed");
        }
    }
}

impl<W: Write> IoDevice for Sio<W> {
    fn read(&mut self, port: u8) -> u8 {
        match port {
            SIO_A_DATA => self.rx.pop_front().unwrap_or(0),
            SIO_A_CTRL => self.status(),
            _ => {
                warn!(port, "SIO channel B read not supported");
                0
            }
        }
    }

    fn write(&mut self, port: u8, value: u8) {
        match port {
            SIO_A_DATA => self.transmit(value),
            // Write registers are accepted but not modelled.
            SIO_A_CTRL => {}
            _ => warn!(port, value, "SIO channel B write not supported"),
        }
    }
}
