//! Core traits and types for instruction-level emulation.
//!
//! The CPU never owns memory or devices. Both are handed to it on every
//! step as services, which keeps CPUs testable against any backing store.

mod bus;
mod cpu;
mod io;
mod observable;
mod ram;

pub use bus::{Bus, BusError};
pub use cpu::Cpu;
pub use io::{IoDevice, NullDevice};
pub use observable::{Observable, Value};
pub use ram::{RAM_SIZE, Ram};
