//! Load-and-step monitor for the Z80 emulator.
//!
//! A binary image is loaded at an origin address and driven one
//! instruction at a time from a line prompt. The CPU's port space is
//! wired to one of a small set of devices, and CP/M console calls can be
//! trapped so CP/M test programs run unmodified.

pub mod bdos;
pub mod command;
pub mod config;
pub mod debug_device;
pub mod monitor;
pub mod sio;

pub use command::{Command, CommandError};
pub use config::{Cli, DeviceKind, MonitorConfig};
pub use monitor::{Flow, Monitor, make_device};
