//! The monitor session: a machine, its settings and the console it prints to.

use std::io::{self, Write};

use emu_core::{Bus, BusError, IoDevice, NullDevice, Observable};
use tracing::{debug, info};
use zilog_z80::Machine;

use crate::bdos::{self, TrapError};
use crate::command::Command;
use crate::config::{DeviceKind, MonitorConfig};
use crate::debug_device::DebugDevice;
use crate::sio::Sio;

/// Whether the prompt loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Build the device selected on the command line.
///
/// SIO output goes to stdout; `rx` is queued on its receive channel.
pub fn make_device(kind: DeviceKind, rx: &[u8]) -> Box<dyn IoDevice> {
    match kind {
        DeviceKind::Sio => {
            let mut sio = Sio::new(io::stdout());
            sio.queue_input(rx);
            Box::new(sio)
        }
        DeviceKind::Debug => Box::new(DebugDevice),
        DeviceKind::None => Box::new(NullDevice),
    }
}

pub struct Monitor<W: Write> {
    machine: Machine<Box<dyn IoDevice>>,
    config: MonitorConfig,
    out: W,
}

impl<W: Write> Monitor<W> {
    /// Load `image` at the configured origin and point PC at it.
    pub fn new(
        config: MonitorConfig,
        image: &[u8],
        device: Box<dyn IoDevice>,
        out: W,
    ) -> Result<Self, BusError> {
        let mut machine = Machine::new().attach(device);
        if config.bdos {
            bdos::install(&mut machine)?;
        }
        machine.load(config.origin, image)?;
        machine.set_pc(config.origin);
        info!(
            origin = config.origin,
            len = image.len(),
            bdos = config.bdos,
            "image loaded"
        );

        Ok(Self {
            machine,
            config,
            out,
        })
    }

    /// Execute one instruction, or service a BDOS call sitting at PC.
    pub fn step(&mut self) -> Result<(), TrapError> {
        if self.config.bdos && bdos::service(&mut self.machine, &mut self.out)? {
            return Ok(());
        }
        self.machine.step()?;
        Ok(())
    }

    /// Run one prompt command, printing its result.
    ///
    /// Emulation faults are reported on the console and leave the session
    /// running. Only console write failures are returned.
    pub fn execute(&mut self, command: Command) -> io::Result<Flow> {
        debug!(?command, "execute");
        match command {
            Command::Step => self.run(1)?,
            Command::StepMany(count) => self.run(count)?,
            Command::RunUntilStop => self.run_until_stop()?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Registers => writeln!(self.out, "{}", self.machine.dump())?,
            Command::Memory { addr, len } => {
                write!(self.out, "{}", self.machine.memory().dump(addr, len))?;
            }
            Command::Write { addr, value } => {
                if let Err(e) = self.machine.memory_mut().write(addr, value) {
                    writeln!(self.out, "error: {e}")?;
                }
            }
            Command::Query(path) => match self.machine.cpu().query(&path) {
                Some(value) => writeln!(self.out, "{path} = {value}")?,
                None => writeln!(
                    self.out,
                    "unknown path {path:?}; known: {}",
                    self.machine.cpu().query_paths().join(" ")
                )?,
            },
            Command::SetPc(addr) => {
                self.machine.set_pc(addr);
                writeln!(self.out, "PC = {addr:04X}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn run(&mut self, count: usize) -> io::Result<()> {
        for _ in 0..count {
            if self.machine.is_halted() {
                break;
            }
            if let Err(e) = self.step() {
                writeln!(self.out, "error: {e}")?;
                break;
            }
        }
        writeln!(self.out, "{}", self.machine.dump())
    }

    /// Step at least once, then until PC hits the stop address or HALT.
    fn run_until_stop(&mut self) -> io::Result<()> {
        loop {
            if let Err(e) = self.step() {
                writeln!(self.out, "error: {e}")?;
                break;
            }
            if self.machine.pc() == self.config.stop_at || self.machine.is_halted() {
                break;
            }
        }
        writeln!(self.out, "{}", self.machine.dump())
    }

    pub fn machine(&self) -> &Machine<Box<dyn IoDevice>> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine<Box<dyn IoDevice>> {
        &mut self.machine
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}
