//! CP/M BDOS call trap.
//!
//! Programs call BDOS with the function number in C and the argument in
//! DE or E:
//!
//! ```text
//!     LD  DE,message
//!     LD  C,9
//!     CALL 5
//! ```
//!
//! Only the two console-output functions are serviced, which is enough to
//! run the ZEXDOC/ZEXALL exercisers.

use std::io::{self, Write};

use emu_core::{Bus, BusError, Cpu, IoDevice};
use thiserror::Error;
use tracing::{debug, warn};
use zilog_z80::{Machine, Reg8, Reg16};

/// BDOS entry point.
pub const BDOS_ENTRY: u16 = 0x0005;
/// Top of the transient program area, stored at 0x0006.
pub const TPA_TOP: u16 = 0xFE00;

/// Console output.
const WRITE_CHAR: u8 = 2;
/// `$`-terminated string output.
const WRITE_STRING: u8 = 9;

#[derive(Debug, Error)]
pub enum TrapError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("console write failed: {0}")]
    Io(#[from] io::Error),
}

/// Write the CP/M zero page: HALT at warm boot, RET at the BDOS entry and
/// the TPA top for programs that set their stack from it.
pub fn install<D: IoDevice>(machine: &mut Machine<D>) -> Result<(), BusError> {
    machine.load(0x0000, &[0x76])?;
    machine.load(BDOS_ENTRY, &[0xC9])?;
    machine.load(0x0006, &TPA_TOP.to_le_bytes())
}

/// Service a BDOS call if PC sits on the entry point.
///
/// Returns `Ok(true)` when a call was handled; the machine has then
/// already returned to the caller.
pub fn service<D: IoDevice, W: Write>(
    machine: &mut Machine<D>,
    console: &mut W,
) -> Result<bool, TrapError> {
    if machine.pc() != BDOS_ENTRY {
        return Ok(false);
    }

    let regs = machine.cpu().registers();
    let function = regs.get8(Reg8::C);
    let de = regs.get16(Reg16::DE);
    debug!(function, de, "BDOS call");

    match function {
        WRITE_CHAR => console.write_all(&[regs.get8(Reg8::E)])?,
        WRITE_STRING => {
            let text = read_string(machine, de)?;
            console.write_all(&text)?;
        }
        _ => warn!(function, "unsupported BDOS function"),
    }
    console.flush()?;

    machine.force_ret()?;
    Ok(true)
}

/// Collect bytes from `addr` up to the `$` terminator.
fn read_string<D: IoDevice>(machine: &mut Machine<D>, mut addr: u16) -> Result<Vec<u8>, BusError> {
    let mut text = Vec::new();
    for _ in 0..=u16::MAX {
        let byte = machine.memory_mut().read(addr)?;
        if byte == b'$' {
            break;
        }
        text.push(byte);
        addr = addr.wrapping_add(1);
    }
    Ok(text)
}
