//! Monitor prompt commands.

use thiserror::Error;

use crate::config::{parse_u8, parse_u16};

/// Steps taken by `nt`.
pub const BURST_STEPS: usize = 100;
/// Bytes shown by `m` when no length is given.
pub const DEFAULT_DUMP_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line or `n`.
    Step,
    /// `nt`
    StepMany(usize),
    /// `o`: step until PC reaches the stop address or the CPU halts.
    RunUntilStop,
    /// `q`
    Quit,
    /// `r`
    Registers,
    /// `m addr [len]`
    Memory { addr: u16, len: usize },
    /// `w addr byte`
    Write { addr: u16, value: u8 },
    /// `p path`
    Query(String),
    /// `pc addr`
    SetPc(u16),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{command}: missing {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("{0}")]
    BadNumber(String),
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),
}

impl Command {
    /// Parse one prompt line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Step);
        };

        let command = match head {
            "n" => Command::Step,
            "nt" => Command::StepMany(BURST_STEPS),
            "o" => Command::RunUntilStop,
            "q" => Command::Quit,
            "r" => Command::Registers,
            "m" => {
                let addr = address(words.next(), "m")?;
                let len = match words.next() {
                    Some(text) => usize::from(parse_u16(text).map_err(CommandError::BadNumber)?),
                    None => DEFAULT_DUMP_LEN,
                };
                Command::Memory { addr, len }
            }
            "w" => {
                let addr = address(words.next(), "w")?;
                let text = words.next().ok_or(CommandError::MissingArgument {
                    command: "w",
                    what: "byte",
                })?;
                let value = parse_u8(text).map_err(CommandError::BadNumber)?;
                Command::Write { addr, value }
            }
            "p" => {
                let path = words.next().ok_or(CommandError::MissingArgument {
                    command: "p",
                    what: "path",
                })?;
                Command::Query(path.to_ascii_lowercase())
            }
            "pc" => Command::SetPc(address(words.next(), "pc")?),
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        if words.next().is_some() {
            return Err(CommandError::TooManyArguments(name(&command)));
        }
        Ok(command)
    }
}

fn address(word: Option<&str>, command: &'static str) -> Result<u16, CommandError> {
    let text = word.ok_or(CommandError::MissingArgument {
        command,
        what: "address",
    })?;
    parse_u16(text).map_err(CommandError::BadNumber)
}

fn name(command: &Command) -> &'static str {
    match command {
        Command::Step => "n",
        Command::StepMany(_) => "nt",
        Command::RunUntilStop => "o",
        Command::Quit => "q",
        Command::Registers => "r",
        Command::Memory { .. } => "m",
        Command::Write { .. } => "w",
        Command::Query(_) => "p",
        Command::SetPc(_) => "pc",
    }
}

/// One-line summary for the prompt.
pub const HELP: &str = "n|<enter> step, nt step 100, o run to stop, r regs, \
m addr [len], w addr byte, p path, pc addr, q quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_steps() {
        assert_eq!(Command::parse(""), Ok(Command::Step));
        assert_eq!(Command::parse("   "), Ok(Command::Step));
        assert_eq!(Command::parse("n"), Ok(Command::Step));
    }

    #[test]
    fn stepping_commands() {
        assert_eq!(Command::parse("nt"), Ok(Command::StepMany(BURST_STEPS)));
        assert_eq!(Command::parse("o"), Ok(Command::RunUntilStop));
        assert_eq!(Command::parse(" q "), Ok(Command::Quit));
        assert_eq!(Command::parse("r"), Ok(Command::Registers));
    }

    #[test]
    fn memory_defaults_length() {
        assert_eq!(
            Command::parse("m 0x100"),
            Ok(Command::Memory {
                addr: 0x0100,
                len: DEFAULT_DUMP_LEN
            })
        );
        assert_eq!(
            Command::parse("m $20 16"),
            Ok(Command::Memory {
                addr: 0x0020,
                len: 16
            })
        );
    }

    #[test]
    fn write_and_set_pc() {
        assert_eq!(
            Command::parse("w 0x8000 0xff"),
            Ok(Command::Write {
                addr: 0x8000,
                value: 0xFF
            })
        );
        assert_eq!(Command::parse("pc 0x04EC"), Ok(Command::SetPc(0x04EC)));
    }

    #[test]
    fn query_path_is_lowercased() {
        assert_eq!(Command::parse("p Flags.Z"), Ok(Command::Query("flags.z".into())));
    }

    #[test]
    fn errors() {
        assert_eq!(
            Command::parse("x"),
            Err(CommandError::Unknown("x".into()))
        );
        assert_eq!(
            Command::parse("m"),
            Err(CommandError::MissingArgument {
                command: "m",
                what: "address"
            })
        );
        assert_eq!(
            Command::parse("w 0x10"),
            Err(CommandError::MissingArgument {
                command: "w",
                what: "byte"
            })
        );
        assert!(matches!(
            Command::parse("w 0x10 0x100"),
            Err(CommandError::BadNumber(_))
        ));
        assert_eq!(
            Command::parse("r now"),
            Err(CommandError::TooManyArguments("r"))
        );
    }
}
