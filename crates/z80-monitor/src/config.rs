//! Command-line configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which device answers IN and OUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceKind {
    /// Z80 SIO/2 serial controller at ports 0x20-0x23.
    Sio,
    /// Logs every port access; reads return 0.
    Debug,
    /// Empty port space.
    None,
}

#[derive(Parser, Debug)]
#[command(name = "z80-monitor")]
#[command(about = "Load a Z80 binary and step through it", long_about = None)]
pub struct Cli {
    /// Binary image to load
    #[arg(short, long)]
    pub input: PathBuf,

    /// Load address; `0x`/`$` prefix for hex, otherwise decimal
    #[arg(short, long, default_value = "0x0000", value_parser = parse_u16)]
    pub origin: u16,

    /// I/O device attached to the CPU
    #[arg(long, value_enum, default_value_t = DeviceKind::Sio)]
    pub device: DeviceKind,

    /// Trap CP/M BDOS calls and set up the CP/M zero page
    #[arg(long)]
    pub bdos: bool,

    /// Stop address for the `o` command
    #[arg(long, default_value = "0x04EC", value_parser = parse_u16)]
    pub stop_at: u16,

    /// Bytes of the image to hex-dump after loading
    #[arg(long, default_value_t = 64)]
    pub dump_bytes: usize,

    /// File whose bytes are queued on the SIO receive channel
    #[arg(long)]
    pub sio_input: Option<PathBuf>,
}

/// Resolved monitor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub input: PathBuf,
    pub origin: u16,
    pub device: DeviceKind,
    pub bdos: bool,
    pub stop_at: u16,
    pub dump_bytes: usize,
    pub sio_input: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            origin: 0x0000,
            device: DeviceKind::Sio,
            bdos: false,
            stop_at: 0x04EC,
            dump_bytes: 64,
            sio_input: None,
        }
    }
}

impl From<Cli> for MonitorConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            origin: cli.origin,
            device: cli.device,
            bdos: cli.bdos,
            stop_at: cli.stop_at,
            dump_bytes: cli.dump_bytes,
            sio_input: cli.sio_input,
        }
    }
}

/// Parse a 16-bit number: `0x1234`, `$1234` or `4660`.
pub fn parse_u16(text: &str) -> Result<u16, String> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|e| format!("invalid 16-bit value {text:?}: {e}"))
}

/// Parse an 8-bit number with the same prefixes as [`parse_u16`].
pub fn parse_u8(text: &str) -> Result<u8, String> {
    let value = parse_u16(text)?;
    u8::try_from(value).map_err(|_| format!("value {text:?} does not fit in a byte"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_hex_and_decimal() {
        assert_eq!(parse_u16("0x04EC"), Ok(0x04EC));
        assert_eq!(parse_u16("$ff"), Ok(0x00FF));
        assert_eq!(parse_u16("256"), Ok(256));
        assert!(parse_u16("0x10000").is_err());
        assert!(parse_u16("zz").is_err());
        assert_eq!(parse_u8("0x7f"), Ok(0x7F));
        assert!(parse_u8("300").is_err());
    }

    #[test]
    fn defaults_match_the_monitor_binary() {
        let cli = Cli::try_parse_from(["z80-monitor", "-i", "monitor.bin"]).unwrap();
        let config = MonitorConfig::from(cli);
        assert_eq!(
            config,
            MonitorConfig {
                input: PathBuf::from("monitor.bin"),
                ..MonitorConfig::default()
            }
        );
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "z80-monitor",
            "--input",
            "zexdoc.com",
            "-o",
            "$100",
            "--device",
            "none",
            "--bdos",
            "--stop-at",
            "0",
            "--dump-bytes",
            "16",
            "--sio-input",
            "keys.txt",
        ])
        .unwrap();
        let config = MonitorConfig::from(cli);
        assert_eq!(config.origin, 0x0100);
        assert_eq!(config.device, DeviceKind::None);
        assert!(config.bdos);
        assert_eq!(config.stop_at, 0);
        assert_eq!(config.dump_bytes, 16);
        assert_eq!(config.sio_input, Some(PathBuf::from("keys.txt")));
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["z80-monitor"]).is_err());
    }

    #[test]
    fn bad_origin_is_rejected() {
        assert!(Cli::try_parse_from(["z80-monitor", "-i", "x.bin", "-o", "0xGGGG"]).is_err());
    }
}
