//! Z80 monitor binary.
//!
//! Loads a binary image, dumps its first bytes and enters a step prompt.
//! Set `RUST_LOG` to control log output, which goes to stderr.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use z80_monitor::command::HELP;
use z80_monitor::{Cli, Command, Flow, Monitor, MonitorConfig, make_device};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = MonitorConfig::from(Cli::parse());
    let image = fs::read(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    let rx = match &config.sio_input {
        Some(path) => fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => Vec::new(),
    };
    let device = make_device(config.device, &rx);
    let dump_len = config.dump_bytes.min(image.len());
    let mut monitor = Monitor::new(config, &image, device, io::stdout())
        .context("failed to load image")?;

    let origin = monitor.config().origin;
    info!(
        "loaded {} bytes from {} at {origin:#06x}",
        image.len(),
        monitor.config().input.display()
    );
    print!("{}", monitor.machine().memory().dump(origin, dump_len));
    println!("{HELP}");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(">") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = editor.add_history_entry(line.as_str()) {
                        debug!(error = %e, "history entry not recorded");
                    }
                }
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                if monitor.execute(command)? == Flow::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
