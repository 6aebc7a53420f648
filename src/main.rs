//! remote-gamer - Main Application
//!
//! Run `remote-gamer emit` on the machine running the game and
//! `remote-gamer capture --host <station>` on the machine with the pad.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, select};
use env_logger::Env;
use log::{error, info};
use remote_gamer::backend::{self, ControllerSink};
use remote_gamer::config::{Config, SinkKind};
use remote_gamer::source::{RawEventSource, SourceError};
use remote_gamer::{RelayError, RelayManager, Role};
use std::thread;

use crate::cli::Cli;

type BoxedSource = Box<dyn RawEventSource + Send>;
type BoxedSink = Box<dyn ControllerSink + Send>;
type Job = Box<dyn FnOnce(&RelayManager) -> Result<(), RelayError> + Send>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let mut config = Config::load_or_default(cli.config.as_ref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let role = cli.role;
    info!("Starting as {}", role);

    // Devices are opened before Ctrl+C is hooked so the prompt stays interruptible
    let job = prepare(role, &config)?;
    let manager = RelayManager::new(config);

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("failed to set Ctrl+C handler")?;

    let (done_tx, done_rx) = bounded::<Result<(), RelayError>>(1);
    let worker = manager.clone();
    let handle = thread::Builder::new()
        .name(role.to_string())
        .spawn(move || {
            let _ = done_tx.send(job(&worker));
        })
        .context("failed to spawn relay thread")?;

    let result = select! {
        recv(stop_rx) -> _ => {
            info!("Ctrl+C received, shutting down");
            manager.stop();
            done_rx.recv().unwrap_or(Ok(()))
        }
        recv(done_rx) -> msg => msg.unwrap_or(Ok(())),
    };

    manager.stop();
    if handle.join().is_err() {
        error!("{} thread panicked", role);
    }

    result.with_context(|| format!("{} failed", role))?;
    info!("✓ Shutdown complete");
    Ok(())
}

/// Open whatever the role needs and package the run as a job
fn prepare(role: Role, config: &Config) -> Result<Job> {
    let job: Job = match role {
        Role::Capture => {
            let source = open_source(config)?;
            Box::new(move |manager: &RelayManager| manager.run_capture(source))
        }
        Role::Emit => {
            let sink = open_sink(config)?;
            Box::new(move |manager: &RelayManager| manager.run_emit(sink))
        }
        Role::Monitor => {
            let source = open_source(config)?;
            Box::new(move |manager: &RelayManager| manager.run_monitor(source))
        }
        Role::Local => {
            let source = open_source(config)?;
            let sink = open_sink(config)?;
            Box::new(move |manager: &RelayManager| manager.run_local(source, sink))
        }
    };
    Ok(job)
}

fn open_sink(config: &Config) -> Result<BoxedSink> {
    match config.emit.sink {
        SinkKind::Log => {
            info!("Using log-only virtual controller");
            Ok(Box::new(backend::get_mock_controller_sink()))
        }
        SinkKind::Uinput => {
            let sink = backend::get_controller_sink(&config.emit.device_name, config.emit.trigger_max)
                .context("failed to create virtual controller")?;
            info!("✓ Virtual controller '{}' ready", config.emit.device_name);
            Ok(Box::new(sink))
        }
    }
}

#[cfg(target_os = "linux")]
fn open_source(config: &Config) -> Result<BoxedSource> {
    use remote_gamer::source::{list_gamepads, EvdevSource};

    let grab = config.capture.grab;
    let source = match &config.capture.device {
        Some(choice) => EvdevSource::select(choice, grab)?,
        None => {
            let pads = list_gamepads();
            if pads.is_empty() {
                return Err(SourceError::NoGamepad("no input device reports BTN_SOUTH".into()).into());
            }
            for (index, pad) in pads.iter().enumerate() {
                println!("[{}] {} ({})", index, pad.name, pad.path.display());
            }
            let index = if pads.len() == 1 { 0 } else { prompt_index(pads.len())? };
            EvdevSource::open(&pads[index].path, grab)?
        }
    };
    Ok(Box::new(source))
}

#[cfg(not(target_os = "linux"))]
fn open_source(_config: &Config) -> Result<BoxedSource> {
    Err(SourceError::PlatformNotSupported.into())
}

#[cfg(target_os = "linux")]
fn prompt_index(count: usize) -> Result<usize> {
    use std::io::{self, Write};

    print!("which controller to capture? [0] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(0);
    }

    let index: usize = line
        .parse()
        .with_context(|| format!("'{}' is not a controller number", line))?;
    if index >= count {
        anyhow::bail!("no controller {} (found {})", index, count);
    }
    Ok(index)
}
