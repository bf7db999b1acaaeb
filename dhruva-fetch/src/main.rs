//! DhruvaFetch console
//!
//! Reads operator commands line by line and runs them as fetch missions on
//! the configured devices (the simulator unless configured otherwise).
//!
//! ```text
//! dhruva-fetch [CONFIG] [--seed N] [--target X,Y] [--tick-ms MS]
//! ```
//!
//! Console commands: any request starts a mission, `abort` stops it,
//! `status` prints the current state, `quit` or `exit` leaves. SIGINT and
//! SIGTERM abort a running mission, or exit when idle.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{Sender, select, unbounded};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dhruva_fetch::command::create_parser;
use dhruva_fetch::mission::MissionOutcome;
use dhruva_fetch::{
    FetchConfig, FetchError, MissionRunner, MissionUpdate, Pose2D, Result, TaskOrchestrator,
};

/// Default config file looked up in the working directory
const DEFAULT_CONFIG: &str = "dhruva-fetch.toml";

#[derive(Parser, Debug)]
#[command(name = "dhruva-fetch", version, about = "Fetch robot mission console")]
struct Args {
    /// Configuration file (default: dhruva-fetch.toml when present)
    config: Option<PathBuf>,

    /// Seed for the simulator's noise
    #[arg(long)]
    seed: Option<u64>,

    /// Place the simulated target at X,Y (meters)
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    target: Option<(f32, f32)>,

    /// Pause between control ticks in milliseconds
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,
}

fn parse_point(s: &str) -> std::result::Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad X: {e}"))?;
    let y = y.trim().parse::<f32>().map_err(|e| format!("bad Y: {e}"))?;
    Ok((x, y))
}

/// Console input, from stdin or a signal
enum Input {
    Line(String),
    Eof,
    Signal(i32),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dhruva_fetch=info,hasta_io=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            FetchConfig::load(path)?
        }
        None => FetchConfig::load_or_default(Path::new(DEFAULT_CONFIG))?,
    };

    let sim = &mut config.device.simulation;
    if let Some(seed) = args.seed {
        sim.random_seed = seed;
    }
    if let Some((x, y)) = args.target {
        sim.target.x = x;
        sim.target.y = y;
    }
    let start_pose = Pose2D::new(sim.start_x, sim.start_y, sim.start_heading_deg);

    info!("DhruvaFetch v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Search area {:.1}x{:.1} m, step {:.2} m, device '{}'",
        config.search.area_width_m,
        config.search.area_height_m,
        config.search.step_size_m,
        config.device.device_type
    );

    let devices = hasta_io::create_devices(&config.device).map_err(|source| {
        FetchError::Device {
            step: "device setup",
            source,
        }
    })?;
    let parser = create_parser(&config.parser)?;
    let orchestrator = TaskOrchestrator::with_start_pose(config, parser, devices, start_pose)?;
    let runner = MissionRunner::spawn(orchestrator, Duration::from_millis(args.tick_ms))?;

    let (input_tx, input_rx) = unbounded();
    spawn_signal_listener(input_tx.clone())?;
    spawn_stdin_reader(input_tx)?;

    println!("Ready. Type a request, 'status', 'abort' or 'quit'.");
    let mut exit_when_idle = false;
    loop {
        select! {
            recv(input_rx) -> input => match input {
                Ok(Input::Line(line)) => match line.trim() {
                    "" => {}
                    "quit" | "exit" => {
                        if runner.is_busy() {
                            println!("Aborting mission before exit");
                            runner.abort();
                            exit_when_idle = true;
                        } else {
                            break;
                        }
                    }
                    "abort" => {
                        if runner.is_busy() {
                            runner.abort();
                        } else {
                            println!("No mission running");
                        }
                    }
                    "status" => runner.request_status(),
                    request => {
                        if let Err(e) = runner.submit(request) {
                            println!("{}", e);
                        }
                    }
                },
                Ok(Input::Signal(sig)) => {
                    if runner.is_busy() {
                        warn!("Signal {} received, aborting mission", sig);
                        runner.abort();
                    } else {
                        info!("Signal {} received, exiting", sig);
                        break;
                    }
                }
                Ok(Input::Eof) | Err(_) => {
                    if !runner.is_busy() {
                        break;
                    }
                    exit_when_idle = true;
                }
            },
            recv(runner.updates()) -> update => match update {
                Ok(update) => {
                    let finished = matches!(update, MissionUpdate::Finished(_));
                    print_update(&update);
                    if finished && exit_when_idle {
                        break;
                    }
                }
                Err(_) => {
                    warn!("Mission worker stopped");
                    break;
                }
            },
        }
    }

    runner.shutdown();
    info!("DhruvaFetch finished");
    Ok(())
}

fn print_update(update: &MissionUpdate) {
    match update {
        MissionUpdate::Accepted(plan) => println!("Starting: {}", plan),
        MissionUpdate::Rejected { command, error } => {
            println!("Cannot do {:?}: {}", command, error)
        }
        MissionUpdate::StateChanged { from, to } => println!("[{} -> {}]", from, to),
        MissionUpdate::Status(line) => println!("{}", line),
        MissionUpdate::Finished(report) => {
            match &report.outcome {
                MissionOutcome::Completed => println!("Done: {}", report.plan),
                MissionOutcome::Failed { reason, message } => {
                    println!("Failed ({}): {}", reason, message)
                }
            }
            if let Some(location) = report.target_location {
                println!("  target reached at {}", location);
            }
            println!(
                "  {} ticks, {} poses retraced, final pose {}",
                report.ticks,
                report.return_path.len(),
                report.final_pose
            );
        }
    }
}

fn spawn_signal_listener(input: Sender<Input>) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("signal-handler".into())
        .spawn(move || {
            for sig in signals.forever() {
                if input.send(Input::Signal(sig)).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

fn spawn_stdin_reader(input: Sender<Input>) -> Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if input.send(Input::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
            let _ = input.send(Input::Eof);
        })?;
    Ok(())
}
