use anyhow::Context;
use clap::Parser;
use flume::Sender;
use racesim::core::clock::{Clock, SystemClock};
use racesim::core::handle_race::{handle_race, BroadcastMsg, SimCommand};
use racesim::core::race::RaceSimulation;
use racesim::pre::read_sim_pars::load_sim_pars;
use racesim::pre::sim_opts::SimOpts;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// read_commands forwards command lines from stdin (e.g. `pit car1`) to the simulation thread
/// until stdin is closed or the simulation is gone.
fn read_commands(tx_cmd: Sender<SimCommand>) {
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not read command from stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<SimCommand>() {
            Ok(cmd) => {
                if tx_cmd.send(cmd).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Ignoring command {:?}: {}", line, e),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // logs go to stderr, stdout carries the broadcast stream
    let default_level = if sim_opts.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // get simulation parameters
    if let Some(parfile_path) = &sim_opts.parfile_path {
        info!("Reading simulation parameters from {:?}", parfile_path);
    }
    let sim_pars = load_sim_pars(&sim_opts)?;

    info!(
        "Simulating {} laps on a {:.0}m track at {:.1} Hz with {} cars",
        sim_pars.race_pars.tot_no_laps,
        sim_pars.race_pars.track_length,
        sim_pars.race_pars.update_frequency,
        sim_pars.car_pars_all.len()
    );

    // lap times follow the simulated time if the race does not run in real time
    let loop_opts = sim_opts.loop_opts();
    let clock: Box<dyn Clock> = match &loop_opts.sim_clock {
        Some(sim_clock) => Box::new(sim_clock.clone()),
        None => Box::new(SystemClock),
    };

    let race = RaceSimulation::with_clock(
        sim_pars.race_pars,
        &sim_pars.car_pars_all,
        sim_opts.seed,
        clock,
    )
    .context("Could not set up the race!")?;

    // EXECUTION -----------------------------------------------------------------------------------
    let (tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, rx) = flume::unbounded();
    let t_start = Instant::now();

    // the simulation thread is the only owner of the race
    let sim_thread = thread::spawn(move || {
        let mut race = race;
        handle_race(&mut race, &loop_opts, &rx_cmd, &tx)
    });

    // the command reader is not joined, it blocks on stdin until the process exits
    thread::spawn(move || read_commands(tx_cmd));

    // broadcast race updates as JSON lines and signal frames as CSV lines
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for msg in rx.iter() {
        match msg {
            BroadcastMsg::RaceUpdate(snapshot) => {
                let line = serde_json::to_string(&snapshot).context("Failed to serialize race state!")?;
                writeln!(out, "{}", line).context("Failed to write race state!")?;
            }
            BroadcastMsg::Signal(frame) => {
                write!(out, "{}", frame.to_csv_line()).context("Failed to write signal frame!")?;
            }
        }
    }
    out.flush()?;

    // POST-PROCESSING -----------------------------------------------------------------------------
    let race_result = sim_thread
        .join()
        .map_err(|_| anyhow::anyhow!("Simulation thread panicked!"))??;

    info!("Execution time: {}ms", t_start.elapsed().as_millis());
    eprint!("{}", race_result);

    Ok(())
}
