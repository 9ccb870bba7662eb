use crate::core::clock::{Clock, ManualClock};
use crate::core::race::RaceSimulation;
use crate::error::CommandParseError;
use crate::interfaces::broadcast_interface::Snapshot;
use crate::interfaces::signal_interface::{SignalFrame, SignalThrottle};
use crate::post::race_result::RaceResult;
use anyhow::Context;
use flume::{Receiver, Sender};
use rand::Rng;
use std::str::FromStr;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// SimCommand is an inbound request that is applied between two ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCommand {
    PitStop { car_id: String },
    Shutdown,
}

impl FromStr for SimCommand {
    type Err = CommandParseError;

    /// Parses command lines such as `pit car1` or `quit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        match tokens.next() {
            None => Err(CommandParseError::Empty),
            Some("pit") | Some("pitstop") => match tokens.next() {
                Some(car_id) => Ok(SimCommand::PitStop {
                    car_id: car_id.to_owned(),
                }),
                None => Err(CommandParseError::MissingCarId),
            },
            Some("quit") | Some("exit") => Ok(SimCommand::Shutdown),
            Some(other) => Err(CommandParseError::Unknown(other.to_owned())),
        }
    }
}

/// BroadcastMsg is an outbound message for the transport layer.
#[derive(Debug, Clone)]
pub enum BroadcastMsg {
    RaceUpdate(Box<Snapshot>),
    Signal(SignalFrame),
}

/// * `realtime_factor` - Speed-up against real time, non-positive values run without pacing
/// * `max_ticks` - Stop after this number of ticks (None: run until shutdown)
/// * `signal_rate` - (Hz) Rate of signal frames (None: no signal frames)
/// * `sim_clock` - Clock of the simulation that is advanced by one timestep per tick, such that
/// lap times follow simulated time (None: the simulation reads the wall clock)
#[derive(Debug, Clone)]
pub struct LoopOpts {
    pub realtime_factor: f64,
    pub max_ticks: Option<u64>,
    pub signal_rate: Option<f64>,
    pub sim_clock: Option<ManualClock>,
}

impl Default for LoopOpts {
    fn default() -> Self {
        LoopOpts {
            realtime_factor: 1.0,
            max_ticks: None,
            signal_rate: None,
            sim_clock: None,
        }
    }
}

/// handle_race drives the simulation: it applies inbound commands between ticks, advances the
/// race at the configured rate and broadcasts a snapshot after every change. The loop is the only
/// owner of the simulation, so commands and ticks never interleave. Returns the race result once
/// a shutdown command arrives or `max_ticks` is reached.
pub fn handle_race<R: Rng>(
    race: &mut RaceSimulation<R>,
    opts: &LoopOpts,
    rx: &Receiver<SimCommand>,
    tx: &Sender<BroadcastMsg>,
) -> anyhow::Result<RaceResult> {
    let timestep_size = race.config().timestep_size();
    let mut signal_throttle = opts.signal_rate.map(SignalThrottle::new);

    let mut no_ticks: u64 = 0;
    let mut t_sim = 0.0;
    let mut t_race_update_print = 0.0;
    let t_clock_start = opts.sim_clock.as_ref().map(|clock| clock.now_ms());

    info!(
        "Race started with {} cars at {:.1} Hz",
        race.cars().len(),
        race.config().update_frequency
    );

    loop {
        if opts.max_ticks.map_or(false, |max_ticks| no_ticks >= max_ticks) {
            break;
        }

        let t_start = Instant::now();

        // apply commands that arrived since the last tick
        for cmd in rx.try_iter() {
            match cmd {
                SimCommand::PitStop { car_id } => {
                    info!("Pit stop requested for {}", car_id);
                    race.execute_pit_stop(&car_id);
                    tx.send(BroadcastMsg::RaceUpdate(Box::new(race.get_current_state())))
                        .context("Failed to broadcast race state after pit stop!")?;
                }
                SimCommand::Shutdown => {
                    info!("Shutdown requested after {} ticks", no_ticks);
                    return Ok(race.get_race_result());
                }
            }
        }

        no_ticks += 1;
        t_sim += timestep_size;

        if let (Some(clock), Some(t_clock_start)) = (opts.sim_clock.as_ref(), t_clock_start) {
            clock.set(t_clock_start + (t_sim * 1000.0).round() as u64);
        }

        race.update();

        let snapshot = race.get_current_state();

        if let Some(throttle) = signal_throttle.as_mut() {
            if throttle.ready(t_sim) {
                tx.send(BroadcastMsg::Signal(SignalFrame::from(&snapshot)))
                    .context("Failed to send signal frame!")?;
            }
        }

        if t_sim > t_race_update_print + 0.9999 {
            debug!(
                "Simulating... Current race time is {:.3}s, current lap is {}",
                t_sim, snapshot.race_state.current_lap
            );
            t_race_update_print = t_sim;
        }

        tx.send(BroadcastMsg::RaceUpdate(Box::new(snapshot)))
            .context("Failed to broadcast race state!")?;

        // sleep until time step is finished in real-time as well (calculation in ms)
        if opts.realtime_factor > 0.0 {
            let t_sleep = (timestep_size * 1000.0 / opts.realtime_factor) as i64
                - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                warn!("Could not keep up with real-time!");
            }
        }
    }

    info!("Simulation finished after {} ticks", no_ticks);
    Ok(race.get_race_result())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(
            "pit car1".parse::<SimCommand>(),
            Ok(SimCommand::PitStop {
                car_id: "car1".to_owned()
            })
        );
        assert_eq!("  quit ".parse::<SimCommand>(), Ok(SimCommand::Shutdown));
        assert_eq!("".parse::<SimCommand>(), Err(CommandParseError::Empty));
        assert_eq!(
            "pit".parse::<SimCommand>(),
            Err(CommandParseError::MissingCarId)
        );
        assert_eq!(
            "boost car1".parse::<SimCommand>(),
            Err(CommandParseError::Unknown("boost".to_owned()))
        );
    }
}
