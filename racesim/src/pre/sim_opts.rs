use crate::core::clock::{Clock, ManualClock, SystemClock};
use crate::core::handle_race::LoopOpts;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "RS-TELEMETRY",
    about = "A tick-driven race telemetry simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Emit reduced signal frames (CSV) for the hardware bridge besides the race updates
    #[clap(short, long)]
    pub signals: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the simulation parameter file (OPTIONAL: if not set, the default 2-car race is
    /// used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set total number of laps (overrides the parameter file)
    #[clap(long, env = "TOTAL_LAPS")]
    pub total_laps: Option<u32>,

    /// Set track length in meters (overrides the parameter file)
    #[clap(long, env = "TRACK_LENGTH")]
    pub track_length: Option<f64>,

    /// Set update frequency in Hz (overrides the parameter file)
    #[clap(long, env = "UPDATE_FREQUENCY")]
    pub update_frequency: Option<f64>,

    /// Set seed of the random number generator for reproducible races
    #[clap(long)]
    pub seed: Option<u64>,

    /// Set real-time factor, values <= 0 simulate as fast as possible (lap times follow the
    /// simulated time if the factor is not 1)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Stop after the given number of ticks (default: run until `quit` is entered)
    #[clap(short = 'n', long)]
    pub max_ticks: Option<u64>,

    /// Set rate of the signal frames in Hz
    #[clap(long, default_value = "20.0")]
    pub signal_rate: f64,
}

impl SimOpts {
    /// loop_opts returns the driver loop options. A simulated clock starting at the current wall
    /// time is created if the race does not run in real time.
    pub fn loop_opts(&self) -> LoopOpts {
        let sim_clock = if (self.realtime_factor - 1.0).abs() > f64::EPSILON {
            Some(ManualClock::new(SystemClock.now_ms()))
        } else {
            None
        };

        LoopOpts {
            realtime_factor: self.realtime_factor,
            max_ticks: self.max_ticks,
            signal_rate: if self.signals {
                Some(self.signal_rate)
            } else {
                None
            },
            sim_clock,
        }
    }
}
