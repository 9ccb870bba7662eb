use crate::core::car::{Car, CarPars};
use crate::core::clock::{Clock, SystemClock};
use crate::core::tireset::{CornerPos, TireCorner};
use crate::error::ConfigError;
use crate::interfaces::broadcast_interface::{
    CarInfo, CornerInfo, DriverInfo, Gap, RaceStateInfo, Snapshot, TimingInfo, TiresInfo,
    TrackInfo,
};
use crate::post::race_result::{CarResult, RaceResult};
use helpers::general::{argsort, fmt_fixed, max, round_i64, SortOrder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// * `tot_no_laps` - Total number of laps, the race restarts in place afterwards
/// * `track_length` - (m) Track length
/// * `update_frequency` - (Hz) Expected tick rate, determines the timestep size
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RaceConfig {
    pub tot_no_laps: u32,
    pub track_length: f64,
    pub update_frequency: f64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            tot_no_laps: 58,
            track_length: 5281.0,
            update_frequency: 30.0,
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tot_no_laps == 0 {
            return Err(ConfigError::NonPositive {
                name: "tot_no_laps",
                value: 0.0,
            });
        }
        for &(name, value) in [
            ("track_length", self.track_length),
            ("update_frequency", self.update_frequency),
        ]
        .iter()
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }

    /// timestep_size returns the nominal time (s) a car advances per tick.
    pub fn timestep_size(&self) -> f64 {
        1.0 / self.update_frequency
    }
}

/// RaceSimulation owns the roster and advances it tick by tick. Randomness and wall-clock time
/// are injected, such that a simulation with a seeded generator and a `ManualClock` is fully
/// reproducible.
pub struct RaceSimulation<R: Rng = StdRng> {
    config: RaceConfig,
    timestep_size: f64,
    t_start: u64,
    pub race_time: f64,
    cars_list: Vec<Car>,
    rng: R,
    clock: Box<dyn Clock>,
}

impl RaceSimulation<StdRng> {
    /// with_seed creates a reproducible simulation that uses the system clock.
    pub fn with_seed(
        config: RaceConfig,
        car_pars_all: &[CarPars],
        seed: u64,
    ) -> Result<Self, ConfigError> {
        RaceSimulation::with_clock(config, car_pars_all, Some(seed), Box::new(SystemClock))
    }

    pub fn from_entropy(config: RaceConfig, car_pars_all: &[CarPars]) -> Result<Self, ConfigError> {
        RaceSimulation::with_clock(config, car_pars_all, None, Box::new(SystemClock))
    }

    /// with_clock creates a simulation on the given clock, seeded from entropy if no seed is set.
    pub fn with_clock(
        config: RaceConfig,
        car_pars_all: &[CarPars],
        seed: Option<u64>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RaceSimulation::new(config, car_pars_all, rng, clock)
    }
}

impl<R: Rng> RaceSimulation<R> {
    pub fn new(
        config: RaceConfig,
        car_pars_all: &[CarPars],
        mut rng: R,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        if car_pars_all.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let mut car_ids = HashSet::with_capacity(car_pars_all.len());
        for car_pars in car_pars_all.iter() {
            car_pars.validate()?;
            if car_pars.s_start >= config.track_length {
                return Err(ConfigError::StartBeyondTrack {
                    car_id: car_pars.id.to_owned(),
                    s_start: car_pars.s_start,
                });
            }
            if !car_ids.insert(car_pars.id.as_str()) {
                return Err(ConfigError::DuplicateCarId(car_pars.id.to_owned()));
            }
        }

        let t_start = clock.now_ms();
        let cars_list: Vec<Car> = car_pars_all
            .iter()
            .map(|car_pars| Car::new(car_pars, t_start, &mut rng))
            .collect();

        let mut race = RaceSimulation {
            config,
            timestep_size: config.timestep_size(),
            t_start,
            race_time: 0.0,
            cars_list,
            rng,
            clock,
        };

        for car in race.cars_list.iter_mut() {
            car.update_sector(config.track_length);
        }
        race.update_race_positions();

        Ok(race)
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// cars returns the roster in input order (raw position and speed included).
    pub fn cars(&self) -> &[Car] {
        &self.cars_list
    }

    pub fn get_car(&self, car_id: &str) -> Option<&Car> {
        self.cars_list.iter().find(|car| car.id == car_id)
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// update simulates one tick for all cars and recomputes the standings afterwards.
    pub fn update(&mut self) {
        let t_now = self.clock.now_ms();
        self.race_time = t_now.saturating_sub(self.t_start) as f64 / 1000.0;

        let track_length = self.config.track_length;
        let tot_no_laps = self.config.tot_no_laps;

        for car in self.cars_list.iter_mut() {
            let track_progress = car.track_progress(track_length);

            car.drive(track_progress, self.timestep_size, &mut self.rng);
            car.update_cur_laptime(t_now);

            // handle lap transition
            if car.lap_completed(track_length) {
                let laptime = car.cur_laptime;
                let restarted = car.complete_lap(t_now, tot_no_laps, track_length);

                if restarted {
                    info!(car = %car.name, "Final lap completed in {:.3}s, race restarts", laptime);
                } else {
                    info!(car = %car.name, lap = car.lap_number, "Lap completed in {:.3}s", laptime);
                }
            }

            car.update_sector(track_length);
            car.update_driver_inputs(&mut self.rng);

            let driving_sample = car.driving_sample(track_progress);
            car.tireset_mut()
                .update(&driving_sample, self.timestep_size, &mut self.rng);
        }

        self.update_race_positions();
    }

    // ---------------------------------------------------------------------------------------------
    // STANDINGS -----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// update_race_positions ranks the cars by total distance. Ties keep the roster order.
    pub fn update_race_positions(&mut self) {
        let track_length = self.config.track_length;
        let total_distances: Vec<f64> = self
            .cars_list
            .iter()
            .map(|car| car.total_distance(track_length))
            .collect();

        for (rank, &idx) in argsort(&total_distances, SortOrder::Descending)
            .iter()
            .enumerate()
        {
            self.cars_list[idx].race_position = rank as u32 + 1;
        }
    }

    /// calculate_gap returns the gap between the leader and the car in second place, `None` if
    /// fewer than two cars are racing.
    pub fn calculate_gap(&self) -> Option<Gap> {
        if self.cars_list.len() < 2 {
            return None;
        }

        let race_positions: Vec<u32> = self.cars_list.iter().map(|car| car.race_position).collect();
        let idxs_sorted = argsort(&race_positions, SortOrder::Ascending);
        let leader = &self.cars_list[idxs_sorted[0]];
        let follower = &self.cars_list[idxs_sorted[1]];

        let track_length = self.config.track_length;
        let distance_gap = leader.total_distance(track_length) - follower.total_distance(track_length);

        let follower_speed = follower.speed / 3.6;
        let time_gap = if follower_speed > 0.0 {
            distance_gap / follower_speed
        } else {
            0.0
        };

        Some(Gap {
            distance_meters: round_i64(distance_gap),
            time_seconds: time_gap,
            leader: leader.name.to_owned(),
            follower: follower.name.to_owned(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // COMMANDS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// execute_pit_stop mounts the next compound of the cycle on the given car. Unknown car ids
    /// are logged and otherwise ignored.
    pub fn execute_pit_stop(&mut self, car_id: &str) {
        let rng = &mut self.rng;

        match self.cars_list.iter_mut().find(|car| car.id == car_id) {
            Some(car) => {
                let (old_compound, new_compound) = car.perform_pitstop(rng);
                info!(
                    car = %car.name,
                    "Pit stop: changed from {} to {} tires",
                    old_compound.as_str(),
                    new_compound.as_str()
                );
            }
            None => warn!("Pit stop requested for unknown car {}", car_id),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // OUTPUT --------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// get_current_state returns the formatted snapshot of the current race state.
    pub fn get_current_state(&self) -> Snapshot {
        let lap_numbers: Vec<u32> = self.cars_list.iter().map(|car| car.lap_number).collect();

        Snapshot {
            timestamp: self.clock.now_ms(),
            race_time: self.race_time,
            race_state: RaceStateInfo {
                current_lap: max(&lap_numbers).unwrap_or(1),
                total_laps: self.config.tot_no_laps,
                gap: self.calculate_gap(),
            },
            cars: self
                .cars_list
                .iter()
                .map(|car| self.car_info(car))
                .collect(),
        }
    }

    fn car_info(&self, car: &Car) -> CarInfo {
        let track_length = self.config.track_length;
        let tireset = car.tireset();

        CarInfo {
            id: car.id.to_owned(),
            name: car.name.to_owned(),
            team_color: car.color.to_owned(),
            position: car.race_position,
            track: TrackInfo {
                speed: round_i64(car.speed),
                position: round_i64(car.lap_position(track_length)),
                track_progress: car.track_progress(track_length),
                sector: car.sector,
            },
            timing: TimingInfo {
                lap_number: car.lap_number,
                current_lap_time: fmt_fixed(car.cur_laptime, 3),
                last_lap_time: car.last_laptime.map(|t| fmt_fixed(t, 3)),
                best_lap_time: car.best_laptime.map(|t| fmt_fixed(t, 3)),
            },
            driver: DriverInfo {
                throttle: round_i64(car.throttle),
                brake: round_i64(car.brake),
                gear: car.gear,
                rpm: round_i64(car.rpm),
            },
            tires: TiresInfo {
                compound: tireset.compound,
                age: tireset.age,
                fl: corner_info(tireset.corner(CornerPos::FrontLeft)),
                fr: corner_info(tireset.corner(CornerPos::FrontRight)),
                rl: corner_info(tireset.corner(CornerPos::RearLeft)),
                rr: corner_info(tireset.corner(CornerPos::RearRight)),
                status: tireset.status(),
            },
        }
    }

    /// get_race_result returns the per-car summary sorted by standings.
    pub fn get_race_result(&self) -> RaceResult {
        let race_positions: Vec<u32> = self.cars_list.iter().map(|car| car.race_position).collect();

        RaceResult {
            tot_no_laps: self.config.tot_no_laps,
            race_time: self.race_time,
            car_results: argsort(&race_positions, SortOrder::Ascending)
                .into_iter()
                .map(|idx| CarResult::from(&self.cars_list[idx]))
                .collect(),
        }
    }
}

fn corner_info(corner: &TireCorner) -> CornerInfo {
    CornerInfo {
        temp: round_i64(corner.temperature),
        pressure: fmt_fixed(corner.pressure, 1),
        wear: round_i64(corner.wear),
    }
}
