use crate::core::tireset::{Compound, DrivingSample, Tireset};
use crate::error::ConfigError;
use rand::Rng;
use serde::Deserialize;
use std::f64::consts::PI;

const BASE_SPEED: f64 = 280.0; // km/h
const SPEED_NOISE: f64 = 5.0; // km/h
const MAX_LATERAL_G: f64 = 3.5;
const MAX_LONGITUDINAL_G: f64 = 6.0;
const GRAVITY: f64 = 9.81;
// three fast and three slow zones per lap
const SPEED_ZONES_PER_LAP: f64 = 3.0;
const NO_SECTORS: u8 = 3;

/// Roster entry of a car.
/// * `id` - Identifier used by inbound commands, e.g. car1
/// * `name` - Display name
/// * `color` - Team color (CSS color string, e.g. #00d9ff)
/// * `s_start` - (m) Start position on the track
/// * `compound` - Compound mounted at the start
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CarPars {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub s_start: f64,
    pub compound: Compound,
}

impl CarPars {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .color
            .parse::<css_color_parser::Color>()
            .is_err()
        {
            return Err(ConfigError::InvalidColor {
                car_id: self.id.to_owned(),
                color: self.color.to_owned(),
            });
        }
        if !self.s_start.is_finite() || self.s_start < 0.0 {
            return Err(ConfigError::Negative {
                name: "s_start",
                value: self.s_start,
            });
        }
        Ok(())
    }
}

/// default_roster returns the two cars that race if no roster is configured.
pub fn default_roster() -> Vec<CarPars> {
    vec![
        CarPars {
            id: "car1".to_owned(),
            name: "NEXUS-01".to_owned(),
            color: "#00d9ff".to_owned(),
            s_start: 0.0,
            compound: Compound::Soft,
        },
        CarPars {
            id: "car2".to_owned(),
            name: "NEXUS-02".to_owned(),
            color: "#bd00ff".to_owned(),
            // start slightly behind
            s_start: 150.0,
            compound: Compound::Medium,
        },
    ]
}

/// Car state.
/// * `position` - (m) Cumulative distance traveled (folded back on race restart only)
/// * `speed` - (km/h)
/// * `lap_start_time` - (ms) Wall-clock time at the start of the current lap
/// * `cur_laptime`, `last_laptime`, `best_laptime` - (s)
/// * `race_position` - Standings rank, recomputed every tick
#[derive(Debug, Clone)]
pub struct Car {
    pub id: String,
    pub name: String,
    pub color: String,
    pub position: f64,
    pub speed: f64,
    pub lap_number: u32,
    pub lap_start_time: u64,
    pub cur_laptime: f64,
    pub last_laptime: Option<f64>,
    pub best_laptime: Option<f64>,
    pub race_position: u32,
    pub sector: u8,
    pub throttle: f64,
    pub brake: f64,
    pub gear: u8,
    pub rpm: f64,
    pub lateral_g: f64,
    pub longitudinal_g: f64,
    pub pit_stops: u32,
    tireset: Tireset,
}

impl Car {
    pub fn new<R: Rng + ?Sized>(car_pars: &CarPars, t_now: u64, rng: &mut R) -> Car {
        Car {
            id: car_pars.id.to_owned(),
            name: car_pars.name.to_owned(),
            color: car_pars.color.to_owned(),
            position: car_pars.s_start,
            speed: 0.0,
            lap_number: 1,
            lap_start_time: t_now,
            cur_laptime: 0.0,
            last_laptime: None,
            best_laptime: None,
            race_position: 1,
            sector: 1,
            throttle: 0.0,
            brake: 0.0,
            gear: 4,
            rpm: 8000.0,
            lateral_g: 0.0,
            longitudinal_g: 0.0,
            pit_stops: 0,
            tireset: Tireset::new(car_pars.compound, rng),
        }
    }

    pub fn tireset(&self) -> &Tireset {
        &self.tireset
    }

    pub(crate) fn tireset_mut(&mut self) -> &mut Tireset {
        &mut self.tireset
    }

    /// lap_position returns the position within the current lap, in [0, track_length).
    pub fn lap_position(&self, track_length: f64) -> f64 {
        self.position.rem_euclid(track_length)
    }

    pub fn track_progress(&self, track_length: f64) -> f64 {
        self.lap_position(track_length) / track_length
    }

    /// total_distance returns the race progress in meters used for the standings.
    pub fn total_distance(&self, track_length: f64) -> f64 {
        (self.lap_number - 1) as f64 * track_length + self.lap_position(track_length)
    }

    /// drive sets the speed from the speed zone at the given track progress, derives the G-forces
    /// and moves the car forward by one timestep.
    pub fn drive<R: Rng + ?Sized>(&mut self, track_progress: f64, timestep_size: f64, rng: &mut R) {
        let prev_speed = self.speed;
        let zone_angle = track_progress * PI * 2.0 * SPEED_ZONES_PER_LAP;

        let speed_factor = 0.8 + 0.2 * zone_angle.cos();
        let target_speed = BASE_SPEED * speed_factor;
        self.speed = (target_speed + rng.gen_range(-SPEED_NOISE..SPEED_NOISE)).max(0.0);

        // longitudinal G from the speed change, lateral G from the cornering intensity
        let acceleration = (self.speed - prev_speed) / 3.6 / timestep_size;
        self.longitudinal_g =
            (acceleration / GRAVITY).clamp(-MAX_LONGITUDINAL_G, MAX_LONGITUDINAL_G);

        let cornering_intensity = zone_angle.sin().abs();
        let mut lateral_g = self.speed / BASE_SPEED * cornering_intensity * MAX_LATERAL_G;
        if rng.gen_bool(0.5) {
            lateral_g = -lateral_g;
        }
        self.lateral_g = lateral_g.clamp(-MAX_LATERAL_G, MAX_LATERAL_G);

        self.position += self.speed / 3.6 * timestep_size;
    }

    pub fn update_cur_laptime(&mut self, t_now: u64) {
        self.cur_laptime = t_now.saturating_sub(self.lap_start_time) as f64 / 1000.0;
    }

    pub fn lap_completed(&self, track_length: f64) -> bool {
        self.position >= track_length * self.lap_number as f64
    }

    /// complete_lap closes the current lap. If the final lap was completed, the race restarts in
    /// place: lap number 1, position folded back into the first lap and lap times cleared.
    /// Returns true in the restart case.
    pub fn complete_lap(&mut self, t_now: u64, tot_no_laps: u32, track_length: f64) -> bool {
        self.last_laptime = Some(self.cur_laptime);

        if self.best_laptime.map_or(true, |best| self.cur_laptime < best) {
            self.best_laptime = Some(self.cur_laptime);
        }

        self.lap_number += 1;
        self.lap_start_time = t_now;
        self.tireset.drive_lap();

        if self.lap_number > tot_no_laps {
            self.lap_number = 1;
            self.position = self.lap_position(track_length);
            self.last_laptime = None;
            self.best_laptime = None;
            return true;
        }
        false
    }

    pub fn update_sector(&mut self, track_length: f64) {
        let sector_length = track_length / NO_SECTORS as f64;
        let sector = (self.lap_position(track_length) / sector_length).floor() as u8 + 1;
        self.sector = sector.min(NO_SECTORS);
    }

    /// update_driver_inputs derives throttle, brake, gear and rpm from the current speed band.
    pub fn update_driver_inputs<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.speed > 250.0 {
            self.throttle = rng.gen_range(95.0..100.0);
            self.brake = 0.0;
            self.gear = rng.gen_range(7..=8);
            self.rpm = rng.gen_range(11000.0..13000.0);
        } else if self.speed > 150.0 {
            self.throttle = rng.gen_range(60.0..90.0);
            self.brake = rng.gen_range(0.0..20.0);
            self.gear = rng.gen_range(4..=6);
            self.rpm = rng.gen_range(8000.0..11000.0);
        } else {
            self.throttle = rng.gen_range(40.0..80.0);
            self.brake = rng.gen_range(0.0..60.0);
            self.gear = rng.gen_range(2..=4);
            self.rpm = rng.gen_range(6000.0..10000.0);
        }
    }

    pub fn driving_sample(&self, track_progress: f64) -> DrivingSample {
        DrivingSample {
            speed: self.speed,
            throttle: self.throttle,
            brake: self.brake,
            lateral_g: self.lateral_g,
            longitudinal_g: self.longitudinal_g,
            track_progress,
        }
    }

    /// perform_pitstop mounts a fresh tireset of the next compound in the cycle and returns the
    /// old and the new compound.
    pub fn perform_pitstop<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (Compound, Compound) {
        let old_compound = self.tireset.compound;
        let new_compound = old_compound.next();

        self.tireset = Tireset::new(new_compound, rng);
        self.pit_stops += 1;

        (old_compound, new_compound)
    }
}
