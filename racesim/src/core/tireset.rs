use helpers::general::{fmt_fixed, mean};
use rand::Rng;
use serde::{Deserialize, Serialize};

// temperature bounds (°C)
const TEMP_MIN: f64 = 60.0;
const TEMP_MAX: f64 = 130.0;
// pressure bounds (PSI)
const PRESSURE_MIN: f64 = 18.0;
const PRESSURE_MAX: f64 = 26.0;
// cold reference point of the linear pressure model
const PRESSURE_COLD: f64 = 19.5;
const TEMP_COLD: f64 = 70.0;
const PRESSURE_PER_DEG: f64 = 0.05;
// share of the gap to the target temperature that is closed per update
const TEMP_SMOOTHING: f64 = 0.05;
// worn tires run hotter
const WORN_TIRE_THRESHOLD: f64 = 30.0;
const WORN_TIRE_HEATING: f64 = 0.5;
// pit advisory thresholds
const CRITICAL_WEAR: f64 = 20.0;
const LOW_AVERAGE_WEAR: f64 = 40.0;
const MAX_LAPS_WARNING: i64 = 3;

/// Compound is the rubber formulation of a tireset. The performance parameters of each
/// compound are defined by a static table, see `Compound::pars`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
}

/// * `optimal_temp` - (°C) Optimal operating window [min, max]
/// * `degr_rate` - Degradation rate coefficient (higher wears faster)
/// * `grip_level` - Relative grip level
/// * `max_laps` - Laps after which a change is recommended
#[derive(Debug, Clone, Copy)]
pub struct CompoundPars {
    pub optimal_temp: [f64; 2],
    pub degr_rate: f64,
    pub grip_level: f64,
    pub max_laps: u32,
}

const SOFT_PARS: CompoundPars = CompoundPars {
    optimal_temp: [90.0, 110.0],
    degr_rate: 0.8,
    grip_level: 1.0,
    max_laps: 15,
};

const MEDIUM_PARS: CompoundPars = CompoundPars {
    optimal_temp: [85.0, 105.0],
    degr_rate: 0.5,
    grip_level: 0.85,
    max_laps: 25,
};

const HARD_PARS: CompoundPars = CompoundPars {
    optimal_temp: [80.0, 100.0],
    degr_rate: 0.3,
    grip_level: 0.75,
    max_laps: 40,
};

impl Compound {
    pub fn pars(self) -> &'static CompoundPars {
        match self {
            Compound::Soft => &SOFT_PARS,
            Compound::Medium => &MEDIUM_PARS,
            Compound::Hard => &HARD_PARS,
        }
    }

    /// next returns the compound mounted at the next pit stop (SOFT -> MEDIUM -> HARD -> SOFT).
    pub fn next(self) -> Compound {
        match self {
            Compound::Soft => Compound::Medium,
            Compound::Medium => Compound::Hard,
            Compound::Hard => Compound::Soft,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
        }
    }

    fn optimal_temp_mid(self) -> f64 {
        let pars = self.pars();
        (pars.optimal_temp[0] + pars.optimal_temp[1]) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerPos {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

/// Update order of the four corners.
pub const CORNER_POSITIONS: [CornerPos; 4] = [
    CornerPos::FrontLeft,
    CornerPos::FrontRight,
    CornerPos::RearLeft,
    CornerPos::RearRight,
];

impl CornerPos {
    pub fn is_front(self) -> bool {
        matches!(self, CornerPos::FrontLeft | CornerPos::FrontRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, CornerPos::FrontLeft | CornerPos::RearLeft)
    }

    fn idx(self) -> usize {
        match self {
            CornerPos::FrontLeft => 0,
            CornerPos::FrontRight => 1,
            CornerPos::RearLeft => 2,
            CornerPos::RearRight => 3,
        }
    }
}

/// TireCorner holds the telemetry of a single tire.
/// * `temperature` - (°C) Core temperature, bounded to [60, 130]
/// * `pressure` - (PSI) Bounded to [18, 26]
/// * `wear` - (%) Remaining tire life, bounded to [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireCorner {
    pub temperature: f64,
    pub surface_temp: f64,
    pub inner_temp: f64,
    pub pressure: f64,
    pub wear: f64,
}

/// DrivingSample contains the car state of the current tick that drives the tire model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrivingSample {
    pub speed: f64,
    pub throttle: f64,
    pub brake: f64,
    pub lateral_g: f64,
    pub longitudinal_g: f64,
    pub track_progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PitReason {
    CriticalWear,
    ApproachingMaxLaps,
    LowAverageWear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitAdvisory {
    pub should_pit: bool,
    pub reason: Option<PitReason>,
    pub laps_remaining: i64,
}

/// TireStatus is the display summary of a tireset that is broadcast with every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TireStatus {
    pub compound: Compound,
    pub age: u32,
    pub max_laps: u32,
    pub should_pit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<PitReason>,
    pub laps_remaining: i64,
    pub avg_temperature: String,
    pub avg_wear: String,
}

#[derive(Debug, Clone)]
pub struct Tireset {
    pub compound: Compound,
    pub age: u32,
    pub corners: [TireCorner; 4],
}

impl Tireset {
    /// new mounts a fresh tireset of the given compound (wear 100%, age 0).
    pub fn new<R: Rng + ?Sized>(compound: Compound, rng: &mut R) -> Tireset {
        let mut corners = [TireCorner {
            temperature: 0.0,
            surface_temp: 0.0,
            inner_temp: 0.0,
            pressure: 0.0,
            wear: 100.0,
        }; 4];

        for pos in CORNER_POSITIONS.iter() {
            // front tires run slightly hotter
            let base_temp = if pos.is_front() { 85.0 } else { 83.0 };

            corners[pos.idx()] = TireCorner {
                temperature: base_temp + rng.gen_range(-2.5..2.5),
                surface_temp: base_temp + rng.gen_range(-2.5..2.5),
                inner_temp: base_temp - 5.0 + rng.gen_range(-1.5..1.5),
                pressure: 21.5 + rng.gen_range(-0.25..0.25),
                wear: 100.0,
            };
        }

        Tireset {
            compound,
            age: 0,
            corners,
        }
    }

    pub fn corner(&self, pos: CornerPos) -> &TireCorner {
        &self.corners[pos.idx()]
    }

    pub fn corner_mut(&mut self, pos: CornerPos) -> &mut TireCorner {
        &mut self.corners[pos.idx()]
    }

    /// drive_lap increases the tire age by one lap.
    pub fn drive_lap(&mut self) {
        self.age += 1;
    }

    /// update advances temperature, pressure and wear of all four corners by one tick.
    pub fn update<R: Rng + ?Sized>(&mut self, sample: &DrivingSample, dt: f64, rng: &mut R) {
        let compound = self.compound;

        for pos in CORNER_POSITIONS.iter() {
            let corner = &mut self.corners[pos.idx()];
            update_temperature(corner, *pos, compound, sample, rng);
            update_pressure(corner, rng);
            update_wear(corner, compound, sample, dt);
        }
    }

    pub fn avg_wear(&self) -> f64 {
        let wears: Vec<f64> = self.corners.iter().map(|c| c.wear).collect();
        mean(&wears)
    }

    pub fn avg_temperature(&self) -> f64 {
        let temps: Vec<f64> = self.corners.iter().map(|c| c.temperature).collect();
        mean(&temps)
    }

    /// pit_advisory checks whether the tires should be changed. The rules are evaluated in
    /// strict priority order: critical wear, approaching max laps, low average wear.
    pub fn pit_advisory(&self) -> PitAdvisory {
        let min_wear = self
            .corners
            .iter()
            .map(|c| c.wear)
            .fold(f64::INFINITY, f64::min);

        if min_wear < CRITICAL_WEAR {
            return PitAdvisory {
                should_pit: true,
                reason: Some(PitReason::CriticalWear),
                laps_remaining: 0,
            };
        }

        let laps_remaining = self.compound.pars().max_laps as i64 - self.age as i64;
        if laps_remaining <= MAX_LAPS_WARNING {
            return PitAdvisory {
                should_pit: true,
                reason: Some(PitReason::ApproachingMaxLaps),
                laps_remaining,
            };
        }

        if self.avg_wear() < LOW_AVERAGE_WEAR {
            return PitAdvisory {
                should_pit: true,
                reason: Some(PitReason::LowAverageWear),
                laps_remaining: laps_remaining.div_euclid(2),
            };
        }

        PitAdvisory {
            should_pit: false,
            reason: None,
            laps_remaining,
        }
    }

    pub fn status(&self) -> TireStatus {
        let advisory = self.pit_advisory();

        TireStatus {
            compound: self.compound,
            age: self.age,
            max_laps: self.compound.pars().max_laps,
            should_pit: advisory.should_pit,
            reason: advisory.reason,
            laps_remaining: advisory.laps_remaining,
            avg_temperature: fmt_fixed(self.avg_temperature(), 1),
            avg_wear: fmt_fixed(self.avg_wear(), 1),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// CORNER MODEL ------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

fn update_temperature<R: Rng + ?Sized>(
    corner: &mut TireCorner,
    pos: CornerPos,
    compound: Compound,
    sample: &DrivingSample,
    rng: &mut R,
) {
    let mut heat_generation = sample.speed / 30.0;

    if pos.is_front() && sample.brake > 0.0 {
        heat_generation += sample.brake / 10.0;
    }

    if !pos.is_front() && sample.throttle > 0.0 {
        heat_generation += sample.throttle / 15.0;
    }

    // cornering loads the outer side
    let loaded = (sample.lateral_g > 0.0 && pos.is_left()) || (sample.lateral_g < 0.0 && !pos.is_left());
    if loaded {
        heat_generation += sample.lateral_g.abs() * 2.0;
    }

    let target_temp = compound.optimal_temp_mid() + heat_generation;
    corner.temperature += (target_temp - corner.temperature) * TEMP_SMOOTHING;
    corner.temperature += rng.gen_range(-0.25..0.25);
    corner.temperature = corner.temperature.clamp(TEMP_MIN, TEMP_MAX);

    corner.surface_temp = corner.temperature + rng.gen_range(0.0..5.0);
    corner.inner_temp = corner.temperature - 3.0 + rng.gen_range(0.0..2.0);
}

fn update_pressure<R: Rng + ?Sized>(corner: &mut TireCorner, rng: &mut R) {
    let pressure = PRESSURE_COLD + (corner.temperature - TEMP_COLD) * PRESSURE_PER_DEG;
    corner.pressure = (pressure + rng.gen_range(-0.05..0.05)).clamp(PRESSURE_MIN, PRESSURE_MAX);
}

fn update_wear(corner: &mut TireCorner, compound: Compound, sample: &DrivingSample, dt: f64) {
    let aggression = (sample.throttle + sample.brake + sample.lateral_g.abs() * 30.0) / 150.0;
    let degradation = compound.pars().degr_rate
        * 0.01
        * dt
        * (1.0 + sample.speed / 500.0)
        * (1.0 + aggression);

    corner.wear = (corner.wear - degradation.max(0.0)).max(0.0);

    if corner.wear < WORN_TIRE_THRESHOLD {
        corner.temperature = (corner.temperature + WORN_TIRE_HEATING).min(TEMP_MAX);
    }
}
