use crate::core::tireset::{Compound, TireStatus};
use serde::Serialize;

/// Gap between the leading and the immediately trailing car.
/// * `distance_meters` - (m) Rounded distance gap, never negative
/// * `time_seconds` - (s) Estimated from the follower's current speed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub distance_meters: i64,
    pub time_seconds: f64,
    pub leader: String,
    pub follower: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceStateInfo {
    pub current_lap: u32,
    pub total_laps: u32,
    pub gap: Option<Gap>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub speed: i64,
    pub position: i64,
    pub track_progress: f64,
    pub sector: u8,
}

/// Lap times are formatted with three decimals, e.g. "92.417".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingInfo {
    pub lap_number: u32,
    pub current_lap_time: String,
    pub last_lap_time: Option<String>,
    pub best_lap_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInfo {
    pub throttle: i64,
    pub brake: i64,
    pub gear: u8,
    pub rpm: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CornerInfo {
    pub temp: i64,
    pub pressure: String,
    pub wear: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiresInfo {
    pub compound: Compound,
    pub age: u32,
    pub fl: CornerInfo,
    pub fr: CornerInfo,
    pub rl: CornerInfo,
    pub rr: CornerInfo,
    pub status: TireStatus,
}

/// CarInfo is the display projection of a single car. `position` is the standings rank, the
/// position on the track is contained in `track`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarInfo {
    pub id: String,
    pub name: String,
    pub team_color: String,
    pub position: u32,
    pub track: TrackInfo,
    pub timing: TimingInfo,
    pub driver: DriverInfo,
    pub tires: TiresInfo,
}

/// Snapshot is the fully formatted, read-only race state that is handed to the broadcast layer.
/// * `timestamp` - (ms) Time since the Unix epoch
/// * `race_time` - (s) Elapsed race time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: u64,
    pub race_time: f64,
    pub race_state: RaceStateInfo,
    pub cars: Vec<CarInfo>,
}
