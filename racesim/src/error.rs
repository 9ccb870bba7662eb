use thiserror::Error;

/// ConfigError is returned if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., a non-positive track length.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive number, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("car {car_id} starts at {s_start}m, which is not within the first lap")]
    StartBeyondTrack { car_id: String, s_start: f64 },
    #[error("race needs at least one car")]
    EmptyRoster,
    #[error("car id {0} is used more than once")]
    DuplicateCarId(String),
    #[error("could not parse team color {color:?} of car {car_id}")]
    InvalidColor { car_id: String, color: String },
}

/// CommandParseError is returned for inbound command lines that cannot be understood.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("pit command needs a car id")]
    MissingCarId,
    #[error("unknown command {0:?}")]
    Unknown(String),
}
