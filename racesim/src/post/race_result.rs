use crate::core::car::Car;
use crate::core::tireset::Compound;
use serde::Serialize;
use std::fmt;

/// CarResult contains the race information of a single car that is required for post-processing.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CarResult {
    pub id: String,
    pub name: String,
    pub race_position: u32,
    pub lap_number: u32,
    pub last_laptime: Option<f64>,
    pub best_laptime: Option<f64>,
    pub compound: Compound,
    pub tire_age: u32,
    pub pit_stops: u32,
}

impl From<&Car> for CarResult {
    fn from(car: &Car) -> Self {
        CarResult {
            id: car.id.to_owned(),
            name: car.name.to_owned(),
            race_position: car.race_position,
            lap_number: car.lap_number,
            last_laptime: car.last_laptime,
            best_laptime: car.best_laptime,
            compound: car.tireset().compound,
            tire_age: car.tireset().age,
            pit_stops: car.pit_stops,
        }
    }
}

/// RaceResult is the final summary of a simulation run, cars sorted by standings.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RaceResult {
    pub tot_no_laps: u32,
    pub race_time: f64,
    pub car_results: Vec<CarResult>,
}

fn fmt_laptime(laptime: Option<f64>) -> String {
    match laptime {
        Some(t) => format!("{:8.3}s", t),
        None => format!("{:>9}", "-"),
    }
}

impl fmt::Display for RaceResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "RESULT: Standings after {:.3}s", self.race_time)?;
        writeln!(
            f,
            "pos, {:10}, lap, {:>9}, {:>9}, compound, age, stops",
            "car", "last", "best"
        )?;

        for car_result in self.car_results.iter() {
            writeln!(
                f,
                "{:3}, {:10}, {:3}, {}, {}, {:>8}, {:3}, {:5}",
                car_result.race_position,
                car_result.name,
                car_result.lap_number,
                fmt_laptime(car_result.last_laptime),
                fmt_laptime(car_result.best_laptime),
                car_result.compound.as_str(),
                car_result.tire_age,
                car_result.pit_stops
            )?;
        }
        Ok(())
    }
}
