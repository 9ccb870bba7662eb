use crate::core::car::{default_roster, CarPars};
use crate::core::race::RaceConfig;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. Missing entries fall back to the
/// default race (58 laps on a 5281m track at 30 Hz) and the default 2-car roster.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimPars {
    #[serde(default)]
    pub race_pars: RaceConfig,
    #[serde(default = "default_roster")]
    pub car_pars_all: Vec<CarPars>,
}

impl Default for SimPars {
    fn default() -> Self {
        SimPars {
            race_pars: RaceConfig::default(),
            car_pars_all: default_roster(),
        }
    }
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

/// load_sim_pars reads the parameter file (if given) and applies the race options of the command
/// line and environment on top.
pub fn load_sim_pars(sim_opts: &SimOpts) -> anyhow::Result<SimPars> {
    let mut sim_pars = match &sim_opts.parfile_path {
        Some(parfile_path) => read_sim_pars(parfile_path)?,
        None => SimPars::default(),
    };

    if let Some(total_laps) = sim_opts.total_laps {
        sim_pars.race_pars.tot_no_laps = total_laps;
    }
    if let Some(track_length) = sim_opts.track_length {
        sim_pars.race_pars.track_length = track_length;
    }
    if let Some(update_frequency) = sim_opts.update_frequency {
        sim_pars.race_pars.update_frequency = update_frequency;
    }

    sim_pars
        .race_pars
        .validate()
        .context("Invalid race parameters!")?;

    Ok(sim_pars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tireset::Compound;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;

    fn write_parfile(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("racesim_{}_{}.json", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn full_parameter_file() {
        let path = write_parfile(
            "full",
            r##"{
                "race_pars": {"tot_no_laps": 10, "track_length": 3337.0, "update_frequency": 20.0},
                "car_pars_all": [
                    {"id": "a", "name": "ALPHA", "color": "#ff0000", "compound": "HARD"},
                    {"id": "b", "name": "BRAVO", "color": "#00ff00", "s_start": 50.0, "compound": "SOFT"},
                    {"id": "c", "name": "CHARLIE", "color": "#0000ff", "s_start": 100.0, "compound": "MEDIUM"}
                ]
            }"##,
        );

        let sim_pars = read_sim_pars(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(sim_pars.race_pars.tot_no_laps, 10);
        assert_eq!(sim_pars.car_pars_all.len(), 3);
        assert_eq!(sim_pars.car_pars_all[0].s_start, 0.0);
        assert_eq!(sim_pars.car_pars_all[0].compound, Compound::Hard);
    }

    #[test]
    fn partial_parameter_file_uses_defaults() {
        let path = write_parfile("partial", r#"{"race_pars": {"tot_no_laps": 5}}"#);

        let sim_pars = read_sim_pars(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(sim_pars.race_pars.tot_no_laps, 5);
        assert_eq!(sim_pars.race_pars.track_length, 5281.0);
        assert_eq!(sim_pars.car_pars_all, default_roster());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_sim_pars(Path::new("/nonexistent/racesim.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open parameter file"));
    }

    #[test]
    fn options_override_file() {
        let path = write_parfile("override", r#"{"race_pars": {"tot_no_laps": 5}}"#);
        let sim_opts = SimOpts::try_parse_from(&[
            "rs-telemetry",
            "-p",
            path.to_str().unwrap(),
            "--total-laps",
            "12",
            "--track-length",
            "4000",
        ])
        .unwrap();

        let sim_pars = load_sim_pars(&sim_opts).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(sim_pars.race_pars.tot_no_laps, 12);
        assert_eq!(sim_pars.race_pars.track_length, 4000.0);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let sim_opts =
            SimOpts::try_parse_from(&["rs-telemetry", "--update-frequency", "0"]).unwrap();
        assert!(load_sim_pars(&sim_opts).is_err());
    }
}
