use crate::interfaces::broadcast_interface::Snapshot;

pub const DEFAULT_SIGNAL_RATE: f64 = 20.0;

/// SignalEntry is the reduced state of a car for the hardware signaling bridge.
/// * `position` - (m) Rounded position within the current lap
/// * `speed` - (km/h) Rounded speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEntry {
    pub position: i64,
    pub speed: i64,
}

/// SignalFrame contains one entry per car in roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalFrame {
    pub entries: Vec<SignalEntry>,
}

impl From<&Snapshot> for SignalFrame {
    fn from(snapshot: &Snapshot) -> Self {
        SignalFrame {
            entries: snapshot
                .cars
                .iter()
                .map(|car| SignalEntry {
                    position: car.track.position,
                    speed: car.track.speed,
                })
                .collect(),
        }
    }
}

impl SignalFrame {
    /// to_csv_line returns the frame as `pos_1,speed_1,pos_2,speed_2,...` terminated by a newline.
    pub fn to_csv_line(&self) -> String {
        let fields: Vec<String> = self
            .entries
            .iter()
            .flat_map(|entry| vec![entry.position.to_string(), entry.speed.to_string()])
            .collect();
        format!("{}\n", fields.join(","))
    }
}

/// SignalThrottle limits signal frames to their own, lower rate.
#[derive(Debug, Clone)]
pub struct SignalThrottle {
    interval: f64,
    t_last_send: Option<f64>,
}

impl SignalThrottle {
    /// rate in Hz, non-positive rates let every frame pass
    pub fn new(rate: f64) -> SignalThrottle {
        SignalThrottle {
            interval: if rate > 0.0 { 1.0 / rate } else { 0.0 },
            t_last_send: None,
        }
    }

    /// ready returns true (and marks the frame as sent) if the interval has passed since the last
    /// frame. `t_sim` is the simulated time in seconds.
    pub fn ready(&mut self, t_sim: f64) -> bool {
        let due = match self.t_last_send {
            None => true,
            // tolerate float noise of accumulated timesteps
            Some(t_last) => t_sim - t_last >= self.interval - 1e-9,
        };
        if due {
            self.t_last_send = Some(t_sim);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::car::default_roster;
    use crate::core::race::{RaceConfig, RaceSimulation};

    #[test]
    fn frame_from_snapshot() {
        let mut race = RaceSimulation::with_seed(RaceConfig::default(), &default_roster(), 1).unwrap();
        race.update();

        let snapshot = race.get_current_state();
        let frame = SignalFrame::from(&snapshot);
        assert_eq!(frame.entries.len(), 2);
        assert_eq!(frame.entries[1].position, snapshot.cars[1].track.position);
        assert_eq!(frame.entries[0].speed, snapshot.cars[0].track.speed);
    }

    #[test]
    fn csv_line_format() {
        let frame = SignalFrame {
            entries: vec![
                SignalEntry {
                    position: 1204,
                    speed: 281,
                },
                SignalEntry {
                    position: 1130,
                    speed: 275,
                },
            ],
        };
        assert_eq!(frame.to_csv_line(), "1204,281,1130,275\n");
    }

    #[test]
    fn throttle_limits_rate() {
        let mut throttle = SignalThrottle::new(DEFAULT_SIGNAL_RATE);
        let timestep_size = 1.0 / 30.0;

        let sent = (1..=90)
            .filter(|&i| throttle.ready(i as f64 * timestep_size))
            .count();

        // 3s of 30 Hz ticks, frames need 50ms between them -> every second tick
        assert_eq!(sent, 45);
    }

    #[test]
    fn zero_rate_passes_everything() {
        let mut throttle = SignalThrottle::new(0.0);
        assert!((0..10).all(|i| throttle.ready(i as f64 * 0.01)));
    }
}
