use racesim::core::car::default_roster;
use racesim::core::clock::{Clock, ManualClock};
use racesim::core::handle_race::{handle_race, BroadcastMsg, LoopOpts, SimCommand};
use racesim::core::race::{RaceConfig, RaceSimulation};
use racesim::core::tireset::Compound;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread;

fn unpaced(max_ticks: Option<u64>, signal_rate: Option<f64>) -> LoopOpts {
    LoopOpts {
        realtime_factor: 0.0,
        max_ticks,
        signal_rate,
        sim_clock: None,
    }
}

fn race_updates(msgs: &[BroadcastMsg]) -> usize {
    msgs.iter()
        .filter(|msg| matches!(msg, BroadcastMsg::RaceUpdate(_)))
        .count()
}

#[test]
fn loop_broadcasts_every_tick_and_stops_at_max_ticks() {
    let mut race = RaceSimulation::with_seed(RaceConfig::default(), &default_roster(), 1).unwrap();
    let (_tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, rx) = flume::unbounded();

    let result = handle_race(&mut race, &unpaced(Some(120), None), &rx_cmd, &tx).unwrap();
    drop(tx);

    let msgs: Vec<BroadcastMsg> = rx.iter().collect();
    assert_eq!(race_updates(&msgs), 120);
    assert_eq!(result.car_results.len(), 2);

    let mut ranks: Vec<u32> = result.car_results.iter().map(|c| c.race_position).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2]);
}

#[test]
fn pit_stops_are_applied_between_ticks_and_broadcast_immediately() {
    let mut race = RaceSimulation::with_seed(RaceConfig::default(), &default_roster(), 2).unwrap();
    let (tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, rx) = flume::unbounded();

    tx_cmd
        .send(SimCommand::PitStop {
            car_id: "car1".to_owned(),
        })
        .unwrap();
    tx_cmd
        .send(SimCommand::PitStop {
            car_id: "car7".to_owned(),
        })
        .unwrap();

    let result = handle_race(&mut race, &unpaced(Some(5), None), &rx_cmd, &tx).unwrap();
    drop(tx);

    let msgs: Vec<BroadcastMsg> = rx.iter().collect();
    // two command broadcasts (the unknown car included) and five tick broadcasts
    assert_eq!(race_updates(&msgs), 7);

    match &msgs[0] {
        BroadcastMsg::RaceUpdate(snapshot) => {
            let car1 = snapshot.cars.iter().find(|c| c.id == "car1").unwrap();
            assert_eq!(car1.tires.compound, Compound::Medium);
            assert_eq!(car1.tires.age, 0);
            assert_eq!(car1.tires.fl.wear, 100);
        }
        other => panic!("unexpected message {:?}", other),
    }

    let car1 = result.car_results.iter().find(|c| c.id == "car1").unwrap();
    assert_eq!(car1.pit_stops, 1);
    assert_eq!(car1.compound, Compound::Medium);
}

#[test]
fn shutdown_ends_unbounded_loop() {
    let clock = ManualClock::new(0);
    let race = RaceSimulation::new(
        RaceConfig::default(),
        &default_roster(),
        StdRng::seed_from_u64(3),
        Box::new(clock),
    )
    .unwrap();
    let (tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, rx) = flume::unbounded();

    let sim_thread = thread::spawn(move || {
        let mut race = race;
        handle_race(&mut race, &unpaced(None, None), &rx_cmd, &tx)
    });

    // wait for some ticks from the simulation thread, then stop it
    for _ in 0..50 {
        rx.recv().unwrap();
    }
    tx_cmd.send(SimCommand::Shutdown).unwrap();

    let result = sim_thread.join().unwrap().unwrap();
    assert_eq!(result.car_results.len(), 2);
}

#[test]
fn signal_frames_run_at_their_own_rate() {
    let mut race = RaceSimulation::with_seed(RaceConfig::default(), &default_roster(), 4).unwrap();
    let (_tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, rx) = flume::unbounded();

    // 3s of simulated time at 30 Hz, signals at 10 Hz
    handle_race(&mut race, &unpaced(Some(90), Some(10.0)), &rx_cmd, &tx).unwrap();
    drop(tx);

    let msgs: Vec<BroadcastMsg> = rx.iter().collect();
    let frames: Vec<String> = msgs
        .iter()
        .filter_map(|msg| match msg {
            BroadcastMsg::Signal(frame) => Some(frame.to_csv_line()),
            _ => None,
        })
        .collect();

    assert_eq!(race_updates(&msgs), 90);
    assert_eq!(frames.len(), 30);
    assert!(frames
        .iter()
        .all(|line| line.ends_with('\n') && line.trim_end().split(',').count() == 4));
}

#[test]
fn closed_broadcast_channel_is_an_error() {
    let mut race = RaceSimulation::with_seed(RaceConfig::default(), &default_roster(), 5).unwrap();
    let (_tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, rx) = flume::unbounded::<BroadcastMsg>();
    drop(rx);

    let err = handle_race(&mut race, &unpaced(Some(10), None), &rx_cmd, &tx).unwrap_err();
    assert!(err.to_string().contains("Failed to broadcast race state"));
}

#[test]
fn simulated_clock_drives_lap_times_in_unpaced_runs() {
    let clock = ManualClock::new(1_700_000_000_000);
    let mut race = RaceSimulation::new(
        RaceConfig::default(),
        &default_roster(),
        StdRng::seed_from_u64(6),
        Box::new(clock.clone()),
    )
    .unwrap();
    let (_tx_cmd, rx_cmd) = flume::unbounded();
    let (tx, _rx) = flume::unbounded();

    // 120s of simulated time, finished in a fraction of that in real time
    let opts = LoopOpts {
        sim_clock: Some(clock.clone()),
        ..unpaced(Some(3600), None)
    };
    let result = handle_race(&mut race, &opts, &rx_cmd, &tx).unwrap();

    assert!((result.race_time - 120.0).abs() < 1e-6);
    assert_eq!(clock.now_ms(), 1_700_000_120_000);

    // no car is faster than 285 km/h, so a lap takes more than a minute of simulated time
    let car1 = race.get_car("car1").unwrap();
    assert_eq!(car1.lap_number, 2);
    assert!(car1.last_laptime.unwrap() > 60.0);
}
