#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
use pixframe_algorithms::{
    ClusterLimitPolicy, ClusteringConfig, EventClusteringEngine, EventOutcome, SensorState,
};
use pixframe_core::{
    ArrayKind, ClusterRecord, Error, EventData, EventKind, PixelCoord, SensorFrame, SensorSamples,
};
use std::collections::HashSet;

/// Deterministic LCG for reproducible test input.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Positive noise floor plus a sprinkling of bright pixels.
fn noisy_samples(frame: &SensorFrame, seed: u64) -> SensorSamples {
    let mut rng = Lcg(seed);
    let charge = (0..frame.pixel_count())
        .map(|_| {
            let base = 0.1 + rng.next_f64();
            if rng.next_f64() < 0.06 {
                base + 20.0 + 80.0 * rng.next_f64()
            } else {
                base
            }
        })
        .collect();
    SensorSamples::with_uniform_noise(charge, 1.0)
}

fn engine(frames: &[SensorFrame], config: ClusteringConfig) -> EventClusteringEngine {
    let sensors = frames
        .iter()
        .enumerate()
        .map(|(id, frame)| SensorState::new(id, *frame).unwrap())
        .collect();
    EventClusteringEngine::new(config, sensors).unwrap()
}

/// Pixels a record contributed, recovered from its positive raster entries.
fn contributed(record: &ClusterRecord) -> Vec<PixelCoord> {
    let hx = (record.x_size / 2) as i32;
    let hy = (record.y_size / 2) as i32;
    record
        .charges
        .iter()
        .enumerate()
        .filter(|(_, &q)| q > 0.0)
        .map(|(i, _)| {
            let dx = (i % record.x_size) as i32 - hx;
            let dy = (i / record.x_size) as i32 - hy;
            record.seed.offset(dx, dy).unwrap()
        })
        .collect()
}

#[test]
fn test_claimed_pixels_are_disjoint() {
    let frame = SensorFrame::with_size(40, 30).unwrap();
    let mut engine = engine(
        &[frame, frame],
        ClusteringConfig::new().with_cluster_size(5, 3),
    );

    for number in 0..5 {
        let event = EventData::data(
            number,
            vec![
                noisy_samples(&frame, 2 * number + 1),
                noisy_samples(&frame, 2 * number + 2),
            ],
        );
        let outcome = engine.process_event(&event).unwrap();
        let clusters = outcome.clusters().expect("bright pixels should cluster");
        assert!(clusters.total_clusters() > 1);

        for sensor in &clusters.sensors {
            let mut seen = HashSet::new();
            for record in &sensor.clusters {
                for coord in contributed(record) {
                    assert!(
                        seen.insert(coord),
                        "pixel {coord:?} claimed twice on sensor {}",
                        sensor.sensor_id
                    );
                }
            }
        }
    }
}

#[test]
fn test_raster_length_is_fixed() {
    let frame = SensorFrame::with_size(12, 12).unwrap();
    let config = ClusteringConfig::new().with_cluster_size(7, 5);
    let mut engine = engine(&[frame], config);
    let event = EventData::data(0, vec![noisy_samples(&frame, 99)]);

    let outcome = engine.process_event(&event).unwrap();
    for record in outcome.clusters().unwrap().iter() {
        assert_eq!(record.charges.len(), 35);
        assert_eq!((record.x_size, record.y_size), (7, 5));
    }
}

#[test]
fn test_first_cluster_is_brightest_seed() {
    let frame = SensorFrame::with_size(25, 25).unwrap();
    let mut engine = engine(&[frame], ClusteringConfig::new().with_cluster_size(3, 3));
    let samples = noisy_samples(&frame, 7);

    let (brightest, _) = samples
        .charge
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap();

    let event = EventData::data(0, vec![samples.clone()]);
    let outcome = engine.process_event(&event).unwrap();
    let first = &outcome.clusters().unwrap().sensors[0].clusters[0];
    assert_eq!(first.seed, frame.indexer().coord(brightest));

    let seed_charges: Vec<f64> = outcome
        .clusters()
        .unwrap()
        .iter()
        .map(ClusterRecord::seed_charge)
        .collect();
    assert!(seed_charges.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_equal_charge_seeds_are_all_clustered() {
    let frame = SensorFrame::with_size(9, 1).unwrap();
    let mut engine = engine(&[frame], ClusteringConfig::new().with_cluster_size(1, 1));

    let mut charge = vec![0.0; 9];
    for x in [1, 4, 7] {
        charge[x] = 25.0;
    }
    let event = EventData::data(0, vec![SensorSamples::with_uniform_noise(charge, 1.0)]);
    let outcome = engine.process_event(&event).unwrap();
    let seeds: Vec<i32> = outcome.clusters().unwrap().iter().map(|c| c.seed.x).collect();
    assert_eq!(seeds, vec![1, 4, 7]);
}

#[test]
fn test_acceptance_boundary() {
    let frame = SensorFrame::with_size(1, 1).unwrap();
    let config = ClusteringConfig::new()
        .with_cluster_size(1, 1)
        .with_seed_cut(2.0)
        .with_cluster_cut(3.0);
    let mut engine = engine(&[frame], config);

    // signal 9 == 3 * sqrt(9)
    let at_cut = EventData::data(0, vec![SensorSamples::new(vec![9.0], vec![3.0])]);
    assert_eq!(engine.process_event(&at_cut).unwrap(), EventOutcome::NoClusters);

    let above = EventData::data(1, vec![SensorSamples::new(vec![10.0], vec![3.0])]);
    let outcome = engine.process_event(&above).unwrap();
    assert_eq!(outcome.clusters().unwrap().total_clusters(), 1);
}

#[test]
fn test_identical_input_gives_identical_output() {
    let frame = SensorFrame::with_size(30, 20).unwrap();
    let events: Vec<EventData> = (0..3)
        .map(|n| EventData::data(n, vec![noisy_samples(&frame, 40 + n), noisy_samples(&frame, 80 + n)]))
        .collect();

    let run = |config: ClusteringConfig| -> Vec<EventOutcome> {
        let mut engine = engine(&[frame, frame], config);
        events.iter().map(|e| engine.process_event(e).unwrap()).collect()
    };

    let config = ClusteringConfig::new().with_cluster_size(3, 3);
    let first = run(config.clone());
    let second = run(config.clone());
    assert_eq!(first, second);

    let sequential = run(config.with_parallel_sensors(false));
    assert_eq!(first, sequential);
}

#[test]
fn test_status_reset_between_events() {
    let frame = SensorFrame::with_size(20, 20).unwrap();
    let mut engine = engine(&[frame], ClusteringConfig::new().with_cluster_size(3, 3));
    let event = EventData::data(0, vec![noisy_samples(&frame, 5)]);

    let first = engine.process_event(&event).unwrap();
    let second = engine.process_event(&event).unwrap();
    let count = first.clusters().unwrap().total_clusters() as u64;

    // same event again: HIT pixels were released, ids restart at 0
    assert_eq!(first.clusters().unwrap().sensors, second.clusters().unwrap().sensors);
    assert_eq!(engine.cluster_totals(), vec![2 * count]);
}

#[test]
fn test_no_output_and_end_of_run() {
    let frame = SensorFrame::with_size(4, 4).unwrap();
    let mut engine = engine(&[frame, frame], ClusteringConfig::new().with_cluster_size(3, 3));

    let quiet = EventData::data(
        0,
        vec![
            SensorSamples::with_uniform_noise(vec![0.5; 16], 1.0),
            SensorSamples::with_uniform_noise(vec![0.5; 16], 1.0),
        ],
    );
    assert_eq!(engine.process_event(&quiet).unwrap(), EventOutcome::NoClusters);

    let mut bright = vec![0.5; 16];
    bright[5] = 40.0;
    let one_sided = EventData::data(
        1,
        vec![
            SensorSamples::with_uniform_noise(vec![0.5; 16], 1.0),
            SensorSamples::with_uniform_noise(bright, 1.0),
        ],
    );
    let outcome = engine.process_event(&one_sided).unwrap();
    let clusters = outcome.clusters().unwrap();
    assert!(clusters.sensors[0].clusters.is_empty());
    assert_eq!(clusters.sensors[1].clusters.len(), 1);
    assert_eq!(clusters.sensors[1].clusters[0].sensor_id, 1);

    assert_eq!(
        engine.process_event(&EventData::end_of_run(2)).unwrap(),
        EventOutcome::EndOfRun
    );

    let stats = engine.finish_run();
    assert_eq!(stats.events_processed, 3);
    assert_eq!(stats.data_events, 2);
    assert_eq!(stats.events_without_output, 1);
    assert_eq!(stats.end_of_run_markers, 1);
    assert_eq!(stats.clusters_per_sensor, vec![0, 1]);
    assert_eq!(stats.total_clusters(), 1);
}

#[test]
fn test_unknown_kind_is_clustered() {
    let frame = SensorFrame::with_size(3, 3).unwrap();
    let mut engine = engine(&[frame], ClusteringConfig::new().with_cluster_size(3, 3));
    let mut charge = vec![0.0; 9];
    charge[4] = 30.0;
    let event = EventData {
        number: 11,
        kind: EventKind::Unknown,
        sensors: vec![SensorSamples::with_uniform_noise(charge, 1.0)],
    };
    let outcome = engine.process_event(&event).unwrap();
    assert_eq!(outcome.clusters().unwrap().event_number, 11);
}

#[test]
fn test_shape_mismatch_aborts_the_run() {
    let frame = SensorFrame::with_size(3, 3).unwrap();
    let mut engine = engine(&[frame], ClusteringConfig::new().with_cluster_size(3, 3));

    let broken = EventData::data(0, vec![SensorSamples::new(vec![0.0; 9], vec![1.0; 8])]);
    let err = engine.process_event(&broken).unwrap_err();
    assert_eq!(
        err,
        Error::PixelCountMismatch {
            sensor: 0,
            array: ArrayKind::Noise,
            expected: 9,
            found: 8
        }
    );
    assert!(err.is_shape_mismatch());
    assert!(engine.is_aborted());

    let fine = EventData::data(1, vec![SensorSamples::with_uniform_noise(vec![30.0; 9], 1.0)]);
    assert!(matches!(
        engine.process_event(&fine),
        Err(Error::RunAborted(_))
    ));

    engine.start_run();
    assert!(engine.process_event(&fine).is_ok());
}

#[test]
fn test_sensor_count_mismatch() {
    let frame = SensorFrame::with_size(3, 3).unwrap();
    let mut engine = engine(&[frame, frame], ClusteringConfig::default());
    let event = EventData::data(0, vec![SensorSamples::with_uniform_noise(vec![0.0; 9], 1.0)]);
    assert_eq!(
        engine.process_event(&event),
        Err(Error::SensorCountMismatch {
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn test_invalid_configuration_prevents_engine() {
    let frame = SensorFrame::with_size(3, 3).unwrap();
    let sensors = vec![SensorState::new(0, frame).unwrap()];
    let result = EventClusteringEngine::new(ClusteringConfig::new().with_cluster_size(2, 3), sensors);
    assert!(result.is_err_and(|e| e.is_configuration()));
}

#[test]
fn test_enforced_limit_is_reported() {
    let frame = SensorFrame::with_size(10, 1).unwrap();
    let config = ClusteringConfig::new()
        .with_cluster_size(1, 1)
        .with_cluster_limit(3, ClusterLimitPolicy::Enforced);
    let mut engine = engine(&[frame], config);
    let event = EventData::data(0, vec![SensorSamples::with_uniform_noise(vec![50.0; 10], 1.0)]);

    let outcome = engine.process_event(&event).unwrap();
    assert_eq!(outcome.clusters().unwrap().total_clusters(), 3);
    assert_eq!(engine.statistics().events_over_limit, 1);
}
