//! Per-event orchestration of the sensor clustering passes.
//!
//! For every data event and sensor: reset the status mask, find seeds,
//! build and validate one window per seed in descending charge, and
//! collect the accepted clusters. Sensors are independent of each other
//! and can be processed on the rayon pool; the seeds of one sensor are
//! always processed in order.

use crate::fixed_frame::FixedFrameClustering;
use crate::sensor::SensorState;
use crate::statistics::ClusteringStatistics;
use crate::strategy::{SensorClustering, SensorPass};
use log::{debug, info, warn};
use pixframe_core::cluster::ClusterRecord;
use pixframe_core::config::ClusteringConfig;
use pixframe_core::error::{Error, Result};
use pixframe_core::event::{EventData, EventKind, SensorSamples};
use rayon::prelude::*;

/// Accepted clusters of one sensor in one event.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorClusters {
    /// Sensor identifier.
    pub sensor_id: usize,
    /// Clusters in acceptance order (ids 0, 1, ...).
    pub clusters: Vec<ClusterRecord>,
}

/// Accepted clusters of one event, one entry per sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct EventClusters {
    /// Event number from the input.
    pub event_number: u64,
    /// Per-sensor cluster lists in geometry order; some may be empty.
    pub sensors: Vec<SensorClusters>,
}

impl EventClusters {
    /// Number of clusters over all sensors.
    #[must_use]
    pub fn total_clusters(&self) -> usize {
        self.sensors.iter().map(|s| s.clusters.len()).sum()
    }

    /// Iterates all clusters, sensor by sensor.
    pub fn iter(&self) -> impl Iterator<Item = &ClusterRecord> {
        self.sensors.iter().flat_map(|s| s.clusters.iter())
    }
}

/// Non-fatal result of one submitted event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// At least one sensor produced a cluster.
    Clusters(EventClusters),
    /// No sensor produced a cluster; nothing to hand downstream.
    NoClusters,
    /// End-of-run marker; nothing was clustered.
    EndOfRun,
}

impl EventOutcome {
    /// The clusters, if any were produced.
    #[must_use]
    pub fn clusters(&self) -> Option<&EventClusters> {
        match self {
            EventOutcome::Clusters(clusters) => Some(clusters),
            _ => None,
        }
    }

    /// Consumes the outcome and returns the clusters, if any.
    #[must_use]
    pub fn into_clusters(self) -> Option<EventClusters> {
        match self {
            EventOutcome::Clusters(clusters) => Some(clusters),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RunState {
    AwaitingFirstEvent,
    Running,
    Aborted(String),
}

/// Clustering engine holding the per-sensor state of one run.
pub struct EventClusteringEngine<C = FixedFrameClustering> {
    strategy: C,
    sensors: Vec<SensorState>,
    parallel: bool,
    run: RunState,
    stats: ClusteringStatistics,
}

impl EventClusteringEngine<FixedFrameClustering> {
    /// Creates a fixed-frame engine.
    ///
    /// # Errors
    /// Returns a configuration error if the window size or a cut is invalid.
    pub fn new(config: ClusteringConfig, sensors: Vec<SensorState>) -> Result<Self> {
        let parallel = config.parallel_sensors;
        let strategy = FixedFrameClustering::new(config)?;
        Ok(Self::with_strategy(strategy, sensors, parallel))
    }
}

impl<C: SensorClustering> EventClusteringEngine<C> {
    /// Creates an engine around any strategy.
    #[must_use]
    pub fn with_strategy(strategy: C, sensors: Vec<SensorState>, parallel: bool) -> Self {
        let mut engine = Self {
            strategy,
            sensors,
            parallel,
            run: RunState::AwaitingFirstEvent,
            stats: ClusteringStatistics::default(),
        };
        engine.start_run();
        engine
    }

    /// The clustering strategy.
    #[must_use]
    pub fn strategy(&self) -> &C {
        &self.strategy
    }

    /// Per-sensor state in geometry order.
    #[must_use]
    pub fn sensors(&self) -> &[SensorState] {
        &self.sensors
    }

    /// Returns true once a fatal error has stopped the run.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.run, RunState::Aborted(_))
    }

    /// Lifetime cluster totals per sensor.
    #[must_use]
    pub fn cluster_totals(&self) -> Vec<u64> {
        self.sensors.iter().map(SensorState::lifetime_clusters).collect()
    }

    /// Starts a new run: clears counters, totals and any earlier abort.
    pub fn start_run(&mut self) {
        for sensor in &mut self.sensors {
            sensor.begin_run();
        }
        self.stats = ClusteringStatistics::default();
        self.run = RunState::AwaitingFirstEvent;
    }

    /// Snapshot of the run statistics.
    #[must_use]
    pub fn statistics(&self) -> ClusteringStatistics {
        let mut stats = self.stats.clone();
        stats.clusters_per_sensor = self.cluster_totals();
        stats
    }

    /// Logs the per-sensor totals and returns the run statistics.
    pub fn finish_run(&mut self) -> ClusteringStatistics {
        let stats = self.statistics();
        info!(
            "{} finished: {} data events, {} without clusters",
            self.strategy.name(),
            stats.data_events,
            stats.events_without_output
        );
        for (sensor, total) in self.sensors.iter().zip(&stats.clusters_per_sensor) {
            info!("found {} clusters on sensor {}", total, sensor.id());
        }
        stats
    }

    /// Clusters one event.
    ///
    /// End-of-run markers are counted and skipped. Events of unknown kind
    /// are clustered like data events.
    ///
    /// # Errors
    /// A sensor count or array length that disagrees with the geometry
    /// stops the run: the mismatch is returned and every later event is
    /// refused with [`Error::RunAborted`] until [`start_run`](Self::start_run).
    pub fn process_event(&mut self, event: &EventData) -> Result<EventOutcome> {
        if let RunState::Aborted(reason) = &self.run {
            return Err(Error::RunAborted(reason.clone()));
        }

        self.stats.events_processed += 1;
        match event.kind {
            EventKind::EndOfRun => {
                debug!("event {}: end of run marker", event.number);
                self.stats.end_of_run_markers += 1;
                return Ok(EventOutcome::EndOfRun);
            }
            EventKind::Unknown => warn!(
                "event {} is of unknown kind, clustering it as a data event",
                event.number
            ),
            EventKind::Data => {}
        }

        if let Err(err) = self.check_shapes(event) {
            self.run = RunState::Aborted(err.to_string());
            return Err(err);
        }
        self.run = RunState::Running;

        if self.stats.data_events.is_multiple_of(10) {
            info!("clustering event {}", event.number);
        }
        self.stats.data_events += 1;

        let passes = self.run_passes(event);

        let mut over_limit = false;
        let mut sensors = Vec::with_capacity(passes.len());
        for (sensor, pass) in self.sensors.iter().zip(passes) {
            self.stats.seeds += pass.seeds;
            if pass.limit_exceeded {
                over_limit = true;
                warn!(
                    "event {} sensor {}: cluster limit exceeded ({} accepted)",
                    event.number,
                    sensor.id(),
                    pass.clusters.len()
                );
            }
            sensors.push(SensorClusters {
                sensor_id: sensor.id(),
                clusters: pass.clusters,
            });
        }
        if over_limit {
            self.stats.events_over_limit += 1;
        }

        let clusters = EventClusters {
            event_number: event.number,
            sensors,
        };
        if clusters.total_clusters() == 0 {
            debug!("event {}: no clusters", event.number);
            self.stats.events_without_output += 1;
            return Ok(EventOutcome::NoClusters);
        }
        Ok(EventOutcome::Clusters(clusters))
    }

    fn check_shapes(&self, event: &EventData) -> Result<()> {
        if event.sensors.len() != self.sensors.len() {
            return Err(Error::SensorCountMismatch {
                expected: self.sensors.len(),
                found: event.sensors.len(),
            });
        }
        for (sensor, samples) in self.sensors.iter().zip(&event.sensors) {
            sensor.check_samples(samples)?;
        }
        Ok(())
    }

    fn run_passes(&mut self, event: &EventData) -> Vec<SensorPass> {
        let strategy = &self.strategy;
        if self.parallel && self.sensors.len() > 1 {
            self.sensors
                .par_iter_mut()
                .zip(event.sensors.par_iter())
                .map(|(sensor, samples)| run_pass(strategy, sensor, samples))
                .collect()
        } else {
            self.sensors
                .iter_mut()
                .zip(&event.sensors)
                .map(|(sensor, samples)| run_pass(strategy, sensor, samples))
                .collect()
        }
    }
}

fn run_pass<C: SensorClustering>(
    strategy: &C,
    sensor: &mut SensorState,
    samples: &SensorSamples,
) -> SensorPass {
    sensor.begin_event();
    strategy.cluster_sensor(samples, sensor)
}
