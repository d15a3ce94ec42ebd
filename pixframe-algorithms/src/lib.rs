//! pixframe-algorithms: Fixed-window clustering of pixel sensor events.
//!
//! This crate provides the building blocks of the clustering pass:
//! - **`SeedFinder`** - ordered seed candidates above `seed_cut * noise`
//! - **`ClusterBuilder`** - fixed rectangular window with BORDER/INCOMPLETE flags
//! - **`ClusterValidator`** - cluster signal-to-noise cut, pixel claiming
//! - **`EventClusteringEngine`** - per-event, per-sensor orchestration
//!
#![warn(missing_docs)]

mod engine;
mod fixed_frame;
mod seed;
mod sensor;
mod statistics;
mod strategy;
mod validator;
mod window;

pub use engine::{EventClusteringEngine, EventClusters, EventOutcome, SensorClusters};
pub use fixed_frame::FixedFrameClustering;
pub use seed::{SeedCandidate, SeedFinder};
pub use sensor::SensorState;
pub use statistics::{ClusteringStatistics, SeedStatistics};
pub use strategy::{SensorClustering, SensorPass};
pub use validator::ClusterValidator;
pub use window::{ClusterBuilder, ClusterCandidate};

// Re-export core configuration
pub use pixframe_core::config::{ClusterLimitPolicy, ClusteringConfig};
