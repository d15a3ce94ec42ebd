//! pixframe-core: Core types for fixed-window pixel sensor clustering.
//!
//! This crate provides the sensor geometry, the per-pixel status mask,
//! the clustering configuration, and the cluster records produced by
//! the clustering engine.
//!

pub mod cluster;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod status;

pub use cluster::{ClusterQuality, ClusterRecord};
pub use config::{ClusterLimitPolicy, ClusteringConfig};
pub use error::{ArrayKind, Axis, Error, Result};
pub use event::{EventData, EventKind, SensorSamples};
pub use geometry::{PixelCoord, PixelIndexer, SensorFrame};
pub use status::{PixelStatus, StatusMask};
