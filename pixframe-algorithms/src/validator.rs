//! Cluster-level signal-to-noise acceptance.

use crate::sensor::SensorState;
use crate::window::ClusterCandidate;
use pixframe_core::cluster::ClusterRecord;

/// Accepts candidates with `signal > cluster_cut * sqrt(noise_variance)`.
///
/// Equality rejects. On acceptance the candidate's claimed pixels become
/// HIT for the rest of the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterValidator {
    cluster_cut: f64,
}

impl ClusterValidator {
    /// Creates a validator with the given cluster cut.
    #[must_use]
    pub fn new(cluster_cut: f64) -> Self {
        Self { cluster_cut }
    }

    /// The cluster cut in units of cluster noise.
    #[must_use]
    pub fn cluster_cut(&self) -> f64 {
        self.cluster_cut
    }

    /// Returns true if the candidate passes the cut.
    #[must_use]
    pub fn accepts(&self, candidate: &ClusterCandidate) -> bool {
        candidate.signal > self.cluster_cut * candidate.noise_variance.sqrt()
    }

    /// Claims the candidate's pixels and turns it into a record.
    ///
    /// Does not re-check the cut.
    pub fn commit(&self, candidate: ClusterCandidate, sensor: &mut SensorState) -> ClusterRecord {
        sensor.mask_mut().claim(&candidate.claims);
        let cluster_id = sensor.allocate_cluster_id();

        ClusterRecord {
            sensor_id: sensor.id(),
            cluster_id,
            seed: candidate.seed,
            x_size: candidate.x_size,
            y_size: candidate.y_size,
            charges: candidate.charges,
            quality: candidate.quality,
            signal: candidate.signal,
            noise_variance: candidate.noise_variance,
        }
    }

    /// Commits the candidate if it passes the cut; a rejected candidate
    /// leaves the sensor untouched.
    pub fn validate(
        &self,
        candidate: ClusterCandidate,
        sensor: &mut SensorState,
    ) -> Option<ClusterRecord> {
        if self.accepts(&candidate) {
            Some(self.commit(candidate, sensor))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixframe_core::cluster::ClusterQuality;
    use pixframe_core::geometry::{PixelCoord, SensorFrame};
    use pixframe_core::status::PixelStatus;

    fn candidate(signal: f64, noise_variance: f64, claims: Vec<usize>) -> ClusterCandidate {
        ClusterCandidate {
            seed: PixelCoord::new(1, 1),
            x_size: 3,
            y_size: 3,
            charges: vec![0.0; 9],
            quality: ClusterQuality::GOOD,
            signal,
            noise_variance,
            claims,
        }
    }

    fn sensor() -> SensorState {
        SensorState::new(3, SensorFrame::with_size(3, 3).unwrap()).unwrap()
    }

    #[test]
    fn test_equality_rejects() {
        let validator = ClusterValidator::new(3.0);
        assert!(!validator.accepts(&candidate(9.0, 9.0, vec![])));
        assert!(validator.accepts(&candidate(10.0, 9.0, vec![])));
    }

    #[test]
    fn test_accept_claims_pixels() {
        let mut sensor = sensor();
        let record = ClusterValidator::new(3.0)
            .validate(candidate(130.0, 9.0, vec![0, 4, 8]), &mut sensor)
            .unwrap();

        assert_eq!(record.sensor_id, 3);
        assert_eq!(record.cluster_id, 0);
        assert_eq!(sensor.mask().count(PixelStatus::Hit), 3);
        assert_eq!(sensor.mask().get(4), PixelStatus::Hit);
        assert_eq!(sensor.lifetime_clusters(), 1);
    }

    #[test]
    fn test_reject_leaves_sensor_untouched() {
        let mut sensor = sensor();
        let result = ClusterValidator::new(3.0).validate(candidate(1.0, 9.0, vec![0, 1]), &mut sensor);
        assert!(result.is_none());
        assert_eq!(sensor.mask().count(PixelStatus::Hit), 0);
        assert_eq!(sensor.event_clusters(), 0);
        assert_eq!(sensor.lifetime_clusters(), 0);
    }

    #[test]
    fn test_ids_increase_per_event() {
        let mut sensor = sensor();
        let validator = ClusterValidator::new(1.0);
        let first = validator.validate(candidate(5.0, 1.0, vec![0]), &mut sensor).unwrap();
        let second = validator.validate(candidate(5.0, 1.0, vec![1]), &mut sensor).unwrap();
        assert_eq!((first.cluster_id, second.cluster_id), (0, 1));

        sensor.begin_event();
        let third = validator.validate(candidate(5.0, 1.0, vec![0]), &mut sensor).unwrap();
        assert_eq!(third.cluster_id, 0);
        assert_eq!(sensor.lifetime_clusters(), 3);
    }
}
