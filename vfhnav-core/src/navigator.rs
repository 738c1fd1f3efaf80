use naci::{MarkerDetection, Policy, PointCloud};

use crate::{
    arbiter::{Arbiter, Decision},
    config::NavigationConfig,
    error::Error,
    histogram::{Histogram, HistogramBuilder},
    marker::{GoalTracker, MarkerObservation},
    obstacle::{ObstacleClassifier, ObstacleState},
};

/// Everything computed during one control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub histogram: Histogram,
    pub obstacle: ObstacleState,
    pub marker: MarkerObservation,
    pub decision: Decision,
}

/// Runs the whole decision pipeline for one cycle.
#[derive(Debug, Clone)]
pub struct Navigator {
    config: NavigationConfig,
    histogram: HistogramBuilder,
    classifier: ObstacleClassifier,
    tracker: GoalTracker,
    arbiter: Arbiter,
}

impl Navigator {
    /// Validates `config` and builds the pipeline stages from it.
    pub fn new(config: NavigationConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            histogram: HistogramBuilder::new(&config.vfh),
            classifier: ObstacleClassifier::new(&config.vfh),
            tracker: GoalTracker::new(&config.marker),
            arbiter: Arbiter::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn step(
        &self,
        cloud: &PointCloud,
        detection: Option<&MarkerDetection>,
        policy: Policy,
    ) -> CycleReport {
        let histogram = self.histogram.build(cloud);
        let obstacle = self.classifier.classify(&histogram);
        let marker = self.tracker.observe(detection);
        let decision = self.arbiter.decide(&obstacle, &marker, policy);
        tracing::debug!(
            histogram = ?histogram.clamped(self.config.vfh.histogram_cap),
            blocked = ?obstacle.blocked_sectors,
            marker = ?marker,
            ?policy,
            %decision,
            "cycle"
        );
        CycleReport {
            histogram,
            obstacle,
            marker,
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use naci::{MotionAction, Point3};

    use super::*;
    use crate::arbiter::Mode;

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = NavigationConfig::default();
        config.vfh.num_sectors = 0;
        assert!(Navigator::new(config).is_err());
    }

    #[test]
    fn test_step() {
        let navigator = Navigator::new(NavigationConfig::default()).unwrap();
        let cloud = PointCloud::new(vec![Point3::new(-0.2, 0.0, 0.5)]);
        let detection = MarkerDetection::new(1, 0.5, Some(2.0));

        let report = navigator.step(&cloud, Some(&detection), Policy::Hybrid);
        assert!(report.obstacle.blocked);
        assert_eq!(report.decision.mode, Mode::VfhActive);
        assert!(report.marker.is_visible());

        let report = navigator.step(&PointCloud::default(), Some(&detection), Policy::Hybrid);
        assert_eq!(report.decision.mode, Mode::ArucoTracking);
        assert_eq!(report.decision.command.action, MotionAction::Forward);
    }
}
