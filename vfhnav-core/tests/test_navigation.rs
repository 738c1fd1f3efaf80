use std::{collections::BTreeSet, time::Duration};

use assert_approx_eq::assert_approx_eq;
use naci::{
    DepthSource, DummyDepthSource, DummyMarkerSource, MarkerDetection, MarkerSource,
    MotionAction, MotionCommand, Point3, PointCloud, Policy,
};
use vfhnav_core::{
    Histogram, LateralZone, Mode, NavigationConfig, Navigator, ObstacleClassifier,
    TurnDirection, VfhConfig,
};

/// A cloud whose histogram has the given per-sector minimum distances.
fn cloud_for(config: &VfhConfig, distances: &[f64]) -> PointCloud {
    let fov = config.horizontal_fov();
    let width = fov / distances.len() as f64;
    distances
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_finite())
        .flat_map(|(i, &d)| {
            let bearing = -fov / 2.0 + width * (i as f64 + 0.5);
            [d, d + 0.5]
                .map(|range| Point3::new(range * bearing.sin(), 0.0, range * bearing.cos()))
        })
        .collect()
}

fn navigator() -> Navigator {
    Navigator::new(NavigationConfig::default()).unwrap()
}

#[test]
fn test_blocked_always_avoids_in_hybrid() {
    let navigator = navigator();
    let cloud = cloud_for(&navigator.config().vfh, &[2.0, 0.4, 2.0, 2.0, 2.0]);
    for detection in [
        None,
        Some(MarkerDetection::new(0, 0.5, Some(0.2))),
        Some(MarkerDetection::new(0, 0.1, Some(1.5))),
        Some(MarkerDetection::new(0, 0.9, None)),
    ] {
        let report = navigator.step(&cloud, detection.as_ref(), Policy::Hybrid);
        assert_eq!(report.decision.mode, Mode::VfhActive);
        assert!(matches!(
            report.decision.command.action,
            MotionAction::TurnLeft | MotionAction::TurnRight
        ));
    }
}

#[test]
fn test_empty_cloud_is_clear() {
    let navigator = navigator();
    let source = DummyDepthSource::new();
    let report = navigator.step(&source.current_cloud().unwrap(), None, Policy::Hybrid);
    assert!(report
        .histogram
        .min_distances()
        .iter()
        .all(|d| d.is_infinite()));
    assert!(!report.obstacle.blocked);
}

#[test]
fn test_reached_regardless_of_zone() {
    let navigator = navigator();
    for x_fraction in [0.05, 0.5, 0.95] {
        let detection = MarkerDetection::new(0, x_fraction, Some(0.3));
        let report = navigator.step(&PointCloud::default(), Some(&detection), Policy::Hybrid);
        assert_eq!(report.decision.mode, Mode::ArucoReached);
        assert_eq!(report.decision.command, MotionCommand::stop());
    }
}

#[test]
fn test_clear_and_lost_is_search() {
    let navigator = navigator();
    let markers = DummyMarkerSource::new();
    let detection = markers.current_marker().unwrap();
    let report = navigator.step(&PointCloud::default(), detection.as_ref(), Policy::Hybrid);
    assert!(!report.marker.is_visible());
    assert_eq!(report.decision.mode, Mode::Search);
}

#[test]
fn test_scenario_center_blocked_uses_tie_break() {
    for (tie_break, expected) in [
        (TurnDirection::Left, MotionAction::TurnLeft),
        (TurnDirection::Right, MotionAction::TurnRight),
    ] {
        let mut config = NavigationConfig::default();
        config.vfh.tie_break = tie_break;
        let navigator = Navigator::new(config).unwrap();
        let cloud = cloud_for(&navigator.config().vfh, &[2.0, 2.0, 0.5, 2.0, 2.0]);

        let report = navigator.step(&cloud, None, Policy::Hybrid);
        assert_eq!(report.obstacle.blocked_sectors, BTreeSet::from([2]));
        assert_eq!(report.obstacle.suggested_turn, Some(tie_break));
        assert_eq!(report.decision.command.action, expected);
        assert_eq!(report.decision.command.duration, Duration::from_millis(200));
    }
}

#[test]
fn test_scenario_left_blocked_turns_right() {
    let config = VfhConfig::default();
    let histogram = Histogram::from_distances(config.horizontal_fov(), &[0.3, 0.3, 2.0, 2.0, 2.0]);
    let state = ObstacleClassifier::new(&config).classify(&histogram);
    assert_eq!(state.blocked_sectors, BTreeSet::from([0, 1]));
    assert_eq!(state.suggested_turn, Some(TurnDirection::Right));

    let navigator = navigator();
    let cloud = cloud_for(&navigator.config().vfh, &[0.3, 0.3, 2.0, 2.0, 2.0]);
    let report = navigator.step(&cloud, None, Policy::Hybrid);
    assert_approx_eq!(report.histogram.min_distances()[0], 0.3);
    assert_eq!(report.decision.command.action, MotionAction::TurnRight);
}

#[test]
fn test_scenario_centered_marker_drives_forward() {
    let navigator = navigator();
    let detection = MarkerDetection::new(7, 0.5, Some(1.2));
    let report = navigator.step(&PointCloud::default(), Some(&detection), Policy::Hybrid);
    assert_eq!(report.marker.zone(), Some(LateralZone::Center));
    assert_eq!(report.decision.mode, Mode::ArucoTracking);
    assert_eq!(
        report.decision.command,
        MotionCommand::new(MotionAction::Forward, Duration::from_millis(400))
    );
}

#[test]
fn test_scenario_close_marker_is_reached() {
    let navigator = navigator();
    let detection = MarkerDetection::new(7, 0.5, Some(0.3));
    let report = navigator.step(&PointCloud::default(), Some(&detection), Policy::Hybrid);
    assert_eq!(report.decision.mode, Mode::ArucoReached);
    assert_eq!(report.decision.command.action, MotionAction::Stop);
    assert!(report.decision.command.duration.is_zero());
}

#[test]
fn test_policies() {
    let navigator = navigator();
    let cloud = cloud_for(&navigator.config().vfh, &[2.0, 2.0, 2.0, 0.5, 2.0]);
    let detection = MarkerDetection::new(7, 0.1, Some(1.2));

    let report = navigator.step(&cloud, Some(&detection), Policy::ArucoOnly);
    assert_eq!(report.decision.mode, Mode::ArucoTracking);
    assert_eq!(report.decision.command.action, MotionAction::TurnLeft);

    let report = navigator.step(&PointCloud::default(), Some(&detection), Policy::VfhOnly);
    assert_eq!(report.decision.mode, Mode::Search);

    let report = navigator.step(&cloud, Some(&detection), Policy::VfhOnly);
    assert_eq!(report.decision.mode, Mode::VfhActive);
    assert_eq!(report.decision.command.action, MotionAction::TurnLeft);
}
