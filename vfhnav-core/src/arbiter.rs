use std::{fmt, time::Duration};

use naci::{MotionAction, MotionCommand, Policy};

use crate::{
    config::{NavigationConfig, SearchBehavior, TurnDirection},
    marker::{LateralZone, MarkerObservation},
    obstacle::ObstacleState,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    VfhActive,
    ArucoTracking,
    ArucoReached,
    Search,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VfhActive => "VFH_ACTIVE",
            Self::ArucoTracking => "ARUCO_TRACKING",
            Self::ArucoReached => "ARUCO_REACHED",
            Self::Search => "SEARCH",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decision {
    pub mode: Mode,
    pub command: MotionCommand,
}

impl Decision {
    fn new(mode: Mode, action: MotionAction, duration: Duration) -> Self {
        Self {
            mode,
            command: MotionCommand::new(action, duration),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.mode, self.command)
    }
}

/// Priority arbiter fusing obstacle and goal state into one command per cycle.
///
/// Rules, first match wins:
///
/// 1. blocked: turn away from the obstacle (skipped by [`Policy::ArucoOnly`])
/// 2. marker visible: stop when reached, otherwise align or approach
///    (skipped by [`Policy::VfhOnly`])
/// 3. otherwise search
///
/// [`Arbiter::decide`] keeps no state between calls and never reads the clock.
#[derive(Debug, Clone)]
pub struct Arbiter {
    turn_duration: Duration,
    forward_duration: Duration,
    approach_distance: f64,
    tie_break: TurnDirection,
    search_behavior: SearchBehavior,
    search_direction: TurnDirection,
    search_duration: Duration,
}

impl Arbiter {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            turn_duration: config.vfh.turn_duration(),
            forward_duration: config.vfh.forward_duration(),
            approach_distance: config.marker.approach_distance,
            tie_break: config.vfh.tie_break,
            search_behavior: config.search.behavior,
            search_direction: config.search.direction,
            search_duration: config.search.duration(),
        }
    }

    pub fn decide(
        &self,
        obstacle: &ObstacleState,
        marker: &MarkerObservation,
        policy: Policy,
    ) -> Decision {
        if obstacle.blocked && policy != Policy::ArucoOnly {
            let direction = obstacle.suggested_turn.unwrap_or(self.tie_break);
            return Decision::new(Mode::VfhActive, turn(direction), self.turn_duration);
        }

        if policy != Policy::VfhOnly {
            if let MarkerObservation::Visible { zone, distance, .. } = *marker {
                if distance < self.approach_distance {
                    return Decision::new(Mode::ArucoReached, MotionAction::Stop, Duration::ZERO);
                }
                return match zone {
                    LateralZone::Center => Decision::new(
                        Mode::ArucoTracking,
                        MotionAction::Forward,
                        self.forward_duration,
                    ),
                    LateralZone::Left => Decision::new(
                        Mode::ArucoTracking,
                        MotionAction::TurnLeft,
                        self.turn_duration,
                    ),
                    LateralZone::Right => Decision::new(
                        Mode::ArucoTracking,
                        MotionAction::TurnRight,
                        self.turn_duration,
                    ),
                };
            }
        }

        self.search()
    }

    fn search(&self) -> Decision {
        match self.search_behavior {
            SearchBehavior::Stop => {
                Decision::new(Mode::Search, MotionAction::Stop, self.search_duration)
            }
            SearchBehavior::Rotate => Decision::new(
                Mode::Search,
                turn(self.search_direction),
                self.search_duration,
            ),
            SearchBehavior::Cruise => {
                Decision::new(Mode::Search, MotionAction::Forward, self.forward_duration)
            }
        }
    }
}

fn turn(direction: TurnDirection) -> MotionAction {
    match direction {
        TurnDirection::Left => MotionAction::TurnLeft,
        TurnDirection::Right => MotionAction::TurnRight,
    }
}
