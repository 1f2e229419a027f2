//! Danger-aware pathing contract.
//!
//! The influence grid itself is built by a pathing collaborator outside
//! this crate. The decision code only asks three questions of it.

use skirmish_core::types::{Point2, PointExt};

/// Immutable ground danger field for the current tick.
pub trait DangerGrid {
    /// True if standing at `position` takes no expected enemy fire.
    fn is_position_safe(&self, position: Point2) -> bool;

    /// Closest safe point within `radius` of `from`, if any.
    fn find_safe_spot(&self, from: Point2, radius: f32) -> Option<Point2>;

    /// Next waypoint of a danger-weighted path from `from` to `to`, or
    /// `None` when no path exists.
    fn next_path_point(&self, from: Point2, to: Point2) -> Option<Point2>;
}

/// Grid with no danger anywhere: every spot is safe and paths are
/// straight lines cut into fixed-length legs.
#[derive(Debug, Clone, Copy)]
pub struct OpenGrid {
    pub step: f32,
}

impl Default for OpenGrid {
    fn default() -> Self {
        Self { step: 4.0 }
    }
}

impl DangerGrid for OpenGrid {
    fn is_position_safe(&self, _position: Point2) -> bool {
        true
    }

    fn find_safe_spot(&self, from: Point2, _radius: f32) -> Option<Point2> {
        Some(from)
    }

    fn next_path_point(&self, from: Point2, to: Point2) -> Option<Point2> {
        if from.is_near(to, self.step) {
            Some(to)
        } else {
            Some(from.towards(to, self.step))
        }
    }
}
