//! Control and moderator rods.

use crate::constants::{ROD_RETRACTED_HEIGHT_RATIO, ROD_SMOOTHING};
use crate::core_types::vec2::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two rod families. Commands address a whole family or one rod in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RodClass {
    /// Absorbs slow neutrons
    Control,
    /// Reflects fast neutrons and slows them down
    Moderator,
}

impl RodClass {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(RodClass::Control),
            1 => Some(RodClass::Moderator),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(&self) -> u8 {
        match self {
            RodClass::Control => 0,
            RodClass::Moderator => 1,
        }
    }
}

impl fmt::Display for RodClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RodClass::Control => f.write_str("control"),
            RodClass::Moderator => f.write_str("moderator"),
        }
    }
}

/// Which rods of a class a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RodTarget {
    Index(usize),
    All,
}

/// What a command does to the rods it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RodAction {
    Insert,
    Retract,
    /// Flip each targeted rod individually
    Toggle,
}

impl RodAction {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(RodAction::Insert),
            1 => Some(RodAction::Retract),
            2 => Some(RodAction::Toggle),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(&self) -> u8 {
        match self {
            RodAction::Insert => 0,
            RodAction::Retract => 1,
            RodAction::Toggle => 2,
        }
    }

    pub fn from_inserted(inserted: bool) -> Self {
        if inserted {
            RodAction::Insert
        } else {
            RodAction::Retract
        }
    }
}

/// A rod hanging from the top of the core in the gap beside one chamber column.
///
/// `inserted` is the command; `current_height` follows it with exponential
/// smoothing, so a rod never jumps. Collisions always use `current_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rod {
    pub class: RodClass,
    pub index: usize,
    /// Top-left corner.
    pub position: Vec2,
    pub width: f64,
    pub max_height: f64,
    pub(crate) current_height: f64,
    pub(crate) inserted: bool,
}

impl Rod {
    /// Create a fully inserted rod.
    pub fn new(class: RodClass, index: usize, position: Vec2, width: f64, max_height: f64) -> Self {
        Rod {
            class,
            index,
            position,
            width,
            max_height,
            current_height: max_height,
            inserted: true,
        }
    }

    pub fn current_height(&self) -> f64 {
        self.current_height
    }

    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    pub(crate) fn apply(&mut self, action: RodAction) {
        self.inserted = match action {
            RodAction::Insert => true,
            RodAction::Retract => false,
            RodAction::Toggle => !self.inserted,
        };
    }

    /// Height the rod is travelling towards.
    pub fn target_height(&self) -> f64 {
        if self.inserted {
            self.max_height
        } else {
            self.max_height * ROD_RETRACTED_HEIGHT_RATIO
        }
    }

    /// One tick of travel towards the target.
    pub(crate) fn advance(&mut self) {
        self.current_height += (self.target_height() - self.current_height) * ROD_SMOOTHING;
    }

    /// Region the rod currently occupies.
    pub fn footprint(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.current_height)
    }

    /// Only inserted rods interact with neutrons.
    pub fn blocks(&self, point: Vec2) -> bool {
        self.inserted && self.footprint().contains(point)
    }

    /// Outward normal of the footprint edge closest to `point`.
    ///
    /// Ties resolve left, right, top, bottom in that order.
    pub fn nearest_edge_normal(&self, point: Vec2) -> Vec2 {
        let footprint = self.footprint();
        let left = point.x - footprint.min.x;
        let right = footprint.max.x - point.x;
        let top = point.y - footprint.min.y;
        let bottom = footprint.max.y - point.y;
        let nearest = left.min(right).min(top).min(bottom);

        if nearest == left {
            Vec2::new(-1.0, 0.0)
        } else if nearest == right {
            Vec2::new(1.0, 0.0)
        } else if nearest == top {
            Vec2::new(0.0, -1.0)
        } else {
            Vec2::new(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rod() -> Rod {
        Rod::new(RodClass::Moderator, 0, Vec2::new(100.0, 20.0), 6.0, 660.0)
    }

    #[test]
    fn test_class_conversion() {
        assert_eq!(RodClass::from_u8(0), Some(RodClass::Control));
        assert_eq!(RodClass::from_u8(1), Some(RodClass::Moderator));
        assert_eq!(RodClass::from_u8(2), None);
        assert_eq!(RodClass::Moderator.as_u8(), 1);
    }

    #[test]
    fn test_action_conversion() {
        assert_eq!(RodAction::Insert.as_u8(), 0);
        assert_eq!(RodAction::Retract.as_u8(), 1);
        assert_eq!(RodAction::Toggle.as_u8(), 2);

        assert_eq!(RodAction::from_u8(0), Some(RodAction::Insert));
        assert_eq!(RodAction::from_u8(2), Some(RodAction::Toggle));
        assert_eq!(RodAction::from_u8(3), None);
        assert_eq!(RodAction::from_inserted(false), RodAction::Retract);
    }

    #[test]
    fn test_apply_toggle() {
        let mut r = rod();
        r.apply(RodAction::Toggle);
        assert!(!r.is_inserted());
        r.apply(RodAction::Toggle);
        assert!(r.is_inserted());
        r.apply(RodAction::Retract);
        r.apply(RodAction::Retract);
        assert!(!r.is_inserted());
    }

    #[test]
    fn test_retracted_target() {
        let mut r = rod();
        assert_eq!(r.target_height(), 660.0);
        r.apply(RodAction::Retract);
        assert_relative_eq!(r.target_height(), 132.0);
    }

    #[test]
    fn test_advance_closes_ten_percent_of_gap() {
        let mut r = rod();
        r.apply(RodAction::Retract);
        r.advance();
        // gap 528 -> 475.2
        assert_relative_eq!(r.current_height(), 660.0 - 52.8, epsilon = 1e-9);
    }

    #[test]
    fn test_retracted_rod_does_not_block() {
        let mut r = rod();
        let p = Vec2::new(103.0, 50.0);
        assert!(r.blocks(p));
        r.apply(RodAction::Retract);
        assert!(!r.blocks(p));
    }

    #[test]
    fn test_nearest_edge_normal() {
        let r = rod();
        assert_eq!(r.nearest_edge_normal(Vec2::new(100.5, 300.0)), Vec2::new(-1.0, 0.0));
        assert_eq!(r.nearest_edge_normal(Vec2::new(105.5, 300.0)), Vec2::new(1.0, 0.0));
        assert_eq!(r.nearest_edge_normal(Vec2::new(103.0, 20.2)), Vec2::new(0.0, -1.0));
        assert_eq!(r.nearest_edge_normal(Vec2::new(103.0, 679.9)), Vec2::new(0.0, 1.0));
        // Dead centre across the width: left wins the tie
        assert_eq!(r.nearest_edge_normal(Vec2::new(103.0, 300.0)), Vec2::new(-1.0, 0.0));
    }
}
