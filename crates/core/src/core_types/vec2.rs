//! Vector type alias for 2D positions and velocities.

use nalgebra::Vector2;

/// 2D vector type for positions, velocities, and directions.
///
/// This is a simple alias for `nalgebra::Vector2<f64>`, used throughout
/// the simulation for layout positions, particle velocities and rod normals.
/// Double precision keeps renormalised neutron speeds exact to well below
/// the tolerances the tests check.
pub type Vec2 = Vector2<f64>;

/// Unit vector pointing at `angle` radians (x right, y down).
#[inline]
pub fn direction(angle: f64) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Axis-aligned rectangle, closed on all sides.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Closed containment test (points on the edge are inside).
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_unit_length() {
        for step in 0..16 {
            let angle = f64::from(step) * std::f64::consts::TAU / 16.0;
            assert_relative_eq!(direction(angle).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rect_is_closed() {
        let rect = Rect::new(10.0, 20.0, 6.0, 100.0);
        assert!(rect.contains(Vec2::new(10.0, 20.0)));
        assert!(rect.contains(Vec2::new(16.0, 120.0)));
        assert!(!rect.contains(Vec2::new(16.01, 50.0)));
        assert!(!rect.contains(Vec2::new(12.0, 19.99)));
        assert_relative_eq!(rect.center().x, 13.0);
    }
}
