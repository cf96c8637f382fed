//! Coolant chambers.

use crate::constants::{BASE_TEMP, MAX_CHAMBER_TEMP, MAX_WATER_LEVEL, WATER_PRESENT_LEVEL};
use crate::core_types::vec2::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable chamber identifier: the row-major index into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChamberId(pub usize);

impl ChamberId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChamberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A water-filled cell of the core holding exactly one fuel element.
///
/// Geometry and identity are fixed when the grid is built; only the water
/// level (percent) and temperature change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chamber {
    pub id: ChamberId,
    pub row: usize,
    pub col: usize,
    pub bounds: Rect,

    // Coolant state
    pub(crate) water_level: f64, // 0-100 %
    pub(crate) temperature: f64, // 20-1000 degrees
}

impl Chamber {
    /// Create a full, ambient chamber.
    pub fn new(id: ChamberId, row: usize, col: usize, bounds: Rect) -> Self {
        Chamber {
            id,
            row,
            col,
            bounds,
            water_level: MAX_WATER_LEVEL,
            temperature: BASE_TEMP,
        }
    }

    pub fn water_level(&self) -> f64 {
        self.water_level
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// True while enough water remains to moderate and cool.
    #[inline]
    pub fn has_water(&self) -> bool {
        self.water_level > WATER_PRESENT_LEVEL
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
    }

    /// Set the water level, clamped to `[0, 100]`.
    pub fn set_water_level(&mut self, level: f64) {
        self.water_level = level.clamp(0.0, MAX_WATER_LEVEL);
    }

    /// Set the temperature, clamped to `[20, 1000]`.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(BASE_TEMP, MAX_CHAMBER_TEMP);
    }

    /// Enforce the documented coolant bounds.
    pub(crate) fn clamp_state(&mut self) {
        self.water_level = self.water_level.clamp(0.0, MAX_WATER_LEVEL);
        self.temperature = self.temperature.clamp(BASE_TEMP, MAX_CHAMBER_TEMP);
    }

    /// Chebyshev distance in grid cells.
    pub fn grid_distance(&self, other: &Chamber) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}
