//! Reactor construction parameters.
//!
//! Layout defaults reproduce a 1000x700 reactor vessel centred in a 1200x800
//! domain: 28 columns by 19 rows of 31px chambers with 3px gaps, 7 control
//! rods and 7 moderator rods.

use crate::constants::{
    CONTROL_ROD_SPACING, CONTROL_ROD_WIDTH, MODERATOR_SPACING, MODERATOR_WIDTH,
};
use crate::error::{ReactorError, Result};
use serde::{Deserialize, Serialize};

/// Column offset within the spacing pattern that gets a control rod.
pub const CONTROL_ROD_COLUMN_OFFSET: usize = 2;

/// Column offset within the spacing pattern that gets a moderator rod.
pub const MODERATOR_COLUMN_OFFSET: usize = 3;

/// Geometry of the core. Only used to place chambers, elements and rods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Particles leaving `[0, domain_width] x [0, domain_height]` are dropped.
    pub domain_width: f64,
    pub domain_height: f64,
    /// Reactor vessel, centred in the domain.
    pub platform_width: f64,
    pub platform_height: f64,
    /// Border between the vessel edge and the chamber grid.
    pub platform_margin: f64,
    pub chamber_size: f64,
    /// Gap between neighbouring chambers.
    pub chamber_gap: f64,
    pub control_rod_spacing: usize,
    pub control_rod_width: f64,
    pub moderator_spacing: usize,
    pub moderator_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            domain_width: 1200.0,
            domain_height: 800.0,
            platform_width: 1000.0,
            platform_height: 700.0,
            platform_margin: 20.0,
            chamber_size: 31.0,
            chamber_gap: 3.0,
            control_rod_spacing: CONTROL_ROD_SPACING,
            control_rod_width: CONTROL_ROD_WIDTH,
            moderator_spacing: MODERATOR_SPACING,
            moderator_width: MODERATOR_WIDTH,
        }
    }
}

impl LayoutConfig {
    /// Distance between the top-left corners of neighbouring chambers.
    pub fn chamber_pitch(&self) -> f64 {
        self.chamber_size + self.chamber_gap
    }

    /// Chambers that fit in one row of the vessel.
    pub fn columns(&self) -> usize {
        let usable = self.platform_width - 2.0 * self.platform_margin;
        ((usable + self.chamber_gap) / self.chamber_pitch()).floor().max(0.0) as usize
    }

    /// Chambers that fit in one column of the vessel.
    pub fn rows(&self) -> usize {
        let usable = self.platform_height - 2.0 * self.platform_margin;
        ((usable + self.chamber_gap) / self.chamber_pitch()).floor().max(0.0) as usize
    }

    /// Top-left corner of the vessel, centred and rounded to whole pixels.
    pub fn platform_origin(&self) -> (f64, f64) {
        (
            ((self.domain_width - self.platform_width) / 2.0).round(),
            ((self.domain_height - self.platform_height) / 2.0).round(),
        )
    }

    /// Check that the layout can build at least one chamber inside the domain.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("domain_width", self.domain_width),
            ("domain_height", self.domain_height),
            ("platform_width", self.platform_width),
            ("platform_height", self.platform_height),
            ("chamber_size", self.chamber_size),
            ("control_rod_width", self.control_rod_width),
            ("moderator_width", self.moderator_width),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReactorError::invalid_config(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }

        let non_negative = [
            ("platform_margin", self.platform_margin),
            ("chamber_gap", self.chamber_gap),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ReactorError::invalid_config(
                    field,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }

        if self.platform_width > self.domain_width || self.platform_height > self.domain_height {
            return Err(ReactorError::invalid_config(
                "platform_width",
                format!(
                    "vessel {}x{} does not fit in domain {}x{}",
                    self.platform_width, self.platform_height, self.domain_width, self.domain_height
                ),
            ));
        }

        if self.columns() == 0 || self.rows() == 0 {
            return Err(ReactorError::invalid_config(
                "chamber_size",
                format!(
                    "no {}px chamber fits in a {}x{} vessel with {}px margins",
                    self.chamber_size, self.platform_width, self.platform_height, self.platform_margin
                ),
            ));
        }

        if self.control_rod_spacing <= CONTROL_ROD_COLUMN_OFFSET {
            return Err(ReactorError::invalid_config(
                "control_rod_spacing",
                format!(
                    "must exceed {CONTROL_ROD_COLUMN_OFFSET}, got {}",
                    self.control_rod_spacing
                ),
            ));
        }
        if self.moderator_spacing <= MODERATOR_COLUMN_OFFSET {
            return Err(ReactorError::invalid_config(
                "moderator_spacing",
                format!(
                    "must exceed {MODERATOR_COLUMN_OFFSET}, got {}",
                    self.moderator_spacing
                ),
            ));
        }

        Ok(())
    }
}

/// Everything needed to build a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    pub layout: LayoutConfig,
    /// Seed for the default random source.
    pub seed: u64,
    /// Slow neutrons placed on random elements at start-up.
    pub initial_neutrons: usize,
    /// Spawn smoke and sparks from molten chambers.
    pub emit_meltdown_effects: bool,
    /// Spread every meltdown to its neighbours at the end of each tick.
    pub auto_spread_meltdown: bool,
    /// Rod commands kept for replay.
    pub command_history_limit: usize,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            seed: 0x5EED,
            initial_neutrons: 5,
            emit_meltdown_effects: true,
            auto_spread_meltdown: false,
            command_history_limit: 10_000,
        }
    }
}

impl ReactorConfig {
    /// Default configuration with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `ReactorError::InvalidConfig` if the layout is unusable.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_dimensions() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.columns(), 28);
        assert_eq!(layout.rows(), 19);
        assert_eq!(layout.platform_origin(), (100.0, 50.0));
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_chamber() {
        let layout = LayoutConfig {
            chamber_size: 0.0,
            ..LayoutConfig::default()
        };
        let err = layout.validate().unwrap_err();
        assert!(matches!(
            err,
            ReactorError::InvalidConfig {
                field: "chamber_size",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_vessel_larger_than_domain() {
        let layout = LayoutConfig {
            domain_width: 900.0,
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_rejects_chamber_larger_than_vessel() {
        let layout = LayoutConfig {
            chamber_size: 800.0,
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_rejects_degenerate_rod_spacing() {
        let layout = LayoutConfig {
            moderator_spacing: 3,
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());
    }
}
