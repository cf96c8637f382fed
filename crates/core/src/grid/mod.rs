//! Spatial layout of the core

pub mod chamber_grid;

pub use chamber_grid::ChamberGrid;
