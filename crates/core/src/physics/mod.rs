//! Physics passes run by the simulation driver, in tick order:
//! rods, fuel elements, particle transport, coolant, aggregation, effects.

pub(crate) mod aggregate;
pub(crate) mod coolant;
pub mod effects;
pub(crate) mod fuel_elements;
pub(crate) mod rods;
pub(crate) mod transport;

pub(crate) use aggregate::{core_temperature, spread_meltdown};
pub(crate) use coolant::update_coolant;
pub(crate) use effects::emit_meltdown_effects;
pub use effects::severity;
pub(crate) use fuel_elements::update_elements;
pub(crate) use rods::RodBank;
pub(crate) use transport::{move_particles, scan_particles, Geometry};
