//! Reactor Core Simulation Library
//!
//! A fixed-step simulation of a graphite-moderated, water-cooled reactor
//! core laid out as a grid of fuel chambers. Neutrons travel between
//! chambers, trigger fission in reactive fuel elements, are slowed by
//! moderator rods and absorbed by control rods and coolant.
//!
//! ## Simulation
//!
//! Each tick advances, in order:
//! - Control and moderator rods towards their commanded heights
//! - Fuel element reactivity, melting and heat exchange with coolant
//! - Neutron transport, absorption, moderation and fission
//! - Coolant evaporation and refill
//! - Core temperature and meltdown propagation
//!
//! All randomness flows through one seeded generator, so a run is fully
//! reproducible from its [`ReactorConfig`] and the recorded rod commands.

// Core types and utilities
pub mod config;
pub mod constants;
pub mod core_types;
pub mod error;

pub mod grid;
pub mod physics;
pub mod simulation;

// Re-export core types
pub use core_types::{
    Chamber, ChamberId, ElementId, FuelElement, MeltdownSet, Particle, ParticleId, ParticleKind,
    Rect, Rod, RodAction, RodClass, RodTarget, Vec2,
};
pub use core_types::{seeded_rng, DefaultRng, ReactorRng};

pub use config::{LayoutConfig, ReactorConfig};
pub use error::{ReactorError, Result};
pub use grid::ChamberGrid;
pub use physics::severity;

// Re-export simulation types
pub use simulation::{ReactorSimulation, ReactorSnapshot, ReactorStats, RodCommand, TickSummary};
