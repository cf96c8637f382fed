//! Core types and utilities

pub mod chamber;
pub mod element;
pub mod meltdown;
pub mod particle;
pub mod rng;
pub mod rod;
pub mod vec2;

pub use chamber::{Chamber, ChamberId};
pub use element::{ElementId, FuelElement};
pub use meltdown::MeltdownSet;
pub use particle::{Particle, ParticleId, ParticleKind};
pub(crate) use particle::ParticleIds;
pub use rng::{seeded_rng, DefaultRng, ReactorRng};
pub use rod::{Rod, RodAction, RodClass, RodTarget};
pub use vec2::{direction, Rect, Vec2};
