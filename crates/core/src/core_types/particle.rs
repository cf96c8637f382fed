//! Neutrons and transient meltdown effects.
//!
//! Neutrons drive the chain reaction: fission spawns fast neutrons, water and
//! moderator rods turn them into slow neutrons, and only slow neutrons split
//! fuel or get absorbed by control rods. Smoke and sparks are byproducts of a
//! meltdown; they drift and warm the chambers they cross until their
//! lifetime runs out.

use crate::constants::{FAST_NEUTRON_SPEED, NEUTRON_SPEED};
use crate::core_types::element::ElementId;
use crate::core_types::vec2::{direction, Vec2};
use serde::{Deserialize, Serialize};

/// Kind of particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    /// Slow (thermal) neutron
    Neutron,
    /// Freshly released fission neutron
    FastNeutron,
    Smoke,
    Spark,
}

impl ParticleKind {
    /// Smoke and sparks carry a lifetime and never react with fuel or rods.
    pub fn is_effect(self) -> bool {
        matches!(self, ParticleKind::Smoke | ParticleKind::Spark)
    }
}

/// Unique particle identifier, never reused within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(pub u64);

/// Monotonic particle id allocator.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParticleIds {
    next: u64,
}

impl ParticleIds {
    pub(crate) fn next_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Element that emitted this neutron. Only compared, never followed.
    pub source: Option<ElementId>,
    /// Remaining ticks for smoke and sparks.
    pub lifetime: Option<u32>,
}

impl Particle {
    /// Slow neutron heading along `angle`.
    pub fn neutron(id: ParticleId, position: Vec2, angle: f64, source: Option<ElementId>) -> Self {
        Particle {
            id,
            kind: ParticleKind::Neutron,
            position,
            velocity: direction(angle) * NEUTRON_SPEED,
            source,
            lifetime: None,
        }
    }

    /// Fast neutron heading along `angle`.
    pub fn fast_neutron(
        id: ParticleId,
        position: Vec2,
        angle: f64,
        source: Option<ElementId>,
    ) -> Self {
        Particle {
            id,
            kind: ParticleKind::FastNeutron,
            position,
            velocity: direction(angle) * FAST_NEUTRON_SPEED,
            source,
            lifetime: None,
        }
    }

    /// Smoke or spark with a fixed lifetime.
    pub fn effect(
        id: ParticleId,
        kind: ParticleKind,
        position: Vec2,
        velocity: Vec2,
        lifetime: u32,
    ) -> Self {
        debug_assert!(kind.is_effect());
        Particle {
            id,
            kind,
            position,
            velocity,
            source: None,
            lifetime: Some(lifetime),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Move one tick along the velocity and age effects.
    pub(crate) fn advance(&mut self) {
        self.position += self.velocity;
        if let Some(lifetime) = self.lifetime.as_mut() {
            *lifetime = lifetime.saturating_sub(1);
        }
    }

    /// Lifetime ran out (never true for neutrons).
    pub fn is_expired(&self) -> bool {
        self.lifetime == Some(0)
    }

    /// Rescale the velocity to `speed`, keeping its direction.
    /// A zero velocity is left untouched.
    pub(crate) fn set_speed(&mut self, speed: f64) {
        let current = self.speed();
        if current > 0.0 {
            self.velocity *= speed / current;
        }
    }

    /// Turn into a slow neutron moving at exactly [`NEUTRON_SPEED`].
    pub(crate) fn thermalize(&mut self) {
        self.kind = ParticleKind::Neutron;
        self.set_speed(NEUTRON_SPEED);
    }
}
