//! Read-only views of the simulation for renderers and hosts.

use crate::core_types::{Chamber, ChamberId, FuelElement, Particle, ParticleKind, Rod};
use serde::{Deserialize, Serialize};

/// Status summary: the numbers a control-room overlay would show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactorStats {
    pub tick: u64,
    pub core_temperature: f64,
    pub neutrons: usize,
    pub fast_neutrons: usize,
    pub smoke: usize,
    pub sparks: usize,
    pub chambers_with_water: usize,
    pub total_chambers: usize,
    pub inserted_control_rods: usize,
    pub total_control_rods: usize,
    pub inserted_moderator_rods: usize,
    pub total_moderator_rods: usize,
    pub melted_elements: usize,
    /// Core temperature above the critical threshold
    pub critical: bool,
    /// At least one chamber has breached
    pub meltdown_in_progress: bool,
}

impl ReactorStats {
    pub fn particles(&self) -> usize {
        self.neutrons + self.fast_neutrons + self.smoke + self.sparks
    }

    pub(crate) fn count_particles(&mut self, particles: &[Particle]) {
        for particle in particles {
            match particle.kind {
                ParticleKind::Neutron => self.neutrons += 1,
                ParticleKind::FastNeutron => self.fast_neutrons += 1,
                ParticleKind::Smoke => self.smoke += 1,
                ParticleKind::Spark => self.sparks += 1,
            }
        }
    }
}

/// Full post-tick state, detached from the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorSnapshot {
    pub tick: u64,
    pub core_temperature: f64,
    pub chambers: Vec<Chamber>,
    pub elements: Vec<FuelElement>,
    pub control_rods: Vec<Rod>,
    pub moderator_rods: Vec<Rod>,
    pub particles: Vec<Particle>,
    /// Breached chambers in the order they melted
    pub meltdown_chamber_ids: Vec<ChamberId>,
    pub stats: ReactorStats,
}

/// What happened during the most recent tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub spontaneous_emissions: usize,
    pub reactivations: usize,
    pub elements_melted: usize,
    /// Whole-core contagion forced a meltdown this tick
    pub contagion: bool,
    pub fissions: usize,
    pub rod_absorptions: usize,
    pub water_absorptions: usize,
    pub moderator_bounces: usize,
    pub escaped: usize,
    pub effects_expired: usize,
    pub effects_spawned: usize,
}
