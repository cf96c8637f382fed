//! Smoke and sparks rising from breached chambers.

use crate::constants::{
    SEVERITY_FULL_TEMP, SMOKE_BASE_LIFETIME, SMOKE_LIFETIME_SPREAD, SMOKE_SPAWN_OFFSET,
    SPARK_BASE_LIFETIME, SPARK_BURST, SPARK_LIFETIME_SPREAD, SPARK_SPEED_SPREAD,
};
use crate::core_types::{
    FuelElement, MeltdownSet, Particle, ParticleIds, ParticleKind, ReactorRng, Vec2,
};

/// Smoke is emitted when a draw exceeds this, less the severity bonus.
const SMOKE_THRESHOLD: f64 = 0.7;
const SMOKE_SEVERITY_BONUS: f64 = 0.2;
/// Sparks need a draw above this once severity passes [`SPARK_MIN_SEVERITY`].
const SPARK_THRESHOLD: f64 = 0.8;
const SPARK_MIN_SEVERITY: f64 = 0.5;

/// Meltdown severity in `[0, 1]` for a given core temperature.
pub fn severity(core_temperature: f64) -> f64 {
    (core_temperature / SEVERITY_FULL_TEMP).min(1.0)
}

/// Spawn effects for every breached chamber, in breach order.
/// Returns the number of particles added.
pub(crate) fn emit_meltdown_effects<R: ReactorRng + ?Sized>(
    meltdown: &MeltdownSet,
    elements: &[FuelElement],
    core_temperature: f64,
    particles: &mut Vec<Particle>,
    ids: &mut ParticleIds,
    rng: &mut R,
) -> usize {
    let severity = severity(core_temperature);
    let before = particles.len();

    for chamber in meltdown.iter() {
        let origin = elements[chamber.index()].position;

        if rng.unit() > SMOKE_THRESHOLD - severity * SMOKE_SEVERITY_BONUS {
            let position = origin
                + Vec2::new(
                    rng.centered() * SMOKE_SPAWN_OFFSET,
                    rng.centered() * SMOKE_SPAWN_OFFSET,
                );
            let velocity = Vec2::new(
                rng.centered() * (0.5 + severity),
                -rng.unit() * (2.0 + severity * 3.0),
            );
            let lifetime = lifetime_ticks(SMOKE_BASE_LIFETIME + rng.unit() * SMOKE_LIFETIME_SPREAD);
            particles.push(Particle::effect(
                ids.next_id(),
                ParticleKind::Smoke,
                position,
                velocity,
                lifetime,
            ));
        }

        if severity > SPARK_MIN_SEVERITY && rng.unit() > SPARK_THRESHOLD {
            for _ in 0..SPARK_BURST {
                let velocity = Vec2::new(
                    rng.centered() * SPARK_SPEED_SPREAD,
                    rng.centered() * SPARK_SPEED_SPREAD,
                );
                let lifetime =
                    lifetime_ticks(SPARK_BASE_LIFETIME + rng.unit() * SPARK_LIFETIME_SPREAD);
                particles.push(Particle::effect(
                    ids.next_id(),
                    ParticleKind::Spark,
                    origin,
                    velocity,
                    lifetime,
                ));
            }
        }
    }

    particles.len() - before
}

/// Whole ticks an effect survives; a partial tick still counts.
#[inline]
fn lifetime_ticks(ticks: f64) -> u32 {
    ticks.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::core_types::rng::ConstRng;
    use crate::core_types::ChamberId;
    use crate::grid::ChamberGrid;

    fn breached(ids: &[usize]) -> (MeltdownSet, Vec<FuelElement>) {
        let grid = ChamberGrid::new(&LayoutConfig::default()).unwrap();
        let (_, elements) = grid.build_cells();
        let mut set = MeltdownSet::default();
        for &id in ids {
            set.insert(ChamberId(id));
        }
        (set, elements)
    }

    #[test]
    fn test_severity_saturates() {
        assert_eq!(severity(1500.0), 0.5);
        assert_eq!(severity(4000.0), 1.0);
    }

    #[test]
    fn test_partial_lifetime_rounds_up() {
        assert_eq!(lifetime_ticks(150.0), 150);
        assert_eq!(lifetime_ticks(150.25), 151);
        assert_eq!(lifetime_ticks(30.999), 31);
    }

    #[test]
    fn test_no_effects_without_meltdown() {
        let (set, elements) = breached(&[]);
        let mut particles = Vec::new();
        let added = emit_meltdown_effects(
            &set,
            &elements,
            4000.0,
            &mut particles,
            &mut ParticleIds::default(),
            &mut ConstRng::new(0.99),
        );
        assert_eq!(added, 0);
    }

    #[test]
    fn test_severe_meltdown_smokes_and_sparks() {
        let (set, elements) = breached(&[3, 9]);
        let mut particles = Vec::new();
        let added = emit_meltdown_effects(
            &set,
            &elements,
            3000.0,
            &mut particles,
            &mut ParticleIds::default(),
            &mut ConstRng::new(0.875),
        );

        assert_eq!(added, 2 * (1 + SPARK_BURST));
        let smoke = &particles[0];
        assert_eq!(smoke.kind, ParticleKind::Smoke);
        assert!(smoke.velocity.y < 0.0, "smoke rises");
        assert_eq!(smoke.lifetime, Some(238));
        let spark = &particles[1];
        assert_eq!(spark.kind, ParticleKind::Spark);
        assert_eq!(spark.position, elements[3].position);
        assert_eq!(spark.lifetime, Some(48));
    }

    #[test]
    fn test_mild_meltdown_has_no_sparks() {
        let (set, elements) = breached(&[3]);
        let mut particles = Vec::new();
        emit_meltdown_effects(
            &set,
            &elements,
            1200.0,
            &mut particles,
            &mut ParticleIds::default(),
            &mut ConstRng::new(0.875),
        );
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].kind, ParticleKind::Smoke);
    }

    #[test]
    fn test_low_draw_emits_nothing() {
        let (set, elements) = breached(&[3]);
        let mut particles = Vec::new();
        emit_meltdown_effects(
            &set,
            &elements,
            3000.0,
            &mut particles,
            &mut ParticleIds::default(),
            &mut ConstRng::new(0.1),
        );
        assert!(particles.is_empty());
    }
}
