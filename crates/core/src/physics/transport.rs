//! Particle transport: motion, then a collision scan.
//!
//! The scan never mutates the live particle list while walking it. Removals
//! are collected by index and fission products in a side buffer; both are
//! committed once the walk is over, so fission neutrons first move on the
//! next tick.

use crate::constants::{
    CONTROL_ROD_ABSORPTION_CHANCE, FAST_NEUTRON_CONVERSION_RATIO, FAST_NEUTRON_SLOWDOWN_RATE,
    FISSION_NEUTRON_COUNT, NEUTRON_ABSORPTION_CHANCE, NEUTRON_SPEED, PARTICLE_HEAT_TRANSFER,
};
use crate::core_types::{
    Chamber, FuelElement, Particle, ParticleIds, ParticleKind, ReactorRng, Rect,
};
use crate::grid::ChamberGrid;
use crate::physics::rods::{bounce_off_moderator, RodBank};
use rustc_hash::FxHashSet;

/// Heat a chamber gains from a slow neutron absorbed by its water.
const ABSORPTION_HEAT: f64 = 3.0 * PARTICLE_HEAT_TRANSFER;
/// Heat a flooded chamber gains from any particle passing through.
const WET_PASSAGE_HEAT: f64 = 2.0 * PARTICLE_HEAT_TRANSFER;
/// Heat a dry chamber gains from any particle passing through.
const DRY_PASSAGE_HEAT: f64 = 0.5 * PARTICLE_HEAT_TRANSFER;

/// Event counts from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScanReport {
    pub(crate) escaped: usize,
    pub(crate) expired: usize,
    pub(crate) rod_absorptions: usize,
    pub(crate) water_absorptions: usize,
    pub(crate) bounces: usize,
    pub(crate) fissions: usize,
}

/// What the scan does to a single particle.
enum Fate {
    Keep,
    Remove,
}

/// Read-only geometry the scan checks particles against.
pub(crate) struct Geometry<'a> {
    pub(crate) grid: &'a ChamberGrid,
    pub(crate) domain: Rect,
    pub(crate) rods: &'a RodBank,
}

/// Advance every particle one step. Fast neutrons crossing a flooded
/// chamber lose speed and thermalise once slow enough.
pub(crate) fn move_particles(particles: &mut [Particle], grid: &ChamberGrid, chambers: &[Chamber]) {
    let conversion_speed = NEUTRON_SPEED * FAST_NEUTRON_CONVERSION_RATIO;

    for particle in particles.iter_mut() {
        particle.advance();

        if particle.kind != ParticleKind::FastNeutron {
            continue;
        }
        let flooded = grid
            .chamber_at(particle.position)
            .is_some_and(|id| chambers[id.index()].has_water());
        if flooded {
            particle.velocity *= 1.0 - FAST_NEUTRON_SLOWDOWN_RATE;
            if particle.speed() <= conversion_speed {
                particle.thermalize();
            }
        }
    }
}

/// Fission products and counters accumulated during one scan.
struct Pending<'a> {
    spawned: Vec<Particle>,
    ids: &'a mut ParticleIds,
    report: ScanReport,
}

/// Resolve collisions for every live particle and commit the result.
pub(crate) fn scan_particles<R: ReactorRng + ?Sized>(
    particles: &mut Vec<Particle>,
    geometry: &Geometry<'_>,
    chambers: &mut [Chamber],
    elements: &mut [FuelElement],
    ids: &mut ParticleIds,
    rng: &mut R,
) -> ScanReport {
    let mut removed: FxHashSet<usize> = FxHashSet::default();
    let mut pending = Pending {
        spawned: Vec::new(),
        ids,
        report: ScanReport::default(),
    };

    for (index, particle) in particles.iter_mut().enumerate() {
        let fate = scan_one(particle, geometry, chambers, elements, &mut pending, rng);
        if matches!(fate, Fate::Remove) {
            removed.insert(index);
        }
    }

    if !removed.is_empty() {
        let mut index = 0;
        particles.retain(|_| {
            let keep = !removed.contains(&index);
            index += 1;
            keep
        });
    }
    particles.append(&mut pending.spawned);

    pending.report
}

fn scan_one<R: ReactorRng + ?Sized>(
    particle: &mut Particle,
    geometry: &Geometry<'_>,
    chambers: &mut [Chamber],
    elements: &mut [FuelElement],
    pending: &mut Pending<'_>,
    rng: &mut R,
) -> Fate {
    let report = &mut pending.report;
    if !geometry.domain.contains(particle.position) {
        report.escaped += 1;
        return Fate::Remove;
    }

    if particle.is_expired() {
        report.expired += 1;
        return Fate::Remove;
    }

    if particle.kind == ParticleKind::Neutron
        && geometry.rods.control_at(particle.position).is_some()
        && rng.chance(CONTROL_ROD_ABSORPTION_CHANCE)
    {
        report.rod_absorptions += 1;
        return Fate::Remove;
    }

    if particle.kind == ParticleKind::FastNeutron {
        if let Some(rod) = geometry.rods.moderator_at(particle.position) {
            bounce_off_moderator(particle, rod, rng);
            report.bounces += 1;
        }
    }

    let Some(chamber_id) = geometry.grid.chamber_at(particle.position) else {
        return Fate::Keep;
    };

    let chamber = &mut chambers[chamber_id.index()];
    if chamber.has_water() {
        if particle.kind == ParticleKind::Neutron && rng.chance(NEUTRON_ABSORPTION_CHANCE) {
            chamber.temperature += ABSORPTION_HEAT;
            report.water_absorptions += 1;
            return Fate::Remove;
        }
        chamber.temperature += WET_PASSAGE_HEAT;
    } else {
        chamber.temperature += DRY_PASSAGE_HEAT;
    }

    // The capture circle lies inside the chamber, so only its own element can split.
    let element = &mut elements[chamber_id.index()];
    if particle.kind == ParticleKind::Neutron && element.captures(particle.position, particle.source)
    {
        element.fission();
        for _ in 0..FISSION_NEUTRON_COUNT {
            pending.spawned.push(Particle::fast_neutron(
                pending.ids.next_id(),
                element.position,
                rng.angle(),
                Some(element.id),
            ));
        }
        pending.report.fissions += 1;
        return Fate::Remove;
    }

    Fate::Keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::constants::FAST_NEUTRON_SPEED;
    use crate::core_types::rng::ConstRng;
    use crate::core_types::{ElementId, ParticleId, RodAction, RodClass, RodTarget, Vec2};
    use approx::assert_relative_eq;

    struct Fixture {
        grid: ChamberGrid,
        rods: RodBank,
        chambers: Vec<Chamber>,
        elements: Vec<FuelElement>,
        ids: ParticleIds,
    }

    impl Fixture {
        fn new() -> Self {
            let layout = LayoutConfig::default();
            let grid = ChamberGrid::new(&layout).unwrap();
            let rods = RodBank::build(&layout, &grid);
            let (chambers, elements) = grid.build_cells();
            Self {
                grid,
                rods,
                chambers,
                elements,
                ids: ParticleIds::default(),
            }
        }

        fn scan<R: ReactorRng>(&mut self, particles: &mut Vec<Particle>, rng: &mut R) -> ScanReport {
            let geometry = Geometry {
                grid: &self.grid,
                domain: Rect::new(0.0, 0.0, 1200.0, 800.0),
                rods: &self.rods,
            };
            scan_particles(
                particles,
                &geometry,
                &mut self.chambers,
                &mut self.elements,
                &mut self.ids,
                rng,
            )
        }

        fn neutron(&mut self, position: Vec2, source: Option<ElementId>) -> Particle {
            Particle::neutron(self.ids.next_id(), position, 0.0, source)
        }
    }

    #[test]
    fn test_out_of_domain_removed() {
        let mut f = Fixture::new();
        let mut particles = vec![f.neutron(Vec2::new(-1.0, 10.0), None)];
        let report = f.scan(&mut particles, &mut ConstRng::never());
        assert!(particles.is_empty());
        assert_eq!(report.escaped, 1);
    }

    #[test]
    fn test_fission_conserves_and_spawns_fast() {
        let mut f = Fixture::new();
        f.elements[30].reactivate();
        let target = f.elements[30].position;
        let mut particles = vec![f.neutron(target, Some(ElementId(29)))];

        let report = f.scan(&mut particles, &mut ConstRng::never());

        assert_eq!(report.fissions, 1);
        assert_eq!(particles.len(), FISSION_NEUTRON_COUNT);
        for p in &particles {
            assert_eq!(p.kind, ParticleKind::FastNeutron);
            assert_eq!(p.source, Some(ElementId(30)));
            assert_eq!(p.position, target);
            assert_relative_eq!(p.speed(), FAST_NEUTRON_SPEED, epsilon = 1e-9);
        }
        let element = &f.elements[30];
        assert!(!element.is_reactive());
        assert_eq!(element.neutrons_emitted(), 1);
        assert_relative_eq!(element.temperature(), 23.0);
    }

    #[test]
    fn test_no_self_fission_and_spent_elements_ignore() {
        let mut f = Fixture::new();
        f.elements[30].reactivate();
        let target = f.elements[30].position;
        let spent = f.elements[31].position;
        let mut particles = vec![
            f.neutron(target, Some(ElementId(30))),
            f.neutron(spent, None),
        ];

        let report = f.scan(&mut particles, &mut ConstRng::never());

        assert_eq!(report.fissions, 0);
        assert_eq!(particles.len(), 2);
        assert!(f.elements[30].is_reactive());
    }

    #[test]
    fn test_one_fission_per_element_per_tick() {
        let mut f = Fixture::new();
        f.elements[30].reactivate();
        let target = f.elements[30].position;
        let mut particles = vec![f.neutron(target, None), f.neutron(target, None)];

        let report = f.scan(&mut particles, &mut ConstRng::never());

        assert_eq!(report.fissions, 1);
        assert_eq!(particles.len(), 1 + FISSION_NEUTRON_COUNT);
    }

    #[test]
    fn test_fast_neutrons_do_not_fission() {
        let mut f = Fixture::new();
        f.elements[30].reactivate();
        let target = f.elements[30].position;
        let mut particles = vec![Particle::fast_neutron(ParticleId(0), target, 1.0, None)];

        f.scan(&mut particles, &mut ConstRng::never());

        assert_eq!(particles.len(), 1);
        assert!(f.elements[30].is_reactive());
    }

    #[test]
    fn test_control_rod_absorbs_slow_neutrons_only_when_inserted() {
        let mut f = Fixture::new();
        let rod = f.rods.control[0].footprint();
        let inside = Vec2::new(rod.center().x, 300.0);
        let mut particles = vec![
            f.neutron(inside, None),
            Particle::fast_neutron(ParticleId(1), inside, 1.0, None),
        ];
        let report = f.scan(&mut particles, &mut ConstRng::always());
        assert_eq!(report.rod_absorptions, 1);
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].kind, ParticleKind::FastNeutron);

        f.rods
            .apply(RodClass::Control, RodTarget::All, RodAction::Retract)
            .unwrap();
        let mut particles = vec![f.neutron(inside, None)];
        let report = f.scan(&mut particles, &mut ConstRng::new(0.5));
        assert_eq!(report.rod_absorptions, 0);
        assert_eq!(particles.len(), 1);
    }

    #[test]
    fn test_moderator_bounces_fast_neutron_once() {
        let mut f = Fixture::new();
        let rod = f.rods.moderator[1].footprint();
        let inside = Vec2::new(rod.min.x + 0.5, 300.0);
        let mut particles = vec![Particle::fast_neutron(ParticleId(0), inside, 0.0, None)];

        let report = f.scan(&mut particles, &mut ConstRng::new(0.5));

        assert_eq!(report.bounces, 1);
        assert_eq!(particles[0].kind, ParticleKind::Neutron);
        assert_relative_eq!(particles[0].speed(), NEUTRON_SPEED, epsilon = 1e-6);
    }

    #[test]
    fn test_chamber_heating() {
        let mut f = Fixture::new();
        let wet = f.chambers[0].bounds.min + Vec2::new(2.0, 2.0);
        let dry = f.chambers[1].bounds.min + Vec2::new(2.0, 2.0);
        f.chambers[1].water_level = 0.0;
        let mut particles = vec![f.neutron(wet, None), f.neutron(dry, None)];

        f.scan(&mut particles, &mut ConstRng::never());

        assert_relative_eq!(f.chambers[0].temperature(), 22.0);
        assert_relative_eq!(f.chambers[1].temperature(), 20.5);
    }

    #[test]
    fn test_water_absorption() {
        let mut f = Fixture::new();
        let wet = f.chambers[0].bounds.min + Vec2::new(2.0, 2.0);
        let mut particles = vec![f.neutron(wet, None)];
        let report = f.scan(&mut particles, &mut ConstRng::always());
        assert_eq!(report.water_absorptions, 1);
        assert!(particles.is_empty());
        assert_relative_eq!(f.chambers[0].temperature(), 23.0);
    }

    #[test]
    fn test_effects_heat_chambers() {
        let mut f = Fixture::new();
        let wet = f.chambers[0].bounds.min + Vec2::new(2.0, 2.0);
        let dry = f.chambers[1].bounds.min + Vec2::new(2.0, 2.0);
        f.chambers[1].water_level = 0.0;
        let mut particles = vec![
            Particle::effect(ParticleId(0), ParticleKind::Smoke, wet, Vec2::zeros(), 10),
            Particle::effect(ParticleId(1), ParticleKind::Spark, dry, Vec2::zeros(), 10),
        ];

        // a certain roll would absorb a slow neutron; smoke is never absorbed
        let report = f.scan(&mut particles, &mut ConstRng::always());

        assert_eq!(report.water_absorptions, 0);
        assert_eq!(particles.len(), 2);
        assert_relative_eq!(f.chambers[0].temperature(), 22.0);
        assert_relative_eq!(f.chambers[1].temperature(), 20.5);
    }

    #[test]
    fn test_effects_expire_without_touching_fuel() {
        let mut f = Fixture::new();
        let centre = f.elements[30].position;
        f.elements[30].reactivate();
        let mut particles = vec![
            Particle::effect(ParticleId(0), ParticleKind::Smoke, centre, Vec2::zeros(), 0),
            Particle::effect(ParticleId(1), ParticleKind::Spark, centre, Vec2::zeros(), 5),
        ];

        let report = f.scan(&mut particles, &mut ConstRng::always());

        assert_eq!(report.expired, 1);
        assert_eq!(report.fissions, 0);
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].kind, ParticleKind::Spark);
        // only the surviving spark heats the chamber
        assert_relative_eq!(f.chambers[30].temperature(), 22.0);
        assert!(f.elements[30].is_reactive());
    }

    #[test]
    fn test_effects_pass_through_rods() {
        let mut f = Fixture::new();
        let control = f.rods.control[0].footprint();
        let moderator = f.rods.moderator[1].footprint();
        let velocity = Vec2::new(0.0, -1.0);
        let mut particles = vec![
            Particle::effect(
                ParticleId(0),
                ParticleKind::Smoke,
                Vec2::new(control.center().x, 300.0),
                velocity,
                10,
            ),
            Particle::effect(
                ParticleId(1),
                ParticleKind::Spark,
                Vec2::new(moderator.min.x + 0.5, 300.0),
                velocity,
                10,
            ),
        ];

        let report = f.scan(&mut particles, &mut ConstRng::always());

        assert_eq!(report.rod_absorptions, 0);
        assert_eq!(report.bounces, 0);
        assert_eq!(particles.len(), 2);
        assert!(particles.iter().all(|p| p.velocity == velocity));
    }

    #[test]
    fn test_fast_neutron_thermalises_in_water() {
        let f = Fixture::new();
        let start = f.chambers[0].bounds.min + Vec2::new(1.0, 1.0);
        let mut particles = vec![Particle::fast_neutron(ParticleId(0), start, 0.0, None)];
        // just above the conversion speed: one slowdown step crosses it
        particles[0].velocity = Vec2::new(NEUTRON_SPEED * 1.21, 0.0);

        move_particles(&mut particles, &f.grid, &f.chambers);

        assert_eq!(particles[0].kind, ParticleKind::Neutron);
        assert_relative_eq!(particles[0].speed(), NEUTRON_SPEED, epsilon = 1e-6);
    }

    #[test]
    fn test_fast_neutron_slows_one_step_in_water() {
        let f = Fixture::new();
        let start = f.chambers[0].bounds.min + Vec2::new(1.0, 1.0);
        let mut particles = vec![Particle::fast_neutron(ParticleId(0), start, 0.0, None)];

        move_particles(&mut particles, &f.grid, &f.chambers);

        assert_eq!(particles[0].kind, ParticleKind::FastNeutron);
        assert_relative_eq!(
            particles[0].speed(),
            FAST_NEUTRON_SPEED * (1.0 - FAST_NEUTRON_SLOWDOWN_RATE),
            max_relative = 1e-12
        );
        assert!(particles[0].speed() > NEUTRON_SPEED * FAST_NEUTRON_CONVERSION_RATIO);
    }

    #[test]
    fn test_fast_neutron_keeps_speed_in_dry_chamber() {
        let mut f = Fixture::new();
        f.chambers[0].water_level = 0.0;
        let start = f.chambers[0].bounds.min + Vec2::new(1.0, 1.0);
        let mut particles = vec![Particle::fast_neutron(ParticleId(0), start, 0.0, None)];

        move_particles(&mut particles, &f.grid, &f.chambers);

        assert_eq!(particles[0].kind, ParticleKind::FastNeutron);
        assert_relative_eq!(particles[0].speed(), FAST_NEUTRON_SPEED);
        assert_relative_eq!(particles[0].position.x, start.x + FAST_NEUTRON_SPEED);
    }
}
