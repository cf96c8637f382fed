//! Fixed-step reactor simulation
//!
//! `ReactorSimulation` owns every chamber, element, rod and particle and
//! advances them one tick at a time:
//! - Rod travel towards the commanded height
//! - Fuel element reactivity, melting and heat exchange
//! - Neutron transport, rod and water interactions, fission
//! - Coolant evaporation, refill and element cooling
//! - Core temperature aggregation and meltdown spread
//! - Smoke and sparks from breached chambers
//!
//! Rod commands are applied between ticks and recorded for replay.

pub mod command_log;
pub mod snapshot;

pub use command_log::RodCommand;
pub use snapshot::{ReactorSnapshot, ReactorStats, TickSummary};

use crate::config::ReactorConfig;
use crate::constants::CRITICAL_TEMP;
use crate::core_types::{
    seeded_rng, Chamber, ChamberId, DefaultRng, FuelElement, MeltdownSet, Particle, ParticleId,
    ParticleIds, ReactorRng, Rect, Rod, RodAction, RodClass, RodTarget, Vec2,
};
use crate::error::{ReactorError, Result};
use crate::grid::ChamberGrid;
use crate::physics::{
    core_temperature, emit_meltdown_effects, move_particles, scan_particles, spread_meltdown,
    update_coolant, update_elements, Geometry, RodBank,
};
use command_log::CommandLog;
use tracing::{debug, error, info};

/// Reactor core simulation with an injectable random source.
pub struct ReactorSimulation<R = DefaultRng> {
    config: ReactorConfig,
    grid: ChamberGrid,
    /// Particles leaving this rectangle are dropped
    domain: Rect,

    chambers: Vec<Chamber>,
    elements: Vec<FuelElement>,
    rods: RodBank,

    particles: Vec<Particle>,
    particle_ids: ParticleIds,

    meltdown: MeltdownSet,
    core_temperature: f64,
    tick: u64,

    rng: R,
    commands: CommandLog,
    last_tick: TickSummary,
}

impl ReactorSimulation<DefaultRng> {
    /// Build a simulation driven by the default generator seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::InvalidConfig` if the layout cannot be built.
    pub fn new(config: ReactorConfig) -> Result<Self> {
        let rng = seeded_rng(config.seed);
        Self::with_rng(config, rng)
    }

    /// Rebuild a run from its configuration and recorded commands, stopping
    /// after `ticks` ticks.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, a command names a rod that
    /// does not exist, or a tick violates an invariant.
    pub fn replay(config: ReactorConfig, commands: &[RodCommand], ticks: u64) -> Result<Self> {
        let mut sim = Self::new(config)?;
        sim.replay_commands(commands, ticks)?;
        Ok(sim)
    }
}

impl<R: ReactorRng> ReactorSimulation<R> {
    /// Build a simulation that draws every random decision from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::InvalidConfig` if the layout cannot be built.
    pub fn with_rng(config: ReactorConfig, mut rng: R) -> Result<Self> {
        config.validate()?;

        let grid = ChamberGrid::new(&config.layout)?;
        let (chambers, elements) = grid.build_cells();
        let rods = RodBank::build(&config.layout, &grid);
        let domain = Rect::new(
            0.0,
            0.0,
            config.layout.domain_width,
            config.layout.domain_height,
        );

        let mut particle_ids = ParticleIds::default();
        let particles: Vec<Particle> = (0..config.initial_neutrons)
            .map(|_| {
                let element = &elements[rng.index(elements.len())];
                Particle::neutron(
                    particle_ids.next_id(),
                    element.position,
                    rng.angle(),
                    Some(element.id),
                )
            })
            .collect();

        info!(
            "Reactor initialized: {}x{} chambers, {} control rods, {} moderator rods, {} seed neutrons",
            grid.cols(),
            grid.rows(),
            rods.control.len(),
            rods.moderator.len(),
            particles.len()
        );

        Ok(Self {
            commands: CommandLog::new(config.command_history_limit),
            config,
            grid,
            domain,
            chambers,
            elements,
            rods,
            particles,
            particle_ids,
            meltdown: MeltdownSet::default(),
            core_temperature: crate::constants::BASE_TEMP,
            tick: 0,
            rng,
            last_tick: TickSummary::default(),
        })
    }

    /// Advance the simulation by one fixed step.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::InvariantViolation` if the step produced a
    /// non-finite value. The step has been applied; callers should stop.
    pub fn tick(&mut self) -> Result<()> {
        // 1. Rods travel towards their commanded height
        self.rods.advance();

        // 2. Fuel elements (stray neutrons join this tick's transport)
        let elements = update_elements(
            &mut self.elements,
            &mut self.chambers,
            &mut self.meltdown,
            self.core_temperature,
            &mut self.particles,
            &mut self.particle_ids,
            &mut self.rng,
        );
        // 3. Particle transport
        move_particles(&mut self.particles, &self.grid, &self.chambers);
        let geometry = Geometry {
            grid: &self.grid,
            domain: self.domain,
            rods: &self.rods,
        };
        let scan = scan_particles(
            &mut self.particles,
            &geometry,
            &mut self.chambers,
            &mut self.elements,
            &mut self.particle_ids,
            &mut self.rng,
        );

        // 4. Coolant
        update_coolant(&mut self.chambers, &mut self.elements);

        // 5. Core temperature and meltdown spread
        self.core_temperature = core_temperature(
            self.core_temperature,
            &self.elements,
            &self.chambers,
            &self.particles,
            self.meltdown.len(),
        );
        if self.config.auto_spread_meltdown {
            self.spread_all_meltdowns();
        }

        // 6. Smoke and sparks (live from the next tick)
        let effects_spawned = if self.config.emit_meltdown_effects {
            emit_meltdown_effects(
                &self.meltdown,
                &self.elements,
                self.core_temperature,
                &mut self.particles,
                &mut self.particle_ids,
                &mut self.rng,
            )
        } else {
            0
        };

        self.tick += 1;
        self.last_tick = TickSummary {
            tick: self.tick,
            spontaneous_emissions: elements.emitted,
            reactivations: elements.reactivated,
            elements_melted: elements.melted,
            contagion: elements.contagion,
            fissions: scan.fissions,
            rod_absorptions: scan.rod_absorptions,
            water_absorptions: scan.water_absorptions,
            moderator_bounces: scan.bounces,
            escaped: scan.escaped,
            effects_expired: scan.expired,
            effects_spawned,
        };

        debug!(
            "Tick {}: T={:.1}, particles={}, fissions={}, absorbed={}+{}, breached={}",
            self.tick,
            self.core_temperature,
            self.particles.len(),
            scan.fissions,
            scan.rod_absorptions,
            scan.water_absorptions,
            self.meltdown.len()
        );

        self.check_invariants()
    }

    /// Run `ticks` steps, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Propagates the first `ReactorError::InvariantViolation`.
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Insert or retract one rod or a whole class.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::UnknownRod` for an index outside the class;
    /// no rod changes in that case.
    pub fn set_rod_inserted(
        &mut self,
        class: RodClass,
        target: RodTarget,
        inserted: bool,
    ) -> Result<()> {
        self.apply_rod_command(class, target, RodAction::from_inserted(inserted))
    }

    /// Flip the inserted state of each targeted rod.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::UnknownRod` for an index outside the class.
    pub fn toggle_rods(&mut self, class: RodClass, target: RodTarget) -> Result<()> {
        self.apply_rod_command(class, target, RodAction::Toggle)
    }

    /// Apply a rod command and record it in the history.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::UnknownRod` for an index outside the class.
    pub fn apply_rod_command(
        &mut self,
        class: RodClass,
        target: RodTarget,
        action: RodAction,
    ) -> Result<()> {
        self.rods.apply(class, target, action)?;
        self.commands
            .record(RodCommand::new(self.tick, class, target, action));
        info!(
            "Tick {}: {:?} {} rods {:?}",
            self.tick, action, class, target
        );
        Ok(())
    }

    /// Re-apply recorded commands, ticking until `until_tick` ticks have run.
    ///
    /// Each command is applied just before the tick it was originally
    /// issued before. Commands stamped with a tick already in the past are
    /// applied immediately.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown rod or invariant violation.
    pub fn replay_commands(&mut self, commands: &[RodCommand], until_tick: u64) -> Result<()> {
        let mut ordered = commands.to_vec();
        ordered.sort_by_key(|command| command.tick);
        let mut pending = ordered.into_iter().peekable();

        loop {
            let now = self.tick;
            while let Some(command) = pending.next_if(|command| command.tick <= now) {
                self.apply_rod_command(command.class, command.target, command.action)?;
            }
            if self.tick >= until_tick {
                break;
            }
            self.tick()?;
        }
        Ok(())
    }

    /// Pull the intact neighbours of `chamber` towards the melting point.
    /// Returns the number of elements heated.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::UnknownChamber` for an id outside the grid.
    pub fn spread_meltdown(&mut self, chamber: ChamberId) -> Result<usize> {
        self.check_chamber(chamber)?;
        Ok(spread_meltdown(&self.grid, &mut self.elements, chamber))
    }

    /// Spread from every breached chamber, in breach order.
    /// Returns the total number of element heatings.
    pub fn spread_all_meltdowns(&mut self) -> usize {
        let mut heated = 0;
        for chamber in self.meltdown.iter() {
            heated += spread_meltdown(&self.grid, &mut self.elements, chamber);
        }
        heated
    }

    /// Chambers adjacent to `chamber`, including diagonals.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::UnknownChamber` for an id outside the grid.
    pub fn neighbors(&self, chamber: ChamberId) -> Result<Vec<ChamberId>> {
        self.check_chamber(chamber)?;
        Ok(self.grid.neighbors(chamber))
    }

    /// Chamber containing `point`, if any.
    pub fn chamber_at(&self, point: Vec2) -> Option<ChamberId> {
        self.grid.chamber_at(point)
    }

    /// Add a slow neutron heading along `angle`.
    pub fn inject_neutron(&mut self, position: Vec2, angle: f64) -> ParticleId {
        let id = self.particle_ids.next_id();
        self.particles
            .push(Particle::neutron(id, position, angle, None));
        id
    }

    /// Add a fast neutron heading along `angle`.
    pub fn inject_fast_neutron(&mut self, position: Vec2, angle: f64) -> ParticleId {
        let id = self.particle_ids.next_id();
        self.particles
            .push(Particle::fast_neutron(id, position, angle, None));
        id
    }

    /// Detached copy of the full post-tick state.
    pub fn snapshot(&self) -> ReactorSnapshot {
        ReactorSnapshot {
            tick: self.tick,
            core_temperature: self.core_temperature,
            chambers: self.chambers.clone(),
            elements: self.elements.clone(),
            control_rods: self.rods.control.clone(),
            moderator_rods: self.rods.moderator.clone(),
            particles: self.particles.clone(),
            meltdown_chamber_ids: self.meltdown.as_slice().to_vec(),
            stats: self.stats(),
        }
    }

    pub fn stats(&self) -> ReactorStats {
        let inserted = |rods: &[Rod]| rods.iter().filter(|rod| rod.is_inserted()).count();
        let mut stats = ReactorStats {
            tick: self.tick,
            core_temperature: self.core_temperature,
            chambers_with_water: self.chambers.iter().filter(|c| c.has_water()).count(),
            total_chambers: self.chambers.len(),
            inserted_control_rods: inserted(&self.rods.control),
            total_control_rods: self.rods.control.len(),
            inserted_moderator_rods: inserted(&self.rods.moderator),
            total_moderator_rods: self.rods.moderator.len(),
            melted_elements: self.meltdown.len(),
            critical: self.core_temperature > CRITICAL_TEMP,
            meltdown_in_progress: !self.meltdown.is_empty(),
            ..ReactorStats::default()
        };
        stats.count_particles(&self.particles);
        stats
    }

    /// Recorded rod commands, oldest first.
    pub fn command_history(&self) -> Vec<RodCommand> {
        let mut history = Vec::with_capacity(self.commands.len());
        history.extend(self.commands.iter().copied());
        history
    }

    /// Commands dropped from the bounded history.
    pub fn dropped_commands(&self) -> usize {
        self.commands.dropped()
    }

    pub fn last_tick_summary(&self) -> &TickSummary {
        &self.last_tick
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    pub fn grid(&self) -> &ChamberGrid {
        &self.grid
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn core_temperature(&self) -> f64 {
        self.core_temperature
    }

    pub fn chambers(&self) -> &[Chamber] {
        &self.chambers
    }

    pub fn elements(&self) -> &[FuelElement] {
        &self.elements
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn rods(&self, class: RodClass) -> &[Rod] {
        self.rods.class(class)
    }

    pub fn meltdown(&self) -> &MeltdownSet {
        &self.meltdown
    }

    pub fn chamber(&self, id: ChamberId) -> Option<&Chamber> {
        self.chambers.get(id.index())
    }

    /// Mutable chamber access for scenario setup. Setters clamp.
    pub fn chamber_mut(&mut self, id: ChamberId) -> Option<&mut Chamber> {
        self.chambers.get_mut(id.index())
    }

    /// Element `n` sits in chamber `n`.
    pub fn element(&self, chamber: ChamberId) -> Option<&FuelElement> {
        self.elements.get(chamber.index())
    }

    /// Mutable element access for scenario setup.
    pub fn element_mut(&mut self, chamber: ChamberId) -> Option<&mut FuelElement> {
        self.elements.get_mut(chamber.index())
    }

    fn check_chamber(&self, chamber: ChamberId) -> Result<()> {
        if chamber.index() < self.chambers.len() {
            Ok(())
        } else {
            Err(ReactorError::UnknownChamber {
                id: chamber,
                count: self.chambers.len(),
            })
        }
    }

    /// Verify that no tracked quantity went non-finite.
    fn check_invariants(&self) -> Result<()> {
        let violation = if !self.core_temperature.is_finite() {
            Some(format!("core temperature is {}", self.core_temperature))
        } else if let Some(c) = self
            .chambers
            .iter()
            .find(|c| !c.temperature.is_finite() || !c.water_level.is_finite())
        {
            Some(format!(
                "chamber {} has temperature {} and water level {}",
                c.id, c.temperature, c.water_level
            ))
        } else if let Some(e) = self.elements.iter().find(|e| !e.temperature.is_finite()) {
            Some(format!("{} has temperature {}", e.id, e.temperature))
        } else {
            self.particles
                .iter()
                .find(|p| {
                    !(p.position.x.is_finite()
                        && p.position.y.is_finite()
                        && p.velocity.x.is_finite()
                        && p.velocity.y.is_finite())
                })
                .map(|p| {
                    format!(
                        "particle {} at ({}, {}) moving ({}, {})",
                        p.id.0, p.position.x, p.position.y, p.velocity.x, p.velocity.y
                    )
                })
        };

        match violation {
            None => Ok(()),
            Some(what) => {
                error!("Invariant violated at tick {}: {}", self.tick, what);
                Err(ReactorError::InvariantViolation {
                    tick: self.tick,
                    what,
                })
            }
        }
    }
}
