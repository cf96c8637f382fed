//! Rod placement, travel and the moderator bounce.

use crate::config::{LayoutConfig, CONTROL_ROD_COLUMN_OFFSET, MODERATOR_COLUMN_OFFSET};
use crate::constants::{
    FAST_NEUTRON_SPEED, MODERATOR_BOUNCE_EFFICIENCY, MODERATOR_BOUNCE_JITTER, MODERATOR_NUDGE,
    NEUTRON_SPEED,
};
use crate::core_types::{
    Particle, ParticleKind, ReactorRng, Rod, RodAction, RodClass, RodTarget, Vec2,
};
use crate::error::{ReactorError, Result};
use crate::grid::ChamberGrid;

/// Both rod classes, each indexed from zero in column order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RodBank {
    pub(crate) control: Vec<Rod>,
    pub(crate) moderator: Vec<Rod>,
}

impl RodBank {
    /// Place one rod per qualifying column. Control rods sit in the gap left
    /// of their column, moderators in the gap right of theirs. Every rod
    /// hangs from the top of the chamber area and spans its full height.
    pub(crate) fn build(layout: &LayoutConfig, grid: &ChamberGrid) -> Self {
        let (_, platform_y) = layout.platform_origin();
        let top = platform_y + layout.platform_margin;
        let max_height = layout.platform_height - 2.0 * layout.platform_margin;
        let half_gap = layout.chamber_gap / 2.0;

        let mut control = Vec::new();
        let mut moderator = Vec::new();

        for col in 0..grid.cols() {
            let left = grid.column_x(col);

            if col > 0 && col % layout.control_rod_spacing == CONTROL_ROD_COLUMN_OFFSET {
                let x = left - half_gap - layout.control_rod_width / 2.0;
                control.push(Rod::new(
                    RodClass::Control,
                    control.len(),
                    Vec2::new(x, top),
                    layout.control_rod_width,
                    max_height,
                ));
            }

            if col % layout.moderator_spacing == MODERATOR_COLUMN_OFFSET {
                let x = left + grid.chamber_size() + half_gap - layout.moderator_width / 2.0;
                moderator.push(Rod::new(
                    RodClass::Moderator,
                    moderator.len(),
                    Vec2::new(x, top),
                    layout.moderator_width,
                    max_height,
                ));
            }
        }

        Self { control, moderator }
    }

    pub(crate) fn class(&self, class: RodClass) -> &[Rod] {
        match class {
            RodClass::Control => &self.control,
            RodClass::Moderator => &self.moderator,
        }
    }

    fn class_mut(&mut self, class: RodClass) -> &mut [Rod] {
        match class {
            RodClass::Control => &mut self.control,
            RodClass::Moderator => &mut self.moderator,
        }
    }

    /// Command one rod or a whole class. An out-of-range index changes nothing.
    pub(crate) fn apply(&mut self, class: RodClass, target: RodTarget, action: RodAction) -> Result<()> {
        let rods = self.class_mut(class);
        match target {
            RodTarget::All => rods.iter_mut().for_each(|rod| rod.apply(action)),
            RodTarget::Index(index) => {
                let count = rods.len();
                let rod = rods
                    .get_mut(index)
                    .ok_or(ReactorError::UnknownRod { class, index, count })?;
                rod.apply(action);
            }
        }
        Ok(())
    }

    /// Move every rod of both classes one smoothing step.
    pub(crate) fn advance(&mut self) {
        for rod in self.control.iter_mut().chain(self.moderator.iter_mut()) {
            rod.advance();
        }
    }

    /// First inserted control rod covering `point`.
    pub(crate) fn control_at(&self, point: Vec2) -> Option<&Rod> {
        self.control.iter().find(|rod| rod.blocks(point))
    }

    /// First inserted moderator rod covering `point`.
    pub(crate) fn moderator_at(&self, point: Vec2) -> Option<&Rod> {
        self.moderator.iter().find(|rod| rod.blocks(point))
    }
}

/// Reflect a fast neutron off `rod` and slow it down.
///
/// The velocity is mirrored about the nearest edge, damped, jittered, then
/// rescaled to [`NEUTRON_SPEED`]; the neutron is nudged along the new
/// velocity so it does not hit the same rod again.
pub(crate) fn bounce_off_moderator<R: ReactorRng + ?Sized>(
    particle: &mut Particle,
    rod: &Rod,
    rng: &mut R,
) {
    let normal = rod.nearest_edge_normal(particle.position);
    let v = particle.velocity;
    let mut reflected = (v - normal * (2.0 * v.dot(&normal))) * MODERATOR_BOUNCE_EFFICIENCY;

    let jitter = MODERATOR_BOUNCE_JITTER * FAST_NEUTRON_SPEED;
    reflected.x += rng.centered() * jitter;
    reflected.y += rng.centered() * jitter;

    particle.kind = ParticleKind::Neutron;
    particle.velocity = reflected;
    particle.set_speed(NEUTRON_SPEED);
    particle.position += particle.velocity * MODERATOR_NUDGE;
}
