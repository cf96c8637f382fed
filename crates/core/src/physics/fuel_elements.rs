//! Per-element reactivity pass.
//!
//! Elements are visited in grid order. Each one folds in the heat of its
//! last emissions, may melt, may trigger the whole-core contagion, may
//! recover reactivity or emit a stray neutron, and finally exchanges heat
//! with its chamber.

use crate::constants::{
    CONTAGION_MELT_COUNT, DRY_HEAT_TRANSFER_RATE, MAX_TEMP, MELTDOWN_TEMP, REACTIVATION_CHANCE,
    UNREACTIVE_EMISSION_CHANCE, WET_HEAT_TRANSFER_RATE,
};
use crate::core_types::{
    Chamber, FuelElement, MeltdownSet, Particle, ParticleIds, ReactorRng,
};
use tracing::warn;

/// Counts reported back to the driver for the tick summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ElementPassReport {
    pub(crate) melted: usize,
    pub(crate) emitted: usize,
    pub(crate) reactivated: usize,
    pub(crate) contagion: bool,
}

/// Run the element pass.
///
/// `previous_core_temperature` is the aggregate from the end of the last
/// tick. Stray neutrons are appended to `particles` and take part in this
/// tick's transport.
pub(crate) fn update_elements<R: ReactorRng + ?Sized>(
    elements: &mut [FuelElement],
    chambers: &mut [Chamber],
    meltdown: &mut MeltdownSet,
    previous_core_temperature: f64,
    particles: &mut Vec<Particle>,
    ids: &mut ParticleIds,
    rng: &mut R,
) -> ElementPassReport {
    let mut report = ElementPassReport::default();

    for i in 0..elements.len() {
        elements[i].absorb_emission_heat();

        if elements[i].temperature >= MELTDOWN_TEMP
            && melt_element(&mut elements[i], chambers, meltdown)
        {
            report.melted += 1;
            warn!(
                "Fuel element in chamber {} melted at {:.1} degrees",
                elements[i].chamber_id, elements[i].temperature
            );
        }

        if previous_core_temperature > MELTDOWN_TEMP && meltdown.is_empty() {
            report.melted += force_melt_hottest(elements, chambers, meltdown);
            report.contagion = true;
            warn!(
                "Core at {:.1} degrees with no breach: forcing meltdown of the {} hottest elements",
                previous_core_temperature, CONTAGION_MELT_COUNT
            );
        }

        let element = &mut elements[i];
        if !element.reactive && !element.melted {
            element.time_since_deactivation += 1;

            if rng.chance(UNREACTIVE_EMISSION_CHANCE) {
                particles.push(Particle::neutron(
                    ids.next_id(),
                    element.position,
                    rng.angle(),
                    Some(element.id),
                ));
                report.emitted += 1;
            }

            if rng.chance(REACTIVATION_CHANCE) {
                element.reactivate();
                report.reactivated += 1;
            }
        }

        let chamber = &mut chambers[element.chamber_id.index()];
        let rate = if chamber.has_water() {
            WET_HEAT_TRANSFER_RATE
        } else {
            DRY_HEAT_TRANSFER_RATE
        };
        chamber.temperature += (element.temperature - chamber.temperature) * rate;

        element.temperature = element.temperature.min(MAX_TEMP);
    }

    report
}

/// Melt one element, record the breach and drain its chamber.
/// Returns `false` if the element had already melted.
pub(crate) fn melt_element(
    element: &mut FuelElement,
    chambers: &mut [Chamber],
    meltdown: &mut MeltdownSet,
) -> bool {
    if !element.melt() {
        return false;
    }
    meltdown.insert(element.chamber_id);
    chambers[element.chamber_id.index()].water_level = 0.0;
    true
}

/// Melt the [`CONTAGION_MELT_COUNT`] hottest intact elements.
/// Equal temperatures keep grid order.
fn force_melt_hottest(
    elements: &mut [FuelElement],
    chambers: &mut [Chamber],
    meltdown: &mut MeltdownSet,
) -> usize {
    let mut candidates: Vec<usize> = (0..elements.len())
        .filter(|&i| !elements[i].melted)
        .collect();
    candidates.sort_by(|&a, &b| elements[b].temperature.total_cmp(&elements[a].temperature));

    candidates
        .into_iter()
        .take(CONTAGION_MELT_COUNT)
        .filter(|&i| melt_element(&mut elements[i], chambers, meltdown))
        .count()
}
