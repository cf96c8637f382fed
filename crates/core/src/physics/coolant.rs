//! Chamber water: evaporation, refill and element cooling.

use crate::constants::{
    BASE_TEMP, COOLING_RATE, EVAPORATION_TEMP, MAX_WATER_LEVEL, WATER_REFILL_RATE,
};
use crate::core_types::{Chamber, FuelElement};

/// Temperature span over which evaporation loses one percent of the water per tick.
const EVAPORATION_SPAN: f64 = 50.0;
/// Per-tick evaporation fraction per [`EVAPORATION_SPAN`] above boiling.
const EVAPORATION_RATE: f64 = 0.01;
/// Fraction of element temperature a barely flooded chamber keeps per tick.
const BASE_ELEMENT_RETENTION: f64 = 0.9;
/// Additional retention scaled by the water fraction.
const WATER_RETENTION_SPAN: f64 = 0.1;

/// Update every chamber's water and cool the element it holds.
///
/// Chambers above [`EVAPORATION_TEMP`] lose water in proportion to how hot
/// they are; cooler chambers refill. A chamber that still counts as flooded
/// pulls its element's temperature down.
pub(crate) fn update_coolant(chambers: &mut [Chamber], elements: &mut [FuelElement]) {
    for chamber in chambers.iter_mut() {
        chamber.temperature = (chamber.temperature * COOLING_RATE).max(BASE_TEMP);

        if chamber.temperature > EVAPORATION_TEMP {
            let excess = chamber.temperature - EVAPORATION_TEMP;
            chamber.water_level *= 1.0 - EVAPORATION_RATE * excess / EVAPORATION_SPAN;
        } else if chamber.water_level < MAX_WATER_LEVEL {
            chamber.water_level = (chamber.water_level + WATER_REFILL_RATE).min(MAX_WATER_LEVEL);
        }

        if chamber.has_water() {
            let element = &mut elements[chamber.id.index()];
            let retention = BASE_ELEMENT_RETENTION
                + chamber.water_level / MAX_WATER_LEVEL * WATER_RETENTION_SPAN;
            element.temperature = (element.temperature * retention).max(BASE_TEMP);
        }

        chamber.clamp_state();
    }
}
