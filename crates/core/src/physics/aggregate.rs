//! Core temperature and meltdown propagation.

use crate::constants::{
    BASE_TEMP, MAX_TEMP, MAX_WATER_TEMP, MELTDOWN_FACTOR_PER_CHAMBER, MELTDOWN_SPREAD_RATE,
    MELTDOWN_TEMP, NEUTRON_DENSITY_SCALE, TEMP_MELTDOWN_WEIGHT, TEMP_NEUTRON_WEIGHT,
    TEMP_NORMALIZATION, TEMP_WATER_WEIGHT,
};
use crate::core_types::{Chamber, ChamberId, FuelElement, Particle, ParticleKind};
use crate::grid::ChamberGrid;

/// New smoothed core temperature.
///
/// The raw value scales the mean temperature of active elements by three
/// weighted factors: slow neutron density, how cool the remaining water
/// is, and how many chambers have breached. The result moves 30% of the
/// way from `previous` towards it.
pub(crate) fn core_temperature(
    previous: f64,
    elements: &[FuelElement],
    chambers: &[Chamber],
    particles: &[Particle],
    meltdown_count: usize,
) -> f64 {
    let element_temp = mean(
        elements
            .iter()
            .filter(|e| e.is_active())
            .map(FuelElement::temperature),
    )
    .unwrap_or(BASE_TEMP);

    let slow_neutrons = particles
        .iter()
        .filter(|p| p.kind == ParticleKind::Neutron)
        .count();
    let neutron_factor = 1.0 + count_to_f64(slow_neutrons) / NEUTRON_DENSITY_SCALE;

    let water_cooling = mean(
        chambers
            .iter()
            .filter(|c| c.has_water())
            .map(|c| (MAX_WATER_TEMP - c.temperature) / MAX_WATER_TEMP),
    )
    .unwrap_or(1.0);

    let meltdown_factor = 1.0 + count_to_f64(meltdown_count) * MELTDOWN_FACTOR_PER_CHAMBER;

    let raw = element_temp
        * (TEMP_NEUTRON_WEIGHT * neutron_factor
            + TEMP_WATER_WEIGHT * water_cooling
            + TEMP_MELTDOWN_WEIGHT * meltdown_factor);

    let smoothed = BASE_TEMP
        + (raw - BASE_TEMP) * TEMP_NORMALIZATION
        + (previous - BASE_TEMP) * (1.0 - TEMP_NORMALIZATION);

    smoothed.clamp(BASE_TEMP, MAX_TEMP)
}

/// Pull every intact neighbour of `chamber` halfway to the melting point.
/// Returns how many elements were heated.
pub(crate) fn spread_meltdown(
    grid: &ChamberGrid,
    elements: &mut [FuelElement],
    chamber: ChamberId,
) -> usize {
    let mut heated = 0;
    for neighbor in grid.neighbors(chamber) {
        let element = &mut elements[neighbor.index()];
        if element.melted {
            continue;
        }
        let gap = MELTDOWN_TEMP - element.temperature;
        element.set_temperature(element.temperature + MELTDOWN_SPREAD_RATE * gap);
        heated += 1;
    }
    heated
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count_to_f64(count))
}

#[inline]
fn count_to_f64(v: usize) -> f64 {
    v as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::core_types::{ParticleId, Vec2};
    use approx::assert_relative_eq;

    fn setup() -> (ChamberGrid, Vec<Chamber>, Vec<FuelElement>) {
        let grid = ChamberGrid::new(&LayoutConfig::default()).unwrap();
        let (chambers, elements) = grid.build_cells();
        (grid, chambers, elements)
    }

    #[test]
    fn test_cold_core_stays_ambient() {
        let (_, chambers, elements) = setup();
        let t = core_temperature(BASE_TEMP, &elements, &chambers, &[], 0);
        // raw = 20 * (0.4 + 0.3 * 0.75 + 0.3) = 18.5, clamped back to ambient
        assert_eq!(t, BASE_TEMP);
    }

    #[test]
    fn test_raw_formula() {
        let (_, chambers, mut elements) = setup();
        elements[0].reactivate();
        elements[0].temperature = 1000.0;
        let particles: Vec<Particle> = (0..50)
            .map(|i| Particle::neutron(ParticleId(i), Vec2::zeros(), 0.0, None))
            .collect();

        let t = core_temperature(BASE_TEMP, &elements, &chambers, &particles, 2);

        // every chamber is at 20 degrees: water cooling 0.75
        let raw = 1000.0 * (0.4 * 1.5 + 0.3 * 0.75 + 0.3 * 1.4);
        assert_relative_eq!(t, BASE_TEMP + (raw - BASE_TEMP) * 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_fast_neutrons_do_not_count() {
        let (_, chambers, mut elements) = setup();
        elements[0].reactivate();
        elements[0].temperature = 1000.0;
        let fast = vec![Particle::fast_neutron(ParticleId(0), Vec2::zeros(), 0.0, None); 100];
        let with_fast = core_temperature(BASE_TEMP, &elements, &chambers, &fast, 0);
        let without = core_temperature(BASE_TEMP, &elements, &chambers, &[], 0);
        assert_eq!(with_fast, without);
    }

    #[test]
    fn test_smoothing_keeps_most_of_previous() {
        let (_, chambers, elements) = setup();
        let t = core_temperature(1020.0, &elements, &chambers, &[], 0);
        // raw 18.5: 20 + (-1.5 * 0.3) + 1000 * 0.7
        assert_relative_eq!(t, 20.0 - 0.45 + 700.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamped_to_max() {
        let (_, chambers, mut elements) = setup();
        for e in &mut elements {
            e.reactivate();
            e.temperature = 4000.0;
        }
        let t = core_temperature(MAX_TEMP, &elements, &chambers, &[], 500);
        assert_eq!(t, MAX_TEMP);
    }

    #[test]
    fn test_spread_heats_intact_neighbours() {
        let (grid, _, mut elements) = setup();
        let centre = grid.id_of(5, 5).unwrap();
        let melted = grid.id_of(4, 4).unwrap();
        elements[melted.index()].melt();
        elements[melted.index()].temperature = 50.0;

        let heated = spread_meltdown(&grid, &mut elements, centre);

        assert_eq!(heated, 7);
        for n in grid.neighbors(centre) {
            let e = &elements[n.index()];
            if n == melted {
                assert_eq!(e.temperature(), 50.0);
            } else {
                assert_relative_eq!(e.temperature(), 20.0 + 0.5 * (1132.0 - 20.0));
            }
        }
        assert_eq!(elements[centre.index()].temperature(), 20.0);
    }

    #[test]
    fn test_repeated_spread_converges_on_melting_point() {
        let (grid, _, mut elements) = setup();
        let centre = grid.id_of(5, 5).unwrap();
        let neighbour = grid.id_of(5, 6).unwrap();
        for _ in 0..4 {
            spread_meltdown(&grid, &mut elements, centre);
        }
        let gap = MELTDOWN_TEMP - elements[neighbour.index()].temperature();
        assert_relative_eq!(gap, (MELTDOWN_TEMP - 20.0) / 16.0, epsilon = 1e-9);
    }
}
