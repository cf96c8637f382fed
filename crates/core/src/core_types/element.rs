use crate::constants::{BASE_TEMP, FISSION_HEAT, MAX_TEMP, NEUTRON_EMISSION_HEAT};
use crate::core_types::chamber::ChamberId;
use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fuel element identifier. Element `n` sits in chamber `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {}", self.0)
    }
}

/// Reactive fuel body centred in its chamber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelElement {
    pub id: ElementId,
    pub chamber_id: ChamberId,
    pub position: Vec2, // Centre of the owning chamber
    pub radius: f64,    // Fission capture radius

    // Reactivity state (accessible within crate only)
    pub(crate) temperature: f64,
    pub(crate) reactive: bool,
    pub(crate) melted: bool,             // Never cleared once set
    pub(crate) neutrons_emitted: u32,    // Fissions since the last element pass
    pub(crate) time_since_deactivation: u64, // Ticks spent unreactive
}

impl FuelElement {
    /// Create a cold, spent element. Elements become reactive on their own.
    pub fn new(id: ElementId, chamber_id: ChamberId, position: Vec2, radius: f64) -> Self {
        FuelElement {
            id,
            chamber_id,
            position,
            radius,
            temperature: BASE_TEMP,
            reactive: false,
            melted: false,
            neutrons_emitted: 0,
            time_since_deactivation: 0,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn is_reactive(&self) -> bool {
        self.reactive
    }

    pub fn is_melted(&self) -> bool {
        self.melted
    }

    pub fn neutrons_emitted(&self) -> u32 {
        self.neutrons_emitted
    }

    pub fn time_since_deactivation(&self) -> u64 {
        self.time_since_deactivation
    }

    /// Reactive and intact: counts towards the core temperature average.
    pub fn is_active(&self) -> bool {
        self.reactive && !self.melted
    }

    /// Set the temperature, capped at the core maximum.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.min(MAX_TEMP);
    }

    /// Force reactivity. Ignored for a melted element.
    pub fn set_reactive(&mut self, reactive: bool) {
        self.reactive = reactive && !self.melted;
    }

    /// Fold last tick's emissions into temperature and reset the counter.
    pub(crate) fn absorb_emission_heat(&mut self) {
        self.temperature += f64::from(self.neutrons_emitted) * NEUTRON_EMISSION_HEAT;
        self.neutrons_emitted = 0;
    }

    /// Mark the element molten. Returns `false` if it already was.
    pub(crate) fn melt(&mut self) -> bool {
        if self.melted {
            return false;
        }
        self.melted = true;
        self.reactive = false;
        true
    }

    /// Spend the element after it captured a neutron.
    pub(crate) fn fission(&mut self) {
        self.neutrons_emitted += 1;
        self.temperature += FISSION_HEAT;
        self.reactive = false;
        self.time_since_deactivation = 0;
    }

    pub(crate) fn reactivate(&mut self) {
        self.reactive = true;
        self.time_since_deactivation = 0;
    }

    /// Whether a slow neutron at `point` emitted by `source` splits this element.
    pub fn captures(&self, point: Vec2, source: Option<ElementId>) -> bool {
        self.reactive && source != Some(self.id) && (point - self.position).norm() < self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element() -> FuelElement {
        FuelElement::new(ElementId(4), ChamberId(4), Vec2::new(50.0, 50.0), 10.0)
    }

    #[test]
    fn test_new_element_is_spent_and_cold() {
        let e = element();
        assert!(!e.is_reactive());
        assert!(!e.is_melted());
        assert_eq!(e.temperature(), 20.0);
    }

    #[test]
    fn test_melt_is_monotonic_and_clears_reactivity() {
        let mut e = element();
        e.reactivate();
        assert!(e.melt());
        assert!(!e.melt());
        assert!(e.is_melted());
        assert!(!e.is_reactive());

        e.set_reactive(true);
        assert!(!e.is_reactive(), "melted element must stay unreactive");
    }

    #[test]
    fn test_fission_spends_element() {
        let mut e = element();
        e.reactivate();
        e.time_since_deactivation = 17;
        e.fission();
        assert!(!e.is_reactive());
        assert_eq!(e.neutrons_emitted(), 1);
        assert_eq!(e.temperature(), 23.0);
        assert_eq!(e.time_since_deactivation(), 0);

        e.absorb_emission_heat();
        assert_eq!(e.neutrons_emitted(), 0);
        assert!((e.temperature() - 23.1).abs() < 1e-12);
    }

    #[test]
    fn test_capture_rules() {
        let mut e = element();
        let inside = Vec2::new(55.0, 50.0);
        let outside = Vec2::new(60.0, 50.0);

        assert!(!e.captures(inside, None), "spent element never captures");
        e.reactivate();
        assert!(e.captures(inside, None));
        assert!(e.captures(inside, Some(ElementId(3))));
        assert!(!e.captures(inside, Some(ElementId(4))), "no self-fission");
        assert!(!e.captures(outside, None), "radius is exclusive");
    }

    #[test]
    fn test_temperature_capped() {
        let mut e = element();
        e.set_temperature(9000.0);
        assert_eq!(e.temperature(), MAX_TEMP);
    }
}
