//! Named simulation constants.
//!
//! Every probability, rate and threshold the physics step uses lives here so
//! the tick code reads as a sequence of rules rather than magic numbers.
//! Units are simulation units: temperatures in degrees, distances in layout
//! pixels, speeds in pixels per tick.

// ============================================================================
// NEUTRONS
// ============================================================================

/// Speed of a slow (thermal) neutron.
pub const NEUTRON_SPEED: f64 = 2.0;

/// Speed of a freshly spawned fission neutron.
pub const FAST_NEUTRON_SPEED: f64 = 5.0;

/// Fractional speed loss per tick for a fast neutron inside a flooded chamber.
pub const FAST_NEUTRON_SLOWDOWN_RATE: f64 = 0.0085;

/// A moderated fast neutron becomes slow once its speed drops to this
/// multiple of [`NEUTRON_SPEED`].
pub const FAST_NEUTRON_CONVERSION_RATIO: f64 = 1.2;

/// Chance per tick that a slow neutron in a flooded chamber is absorbed by water.
pub const NEUTRON_ABSORPTION_CHANCE: f64 = 0.003;

/// Fast neutrons released by a single fission event.
pub const FISSION_NEUTRON_COUNT: usize = 3;

// ============================================================================
// FUEL ELEMENTS
// ============================================================================

/// Chance per tick that a spent element spontaneously emits a slow neutron.
pub const UNREACTIVE_EMISSION_CHANCE: f64 = 0.0001;

/// Chance per tick that a spent element becomes reactive again.
pub const REACTIVATION_CHANCE: f64 = 0.01;

/// Temperature added to an element per neutron it emitted last tick.
pub const NEUTRON_EMISSION_HEAT: f64 = 0.1;

/// Temperature added to an element by the fission event itself.
pub const FISSION_HEAT: f64 = 3.0;

/// Element temperature at which the element melts.
pub const MELTDOWN_TEMP: f64 = 1132.0;

/// Fraction of the gap to [`MELTDOWN_TEMP`] a neighbour closes per spread.
pub const MELTDOWN_SPREAD_RATE: f64 = 0.5;

/// Hottest elements force-melted when the whole core runs away.
pub const CONTAGION_MELT_COUNT: usize = 3;

/// Element radius as a fraction of the chamber size.
pub const ELEMENT_RADIUS_RATIO: f64 = 1.0 / 3.0;

/// Element to chamber heat exchange rate when the chamber holds water.
pub const WET_HEAT_TRANSFER_RATE: f64 = 0.1;

/// Element to chamber heat exchange rate for a dry chamber.
pub const DRY_HEAT_TRANSFER_RATE: f64 = 0.01;

// ============================================================================
// COOLANT
// ============================================================================

/// Chamber self-cooling multiplier. Kept at 1.0 so the step is only a floor clamp.
pub const COOLING_RATE: f64 = 1.0;

/// Chamber temperature above which water evaporates.
pub const EVAPORATION_TEMP: f64 = 100.0;

/// Water level regained per tick by a chamber at or below [`EVAPORATION_TEMP`].
pub const WATER_REFILL_RATE: f64 = 0.5;

/// Water level (percent) above which a chamber counts as flooded.
pub const WATER_PRESENT_LEVEL: f64 = 5.0;

/// Full water level (percent).
pub const MAX_WATER_LEVEL: f64 = 100.0;

/// Water temperature used to normalise the cooling contribution.
pub const MAX_WATER_TEMP: f64 = 80.0;

/// Heat deposited per unit of particle interaction with a chamber.
pub const PARTICLE_HEAT_TRANSFER: f64 = 1.0;

/// Hottest temperature a chamber is allowed to hold.
pub const MAX_CHAMBER_TEMP: f64 = 1000.0;

// ============================================================================
// RODS
// ============================================================================

/// Column pattern for control rods: a rod precedes column `c` when `c % 4 == 2`.
pub const CONTROL_ROD_SPACING: usize = 4;
pub const CONTROL_ROD_WIDTH: f64 = 6.0;
pub const CONTROL_ROD_ABSORPTION_CHANCE: f64 = 0.8;

/// Column pattern for moderator rods: a rod follows column `c` when `c % 4 == 3`.
pub const MODERATOR_SPACING: usize = 4;
pub const MODERATOR_WIDTH: f64 = 6.0;
pub const MODERATOR_BOUNCE_EFFICIENCY: f64 = 0.8;

/// Jitter added to a moderator bounce, as a fraction of [`FAST_NEUTRON_SPEED`].
pub const MODERATOR_BOUNCE_JITTER: f64 = 0.1;

/// Fraction of the bounce velocity used to push a neutron off the moderator.
pub const MODERATOR_NUDGE: f64 = 0.1;

/// Height fraction a retracted rod settles at.
pub const ROD_RETRACTED_HEIGHT_RATIO: f64 = 0.2;

/// Exponential smoothing factor for rod travel.
pub const ROD_SMOOTHING: f64 = 0.1;

// ============================================================================
// CORE TEMPERATURE
// ============================================================================

/// Ambient temperature.
pub const BASE_TEMP: f64 = 20.0;

/// Maximum possible core (and element) temperature.
pub const MAX_TEMP: f64 = 4000.0;

/// Weight of the newly computed raw temperature in the smoothed core value.
pub const TEMP_NORMALIZATION: f64 = 0.3;
pub const TEMP_NEUTRON_WEIGHT: f64 = 0.4;
pub const TEMP_WATER_WEIGHT: f64 = 0.3;
pub const TEMP_MELTDOWN_WEIGHT: f64 = 0.3;

/// Extra weight each molten chamber adds to the meltdown factor.
pub const MELTDOWN_FACTOR_PER_CHAMBER: f64 = 0.2;

/// Slow neutrons per unit of neutron factor.
pub const NEUTRON_DENSITY_SCALE: f64 = 100.0;

/// Core temperature reported as critical.
pub const CRITICAL_TEMP: f64 = 500.0;

// ============================================================================
// MELTDOWN EFFECTS
// ============================================================================

/// Core temperature at which meltdown effects reach full severity.
pub const SEVERITY_FULL_TEMP: f64 = 3000.0;

pub const SMOKE_BASE_LIFETIME: f64 = 150.0;
pub const SMOKE_LIFETIME_SPREAD: f64 = 100.0;
pub const SMOKE_SPAWN_OFFSET: f64 = 10.0;

pub const SPARK_BASE_LIFETIME: f64 = 30.0;
pub const SPARK_LIFETIME_SPREAD: f64 = 20.0;
pub const SPARK_SPEED_SPREAD: f64 = 3.0;
pub const SPARK_BURST: usize = 3;
