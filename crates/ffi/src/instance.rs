use reactor_sim_core::{ReactorConfig, ReactorSimulation};
use std::ptr;
use std::sync::{Mutex, RwLock};
use tracing::info;

use crate::error::{DefaultReactorSimError, ReactorSimErrorCode};
use crate::helpers::{clear_last_error, track_error, track_result};
use crate::queries::{ChamberState, RodState};

/// Run parameters accepted across the FFI boundary. The chamber layout
/// always uses the built-in defaults.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorSimConfig {
    /// Seed for the simulation's random source.
    pub seed: u64,
    /// Slow neutrons placed on random fuel elements at start-up.
    pub initial_neutrons: u32,
    /// Spawn smoke and sparks from breached chambers.
    pub emit_meltdown_effects: bool,
    /// Spread every meltdown to its neighbours at the end of each tick.
    pub auto_spread_meltdown: bool,
}

impl From<ReactorSimConfig> for ReactorConfig {
    fn from(config: ReactorSimConfig) -> Self {
        ReactorConfig {
            seed: config.seed,
            initial_neutrons: config.initial_neutrons as usize,
            emit_meltdown_effects: config.emit_meltdown_effects,
            auto_spread_meltdown: config.auto_spread_meltdown,
            ..ReactorConfig::default()
        }
    }
}

/// The reactor simulation context handed to C callers.
///
/// # Thread Safety
/// The simulation sits behind an `RwLock`: queries take the read lock,
/// `reactor_sim_tick` and rod commands take the write lock. Array queries
/// fill cached buffers guarded by their own `Mutex`, so repeated polling
/// does not allocate.
///
/// # Usage (C++)
/// ```cpp
/// ReactorSimInstance* sim = nullptr;
/// if (reactor_sim_new(reactor_sim_default_config(), &sim) != ReactorSimErrorCode::Ok) {
///     return;
/// }
/// reactor_sim_set_rod_inserted(sim, 0, REACTOR_SIM_ALL_RODS, false);
/// for (int i = 0; i < 600; ++i) {
///     reactor_sim_tick(sim, 1);
/// }
/// reactor_sim_destroy(sim);
/// ```
pub struct ReactorSimInstance {
    pub(crate) sim: RwLock<ReactorSimulation>,
    /// Reused by `reactor_sim_get_chambers`.
    pub(crate) chamber_snapshot: Mutex<Vec<ChamberState>>,
    /// Reused by `reactor_sim_get_meltdown_chambers`.
    pub(crate) meltdown_snapshot: Mutex<Vec<u32>>,
    /// Reused by `reactor_sim_get_rods`.
    pub(crate) rod_snapshot: Mutex<Vec<RodState>>,
}

impl ReactorSimInstance {
    /// # Errors
    ///
    /// Returns `ReactorSimErrorCode::InvalidConfig` if the configuration is rejected.
    pub(crate) fn new(config: ReactorSimConfig) -> Result<Box<Self>, DefaultReactorSimError> {
        let sim = ReactorSimulation::new(config.into())?;
        let chambers = sim.chambers().len();
        info!("Created reactor instance with {} chambers", chambers);

        Ok(Box::new(Self {
            sim: RwLock::new(sim),
            chamber_snapshot: Mutex::new(Vec::with_capacity(chambers)),
            meltdown_snapshot: Mutex::new(Vec::new()),
            rod_snapshot: Mutex::new(Vec::new()),
        }))
    }
}

/// Default run parameters: the built-in seed, five seed neutrons, effects
/// on and automatic meltdown spread off.
#[no_mangle]
pub extern "C" fn reactor_sim_default_config() -> ReactorSimConfig {
    let config = ReactorConfig::default();
    ReactorSimConfig {
        seed: config.seed,
        initial_neutrons: u32::try_from(config.initial_neutrons).unwrap_or(u32::MAX),
        emit_meltdown_effects: config.emit_meltdown_effects,
        auto_spread_meltdown: config.auto_spread_meltdown,
    }
}

/// Create a new reactor instance and return it via out-parameter.
///
/// Returns
/// - `ReactorSimErrorCode::Ok` (0) with a valid instance in `out_instance`
/// - `ReactorSimErrorCode::NullPointer` if `out_instance` is null
/// - `ReactorSimErrorCode::InvalidConfig` if the configuration is rejected,
///   with `out_instance` set to null
///
/// Call `reactor_sim_get_last_error()` for a description of the failure.
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call
///   `reactor_sim_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn reactor_sim_new(
    config: ReactorSimConfig,
    out_instance: *mut *mut ReactorSimInstance,
) -> ReactorSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultReactorSimError::null_pointer("out_instance"));
    }

    match track_result(ReactorSimInstance::new(config)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            clear_last_error();
            ReactorSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroys an instance previously created by `reactor_sim_new`.
///
/// If `ptr` is null this function is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `reactor_sim_new`.
/// - The pointer MUST NOT have been freed already.
/// - The caller must not use the pointer again afterwards.
#[no_mangle]
pub unsafe extern "C" fn reactor_sim_destroy(ptr: *mut ReactorSimInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` came from `Box::into_raw` in `reactor_sim_new` and has
    // not been freed.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
