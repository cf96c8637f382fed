//! C ABI for the reactor core simulation.
//!
//! Instances are opaque heap objects created by `reactor_sim_new` and freed
//! by `reactor_sim_destroy`. Every fallible call returns a
//! `ReactorSimErrorCode`; the message for the last failure on the calling
//! thread is available from `reactor_sim_get_last_error`.

mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;

pub use error::{reactor_sim_get_last_error, reactor_sim_get_last_error_code, ReactorSimErrorCode};
pub use instance::{
    reactor_sim_default_config, reactor_sim_destroy, reactor_sim_new, ReactorSimConfig,
    ReactorSimInstance,
};
pub use queries::{
    reactor_sim_get_chambers, reactor_sim_get_core_state, reactor_sim_get_meltdown_chambers,
    reactor_sim_get_rods, reactor_sim_rod_count, ChamberState, CoreState, RodState,
    REACTOR_SIM_INVALID_COUNT,
};
pub use simulation::{
    reactor_sim_apply_rod_action, reactor_sim_set_rod_inserted, reactor_sim_spread_meltdown,
    reactor_sim_tick, reactor_sim_toggle_rods, REACTOR_SIM_ALL_RODS,
};
