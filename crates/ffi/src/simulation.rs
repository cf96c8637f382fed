use reactor_sim_core::{ChamberId, RodAction, RodClass, RodTarget};

use crate::error::{DefaultReactorSimError, ReactorSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_reactor_sim_mut};
use crate::instance::ReactorSimInstance;

/// Rod index that addresses every rod of a class.
pub const REACTOR_SIM_ALL_RODS: u32 = u32::MAX;

fn rod_class(class: u8) -> Result<RodClass, DefaultReactorSimError> {
    RodClass::from_u8(class).ok_or_else(|| {
        DefaultReactorSimError::invalid_parameter(format!(
            "rod class must be 0 (control) or 1 (moderator), got {class}"
        ))
    })
}

fn rod_target(index: u32) -> RodTarget {
    if index == REACTOR_SIM_ALL_RODS {
        RodTarget::All
    } else {
        RodTarget::Index(index as usize)
    }
}

/// Advance the simulation by `ticks` fixed steps.
///
/// Thread-safe: holds the write lock for the whole batch.
///
/// Returns
/// - `ReactorSimErrorCode::Ok` (0) on success
/// - `ReactorSimErrorCode::NullPointer` if `ptr` is null
/// - `ReactorSimErrorCode::InvariantViolation` if a tick produced a
///   non-finite value; the instance should be destroyed
#[no_mangle]
pub extern "C" fn reactor_sim_tick(ptr: *const ReactorSimInstance, ticks: u32) -> ReactorSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_reactor_sim_mut(instance, |sim| sim.run(u64::from(ticks)))??;
        Ok(())
    })
}

/// Insert or retract one rod, or a whole class with `REACTOR_SIM_ALL_RODS`.
///
/// - `class`: 0 = control rods, 1 = moderator rods
///
/// Returns
/// - `ReactorSimErrorCode::Ok` (0) on success
/// - `ReactorSimErrorCode::InvalidParameter` for an unknown class
/// - `ReactorSimErrorCode::InvalidReference` for an index outside the class;
///   no rod is changed
#[no_mangle]
pub extern "C" fn reactor_sim_set_rod_inserted(
    ptr: *const ReactorSimInstance,
    class: u8,
    index: u32,
    inserted: bool,
) -> ReactorSimErrorCode {
    reactor_sim_apply_rod_action(ptr, class, index, RodAction::from_inserted(inserted).as_u8())
}

/// Flip the inserted state of one rod, or of a whole class with
/// `REACTOR_SIM_ALL_RODS`.
#[no_mangle]
pub extern "C" fn reactor_sim_toggle_rods(
    ptr: *const ReactorSimInstance,
    class: u8,
    index: u32,
) -> ReactorSimErrorCode {
    reactor_sim_apply_rod_action(ptr, class, index, RodAction::Toggle.as_u8())
}

/// Apply a rod action: 0 = insert, 1 = retract, 2 = toggle.
#[no_mangle]
pub extern "C" fn reactor_sim_apply_rod_action(
    ptr: *const ReactorSimInstance,
    class: u8,
    index: u32,
    action: u8,
) -> ReactorSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let class = rod_class(class)?;
        let action = RodAction::from_u8(action).ok_or_else(|| {
            DefaultReactorSimError::invalid_parameter(format!(
                "rod action must be 0, 1 or 2, got {action}"
            ))
        })?;
        with_reactor_sim_mut(instance, |sim| {
            sim.apply_rod_command(class, rod_target(index), action)
        })??;
        Ok(())
    })
}

/// Pull the intact neighbours of `chamber_id` halfway to the melting point.
///
/// - `out_heated` (optional) receives the number of elements heated.
///
/// Returns
/// - `ReactorSimErrorCode::Ok` (0) on success
/// - `ReactorSimErrorCode::InvalidReference` for a chamber outside the grid
///
/// # Safety
///
/// - `out_heated` if non-null, must be a valid pointer to a `u32`.
#[no_mangle]
pub unsafe extern "C" fn reactor_sim_spread_meltdown(
    ptr: *const ReactorSimInstance,
    chamber_id: u32,
    out_heated: *mut u32,
) -> ReactorSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let heated = with_reactor_sim_mut(instance, |sim| {
            sim.spread_meltdown(ChamberId(chamber_id as usize))
        })??;
        if !out_heated.is_null() {
            unsafe {
                *out_heated = u32::try_from(heated).unwrap_or(u32::MAX);
            }
        }
        Ok(())
    })
}
