use reactor_sim_core::{Chamber, FuelElement, ReactorStats, Rod};
use std::ptr;
use std::sync::Mutex;

use crate::error::{DefaultReactorSimError, ReactorSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_reactor_sim};
use crate::instance::ReactorSimInstance;

/// Returned by `reactor_sim_rod_count` when no count is available.
pub const REACTOR_SIM_INVALID_COUNT: u32 = u32::MAX;

#[inline]
fn count_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

#[repr(C)]
/// FFI-friendly summary of the whole core after the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoreState {
    /// Ticks completed.
    pub tick: u64,
    /// Smoothed core temperature.
    pub core_temperature: f64,
    pub neutrons: u32,
    pub fast_neutrons: u32,
    pub smoke: u32,
    pub sparks: u32,
    pub chambers_with_water: u32,
    pub total_chambers: u32,
    pub inserted_control_rods: u32,
    pub total_control_rods: u32,
    pub inserted_moderator_rods: u32,
    pub total_moderator_rods: u32,
    pub melted_elements: u32,
    /// Core temperature above the critical threshold.
    pub critical: bool,
    /// At least one chamber has breached.
    pub meltdown_in_progress: bool,
}

impl From<&ReactorStats> for CoreState {
    fn from(stats: &ReactorStats) -> Self {
        Self {
            tick: stats.tick,
            core_temperature: stats.core_temperature,
            neutrons: count_u32(stats.neutrons),
            fast_neutrons: count_u32(stats.fast_neutrons),
            smoke: count_u32(stats.smoke),
            sparks: count_u32(stats.sparks),
            chambers_with_water: count_u32(stats.chambers_with_water),
            total_chambers: count_u32(stats.total_chambers),
            inserted_control_rods: count_u32(stats.inserted_control_rods),
            total_control_rods: count_u32(stats.total_control_rods),
            inserted_moderator_rods: count_u32(stats.inserted_moderator_rods),
            total_moderator_rods: count_u32(stats.total_moderator_rods),
            melted_elements: count_u32(stats.melted_elements),
            critical: stats.critical,
            meltdown_in_progress: stats.meltdown_in_progress,
        }
    }
}

#[repr(C)]
/// FFI-friendly view of one chamber and the fuel element it holds.
/// Keep this layout stable for C/C++/C# consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChamberState {
    pub chamber_id: u32,
    pub row: u32,
    pub col: u32,
    /// Top-left corner and side length in world pixels.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Coolant level (0-100 %).
    pub water_level: f32,
    pub temperature: f32,
    pub element_temperature: f32,
    pub element_reactive: bool,
    pub element_melted: bool,
}

impl From<(&Chamber, &FuelElement)> for ChamberState {
    fn from((chamber, element): (&Chamber, &FuelElement)) -> Self {
        Self {
            chamber_id: count_u32(chamber.id.index()),
            row: count_u32(chamber.row),
            col: count_u32(chamber.col),
            x: chamber.bounds.min.x as f32,
            y: chamber.bounds.min.y as f32,
            size: chamber.bounds.width() as f32,
            water_level: chamber.water_level() as f32,
            temperature: chamber.temperature() as f32,
            element_temperature: element.temperature() as f32,
            element_reactive: element.is_reactive(),
            element_melted: element.is_melted(),
        }
    }
}

#[repr(C)]
/// FFI-friendly view of one rod.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RodState {
    pub index: u32,
    /// Top-left corner in world pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub current_height: f32,
    pub max_height: f32,
    pub inserted: bool,
}

impl From<&Rod> for RodState {
    fn from(rod: &Rod) -> Self {
        Self {
            index: count_u32(rod.index),
            x: rod.position.x as f32,
            y: rod.position.y as f32,
            width: rod.width as f32,
            current_height: rod.current_height() as f32,
            max_height: rod.max_height as f32,
            inserted: rod.is_inserted(),
        }
    }
}

/// Refill `cache` with `fill`, then publish it through the out-parameters.
/// On failure both outputs are reset.
///
/// # Safety
///
/// `out_len` and `out_array` must be valid, non-null pointers.
unsafe fn publish_cached<T, F>(
    ptr: *const ReactorSimInstance,
    cache: fn(&ReactorSimInstance) -> &Mutex<Vec<T>>,
    lock_name: &str,
    fill: F,
    out_len: *mut usize,
    out_array: *mut *const T,
) -> ReactorSimErrorCode
where
    F: FnOnce(&reactor_sim_core::ReactorSimulation, &mut Vec<T>) -> Result<(), DefaultReactorSimError>,
{
    let result = handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let mut buffer = cache(instance)
            .lock()
            .map_err(|_| DefaultReactorSimError::lock_poisoned(lock_name))?;
        buffer.clear();
        with_reactor_sim(instance, |sim| fill(sim, &mut buffer))??;

        unsafe {
            *out_len = buffer.len();
            *out_array = buffer.as_ptr();
        }
        Ok(())
    });

    if result != ReactorSimErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }

    result
}

#[no_mangle]
/// Fill `out_state` with the current core summary.
///
/// Returns
/// - `ReactorSimErrorCode::Ok` (0) on success
/// - `ReactorSimErrorCode::NullPointer` if `ptr` or `out_state` is null
///
/// # Safety
///
/// - `out_state` must be a valid, non-null pointer to a `CoreState`.
pub unsafe extern "C" fn reactor_sim_get_core_state(
    ptr: *const ReactorSimInstance,
    out_state: *mut CoreState,
) -> ReactorSimErrorCode {
    if out_state.is_null() {
        return track_error(&DefaultReactorSimError::null_pointer("out_state"));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let state = with_reactor_sim(instance, |sim| CoreState::from(&sim.stats()))?;
        unsafe {
            *out_state = state;
        }
        Ok(())
    })
}

#[no_mangle]
/// Return a borrowed pointer to a cached array of every chamber, ordered by id.
///
/// The buffer is reused between calls: the pointer is valid until the next
/// call to this function on the same instance. **DO NOT FREE THIS POINTER**.
///
/// Returns
/// - `ReactorSimErrorCode::Ok` (0) with the array in `out_array` and count in `out_len`
/// - `ReactorSimErrorCode::NullPointer` if any pointer is null
/// - `ReactorSimErrorCode::LockPoisoned` if an internal lock is poisoned
///
/// # Safety
///
/// - `out_len` must be a valid, non-null pointer to a `usize`.
/// - `out_array` must be a valid, non-null pointer to a `*const ChamberState`.
///
/// # Example Usage (C++)
/// ```cpp
/// uintptr_t len = 0;
/// const ChamberState* chambers = nullptr;
/// if (reactor_sim_get_chambers(sim, &len, &chambers) == ReactorSimErrorCode::Ok) {
///     for (uintptr_t i = 0; i < len; i++) {
///         draw_chamber(chambers[i]);
///     }
/// }
/// ```
pub unsafe extern "C" fn reactor_sim_get_chambers(
    ptr: *const ReactorSimInstance,
    out_len: *mut usize,
    out_array: *mut *const ChamberState,
) -> ReactorSimErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultReactorSimError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultReactorSimError::null_pointer("out_array"));
    }

    unsafe {
        publish_cached(
            ptr,
            |instance| &instance.chamber_snapshot,
            "chamber_snapshot",
            |sim, buffer| {
                buffer.extend(
                    sim.chambers()
                        .iter()
                        .zip(sim.elements())
                        .map(ChamberState::from),
                );
                Ok(())
            },
            out_len,
            out_array,
        )
    }
}

#[no_mangle]
/// Return a borrowed pointer to the ids of breached chambers, in the order
/// they melted.
///
/// Same buffer contract as `reactor_sim_get_chambers`.
///
/// # Safety
///
/// - `out_len` must be a valid, non-null pointer to a `usize`.
/// - `out_array` must be a valid, non-null pointer to a `*const u32`.
pub unsafe extern "C" fn reactor_sim_get_meltdown_chambers(
    ptr: *const ReactorSimInstance,
    out_len: *mut usize,
    out_array: *mut *const u32,
) -> ReactorSimErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultReactorSimError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultReactorSimError::null_pointer("out_array"));
    }

    unsafe {
        publish_cached(
            ptr,
            |instance| &instance.meltdown_snapshot,
            "meltdown_snapshot",
            |sim, buffer| {
                buffer.extend(sim.meltdown().iter().map(|id| count_u32(id.index())));
                Ok(())
            },
            out_len,
            out_array,
        )
    }
}

#[no_mangle]
/// Return a borrowed pointer to the rods of one class, in index order.
///
/// - `class`: 0 = control rods, 1 = moderator rods
///
/// Same buffer contract as `reactor_sim_get_chambers`.
///
/// # Safety
///
/// - `out_len` must be a valid, non-null pointer to a `usize`.
/// - `out_array` must be a valid, non-null pointer to a `*const RodState`.
pub unsafe extern "C" fn reactor_sim_get_rods(
    ptr: *const ReactorSimInstance,
    class: u8,
    out_len: *mut usize,
    out_array: *mut *const RodState,
) -> ReactorSimErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultReactorSimError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultReactorSimError::null_pointer("out_array"));
    }

    unsafe {
        publish_cached(
            ptr,
            |instance| &instance.rod_snapshot,
            "rod_snapshot",
            |sim, buffer| {
                let class = reactor_sim_core::RodClass::from_u8(class).ok_or_else(|| {
                    DefaultReactorSimError::invalid_parameter(format!(
                        "rod class must be 0 (control) or 1 (moderator), got {class}"
                    ))
                })?;
                buffer.extend(sim.rods(class).iter().map(RodState::from));
                Ok(())
            },
            out_len,
            out_array,
        )
    }
}

#[no_mangle]
/// Number of rods in a class, or `REACTOR_SIM_INVALID_COUNT` for an unknown
/// class, a null pointer or a poisoned lock.
pub extern "C" fn reactor_sim_rod_count(ptr: *const ReactorSimInstance, class: u8) -> u32 {
    let Some(class) = reactor_sim_core::RodClass::from_u8(class) else {
        return REACTOR_SIM_INVALID_COUNT;
    };
    instance_from_ptr(ptr)
        .and_then(|instance| with_reactor_sim(instance, |sim| count_u32(sim.rods(class).len())))
        .unwrap_or(REACTOR_SIM_INVALID_COUNT)
}
