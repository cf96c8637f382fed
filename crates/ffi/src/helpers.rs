use crate::error::{with_last_error_mut, DefaultReactorSimError, ReactorSimError, ReactorSimErrorCode};
use crate::instance::ReactorSimInstance;
use reactor_sim_core::ReactorSimulation;
use std::ffi::CString;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl ReactorSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl ReactorSimError) -> ReactorSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = ReactorSimErrorCode::Ok;
    });
}

/// Record the error of a failed result and hand back its code.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultReactorSimError>,
) -> Result<T, ReactorSimErrorCode> {
    result.map_err(|error| track_error(&error))
}

/// Run an FFI body and convert its outcome to an error code.
/// Success clears the last error; failure records it.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> ReactorSimErrorCode
where
    F: FnOnce() -> Result<(), DefaultReactorSimError>,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            ReactorSimErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrow the instance behind a pointer handed out by `reactor_sim_new`.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const ReactorSimInstance,
) -> Result<&'a ReactorSimInstance, DefaultReactorSimError> {
    // SAFETY: callers pass pointers created by `reactor_sim_new` that have not
    // been destroyed; null is rejected here.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultReactorSimError::null_pointer("ptr"))
}

/// Run `f` under the simulation read lock.
pub(crate) fn with_reactor_sim<F, T>(
    instance: &ReactorSimInstance,
    f: F,
) -> Result<T, DefaultReactorSimError>
where
    F: FnOnce(&ReactorSimulation) -> T,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultReactorSimError::lock_poisoned("sim"))?;
    Ok(f(&sim))
}

/// Run `f` under the simulation write lock.
pub(crate) fn with_reactor_sim_mut<F, T>(
    instance: &ReactorSimInstance,
    f: F,
) -> Result<T, DefaultReactorSimError>
where
    F: FnOnce(&mut ReactorSimulation) -> T,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultReactorSimError::lock_poisoned("sim"))?;
    Ok(f(&mut sim))
}
