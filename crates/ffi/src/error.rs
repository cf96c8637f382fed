use reactor_sim_core::ReactorError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait ReactorSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> ReactorSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `ReactorSimError` for FFI failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultReactorSimError {
    code: ReactorSimErrorCode,
    msg: String,
}

impl DefaultReactorSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: ReactorSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"sim"`, `"chamber_snapshot"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: ReactorSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for a parameter outside its accepted range.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: ReactorSimErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<ReactorError> for DefaultReactorSimError {
    fn from(error: ReactorError) -> Self {
        let code = match error {
            ReactorError::UnknownRod { .. } | ReactorError::UnknownChamber { .. } => {
                ReactorSimErrorCode::InvalidReference
            }
            ReactorError::InvalidConfig { .. } => ReactorSimErrorCode::InvalidConfig,
            ReactorError::InvariantViolation { .. } => ReactorSimErrorCode::InvariantViolation,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl ReactorSimError for DefaultReactorSimError {
    fn code(&self) -> ReactorSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by reactor simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactorSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// The reactor configuration cannot produce a valid core.
    InvalidConfig = 3,

    /// A rod or chamber that does not exist. Nothing was changed.
    InvalidReference = 4,

    /// Invalid parameter passed to function (e.g. an unknown rod class).
    InvalidParameter = 5,

    /// A tick produced a non-finite value. The instance should be destroyed.
    InvariantViolation = 6,
}

impl From<DefaultReactorSimError> for ReactorSimErrorCode {
    fn from(error: DefaultReactorSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, ReactorSimErrorCode)> = const { RefCell::new((None, ReactorSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, ReactorSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, ReactorSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// ReactorSimInstance* sim = nullptr;
/// ReactorSimErrorCode err = reactor_sim_new(reactor_sim_default_config(), &sim);
/// if (err != ReactorSimErrorCode::Ok) {
///     const char* error = reactor_sim_get_last_error();
///     if (error) {
///         printf("Reactor creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn reactor_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `ReactorSimErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn reactor_sim_get_last_error_code() -> ReactorSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
