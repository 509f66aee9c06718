//! FFI bindings for liftstreak
//!
//! This module provides C-compatible functions for calling the streak engine
//! from a dashboard shell written in another language. All functions take C
//! strings (null-terminated) and return allocated memory that must be freed by
//! the caller using `liftstreak_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::calendar::parse_day;
use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::pipeline::{activity_log_to_report, StreakEngine};
use crate::plan::{parse_and_validate, PlanRequest};
use crate::schema::ActivityLogAdapter;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Return the string, or record the error and return NULL
fn finish(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

macro_rules! required_str {
    ($ptr:expr, $what:literal) => {
        match cstr_to_string($ptr) {
            Some(s) => s,
            None => {
                set_last_error(concat!("Invalid ", $what, " string pointer"));
                return ptr::null_mut();
            }
        }
    };
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a streak report from a store activity-log document.
///
/// # Safety
/// - `log_json`, `utc_offset` and `today` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `liftstreak_free_string`.
/// - Returns NULL on error; call `liftstreak_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_report(
    log_json: *const c_char,
    utc_offset: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let log_str = required_str!(log_json, "log JSON");
    let offset_str = required_str!(utc_offset, "UTC offset");
    let today_str = required_str!(today, "today");

    finish(activity_log_to_report(log_str, offset_str, today_str))
}

/// Parse and validate a plan generator reply, returning the plan JSON.
///
/// # Safety
/// - `response` must be a valid null-terminated C string.
/// - `request_json` may be NULL; when given it must be a valid C string and the
///   session count is checked against it.
/// - Returns a newly allocated string that must be freed with `liftstreak_free_string`.
/// - Returns NULL on error; call `liftstreak_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_validate_plan(
    response: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let response_str = required_str!(response, "response");

    let result = (|| -> Result<String, ComputeError> {
        let request = match cstr_to_string(request_json) {
            Some(json) => Some(serde_json::from_str::<PlanRequest>(&json)?),
            None => None,
        };
        let plan = parse_and_validate(&response_str, request.as_ref())?;
        Ok(serde_json::to_string(&plan)?)
    })();

    finish(result)
}

// ============================================================================
// Configured Engine API
// ============================================================================

/// Opaque handle to a configured StreakEngine
pub struct StreakEngineHandle {
    engine: StreakEngine,
}

/// Create an engine from a JSON configuration, or the defaults when NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `liftstreak_engine_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_engine_new(
    config_json: *const c_char,
) -> *mut StreakEngineHandle {
    clear_last_error();

    let config = match cstr_to_string(config_json) {
        Some(json) => match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => EngineConfig::default(),
    };

    match StreakEngine::with_config(config) {
        Ok(engine) => Box::into_raw(Box::new(StreakEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `liftstreak_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_engine_free(engine: *mut StreakEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Compute a streak report with a configured engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `liftstreak_engine_new`.
/// - `log_json` and `today` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `liftstreak_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_engine_report(
    engine: *const StreakEngineHandle,
    log_json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let log_str = required_str!(log_json, "log JSON");
    let today_str = required_str!(today, "today");

    let result = (|| -> Result<String, ComputeError> {
        let today = parse_day(&today_str)?;
        let log = ActivityLogAdapter::parse_log(&log_str)?;
        let events = ActivityLogAdapter::to_events(&log)?;
        let report = handle.engine.report(&events, today);
        Ok(serde_json::to_string(&report)?)
    })();

    finish(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by any liftstreak function.
///
/// # Safety
/// - `ptr` must be a pointer returned by a liftstreak function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local string that is valid until the next
///   liftstreak call on the same thread.
/// - Returns NULL if no error has occurred.
/// - Do NOT free this pointer.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a static string. Do NOT free this pointer.
#[no_mangle]
pub unsafe extern "C" fn liftstreak_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
