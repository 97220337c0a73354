//! FFI bindings for Bloom Core
//!
//! This module provides C-compatible functions for driving a log store from a
//! host application. Records cross the boundary as JSON, dates as `YYYY-MM-DD`
//! strings. Returned strings are allocated here and must be freed by the caller
//! using `bloom_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::context::ChatContext;
use crate::cycle::phase_for;
use crate::store::LogStore;
use crate::types::{parse_date, NewDailyLog};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Read a required string argument, recording an error when it is missing
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {name} string pointer"));
    }
    value
}

/// Read a required date argument
unsafe fn required_date(ptr: *const c_char, name: &str) -> Option<NaiveDate> {
    let raw = required_arg(ptr, name)?;
    match parse_date(&raw) {
        Ok(date) => Some(date),
        Err(e) => {
            set_last_error(&e.to_string());
            None
        }
    }
}

fn json_to_cstr<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Store Lifecycle
// ============================================================================

/// Opaque handle to a LogStore
pub struct BloomStoreHandle {
    store: LogStore,
}

/// Create an empty store.
///
/// # Safety
/// - Returns a pointer to a newly allocated store.
/// - Must be freed with `bloom_store_free`.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_new() -> *mut BloomStoreHandle {
    clear_last_error();
    Box::into_raw(Box::new(BloomStoreHandle {
        store: LogStore::new(),
    }))
}

/// Create a store filled with sample data ending at `today`.
///
/// # Safety
/// - `today` must be a valid null-terminated C string (`YYYY-MM-DD`).
/// - Must be freed with `bloom_store_free`.
/// - Returns NULL on error; call `bloom_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_new_sample(today: *const c_char, seed: u64) -> *mut BloomStoreHandle {
    clear_last_error();

    let Some(today) = required_date(today, "today") else {
        return ptr::null_mut();
    };

    Box::into_raw(Box::new(BloomStoreHandle {
        store: LogStore::with_sample_data(today, seed),
    }))
}

/// Restore a store from snapshot JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Must be freed with `bloom_store_free`.
/// - Returns NULL on error; call `bloom_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_from_json(json: *const c_char) -> *mut BloomStoreHandle {
    clear_last_error();

    let Some(json) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    match LogStore::from_json(&json) {
        Ok(store) => Box::into_raw(Box::new(BloomStoreHandle { store })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a store.
///
/// # Safety
/// - `store` must be a valid pointer returned by a `bloom_store_*` constructor, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_free(store: *mut BloomStoreHandle) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Serialize the store to snapshot JSON.
///
/// # Safety
/// - `store` must be a valid store pointer.
/// - Returns a newly allocated string that must be freed with `bloom_free_string`.
/// - Returns NULL on error; call `bloom_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_snapshot(store: *const BloomStoreHandle) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    json_to_cstr(&(*store).store.snapshot())
}

// ============================================================================
// Writes
// ============================================================================

/// Write a daily log (JSON `NewDailyLog`) and return the stored log as JSON.
///
/// # Safety
/// - `store` must be a valid store pointer.
/// - `log_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `bloom_free_string`.
/// - Returns NULL on error (including validation failures); the store is unchanged.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_upsert(
    store: *mut BloomStoreHandle,
    log_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let handle = &mut *store;

    let Some(log_json) = required_arg(log_json, "log JSON") else {
        return ptr::null_mut();
    };

    let entry: NewDailyLog = match serde_json::from_str(&log_json) {
        Ok(entry) => entry,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match handle.store.upsert(entry, Utc::now()) {
        Ok(stored) => json_to_cstr(stored),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Record a period start date.
///
/// # Safety
/// - `store` must be a valid store pointer.
/// - `date` must be a valid null-terminated C string (`YYYY-MM-DD`).
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_log_period_start(
    store: *mut BloomStoreHandle,
    date: *const c_char,
) -> c_int {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return -1;
    }

    let Some(date) = required_date(date, "date") else {
        return -1;
    };

    (*store).store.log_period_start(date);
    0
}

// ============================================================================
// Derived Values
// ============================================================================

/// Compute the insights report for `today` as JSON.
///
/// # Safety
/// - `store` must be a valid store pointer.
/// - `today` must be a valid null-terminated C string (`YYYY-MM-DD`).
/// - Returns a newly allocated string that must be freed with `bloom_free_string`.
/// - Returns NULL on error; call `bloom_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_insights(
    store: *const BloomStoreHandle,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let Some(today) = required_date(today, "today") else {
        return ptr::null_mut();
    };

    json_to_cstr(&(*store).store.insights(today))
}

/// Build the chat context briefing for `today`.
///
/// # Safety
/// - `store` must be a valid store pointer.
/// - `today` must be a valid null-terminated C string (`YYYY-MM-DD`).
/// - Returns a newly allocated string that must be freed with `bloom_free_string`.
/// - Returns NULL on error; call `bloom_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bloom_store_context(
    store: *const BloomStoreHandle,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let Some(today) = required_date(today, "today") else {
        return ptr::null_mut();
    };

    let context = ChatContext::from_store(&(*store).store, today);
    string_to_cstr(&context.briefing_or_default())
}

/// Phase and cycle day of `target` for a cycle starting at `period_start`, as JSON.
///
/// # Safety
/// - `period_start` and `target` must be valid null-terminated C strings (`YYYY-MM-DD`).
/// - Returns a newly allocated string that must be freed with `bloom_free_string`.
/// - Returns NULL on error; call `bloom_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bloom_cycle_phase(
    period_start: *const c_char,
    target: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(period_start) = required_date(period_start, "period_start") else {
        return ptr::null_mut();
    };
    let Some(target) = required_date(target, "target") else {
        return ptr::null_mut();
    };

    json_to_cstr(&phase_for(period_start, target))
}

/// Free a string returned by Bloom functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Bloom function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn bloom_free_string(ptr: *mut c_char) {
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
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Bloom function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn bloom_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the Bloom library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn bloom_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
