//! # EHS Report Core
//!
//! Local-first core behind a workplace safety (EHS) reporting app: users submit
//! incident reports and inspection checklists, then browse their own history.
//!
//! ## Features
//!
//! - **Schema-driven validation**: per-field rules, "touched" tracking and a
//!   full-form submit gate ([`validation`])
//! - **Fail-soft persistence**: JSON collections in LMDB slots; corrupt storage
//!   reads as empty, failed writes are logged and dropped ([`slot_store`])
//! - **History queries**: merge with sample records, newest first, free-text
//!   search and status filter ([`query`])
//! - **C ABI** for the UI shell, answering with JSON envelopes
//!
//! ## Quick Start
//!
//! ```no_run
//! use ehs_report_core::{create_store, submit_report, list_reports, free_response};
//! use std::ffi::CString;
//!
//! let config = CString::new(r#"{"dbName":"ehs_reports"}"#).unwrap();
//! let state = create_store(config.as_ptr());
//!
//! let draft = CString::new(
//!     r#"{"type":"incident","description":"Vazamento de óleo na doca 2","date":"2024-08-25T14:30"}"#,
//! ).unwrap();
//! free_response(submit_report(state, draft.as_ptr()));
//!
//! let search = CString::new("doca").unwrap();
//! let status = CString::new("all").unwrap();
//! free_response(list_reports(state, search.as_ptr(), status.as_ptr()));
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] - Open the store described by a JSON config
//! - [`submit_report`] / [`submit_inspection`] - Validate and persist a draft
//! - [`list_reports`] / [`list_inspections`] - History, searched and filtered
//! - [`clear_submissions`] - Drop one persisted collection
//! - [`set_online`] - Report connectivity changes
//! - [`close_store`] - Flush and release the store
//! - [`free_response`] - Release a string returned by any of the above

pub mod app_response;
pub mod app_state;
pub mod baseline;
pub mod config;
pub mod connectivity;
pub mod forms;
pub mod query;
pub mod record_model;
pub mod slot_store;
pub mod submission;
pub mod validation;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::app_state::AppState;
use crate::config::CoreConfig;
use crate::forms::{InspectionDraft, ReportDraft};
use crate::record_model::{RecordKind, StatusFilter};

/// Opens the store described by `config_json`.
///
/// A null pointer uses [`CoreConfig::default`]. The LMDB environment lives in
/// `<dbName>.lmdb` relative to the working directory.
///
/// # Returns
///
/// A pointer to the [`AppState`], or null when the config is invalid or the
/// environment cannot be opened. Release it with [`close_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(config_json: *const c_char) -> *mut AppState {
    let config = if config_json.is_null() {
        CoreConfig::default()
    } else {
        let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid UTF-8 in config: {e}");
                return std::ptr::null_mut();
            }
        };
        match CoreConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected store config: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    info!("Opening store '{}'", config.db_name);
    match AppState::init(config) {
        Ok(state) => Box::into_raw(Box::new(state)),
        Err(e) => {
            warn!("❌ Failed to open store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Validates a report draft and, when valid, persists it as a new report.
///
/// # Returns
///
/// - `Ok` with the stored report as JSON, protocol id included
/// - `FieldErrors` with one message per invalid field
/// - `SubmissionFailed` when offline; nothing was stored
///
/// # JSON Format
///
/// ```json
/// {
///   "type": "incident | near-miss | unsafe-condition | behavioral",
///   "description": "at least 10 characters",
///   "location": "optional",
///   "riskLevel": "low | medium | high | empty",
///   "date": "2024-08-25T14:30"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn submit_report(state: *mut AppState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to submit_report"),
    };

    let draft: ReportDraft = match parse_json_arg(json_ptr, "report draft") {
        Ok(draft) => draft,
        Err(err) => return err,
    };

    match state.submit_report(draft) {
        Ok(report) => json_response(&report),
        Err(e) => response_to_c_string(&e),
    }
}

/// Validates an inspection draft and persists the finished checklist.
///
/// Every item of the chosen checklist must be answered, otherwise a
/// `ValidationError` is returned.
///
/// # JSON Format
///
/// ```json
/// {
///   "type": "extinguisher | ergonomics | 5s | emergency",
///   "location": "optional",
///   "responses": { "0": { "status": "conforme" }, "1": { "status": "nao-conforme", "comment": "..." } }
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn submit_inspection(state: *mut AppState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to submit_inspection"),
    };

    let draft: InspectionDraft = match parse_json_arg(json_ptr, "inspection draft") {
        Ok(draft) => draft,
        Err(err) => return err,
    };

    match state.submit_inspection(draft) {
        Ok(inspection) => json_response(&inspection),
        Err(e) => response_to_c_string(&e),
    }
}

/// Report history, newest first.
///
/// `search` may be null (no search); `status` may be null or `"all"`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_reports(
    state: *mut AppState,
    search: *const c_char,
    status: *const c_char,
) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to list_reports"),
    };

    let (search, status) = match listing_args(search, status) {
        Ok(args) => args,
        Err(err) => return err,
    };
    json_response(&state.reports(&search, status))
}

/// Inspection history, newest first. Same arguments as [`list_reports`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_inspections(
    state: *mut AppState,
    search: *const c_char,
    status: *const c_char,
) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to list_inspections"),
    };

    let (search, status) = match listing_args(search, status) {
        Ok(args) => args,
        Err(err) => return err,
    };
    json_response(&state.inspections(&search, status))
}

/// Drops the persisted collection for `kind` (`"report"` or `"inspection"`).
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_submissions(state: *mut AppState, kind: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to clear_submissions"),
    };

    let kind = match c_ptr_to_string(kind, "kind") {
        Ok(kind) => kind,
        Err(err) => return err,
    };
    let kind: RecordKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return bad_request(&e),
    };

    if state.clear(kind) {
        response_to_c_string(&AppResponse::success("Submissions cleared successfully"))
    } else {
        response_to_c_string(&AppResponse::NotFound("No stored submissions".to_string()))
    }
}

/// Reports a connectivity change from the shell.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_online(state: *mut AppState, online: bool) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to set_online"),
    };

    state.set_online(online);
    response_to_c_string(&AppResponse::success(if online { "online" } else { "offline" }))
}

/// Flushes and releases a store created by [`create_store`].
///
/// The pointer must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut AppState) -> *const c_char {
    if state.is_null() {
        return bad_request("Null state pointer passed to close_store");
    }

    let state = unsafe { Box::from_raw(state) };
    let response = match state.close_database() {
        Ok(()) => AppResponse::success("Store closed successfully"),
        Err(e) => e,
    };
    drop(state);
    response_to_c_string(&response)
}

/// Releases a string returned by this library. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn listing_args(
    search: *const c_char,
    status: *const c_char,
) -> Result<(String, StatusFilter), *const c_char> {
    let search = if search.is_null() {
        String::new()
    } else {
        c_ptr_to_string(search, "search")?
    };

    let status = if status.is_null() {
        StatusFilter::All
    } else {
        let status = c_ptr_to_string(status, "status")?;
        status
            .parse::<StatusFilter>()
            .map_err(|e| bad_request(&e))?
    };

    Ok((search, status))
}

fn parse_json_arg<T: serde::de::DeserializeOwned>(
    ptr: *const c_char,
    field_name: &str,
) -> Result<T, *const c_char> {
    let json = c_ptr_to_string(ptr, field_name)?;
    serde_json::from_str(&json).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid {field_name} JSON: {e}"));
        response_to_c_string(&error)
    })
}

fn json_response<T: Serialize>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

fn bad_request(msg: &str) -> *const c_char {
    response_to_c_string(&AppResponse::BadRequest(msg.to_string()))
}

fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
