//! Global application state.
//!
//! Uses a `RefCell`-wrapped `thread_local!` singleton (WASM is
//! single-threaded). The input draft itself lives in the DOM input element;
//! everything else the view depends on is here.

use gp_api_types::ListState;
use std::cell::RefCell;

/// Central application state.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub address: Option<String>,
    pub list: ListState,
    pub submitting: bool,
    pub notice: Option<String>,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

// ── Convenience accessors ──

pub fn address() -> Option<String> {
    with(|s| s.address.clone())
}

pub fn set_address(address: Option<String>) {
    with_mut(|s| s.address = address);
}

pub fn list() -> ListState {
    with(|s| s.list.clone())
}

pub fn set_list(list: ListState) {
    with_mut(|s| s.list = list);
}

pub fn submitting() -> bool {
    with(|s| s.submitting)
}

pub fn set_submitting(submitting: bool) {
    with_mut(|s| s.submitting = submitting);
}

pub fn notice() -> Option<String> {
    with(|s| s.notice.clone())
}

pub fn set_notice(notice: Option<String>) {
    with_mut(|s| s.notice = notice);
}
