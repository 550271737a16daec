//! Portal operations.
//!
//! Each function drives one user-visible action end to end: wallet/program
//! call, state update, re-render. Wired to the DOM in `events.rs`.

use wasm_bindgen::JsValue;
use web_sys::console;

use gp_api_types::ListState;

use crate::dom::{self, Elements};
use crate::program::{self, ProgramCallError};
use crate::provider::{self, ConnectOutcome};
use crate::render;
use crate::state;

/// Page-load sequence: restore a prior approval without prompting, then
/// load the account list. A missing provider is a normal, logged outcome.
pub async fn try_reconnect_silently() {
    if !provider::is_available() {
        console::log_1(&JsValue::from_str("Please connect a wallet"));
        return;
    }

    if let ConnectOutcome::Connected(address) = provider::connect(true).await {
        state::set_address(Some(address));
        refresh_list().await;
    }
}

pub async fn on_connect(els: &Elements) {
    state::set_notice(None);

    match provider::connect(false).await {
        ConnectOutcome::Connected(address) => {
            state::set_address(Some(address));
            refresh_list().await;
        }
        ConnectOutcome::Declined => {
            state::set_notice(Some("Connection cancelled.".to_string()));
        }
        ConnectOutcome::Unavailable => {
            state::set_notice(Some("No wallet provider found. Install one and retry.".to_string()));
        }
        ConnectOutcome::NotTrusted => {}
    }

    render::render(els);
}

pub async fn on_initialize(els: &Elements) {
    let Some(owner) = state::address() else {
        return;
    };

    state::set_notice(None);
    match program::initialize(&owner).await {
        // A repeat initialize is a refresh, not a second allocation.
        Ok(()) | Err(ProgramCallError::AlreadyInitialized) => refresh_list().await,
        Err(err) => {
            state::set_notice(Some(format!(
                "Gif list unavailable: {}. Retry initialization.",
                describe(err)
            )));
        }
    }

    render::render(els);
}

/// Submits the draft in the input element. The input is cleared only after
/// a successful append; every failure path leaves it untouched.
pub async fn on_submit(els: &Elements) {
    let raw = dom::get_input_value(&els.gif_input);
    let link = raw.trim().to_string();
    if link.is_empty() {
        console::log_1(&JsValue::from_str("Empty gif link given, try again."));
        state::set_notice(Some("Empty gif link given, try again.".to_string()));
        render::render(els);
        return;
    }

    let Some(owner) = state::address() else {
        return;
    };

    state::set_notice(None);
    state::set_submitting(true);
    render::render(els);

    let signature = match provider::sign_message(&link).await {
        Ok(signature) => signature,
        Err(()) => {
            state::set_notice(Some("Submission not approved; your draft was kept.".to_string()));
            state::set_submitting(false);
            render::render(els);
            return;
        }
    };

    match program::append_gif(&owner, &link, &signature).await {
        Ok(entries) => {
            state::set_list(ListState::from_entries(entries));
            dom::set_input_value(&els.gif_input, "");
        }
        Err(err) => {
            state::set_notice(Some(format!(
                "Submission failed, your draft was kept: {}",
                describe(err)
            )));
        }
    }

    state::set_submitting(false);
    render::render(els);
}

async fn refresh_list() {
    let Some(owner) = state::address() else {
        return;
    };

    match program::fetch_account(&owner).await {
        Ok(Some(entries)) => state::set_list(ListState::from_entries(entries)),
        Ok(None) => state::set_list(ListState::Uninitialized),
        Err(err) => {
            state::set_notice(Some(format!(
                "Gif list unavailable: {}. Retry initialization.",
                describe(err)
            )));
        }
    }
}

fn describe(err: ProgramCallError) -> String {
    match err {
        ProgramCallError::AccountNotFound => "gif account does not exist".to_string(),
        ProgramCallError::AlreadyInitialized => "gif account already initialized".to_string(),
        ProgramCallError::Failed(message) => message,
    }
}
