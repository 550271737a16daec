//! Injected wallet provider boundary.
//!
//! Reaches the `window.solana`-style provider through `js_sys::Reflect` so
//! the crate needs no bindings beyond what the provider actually exposes.
//! Every terminal state of a connect request is an explicit variant.

use js_sys::{Function, Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::console;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(String),
    /// The user dismissed the approval prompt.
    Declined,
    /// Silent mode on an origin the provider does not yet trust.
    NotTrusted,
    /// No provider injected into the page.
    Unavailable,
}

/// The injected provider object, if any.
pub fn provider() -> Option<JsValue> {
    let window = web_sys::window()?;
    let solana = Reflect::get(&window, &JsValue::from_str("solana")).ok()?;
    if solana.is_undefined() || solana.is_null() {
        return None;
    }

    let is_phantom = Reflect::get(&solana, &JsValue::from_str("isPhantom"))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if is_phantom {
        console::log_1(&JsValue::from_str("Phantom wallet available"));
    }

    Some(solana)
}

pub fn is_available() -> bool {
    provider().is_some()
}

/// Requests a connection. `only_if_trusted` never raises a prompt.
pub async fn connect(only_if_trusted: bool) -> ConnectOutcome {
    let Some(provider) = provider() else {
        return ConnectOutcome::Unavailable;
    };

    let Some(connect_fn) = method(&provider, "connect") else {
        return ConnectOutcome::Unavailable;
    };

    let args = Object::new();
    if only_if_trusted {
        let _ = Reflect::set(&args, &JsValue::from_str("onlyIfTrusted"), &JsValue::TRUE);
    }

    let response = match call_async(&connect_fn, &provider, &args).await {
        Ok(response) => response,
        // The provider rejects both a dismissed prompt and an untrusted
        // silent attempt; the mode tells the two apart.
        Err(_) => {
            return if only_if_trusted {
                ConnectOutcome::NotTrusted
            } else {
                ConnectOutcome::Declined
            };
        }
    };

    match public_key_string(&response) {
        Some(address) if !address.is_empty() => {
            console::log_1(&JsValue::from_str(&format!(
                "Connected with Public Key: {address}"
            )));
            ConnectOutcome::Connected(address)
        }
        _ => ConnectOutcome::Declined,
    }
}

/// Asks the provider to approve the submission payload.
///
/// `Ok(signature_hex)` on approval — empty when the provider exposes no
/// `signMessage` capability. `Err(())` means the user rejected the request.
pub async fn sign_message(payload: &str) -> Result<String, ()> {
    let Some(provider) = provider() else {
        return Err(());
    };

    let Some(sign_fn) = method(&provider, "signMessage") else {
        return Ok(String::new());
    };

    let bytes = Uint8Array::from(payload.as_bytes());
    let response = call_async(&sign_fn, &provider, &bytes).await.map_err(|_| ())?;

    let signature = Reflect::get(&response, &JsValue::from_str("signature"))
        .ok()
        .and_then(|v| v.dyn_into::<Uint8Array>().ok())
        .map(|arr| to_hex(&arr.to_vec()))
        .unwrap_or_default();

    Ok(signature)
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

async fn call_async(func: &Function, this: &JsValue, arg: &JsValue) -> Result<JsValue, JsValue> {
    let promise: Promise = func.call1(this, arg)?.dyn_into()?;
    JsFuture::from(promise).await
}

/// `response.publicKey.toString()`
fn public_key_string(response: &JsValue) -> Option<String> {
    let public_key = Reflect::get(response, &JsValue::from_str("publicKey")).ok()?;
    let to_string = method(&public_key, "toString")?;
    to_string.call0(&public_key).ok()?.as_string()
}

fn to_hex(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
