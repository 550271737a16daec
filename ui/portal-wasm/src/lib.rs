//! GifPortal WASM Frontend
//!
//! Pure Rust + WASM single-page app. The wallet provider is whatever the
//! browser injects at `window.solana`; the gif program is reached over
//! `fetch`. Each concern lives in its own module.

pub mod dom;
pub mod events;
pub mod portal_ops;
pub mod program;
pub mod provider;
pub mod render;
pub mod state;

use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    let els = dom::Elements::bind()?;

    portal_ops::try_reconnect_silently().await;
    render::render(&els);

    events::bind_events(&els);

    Ok(())
}
