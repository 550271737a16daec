//! Gif program HTTP client.
//!
//! Wraps `fetch` for JSON requests to the gif program endpoint. `base_url()`
//! prefers the optional `#programUrl` input, falling back to same-origin
//! `:8899`.

use gp_api_types::GifEntry;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::dom;

#[derive(Debug)]
pub enum ProgramCallError {
    AccountNotFound,
    AlreadyInitialized,
    Failed(String),
}

/// Determine the gif program base URL.
pub fn base_url() -> String {
    if let Some(input) = dom::by_id_typed::<web_sys::HtmlInputElement>("programUrl") {
        let v = input.value().trim().to_string();
        if !v.is_empty() {
            return v.trim_end_matches('/').to_string();
        }
    }

    let loc = dom::window().location();
    let host = loc.hostname().unwrap_or_default();
    let protocol = loc.protocol().unwrap_or_else(|_| "http:".into());

    format!("{}//{}:8899", protocol, host)
}

pub async fn fetch_account(owner: &str) -> Result<Option<Vec<GifEntry>>, ProgramCallError> {
    let path = format!("/account/{owner}");
    match request(&path, "GET", None).await {
        Ok(body) => Ok(Some(entries_from(&body)?)),
        Err(RequestError::Status(404, _)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub async fn initialize(owner: &str) -> Result<(), ProgramCallError> {
    let body = serde_json::json!({ "owner": owner });
    match request("/account", "POST", Some(body.to_string())).await {
        Ok(_) => Ok(()),
        Err(RequestError::Status(409, _)) => Err(ProgramCallError::AlreadyInitialized),
        Err(err) => Err(err.into()),
    }
}

pub async fn append_gif(
    owner: &str,
    link: &str,
    signature: &str,
) -> Result<Vec<GifEntry>, ProgramCallError> {
    let path = format!("/account/{owner}/gifs");
    let body = serde_json::json!({
        "owner": owner,
        "link": link,
        "signature": signature,
    });

    match request(&path, "POST", Some(body.to_string())).await {
        Ok(response) => entries_from(&response),
        Err(RequestError::Status(404, _)) => Err(ProgramCallError::AccountNotFound),
        Err(err) => Err(err.into()),
    }
}

fn entries_from(body: &serde_json::Value) -> Result<Vec<GifEntry>, ProgramCallError> {
    let list = body.get("gifList").cloned().unwrap_or_default();
    serde_json::from_value(list)
        .map_err(|err| ProgramCallError::Failed(format!("unexpected account shape: {err}")))
}

enum RequestError {
    Status(u16, String),
    Transport(String),
}

impl From<RequestError> for ProgramCallError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Status(status, text) => {
                // Structured error bodies carry the program's own message.
                let message = serde_json::from_str::<serde_json::Value>(&text)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                    .unwrap_or_else(|| format!("HTTP {status}: {text}"));
                ProgramCallError::Failed(message)
            }
            RequestError::Transport(message) => ProgramCallError::Failed(message),
        }
    }
}

/// Perform a fetch request, returning the parsed JSON body.
async fn request(
    path: &str,
    method: &str,
    body: Option<String>,
) -> Result<serde_json::Value, RequestError> {
    let url = format!("{}{}", base_url(), path);

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);

    let headers = Headers::new().map_err(|e| RequestError::Transport(format!("{e:?}")))?;

    if let Some(ref b) = body {
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| RequestError::Transport(format!("{e:?}")))?;
        let js_body = JsValue::from_str(b);
        opts.set_body(&js_body);
    }

    opts.set_headers(&headers);

    let request = Request::new_with_str_and_init(&url, &opts)
        .map_err(|e| RequestError::Transport(format!("{e:?}")))?;

    let window = dom::window();
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| RequestError::Transport(format!("fetch error: {e:?}")))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| RequestError::Transport("response is not a Response".to_string()))?;

    let text = JsFuture::from(
        resp.text()
            .map_err(|e| RequestError::Transport(format!("{e:?}")))?,
    )
    .await
    .map_err(|e| RequestError::Transport(format!("text error: {e:?}")))?;

    let text_str = text.as_string().unwrap_or_default();

    if !resp.ok() {
        return Err(RequestError::Status(resp.status(), text_str));
    }

    if text_str.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }

    serde_json::from_str(&text_str)
        .map_err(|e| RequestError::Transport(format!("JSON parse error: {e} — raw: {text_str}")))
}
