//! View projection.
//!
//! Pure function of the application state onto the page: exactly one of the
//! connect prompt, the initialize prompt, or the gallery with the
//! submission form is visible at a time.

use gp_api_types::ListState;

use crate::dom::{self, Elements};
use crate::state;

pub fn render(els: &Elements) {
    let app = state::with(|s| s.clone());

    let connected = app.address.is_some();
    let uninitialized = app.list.is_uninitialized();

    dom::set_visible(&els.connect_container, !connected);
    dom::set_visible(&els.init_container, connected && uninitialized);
    dom::set_visible(&els.gallery_container, connected && !uninitialized);

    match &app.address {
        Some(address) => dom::set_text(&els.wallet_badge, &short_address(address)),
        None => dom::set_text(&els.wallet_badge, ""),
    }

    dom::set_text(&els.notice, app.notice.as_deref().unwrap_or(""));

    if connected && !uninitialized {
        render_grid(els, &app.list);
        render_submit_button(els, app.submitting);
    }
}

fn render_grid(els: &Elements, list: &ListState) {
    els.gif_grid.set_inner_html("");

    if list.is_empty() {
        let empty = dom::create_element("p");
        empty.set_class_name("empty-hint");
        empty.set_text_content(Some("No gifs yet — submit the first one!"));
        let _ = els.gif_grid.append_child(&empty);
        return;
    }

    for entry in list.entries() {
        let item = dom::create_element("div");
        item.set_class_name("gif-item");

        let img = dom::create_element("img");
        let _ = img.set_attribute("src", &entry.link);
        let _ = img.set_attribute("alt", "gif");
        let _ = item.append_child(&img);

        if let Some(submitter) = &entry.submitter {
            let byline = dom::create_element("span");
            byline.set_class_name("byline");
            byline.set_text_content(Some(&format!("by {}", short_address(&submitter.0))));
            let _ = item.append_child(&byline);
        }

        let _ = els.gif_grid.append_child(&item);
    }
}

fn render_submit_button(els: &Elements, submitting: bool) {
    if submitting {
        let _ = els.submit_btn.set_attribute("disabled", "disabled");
        els.submit_btn.set_text_content(Some("Submitting…"));
    } else {
        let _ = els.submit_btn.remove_attribute("disabled");
        els.submit_btn.set_text_content(Some("Submit"));
    }
}

fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }

    format!("{}…{}", &address[..6], &address[address.len() - 6..])
}
