//! Light-DOM marquees
//!
//! Pages that don't use the custom element mark up
//! `<div class="marquee-container"><div id="marquee-content">..</div></div>`.
//! Every such container gets a `NewMarquee` that lives as long as the page.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, HtmlElement};

use super::element::NewMarquee;

pub const CONTAINER_SELECTOR: &str = ".marquee-container";

thread_local! {
    static MOUNTED: RefCell<Vec<(HtmlElement, NewMarquee)>> = const { RefCell::new(Vec::new()) };
}

/// Wrap and start every `.marquee-container` not wrapped yet
///
/// Returns the number of containers added by this call.
#[wasm_bindgen(js_name = initializeMarquees)]
pub fn initialize_marquees() -> usize {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return 0;
    };
    let containers = match document.query_selector_all(CONTAINER_SELECTOR) {
        Ok(containers) => containers,
        Err(err) => {
            log::warn!("failed to look up marquee containers: {:?}", err);
            return 0;
        }
    };

    MOUNTED.with(|mounted| {
        let mut mounted = mounted.borrow_mut();
        let mut added = 0;
        for index in 0..containers.length() {
            let Some(container) = containers
                .get(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            if mounted.iter().any(|(known, _)| *known == container) {
                continue;
            }

            let marquee = NewMarquee::from_container(container.clone());
            marquee.connected();
            mounted.push((container, marquee));
            added += 1;
        }
        if added > 0 {
            log::info!("initialized {} marquee container(s)", added);
        }
        added
    })
}

/// Run [`initialize_marquees`] once the document has been parsed
pub fn initialize_when_loaded() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if document.ready_state() != "loading" {
        initialize_marquees();
        return;
    }

    let on_loaded = Closure::once(move |_: Event| {
        initialize_marquees();
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    if let Err(err) = document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        on_loaded.as_ref().unchecked_ref(),
        &options,
    ) {
        log::warn!("failed to wait for DOMContentLoaded: {:?}", err);
    }
    // Fires at most once per page
    on_loaded.forget();
}
