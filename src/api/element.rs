//! `NewMarquee` element binding
//!
//! The custom element itself is declared in JavaScript (a class extending
//! `HTMLElement` cannot be defined from Rust) and forwards its lifecycle
//! callbacks here:
//!
//! ```js
//! import init, { NewMarquee } from './new_marquee.js';
//! await init();
//! customElements.define('new-marquee', class extends HTMLElement {
//!     constructor() { super(); this.marquee = new NewMarquee(this); }
//!     connectedCallback() { this.marquee.connected(); }
//!     disconnectedCallback() { this.marquee.disconnected(); }
//! });
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::marquee::MarqueeController;
use crate::platform::web::{build_shadow_structure, find_light_content, Dispatch, HostMarkup, WebPlatform};
use crate::platform::CallbackId;

use super::helpers::to_js_error;

type SharedController = Rc<RefCell<MarqueeController<WebPlatform>>>;

/// Browser-side marquee instance
#[wasm_bindgen]
pub struct NewMarquee {
    controller: SharedController,
}

#[wasm_bindgen]
impl NewMarquee {
    /// Wrap a custom element host, rendering the marquee into its shadow root
    #[wasm_bindgen(constructor)]
    pub fn new(host: HtmlElement) -> Result<NewMarquee, JsValue> {
        let (container, content) = build_shadow_structure(&host).map_err(to_js_error)?;
        Ok(Self::build(host, HostMarkup::CustomElement, Some(container), Some(content)))
    }

    /// Wrap a plain container holding a `#marquee-content` child (no shadow DOM)
    ///
    /// Configuration is read from the container's `data-direction`,
    /// `data-speed`, `data-pauseonhover` and `data-persistent` attributes. A
    /// missing content child makes the marquee a silent no-op.
    #[wasm_bindgen(js_name = fromContainer)]
    pub fn from_container(container: HtmlElement) -> NewMarquee {
        let content = find_light_content(&container);
        if content.is_none() {
            log::warn!("marquee container has no #marquee-content child");
        }
        Self::build(container.clone(), HostMarkup::Container, Some(container), content)
    }

    /// Forward of `connectedCallback`
    pub fn connected(&self) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.attach(),
            Err(_) => log::warn!("marquee busy, connect ignored"),
        }
    }

    /// Forward of `disconnectedCallback`
    pub fn disconnected(&self) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.detach(),
            Err(_) => log::warn!("marquee busy, disconnect ignored"),
        }
    }

    /// Cancel and re-measure, e.g. after the host changed the content
    pub fn restart(&self) {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.restart();
        }
    }

    #[wasm_bindgen(js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.controller.borrow().is_attached()
    }

    /// Effective direction (`left`, `right`, `up` or `down`)
    pub fn direction(&self) -> String {
        self.controller.borrow().direction().as_str().to_string()
    }
}

impl NewMarquee {
    fn build(
        host: HtmlElement,
        markup: HostMarkup,
        container: Option<HtmlElement>,
        content: Option<HtmlElement>,
    ) -> Self {
        let controller = Rc::new_cyclic(|weak: &Weak<RefCell<MarqueeController<WebPlatform>>>| {
            let dispatch = dispatcher(weak.clone());
            let platform = WebPlatform::new(host, markup, container, content, dispatch);
            RefCell::new(MarqueeController::new(platform))
        });
        Self { controller }
    }
}

/// Route browser callbacks into the controller without keeping it alive
fn dispatcher(controller: Weak<RefCell<MarqueeController<WebPlatform>>>) -> Dispatch {
    Rc::new(move |id: CallbackId| {
        let Some(controller) = controller.upgrade() else {
            return;
        };
        match controller.try_borrow_mut() {
            Ok(mut controller) => controller.dispatch(id),
            Err(_) => log::warn!("re-entrant marquee callback {:?} dropped", id),
        };
    })
}
