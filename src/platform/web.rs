//! Browser platform
//!
//! Implements [`Platform`] on top of `web-sys`: the Web Animations API for
//! the loop, `requestAnimationFrame` for layout sampling, `gloo-timers` for
//! timeouts and intervals, `MutationObserver` for document `lang`/`dir`
//! changes and `localStorage` for persistence.
//!
//! Every closure handed to the browser is kept in an [`Entry`] keyed by its
//! callback id. Dropping the entry detaches exactly that closure, so
//! `cancel` is just a map removal.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    AddEventListenerOptions, Animation, Document, Event, EventTarget, HtmlElement,
    HtmlImageElement, MutationObserver, MutationObserverInit, ShadowRootInit, ShadowRootMode,
    Window,
};

use crate::error::{MarqueeError, Result};
use crate::marquee::direction::DocumentDirection;
use crate::marquee::driver::AnimationPlan;
use crate::models::MeasuredGeometry;

use super::{AnimationId, CallbackId, EventSource, Platform};

#[wasm_bindgen]
extern "C" {
    /// Any element, seen through `Element.animate(keyframes, options)`;
    /// web-sys only exposes that call behind `web_sys_unstable_apis`
    type Animatable;

    #[wasm_bindgen(method, catch)]
    fn animate(
        this: &Animatable,
        keyframes: &js_sys::Array,
        options: &js_sys::Object,
    ) -> std::result::Result<Animation, JsValue>;
}

/// Callback into the controller that owns this platform
pub type Dispatch = Rc<dyn Fn(CallbackId)>;

/// Content element id inside the component's shadow root
pub const CONTENT_ID: &str = "new-marquee-content";

/// Content element id used when the marquee lives in the light DOM
pub const LIGHT_CONTENT_ID: &str = "marquee-content";

/// Storage key base for light-DOM containers without an `id`
pub const LIGHT_KEY_BASE: &str = "marquee";

/// Markup the marquee was built from; decides where settings are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMarkup {
    /// `<new-marquee speed="80">`: plain attributes, shadow root content
    CustomElement,
    /// `<div class="marquee-container" data-speed="80">`: `data-*` attributes
    Container,
}

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

const SHADOW_TEMPLATE: &str = r#"
<style>
    .new-marquee-container {
        display: block;
        max-width: 100%;
        margin: 0 auto;
        overflow: hidden;
        width: 100%;
        height: 100%;
    }
    #new-marquee-content {
        white-space: nowrap;
        will-change: transform;
        display: inline-block;
        visibility: hidden;
    }
</style>
<section class="new-marquee-container">
    <div id="new-marquee-content"><slot></slot></div>
</section>
"#;

/// Attach (or reuse) the shadow root and return `(container, content)`
pub fn build_shadow_structure(host: &HtmlElement) -> Result<(HtmlElement, HtmlElement)> {
    let root = match host.shadow_root() {
        Some(root) => root,
        None => {
            let root = host.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))?;
            root.set_inner_html(SHADOW_TEMPLATE);
            root
        }
    };

    let container = root
        .query_selector(".new-marquee-container")?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(MarqueeError::MissingStructure("marquee container"))?;
    let content = root
        .query_selector(&format!("#{}", CONTENT_ID))?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(MarqueeError::MissingStructure("marquee content"))?;
    Ok((container, content))
}

/// Find the content element of a light-DOM marquee container
pub fn find_light_content(container: &HtmlElement) -> Option<HtmlElement> {
    container
        .query_selector(&format!("#{}", LIGHT_CONTENT_ID))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

struct FrameRequest {
    handle: i32,
    _closure: Closure<dyn FnMut(f64)>,
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(self.handle);
        }
    }
}

struct Observer {
    observer: MutationObserver,
    _closure: Closure<dyn FnMut()>,
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Liveness flag for a promise-backed signal; cleared on cancel
struct Signal(Rc<Cell<bool>>);

impl Drop for Signal {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Browser-side resources behind one callback id
enum Entry {
    Timeout(Timeout),
    Interval(Interval),
    Frame(FrameRequest),
    Listeners(Vec<Listener>),
    Observer(Observer),
    Signal(Signal),
}

pub struct WebPlatform {
    host: HtmlElement,
    markup: HostMarkup,
    container: Option<HtmlElement>,
    content: Option<HtmlElement>,
    dispatch: Dispatch,
    next_id: u64,
    entries: HashMap<CallbackId, Entry>,
    /// One-shot ids whose callbacks have finished running
    fired: Rc<RefCell<Vec<CallbackId>>>,
    animations: HashMap<AnimationId, Animation>,
}

impl WebPlatform {
    /// `host` supplies attributes and media; `container`/`content` are the
    /// viewport and the moving element. Missing elements are tolerated and
    /// make the marquee a no-op.
    pub fn new(
        host: HtmlElement,
        markup: HostMarkup,
        container: Option<HtmlElement>,
        content: Option<HtmlElement>,
        dispatch: Dispatch,
    ) -> Self {
        Self {
            host,
            markup,
            container,
            content,
            dispatch,
            next_id: 1,
            entries: HashMap::new(),
            fired: Rc::new(RefCell::new(Vec::new())),
            animations: HashMap::new(),
        }
    }

    fn window() -> Option<Window> {
        web_sys::window()
    }

    fn document() -> Option<Document> {
        Self::window().and_then(|w| w.document())
    }

    /// Drop entries of one-shot callbacks that already ran
    fn sweep(&mut self) {
        let fired: Vec<CallbackId> = self.fired.borrow_mut().drain(..).collect();
        for id in fired {
            self.entries.remove(&id);
        }
    }

    fn next_callback(&mut self) -> CallbackId {
        self.sweep();
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Dispatch for a one-shot callback: run it, then mark the entry for sweeping
    fn one_shot(&self, id: CallbackId) -> impl FnOnce() + 'static {
        let dispatch = self.dispatch.clone();
        let fired = self.fired.clone();
        move || {
            dispatch(id);
            fired.borrow_mut().push(id);
        }
    }

    fn listener(
        &self,
        target: EventTarget,
        event: &'static str,
        once: bool,
        callback: Rc<dyn Fn()>,
    ) -> Option<Listener> {
        let closure = Closure::wrap(Box::new(move |_: Event| callback()) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_once(once);
        match target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            Ok(()) => Some(Listener {
                target,
                event,
                closure,
            }),
            Err(err) => {
                log::warn!("failed to add {} listener: {:?}", event, err);
                None
            }
        }
    }

    fn observe_document_direction(&self, id: CallbackId) -> Option<Observer> {
        let root = Self::document()?.document_element()?;
        let dispatch = self.dispatch.clone();
        let closure = Closure::wrap(Box::new(move || dispatch(id)) as Box<dyn FnMut()>);
        let observer = MutationObserver::new(closure.as_ref().unchecked_ref()).ok()?;

        let filter = js_sys::Array::of2(&JsValue::from_str("lang"), &JsValue::from_str("dir"));
        let init = MutationObserverInit::new();
        init.set_attributes(true);
        init.set_attribute_filter(&filter);
        if let Err(err) = observer.observe_with_options(&root, &init) {
            log::warn!("failed to observe document direction: {:?}", err);
            return None;
        }
        Some(Observer {
            observer,
            _closure: closure,
        })
    }
}

impl Platform for WebPlatform {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match self.markup {
            HostMarkup::Container if name != "id" => self.host.get_attribute(&format!("data-{}", name)),
            _ => self.host.get_attribute(name),
        }
    }

    fn key_base(&self) -> Option<String> {
        match self.markup {
            HostMarkup::CustomElement => Some(self.host.tag_name().to_ascii_lowercase()),
            HostMarkup::Container => Some(LIGHT_KEY_BASE.to_string()),
        }
    }

    fn measure(&self) -> Option<MeasuredGeometry> {
        let container = self.container.as_ref()?;
        let content = self.content.as_ref()?;
        Some(MeasuredGeometry::new(
            f64::from(content.scroll_width()),
            f64::from(content.scroll_height()),
            f64::from(container.offset_width()),
            f64::from(container.offset_height()),
        ))
    }

    fn document_direction(&self) -> DocumentDirection {
        let root = Self::document().and_then(|d| d.document_element());
        match root {
            Some(root) => DocumentDirection::new(root.get_attribute("lang"), root.get_attribute("dir")),
            None => DocumentDirection::default(),
        }
    }

    fn prefers_reduced_motion(&self) -> bool {
        Self::window()
            .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
            .map(|query| query.matches())
            .unwrap_or(false)
    }

    fn is_document_hidden(&self) -> bool {
        Self::document().map(|d| d.hidden()).unwrap_or(false)
    }

    fn reveal_content(&mut self) {
        if let Some(content) = &self.content {
            if let Err(err) = content.style().set_property("visibility", "visible") {
                log::warn!("failed to reveal marquee content: {:?}", err);
            }
        }
    }

    fn set_timeout(&mut self, delay_ms: u32) -> CallbackId {
        let id = self.next_callback();
        let timeout = Timeout::new(delay_ms, self.one_shot(id));
        self.entries.insert(id, Entry::Timeout(timeout));
        id
    }

    fn set_interval(&mut self, period_ms: u32) -> CallbackId {
        let id = self.next_callback();
        let dispatch = self.dispatch.clone();
        let interval = Interval::new(period_ms, move || dispatch(id));
        self.entries.insert(id, Entry::Interval(interval));
        id
    }

    fn request_frame(&mut self) -> CallbackId {
        let id = self.next_callback();
        let Some(window) = Self::window() else {
            return id;
        };

        let run = self.one_shot(id);
        let closure: Closure<dyn FnMut(f64)> = Closure::once(move |_timestamp: f64| run());
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.entries.insert(
                    id,
                    Entry::Frame(FrameRequest {
                        handle,
                        _closure: closure,
                    }),
                );
            }
            Err(err) => log::warn!("requestAnimationFrame failed: {:?}", err),
        }
        id
    }

    fn listen(&mut self, source: EventSource) -> Option<CallbackId> {
        let id = self.next_callback();
        let dispatch = self.dispatch.clone();
        let callback: Rc<dyn Fn()> = Rc::new(move || dispatch(id));

        let entry = match source {
            EventSource::WindowResize => {
                let target: EventTarget = Self::window()?.into();
                Entry::Listeners(vec![self.listener(target, "resize", false, callback)?])
            }
            EventSource::VisibilityChange => {
                let target: EventTarget = Self::document()?.into();
                Entry::Listeners(vec![self.listener(target, "visibilitychange", false, callback)?])
            }
            EventSource::PointerEnter | EventSource::PointerLeave => {
                let target: EventTarget = self.content.clone()?.into();
                let event = if source == EventSource::PointerEnter {
                    "mouseenter"
                } else {
                    "mouseleave"
                };
                Entry::Listeners(vec![self.listener(target, event, false, callback)?])
            }
            EventSource::DocumentDirection => Entry::Observer(self.observe_document_direction(id)?),
        };

        self.entries.insert(id, entry);
        Some(id)
    }

    fn watch_media(&mut self) -> Vec<CallbackId> {
        let Ok(images) = self.host.query_selector_all("img") else {
            return Vec::new();
        };

        let mut ids = Vec::new();
        for index in 0..images.length() {
            let Some(image) = images
                .get(index)
                .and_then(|node| node.dyn_into::<HtmlImageElement>().ok())
            else {
                continue;
            };
            // Broken images are complete too, so they never hold up the start
            if image.complete() {
                continue;
            }

            let id = self.next_callback();
            let run = RefCell::new(Some(self.one_shot(id)));
            let callback: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(run) = run.borrow_mut().take() {
                    run();
                }
            });
            let target: EventTarget = image.into();
            let listeners: Vec<Listener> = ["load", "error"]
                .into_iter()
                .filter_map(|event| self.listener(target.clone(), event, true, callback.clone()))
                .collect();
            if listeners.is_empty() {
                continue;
            }
            self.entries.insert(id, Entry::Listeners(listeners));
            ids.push(id);
        }
        ids
    }

    fn watch_fonts(&mut self) -> Option<CallbackId> {
        let ready = Self::document()?.fonts().ready().ok()?;
        let id = self.next_callback();
        let alive = Rc::new(Cell::new(true));
        let run = self.one_shot(id);
        {
            let alive = alive.clone();
            spawn_local(async move {
                if let Err(err) = JsFuture::from(ready).await {
                    log::warn!("font loading failed: {:?}", err);
                }
                if alive.get() {
                    run();
                }
            });
        }
        self.entries.insert(id, Entry::Signal(Signal(alive)));
        Some(id)
    }

    fn cancel(&mut self, id: CallbackId) {
        self.entries.remove(&id);
        self.sweep();
    }

    fn animate(&mut self, plan: &AnimationPlan) -> Result<AnimationId> {
        let content = self
            .content
            .as_ref()
            .ok_or(MarqueeError::MissingStructure("marquee content"))?;

        let keyframes = js_sys::Array::new();
        for keyframe in &plan.keyframes {
            let frame = js_sys::Object::new();
            js_sys::Reflect::set(
                &frame,
                &JsValue::from_str("transform"),
                &JsValue::from_str(&keyframe.transform()),
            )?;
            keyframes.push(&frame);
        }

        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &JsValue::from_str("duration"), &JsValue::from_f64(plan.duration_ms))?;
        js_sys::Reflect::set(&options, &JsValue::from_str("iterations"), &JsValue::from_f64(f64::INFINITY))?;
        js_sys::Reflect::set(&options, &JsValue::from_str("easing"), &JsValue::from_str("linear"))?;

        let animation = content.unchecked_ref::<Animatable>().animate(&keyframes, &options)?;
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.animations.insert(id, animation);
        Ok(id)
    }

    fn pause_animation(&mut self, id: AnimationId) {
        if let Some(animation) = self.animations.get(&id) {
            if let Err(err) = animation.pause() {
                log::warn!("failed to pause marquee: {:?}", err);
            }
        }
    }

    fn play_animation(&mut self, id: AnimationId) {
        if let Some(animation) = self.animations.get(&id) {
            if let Err(err) = animation.play() {
                log::warn!("failed to resume marquee: {:?}", err);
            }
        }
    }

    fn cancel_animation(&mut self, id: AnimationId) {
        if let Some(animation) = self.animations.remove(&id) {
            animation.cancel();
        }
    }

    fn seek_animation(&mut self, id: AnimationId, position_ms: f64) {
        if let Some(animation) = self.animations.get(&id) {
            animation.set_current_time(Some(position_ms));
        }
    }

    fn animation_time(&self, id: AnimationId) -> Option<f64> {
        self.animations.get(&id)?.current_time()
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let storage = Self::window()
            .ok_or(MarqueeError::Storage("no window".to_string()))?
            .local_storage()?
            .ok_or(MarqueeError::Storage("localStorage unavailable".to_string()))?;
        Ok(storage.get_item(key)?)
    }

    fn store(&mut self, key: &str, value: &str) -> Result<()> {
        let storage = Self::window()
            .ok_or(MarqueeError::Storage("no window".to_string()))?
            .local_storage()?
            .ok_or(MarqueeError::Storage("localStorage unavailable".to_string()))?;
        storage.set_item(key, value)?;
        Ok(())
    }
}

impl Drop for WebPlatform {
    fn drop(&mut self) {
        for (_, animation) in self.animations.drain() {
            animation.cancel();
        }
    }
}
