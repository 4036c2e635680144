//! `PageHost` over the real page.
//!
//! Every JS callback (timer, observer, listener) only queues a `PageEvent`
//! into the shared [`Inbox`] and schedules a microtask; the engine runs from
//! that microtask, never from inside the callback itself. Closures can
//! therefore be dropped as soon as the engine releases their handle.

use crate::panel_dom::PanelDom;
use crate::snapshot::{self, NodeRegistry};
use app_api::{HostError, KeyValueStore, MutationDetail, PageHost};
use bus::{EventQueue, IntersectionEntry, MutationRecord, PageEvent};
use core_types::{ListenerId, NodeRef, ObserverId, Rect, RootMargin, ScrollBehavior, TimerId};
use html::internal::Id;
use html::{CLICK_KEY_ATTR, DomPatch, Node, PatchKey};
use js_sys::{Array, Function, Reflect};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlAnchorElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MutationObserver, MutationObserverInit,
    ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Storage, Window,
};

/// Events waiting for the engine, plus the microtask that drains them.
#[derive(Default)]
pub(crate) struct Inbox {
    pub events: EventQueue,
    scheduled: bool,
    pump: Option<Function>,
}

pub(crate) type SharedInbox = Rc<RefCell<Inbox>>;

impl Inbox {
    pub fn set_pump(&mut self, pump: Function) {
        self.pump = Some(pump);
    }

    /// Called at the start of every drain.
    pub fn begin_drain(&mut self) {
        self.scheduled = false;
    }
}

pub(crate) fn notify(inbox: &SharedInbox, event: PageEvent) {
    let pump = {
        let mut inbox = inbox.borrow_mut();
        inbox.events.push(event);
        if inbox.scheduled {
            return;
        }
        inbox.scheduled = true;
        inbox.pump.clone()
    };
    if let (Some(pump), Some(window)) = (pump, web_sys::window()) {
        window.queue_microtask(&pump);
    }
}

struct Timer {
    handle: i32,
    interval: bool,
    _callback: Closure<dyn FnMut()>,
}

enum Observer {
    Mutations {
        observer: MutationObserver,
        _callback: Closure<dyn FnMut(Array, MutationObserver)>,
    },
    Intersections {
        observer: IntersectionObserver,
        _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
    },
}

impl Observer {
    fn disconnect(&self) {
        match self {
            Observer::Mutations { observer, .. } => observer.disconnect(),
            Observer::Intersections { observer, .. } => observer.disconnect(),
        }
    }
}

/// `localStorage`, or nothing when the page denies access.
pub(crate) struct LocalStorage(Option<Storage>);

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.0
            && let Err(err) = storage.set_item(key, value)
        {
            log::warn!(target: "platform.host", "storage write failed: {err:?}");
        }
    }
}

pub struct BrowserHost {
    window: Window,
    document: Document,
    inbox: SharedInbox,
    registry: Rc<RefCell<NodeRegistry>>,
    panel: PanelDom,
    storage: LocalStorage,

    next_handle: u64,
    timers: HashMap<TimerId, Timer>,
    observers: HashMap<ObserverId, Observer>,
    listeners: HashMap<ListenerId, Closure<dyn FnMut(Event)>>,
    hooks_installed: bool,
    panel_id: String,
}

impl BrowserHost {
    pub(crate) fn new(window: Window, document: Document, inbox: SharedInbox, panel_id: &str) -> Self {
        let storage = LocalStorage(window.local_storage().ok().flatten());
        Self {
            panel: PanelDom::new(document.clone()),
            window,
            document,
            inbox,
            registry: Rc::new(RefCell::new(NodeRegistry::new())),
            storage,
            next_handle: 0,
            timers: HashMap::new(),
            observers: HashMap::new(),
            listeners: HashMap::new(),
            hooks_installed: false,
            panel_id: panel_id.to_string(),
        }
    }

    fn next_raw(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn content_root(&self) -> Option<web_sys::Node> {
        let main = self.document.query_selector("main").ok().flatten();
        main.map(web_sys::Node::from)
            .or_else(|| self.document.body().map(web_sys::Node::from))
    }

    /// A one-shot timer's callback has run; its closure can go.
    pub(crate) fn timer_fired(&mut self, id: TimerId) {
        if self.timers.get(&id).is_some_and(|t| !t.interval) {
            self.timers.remove(&id);
        }
    }

    fn schedule(&mut self, delay: Duration, interval: bool) -> TimerId {
        let id = TimerId::from_raw(self.next_raw());
        let inbox = self.inbox.clone();
        let callback = Closure::<dyn FnMut()>::new(move || notify(&inbox, PageEvent::TimerFired(id)));
        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let function = callback.as_ref().unchecked_ref();
        let handle = if interval {
            self.window
                .set_interval_with_callback_and_timeout_and_arguments_0(function, ms)
        } else {
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(function, ms)
        };
        match handle {
            Ok(handle) => {
                self.timers.insert(
                    id,
                    Timer {
                        handle,
                        interval,
                        _callback: callback,
                    },
                );
            }
            Err(err) => log::warn!(target: "platform.host", "timer rejected: {err:?}"),
        }
        id
    }

    /// Replace `history.<method>` with a wrapper that calls the original and
    /// then reports `event`.
    fn wrap_history(&self, method: &str, event: PageEvent) -> Result<(), JsValue> {
        let history = self.window.history()?;
        let original: Function = Reflect::get(&history, &JsValue::from_str(method))?.dyn_into()?;
        let inbox = self.inbox.clone();
        let target = history.clone();
        let wrapper = Closure::<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>::new(
            move |state: JsValue, title: JsValue, url: JsValue| {
                let result = original.call3(&target, &state, &title, &url);
                notify(&inbox, event.clone());
                result
            },
        );
        Reflect::set(&history, &JsValue::from_str(method), wrapper.as_ref())?;
        // lives as long as the page
        wrapper.forget();
        Ok(())
    }

    fn install_link_listener(&self) -> Result<(), JsValue> {
        let inbox = self.inbox.clone();
        let panel_selector = format!("#{}", self.panel_id);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if let Ok(Some(_)) = target.closest(&panel_selector) {
                return;
            }
            let anchor = target
                .closest("a[href]")
                .ok()
                .flatten()
                .and_then(|a| a.dyn_into::<HtmlAnchorElement>().ok());
            if let Some(anchor) = anchor {
                notify(&inbox, PageEvent::LinkActivated { href: anchor.href() });
            }
        });
        self.document
            .add_event_listener_with_callback_and_bool("click", callback.as_ref().unchecked_ref(), true)?;
        callback.forget();
        Ok(())
    }

    /// Report clicks inside the panel as keys.
    pub(crate) fn install_panel_clicks(&self) -> Result<(), JsValue> {
        let inbox = self.inbox.clone();
        let panel_selector = format!("#{} [{CLICK_KEY_ATTR}]", self.panel_id);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Some(clicked) = target.closest(&panel_selector).ok().flatten() else {
                return;
            };
            let Some(key) = clicked.get_attribute(CLICK_KEY_ATTR).as_deref().and_then(PatchKey::parse) else {
                return;
            };
            event.prevent_default();
            notify(&inbox, PageEvent::PanelClicked { key });
        });
        self.document
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
        callback.forget();
        Ok(())
    }

    /// `DOMContentLoaded`, delivered once.
    pub(crate) fn listen_dom_ready(&self) -> Result<(), JsValue> {
        let inbox = self.inbox.clone();
        let callback = Closure::once_into_js(move || notify(&inbox, PageEvent::DomContentLoaded));
        self.document
            .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
    }

    fn observe_mutations(
        &mut self,
        target: &web_sys::Node,
        init: &MutationObserverInit,
        detail: MutationDetail,
    ) -> Option<ObserverId> {
        let id = ObserverId::from_raw(self.next_raw());
        let inbox = self.inbox.clone();
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(move |records: Array, _| {
            let records = records
                .iter()
                .filter_map(|r| r.dyn_into::<web_sys::MutationRecord>().ok())
                .map(|r| {
                    if detail == MutationDetail::Signal {
                        return MutationRecord::default();
                    }
                    let added = r.added_nodes();
                    let added = (0..added.length())
                        .filter_map(|i| added.item(i))
                        .filter_map(|n| snapshot::snapshot_added(&n))
                        .collect::<Vec<Node>>();
                    MutationRecord {
                        target: Id::UNASSIGNED,
                        added,
                        removed: Vec::new(),
                    }
                })
                .collect::<Vec<_>>();
            notify(&inbox, PageEvent::Mutations { observer: id, records });
        });
        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                log::warn!(target: "platform.host", "mutation observer rejected: {err:?}");
                return None;
            }
        };
        if let Err(err) = observer.observe_with_options(target, init) {
            log::warn!(target: "platform.host", "observe failed: {err:?}");
            return None;
        }
        self.observers.insert(
            id,
            Observer::Mutations {
                observer,
                _callback: callback,
            },
        );
        Some(id)
    }

    fn purge(&self, pred: impl FnMut(&PageEvent) -> bool) {
        self.inbox.borrow_mut().events.purge(pred);
    }

    fn element_ref(&self, node: NodeRef) -> Option<Element> {
        match node {
            NodeRef::Page(id) => self.registry.borrow().element(id).cloned(),
            NodeRef::Panel(key) => self.panel.element(key).cloned(),
        }
    }
}

impl PageHost for BrowserHost {
    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn document(&mut self) -> Option<Node> {
        let root = self.content_root()?;
        self.registry.borrow_mut().snapshot(&root)
    }

    fn viewport_width(&self) -> f64 {
        self.window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.page_y_offset().unwrap_or(0.0)
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.schedule(delay, false)
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        self.schedule(period, true)
    }

    fn clear_timer(&mut self, id: TimerId) {
        if let Some(timer) = self.timers.remove(&id) {
            if timer.interval {
                self.window.clear_interval_with_handle(timer.handle);
            } else {
                self.window.clear_timeout_with_handle(timer.handle);
            }
        }
        self.purge(|e| matches!(e, PageEvent::TimerFired(t) if *t == id));
    }

    fn observe_content_mutations(&mut self, detail: MutationDetail) -> ObserverId {
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        let observed = self
            .content_root()
            .and_then(|root| self.observe_mutations(&root, &init, detail));
        // a dead handle keeps the engine's bookkeeping uniform
        observed.unwrap_or_else(|| ObserverId::from_raw(self.next_raw()))
    }

    fn observe_title(&mut self) -> Option<ObserverId> {
        let title = self.document.query_selector("title").ok().flatten()?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_character_data(true);
        init.set_subtree(true);
        self.observe_mutations(&title, &init, MutationDetail::Signal)
    }

    fn observe_intersections(&mut self, targets: &[Id], margin: RootMargin) -> ObserverId {
        let id = ObserverId::from_raw(self.next_raw());
        let elements = {
            let registry = self.registry.borrow();
            targets
                .iter()
                .filter_map(|t| registry.element(*t).map(|e| (e.clone(), *t)))
                .collect::<Vec<_>>()
        };
        let inbox = self.inbox.clone();
        let lookup = elements.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(move |entries: Array, _| {
            let entries = entries
                .iter()
                .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let target = entry.target();
                    let (_, id) = lookup.iter().find(|(el, _)| *el == target)?;
                    Some(IntersectionEntry {
                        target: *id,
                        is_intersecting: entry.is_intersecting(),
                    })
                })
                .collect::<Vec<_>>();
            notify(&inbox, PageEvent::Intersections { observer: id, entries });
        });
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&margin.to_string());
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                for (element, _) in &elements {
                    observer.observe(element);
                }
                self.observers.insert(
                    id,
                    Observer::Intersections {
                        observer,
                        _callback: callback,
                    },
                );
            }
            Err(err) => log::warn!(target: "platform.host", "intersection observer rejected: {err:?}"),
        }
        id
    }

    fn disconnect(&mut self, id: ObserverId) {
        if let Some(observer) = self.observers.remove(&id) {
            observer.disconnect();
        }
        self.purge(|e| match e {
            PageEvent::Mutations { observer, .. } | PageEvent::Intersections { observer, .. } => *observer == id,
            _ => false,
        });
    }

    fn install_navigation_hooks(&mut self) {
        if std::mem::replace(&mut self.hooks_installed, true) {
            return;
        }
        for (method, event) in [
            ("pushState", PageEvent::HistoryPushed),
            ("replaceState", PageEvent::HistoryReplaced),
        ] {
            if let Err(err) = self.wrap_history(method, event) {
                log::warn!(target: "platform.host", "cannot wrap history.{method}: {err:?}");
            }
        }

        let inbox = self.inbox.clone();
        let popstate = Closure::<dyn FnMut(Event)>::new(move |_| notify(&inbox, PageEvent::PopState));
        if let Err(err) = self
            .window
            .add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())
        {
            log::warn!(target: "platform.host", "popstate listener rejected: {err:?}");
        }
        popstate.forget();

        if let Err(err) = self.install_link_listener() {
            log::warn!(target: "platform.host", "link listener rejected: {err:?}");
        }
    }

    fn listen_resize(&mut self) -> ListenerId {
        let inbox = self.inbox.clone();
        let window = self.window.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |_| {
            let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0);
            notify(&inbox, PageEvent::Resized { width });
        });
        let id = ListenerId::from_raw(self.next_raw());
        if let Err(err) = self
            .window
            .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        {
            log::warn!(target: "platform.host", "resize listener rejected: {err:?}");
        }
        self.listeners.insert(id, callback);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        let Some(callback) = self.listeners.remove(&id) else {
            return;
        };
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        {
            log::debug!(target: "platform.host", "resize listener removal failed: {err:?}");
        }
        if self.listeners.is_empty() {
            self.purge(|e| matches!(e, PageEvent::Resized { .. }));
        }
    }

    fn apply_panel_patches(&mut self, patches: &[DomPatch]) -> Result<(), HostError> {
        self.panel.apply(patches)
    }

    fn remove_element_by_dom_id(&mut self, dom_id: &str) -> bool {
        match self.document.get_element_by_id(dom_id) {
            Some(element) => {
                element.remove();
                true
            }
            None => false,
        }
    }

    fn assign_anchor(&mut self, node: Id, anchor: &str) {
        if let Some(element) = self.registry.borrow().element(node)
            && let Err(err) = element.set_attribute("id", anchor)
        {
            log::debug!(target: "platform.host", "cannot assign anchor {anchor:?}: {err:?}");
        }
    }

    fn ensure_stylesheet(&mut self, dom_id: &str, css: &str) -> bool {
        if self.document.get_element_by_id(dom_id).is_some() {
            return false;
        }
        let Ok(style) = self.document.create_element("style") else {
            return false;
        };
        style.set_id(dom_id);
        style.set_text_content(Some(css));
        let parent = self
            .document
            .head()
            .map(web_sys::Node::from)
            .or_else(|| self.document.document_element().map(web_sys::Node::from));
        parent.is_some_and(|p| p.append_child(&style).is_ok())
    }

    fn rect(&self, node: NodeRef) -> Option<Rect> {
        let r = self.element_ref(node)?.get_bounding_client_rect();
        Some(Rect::new(r.top(), r.bottom()))
    }

    fn scroll_window_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_into_view(&mut self, node: NodeRef) {
        let Some(element) = self.element_ref(node) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn storage(&mut self) -> &mut dyn KeyValueStore {
        &mut self.storage
    }
}
