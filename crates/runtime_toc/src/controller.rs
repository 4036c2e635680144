//! Lifecycle controller.
//!
//! Owns every piece of per-tab state and sequences the watchers:
//!
//! ```text
//! Idle --in scope, no headings--> WaitingForContent --ready|fallback--> Initialized
//!  ^  \--in scope, headings present------------------------------------^   |
//!  \----------------------------- any navigation (teardown) ---------------/
//! ```
//!
//! Channels race freely; correctness rests on the `current_url` comparison and
//! on the phase guards of `request_init` / `watch_for_content`, never on
//! arrival order.

use crate::config::TocConfig;
use crate::debounce::DebouncedTrigger;
use crate::nav::NavigationWatcher;
use crate::panel_view::LivePanel;
use crate::readiness::ReadinessWatch;
use crate::scroll_spy::ScrollSpy;
use crate::timers::{TimerPurpose, TimerRegistry};
use crate::watcher::StandingWatcher;
use app_api::PageHost;
use bus::{IntersectionEntry, MutationRecord, PageEvent};
use core_types::{ListenerId, NodeRef, ObserverId, ScrollBehavior, TimerId};
use html::internal::Id;
use html::{PatchKey, PatchKeyAllocator};
use toc::style::PANEL_CSS;
use toc::{HeadingLocator, PanelLayout, PanelSettings, build_outline};

/// Resources that exist only while the panel is live.
#[derive(Debug)]
struct Live {
    panel: LivePanel,
    spy: Option<ScrollSpy>,
    watcher: StandingWatcher,
    resize: ListenerId,
    resize_debounce: DebouncedTrigger<f64>,
}

impl Live {
    /// Rebuild the outline from a fresh snapshot, re-render the body and
    /// replace the scroll spy.
    fn refresh(
        &mut self,
        host: &mut dyn PageHost,
        config: &TocConfig,
        locator: &HeadingLocator,
        keys: &mut PatchKeyAllocator,
    ) {
        let headings = host
            .document()
            .map(|doc| locator.locate(&doc))
            .unwrap_or_default();
        for heading in headings.iter().filter(|h| h.generated && h.source != Id::UNASSIGNED) {
            host.assign_anchor(heading.source, &heading.id);
        }
        let outline = build_outline(headings.iter().cloned());
        if let Err(err) = self.panel.render(host, keys, &config.panel, &outline) {
            log::warn!(target: "toc.panel", "render failed: {err}");
        }
        if let Some(spy) = self.spy.take() {
            spy.dispose(host);
        }
        self.spy = ScrollSpy::start(host, &headings, config.spy_margin);
        log::info!(target: "toc.lifecycle", "TOC updated with {} headings", headings.len());
    }

    fn dispose(mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry) {
        if let Some(spy) = self.spy.take() {
            spy.dispose(host);
        }
        self.watcher.stop(host, timers);
        self.resize_debounce.cancel(host, timers);
        host.unlisten(self.resize);
        self.panel.remove(host);
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    WaitingForContent(ReadinessWatch),
    Initialized(Live),
}

#[derive(Debug)]
struct LifecycleState {
    current_url: Option<String>,
    phase: Phase,
    fallback: Option<TimerId>,
}

/// Lifecycle controller: one per tab, driven by `PageEvent`s from a `PageHost`.
pub struct Controller {
    config: TocConfig,
    locator: HeadingLocator,
    timers: TimerRegistry,
    keys: PatchKeyAllocator,
    nav: NavigationWatcher,
    state: LifecycleState,
    settings: PanelSettings,
    started: bool,
    awaiting_dom_ready: bool,
    startup: Option<TimerId>,
}

impl Controller {
    pub fn new(config: TocConfig) -> Self {
        Self {
            locator: HeadingLocator::new(&config.locator),
            config,
            timers: TimerRegistry::new(),
            keys: PatchKeyAllocator::new(),
            nav: NavigationWatcher::new(),
            state: LifecycleState {
                current_url: None,
                phase: Phase::Idle,
                fallback: None,
            },
            settings: PanelSettings::default(),
            started: false,
            awaiting_dom_ready: false,
            startup: None,
        }
    }

    pub fn config(&self) -> &TocConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state.phase, Phase::Initialized(_))
    }

    pub fn is_waiting_for_content(&self) -> bool {
        matches!(self.state.phase, Phase::WaitingForContent(_))
    }

    pub fn current_url(&self) -> Option<&str> {
        self.state.current_url.as_deref()
    }

    /// Settings as last loaded or toggled.
    pub fn settings(&self) -> PanelSettings {
        self.settings
    }

    /// Anchor currently highlighted in the panel.
    pub fn active_anchor(&self) -> Option<&str> {
        match &self.state.phase {
            Phase::Initialized(live) => live.panel.active(),
            _ => None,
        }
    }

    /// Script entry: record the URL, start every navigation channel and
    /// schedule the first evaluation.
    pub fn start(&mut self, host: &mut dyn PageHost) {
        if self.started {
            log::debug!(target: "toc.lifecycle", "already started");
            return;
        }
        self.started = true;
        self.state.current_url = Some(host.location());
        self.nav.start(host, &mut self.timers, &self.config);
        if host.is_loading() {
            self.awaiting_dom_ready = true;
        } else {
            self.schedule_startup(host);
        }
    }

    /// Stop everything, including navigation detection.
    pub fn shutdown(&mut self, host: &mut dyn PageHost) {
        self.teardown(host);
        self.nav.stop(host, &mut self.timers);
        self.started = false;
        self.awaiting_dom_ready = false;
        log::info!(target: "toc.lifecycle", "shut down");
    }

    pub fn on_page_event(&mut self, host: &mut dyn PageHost, event: PageEvent) {
        if self.nav.on_signal(host, &mut self.timers, &self.config, &event) {
            return;
        }
        match event {
            PageEvent::DomContentLoaded => {
                if std::mem::take(&mut self.awaiting_dom_ready) {
                    self.schedule_startup(host);
                }
            }
            PageEvent::TimerFired(id) => self.on_timer(host, id),
            PageEvent::Mutations { observer, records } => self.on_mutations(host, observer, &records),
            PageEvent::Intersections { observer, entries } => self.on_intersections(host, observer, &entries),
            PageEvent::Resized { width } => {
                if let Phase::Initialized(live) = &mut self.state.phase {
                    live.resize_debounce.signal(host, &mut self.timers, |w| *w = width);
                }
            }
            PageEvent::PanelClicked { key } => self.on_panel_click(host, key),
            PageEvent::HistoryPushed
            | PageEvent::HistoryReplaced
            | PageEvent::PopState
            | PageEvent::LinkActivated { .. } => {}
        }
    }

    /// React to the effective URL becoming `url`. Repeated values are ignored,
    /// so every detection channel may call this freely.
    pub fn handle_navigation(&mut self, host: &mut dyn PageHost, url: &str) {
        if self.state.current_url.as_deref() == Some(url) {
            log::debug!(target: "toc.nav", "duplicate URL signal ignored");
            return;
        }
        log::info!(
            target: "toc.nav",
            "URL changed: {} -> {url}",
            self.state.current_url.as_deref().unwrap_or("<none>")
        );
        self.state.current_url = Some(url.to_string());
        self.teardown(host);
        if self.config.scope.contains(url) {
            self.enter_scope(host);
        } else {
            log::info!(target: "toc.lifecycle", "not a scrap page, TOC removed");
        }
    }

    /// Build the panel now. A no-op when already initialised or when the
    /// current location is out of scope. Returns true when a panel was built.
    pub fn request_init(&mut self, host: &mut dyn PageHost) -> bool {
        if !self.config.scope.contains(&host.location()) {
            log::debug!(target: "toc.lifecycle", "not a scrap page, skipping initialization");
            return false;
        }
        match std::mem::replace(&mut self.state.phase, Phase::Idle) {
            Phase::Initialized(live) => {
                self.state.phase = Phase::Initialized(live);
                log::debug!(target: "toc.lifecycle", "already initialized");
                return false;
            }
            Phase::WaitingForContent(watch) => watch.cancel(host, &mut self.timers),
            Phase::Idle => {}
        }
        self.cancel_fallback(host);
        log::info!(target: "toc.lifecycle", "initializing TOC panel");

        self.settings = PanelSettings::load(host.storage(), &self.config.settings_key);
        host.ensure_stylesheet(&self.config.panel.style_id, PANEL_CSS);
        if host.remove_element_by_dom_id(&self.config.panel.dom_id) {
            log::debug!(target: "toc.panel", "removed stale panel");
        }

        let compact = host.viewport_width() < self.config.compact_width;
        let layout = PanelLayout::new(&self.settings, compact);
        let panel = match LivePanel::mount(host, &mut self.keys, &self.config.panel, layout) {
            Ok(panel) => panel,
            Err(err) => {
                log::warn!(target: "toc.panel", "could not mount panel: {err}");
                host.remove_element_by_dom_id(&self.config.panel.dom_id);
                return false;
            }
        };
        let mut live = Live {
            panel,
            spy: None,
            watcher: StandingWatcher::start(host, self.config.standing_debounce),
            resize: host.listen_resize(),
            resize_debounce: DebouncedTrigger::new(self.config.resize_debounce, TimerPurpose::ResizeDebounce),
        };
        live.refresh(host, &self.config, &self.locator, &mut self.keys);
        self.state.phase = Phase::Initialized(live);
        log::info!(target: "toc.lifecycle", "initialization complete");
        true
    }

    /// Start waiting for headings to render. A no-op unless idle.
    pub fn watch_for_content(&mut self, host: &mut dyn PageHost) {
        if !matches!(self.state.phase, Phase::Idle) {
            log::debug!(target: "toc.readiness", "watch already active or panel live");
            return;
        }
        let watch = ReadinessWatch::start(
            host,
            &mut self.timers,
            self.config.readiness_debounce,
            self.config.readiness_timeout,
        );
        self.state.phase = Phase::WaitingForContent(watch);
        log::info!(target: "toc.readiness", "waiting for content");
    }

    /// Remove the panel and release every lifecycle resource. Safe in any
    /// phase.
    pub fn teardown(&mut self, host: &mut dyn PageHost) {
        match std::mem::replace(&mut self.state.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::WaitingForContent(watch) => {
                watch.cancel(host, &mut self.timers);
                log::debug!(target: "toc.readiness", "readiness watch cancelled");
            }
            Phase::Initialized(live) => {
                live.dispose(host, &mut self.timers);
                log::info!(target: "toc.lifecycle", "TOC panel removed");
            }
        }
        host.remove_element_by_dom_id(&self.config.panel.dom_id);
        self.cancel_fallback(host);
        if let Some(id) = self.startup.take() {
            self.timers.cancel(host, id);
        }
    }

    fn enter_scope(&mut self, host: &mut dyn PageHost) {
        log::info!(target: "toc.lifecycle", "on a scrap page");
        let ready = host
            .document()
            .is_some_and(|doc| self.locator.has_headings(&doc));
        if ready {
            self.request_init(host);
        } else {
            self.watch_for_content(host);
        }
        if !self.is_initialized()
            && let Some(delay) = self.config.fallback_delay
        {
            self.cancel_fallback(host);
            self.state.fallback = Some(self.timers.schedule(host, delay, TimerPurpose::Fallback));
        }
    }

    /// Compare the live location against the last seen URL. True when a
    /// navigation was handled.
    fn check_url(&mut self, host: &mut dyn PageHost) -> bool {
        let url = host.location();
        if self.state.current_url.as_deref() == Some(url.as_str()) {
            return false;
        }
        self.handle_navigation(host, &url);
        true
    }

    fn schedule_startup(&mut self, host: &mut dyn PageHost) {
        if let Some(old) = self.startup.take() {
            self.timers.cancel(host, old);
        }
        self.startup = Some(self.timers.schedule(host, self.config.startup_delay, TimerPurpose::Startup));
    }

    fn cancel_fallback(&mut self, host: &mut dyn PageHost) {
        if let Some(id) = self.state.fallback.take() {
            self.timers.cancel(host, id);
        }
    }

    fn on_timer(&mut self, host: &mut dyn PageHost, id: TimerId) {
        let Some(purpose) = self.timers.resolve(id) else {
            log::trace!(target: "toc.lifecycle", "stale timer {id:?}");
            return;
        };
        match purpose {
            TimerPurpose::UrlRecheck | TimerPurpose::Poll => {
                self.check_url(host);
            }
            TimerPurpose::Startup => {
                if self.startup == Some(id) {
                    self.startup = None;
                    if self.config.scope.contains(&host.location()) {
                        self.enter_scope(host);
                    } else {
                        log::info!(target: "toc.lifecycle", "not a scrap page, skipping initialization");
                    }
                }
            }
            TimerPurpose::Fallback => {
                if self.state.fallback == Some(id) {
                    self.state.fallback = None;
                    if !self.is_initialized() {
                        log::info!(target: "toc.lifecycle", "fallback delay elapsed, forcing initialization");
                        self.request_init(host);
                    }
                }
            }
            TimerPurpose::ReadinessDebounce => {
                let settled = match &mut self.state.phase {
                    Phase::WaitingForContent(watch) => watch.settled(id),
                    _ => false,
                };
                if settled {
                    let ready = host
                        .document()
                        .is_some_and(|doc| self.locator.has_headings(&doc));
                    if ready {
                        log::info!(target: "toc.readiness", "headings detected");
                        self.request_init(host);
                    } else {
                        log::trace!(target: "toc.readiness", "mutations settled without headings");
                    }
                }
            }
            TimerPurpose::ReadinessTimeout => {
                let expired = matches!(&self.state.phase, Phase::WaitingForContent(watch) if watch.is_timeout(id));
                if !expired {
                    return;
                }
                if let Phase::WaitingForContent(watch) = std::mem::replace(&mut self.state.phase, Phase::Idle) {
                    watch.cancel(host, &mut self.timers);
                }
                log::info!(target: "toc.readiness", "no headings before timeout, giving up");
            }
            TimerPurpose::StandingDebounce => {
                let Phase::Initialized(live) = &mut self.state.phase else {
                    return;
                };
                if live.watcher.settled(id) == Some(true) && self.config.scope.contains(&host.location()) {
                    log::debug!(target: "toc.watcher", "new headings, rebuilding");
                    live.refresh(host, &self.config, &self.locator, &mut self.keys);
                }
            }
            TimerPurpose::ResizeDebounce => {
                let Phase::Initialized(live) = &mut self.state.phase else {
                    return;
                };
                if let Some(width) = live.resize_debounce.fire(id) {
                    let compact = width < self.config.compact_width;
                    if let Err(err) = live.panel.set_compact(host, &self.config.panel, compact) {
                        log::warn!(target: "toc.panel", "layout update failed: {err}");
                    }
                }
            }
        }
    }

    fn on_mutations(&mut self, host: &mut dyn PageHost, observer: ObserverId, records: &[MutationRecord]) {
        if self.nav.is_title_observer(observer) {
            self.check_url(host);
            return;
        }
        let known = match &self.state.phase {
            Phase::WaitingForContent(watch) => watch.observer() == observer,
            Phase::Initialized(live) => live.watcher.observer() == observer,
            Phase::Idle => false,
        };
        if !known {
            log::trace!(target: "toc.lifecycle", "stale observer {observer:?}");
            return;
        }
        // SPA navigations surface as content mutations too
        if self.check_url(host) {
            return;
        }
        match &mut self.state.phase {
            Phase::WaitingForContent(watch) => watch.on_mutations(host, &mut self.timers),
            Phase::Initialized(live) => {
                let added = records
                    .iter()
                    .flat_map(|r| &r.added)
                    .any(|node| self.locator.is_or_contains_heading(node));
                log::trace!(target: "toc.watcher", "{} records, heading added: {added}", records.len());
                live.watcher.on_batch(host, &mut self.timers, added);
            }
            Phase::Idle => {}
        }
    }

    fn on_intersections(&mut self, host: &mut dyn PageHost, observer: ObserverId, entries: &[IntersectionEntry]) {
        let Phase::Initialized(live) = &mut self.state.phase else {
            return;
        };
        let Some(spy) = live.spy.as_ref().filter(|s| s.observer() == observer) else {
            log::trace!(target: "toc.spy", "stale observer {observer:?}");
            return;
        };
        let Some(anchor) = spy.active_anchor(entries).map(str::to_string) else {
            return;
        };
        if let Err(err) = live.panel.set_active(host, &anchor) {
            log::warn!(target: "toc.spy", "highlight failed: {err}");
        }
    }

    fn on_panel_click(&mut self, host: &mut dyn PageHost, key: PatchKey) {
        let Phase::Initialized(live) = &mut self.state.phase else {
            return;
        };
        if live.panel.is_toggle(key) {
            match live.panel.toggle(host, &self.config.panel, &self.config.settings_key) {
                Ok(settings) => self.settings = settings,
                Err(err) => log::warn!(target: "toc.panel", "toggle failed: {err}"),
            }
            return;
        }
        let Some(source) = live.panel.link(key).map(|l| l.source) else {
            return;
        };
        let Some(rect) = host.rect(NodeRef::Page(source)) else {
            log::debug!(target: "toc.panel", "heading for {key} is gone");
            return;
        };
        let top = rect.top + host.scroll_y() - self.config.header_clearance;
        host.scroll_window_to(top, ScrollBehavior::Smooth);
    }
}
