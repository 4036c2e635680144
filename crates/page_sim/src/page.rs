//! `SimPage`: a deterministic stand-in for one browser tab.
//!
//! The page owns a content region (`main`), a title, a location with history,
//! a virtual clock, observers, listeners, a key-value store and the injected
//! panel. Every callback a browser would run is queued as a `PageEvent` and
//! handed to the harness in [`SimPage::run_for`].
//!
//! Geometry is synthetic. Content elements are laid out one per row of
//! [`CONTENT_ROW`] px in document order; panel elements inside the scroll
//! area one per row of [`PANEL_ROW`] px.

use crate::arena::{DomPatchError, PanelArena};
use crate::clock::{Scheduled, Scheduler};
use crate::script::{NodeSpec, ScriptAction};
use app_api::{HostError, KeyValueStore, MutationDetail, PageHost};
use bus::{EventQueue, IntersectionEntry, MutationRecord, PageEvent};
use core_types::{ListenerId, NodeRef, ObserverId, Rect, RootMargin, ScrollBehavior, TimerId};
use html::dom_utils::{collapse_whitespace, heading_level, text_content};
use html::internal::Id;
use html::traverse::{Walk, walk_with_ancestors};
use html::{CLICK_KEY_ATTR, DomPatch, Node, PatchKey};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

pub const CONTENT_ROW: f64 = 40.0;
pub const PANEL_ROW: f64 = 24.0;
pub const PANEL_TOP: f64 = 100.0;
/// Panel element the companion stylesheet makes scrollable.
pub const PANEL_SCROLL_CLASS: &str = "zenn-toc-content";

#[derive(Debug, Default)]
pub struct SimStorage {
    entries: HashMap<String, String>,
    pub writes: usize,
}

impl KeyValueStore for SimStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug)]
struct IntersectionWatch {
    targets: Vec<Id>,
    margin: RootMargin,
    state: HashMap<Id, bool>,
}

#[derive(Debug)]
enum Observer {
    Content(MutationDetail),
    Title,
    Intersections(IntersectionWatch),
}

pub struct SimPage {
    clock: Scheduler,
    queue: EventQueue,

    location: String,
    history: Vec<String>,
    history_index: usize,
    loading: bool,
    title: Option<String>,
    content: Node,
    next_node: u32,

    hooks_installed: bool,
    observers: BTreeMap<ObserverId, Observer>,
    next_observer: u64,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,

    storage: SimStorage,
    stylesheets: BTreeMap<String, String>,
    panel: PanelArena,
    panel_scroll: f64,
    panel_viewport: f64,
    panel_reveals: Vec<PatchKey>,
    patch_errors: Vec<DomPatchError>,

    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    window_scrolls: Vec<(f64, ScrollBehavior)>,

    delivered: usize,
    observer_callbacks: usize,
}

impl SimPage {
    pub fn new(url: &str) -> Self {
        let mut page = Self {
            clock: Scheduler::default(),
            queue: EventQueue::new(),
            location: url.to_string(),
            history: vec![url.to_string()],
            history_index: 0,
            loading: false,
            title: Some("Zenn".into()),
            content: Node::element("main"),
            next_node: 1,
            hooks_installed: false,
            observers: BTreeMap::new(),
            next_observer: 0,
            listeners: BTreeSet::new(),
            next_listener: 0,
            storage: SimStorage::default(),
            stylesheets: BTreeMap::new(),
            panel: PanelArena::new(),
            panel_scroll: 0.0,
            panel_viewport: 320.0,
            panel_reveals: Vec::new(),
            patch_errors: Vec::new(),
            viewport_width: 1400.0,
            viewport_height: 800.0,
            scroll_y: 0.0,
            window_scrolls: Vec::new(),
            delivered: 0,
            observer_callbacks: 0,
        };
        let mut content = std::mem::replace(&mut page.content, Node::text(""));
        page.stamp(&mut content);
        page.content = content;
        page
    }

    /// A page whose document is still parsing; call `finish_loading` later.
    pub fn loading(url: &str) -> Self {
        let mut page = Self::new(url);
        page.loading = true;
        page
    }

    /// Initial content, present before anything observes the page.
    pub fn with_content(mut self, specs: &[NodeSpec]) -> Self {
        for spec in specs {
            let mut node = spec.to_node();
            self.stamp(&mut node);
            if let Some(children) = self.content.children_mut() {
                children.push(node);
            }
        }
        self
    }

    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::to_string);
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    fn stamp(&mut self, node: &mut Node) {
        if node.id() == Id::UNASSIGNED {
            node.set_id(Id(self.next_node));
            self.next_node += 1;
        }
        if let Some(children) = node.children_mut() {
            for child in children {
                self.stamp(child);
            }
        }
    }

    // =========================================================================
    // Driving
    // =========================================================================

    pub fn now_ms(&self) -> u64 {
        self.clock.now()
    }

    /// Advance virtual time by `ms`, handing every event to `handler` in
    /// order. Events produced by the handler are delivered before time moves.
    pub fn run_for<F>(&mut self, ms: u64, mut handler: F)
    where
        F: FnMut(&mut SimPage, PageEvent),
    {
        let end = self.clock.now() + ms;
        loop {
            self.drain(&mut handler);
            if self.clock.next_due().is_none_or(|due| due > end) {
                break;
            }
            match self.clock.pop_due(end) {
                Some(Scheduled::Engine { id, .. }) => self.queue.push(PageEvent::TimerFired(id)),
                Some(Scheduled::Script(action)) => self.perform(action),
                None => break,
            }
        }
        self.clock.set_now(end);
        self.drain(&mut handler);
    }

    /// Deliver queued events without moving time.
    pub fn settle<F>(&mut self, handler: F)
    where
        F: FnMut(&mut SimPage, PageEvent),
    {
        self.run_for(0, handler);
    }

    fn drain<F>(&mut self, handler: &mut F)
    where
        F: FnMut(&mut SimPage, PageEvent),
    {
        while let Some(event) = self.queue.pop() {
            self.delivered += 1;
            if matches!(event, PageEvent::Mutations { .. } | PageEvent::Intersections { .. }) {
                self.observer_callbacks += 1;
            }
            handler(self, event);
        }
    }

    /// Run `action` after `delay_ms` of virtual time.
    pub fn schedule(&mut self, delay_ms: u64, action: ScriptAction) {
        self.clock.script(delay_ms, action);
    }

    pub fn perform(&mut self, action: ScriptAction) {
        match action {
            ScriptAction::Append { nodes } => {
                self.append_specs(&nodes);
            }
            ScriptAction::ClearContent => self.clear_main(),
            ScriptAction::PushState { url, title } => {
                self.push_state(&url);
                if let Some(title) = title {
                    self.set_title(&title);
                }
            }
            ScriptAction::ReplaceState { url } => self.replace_state(&url),
            ScriptAction::Back => self.back(),
            ScriptAction::SetLocation { url } => self.set_location_silently(&url),
            ScriptAction::ClickLink { href, navigate_after } => self.click_link(&href, navigate_after),
            ScriptAction::SetTitle { text } => self.set_title(&text),
            ScriptAction::Resize { width } => self.resize(width),
            ScriptAction::Scroll { y } => self.scroll_to(y),
            ScriptAction::FinishLoading => self.finish_loading(),
        }
    }

    // =========================================================================
    // Page activity
    // =========================================================================

    pub fn finish_loading(&mut self) {
        if std::mem::take(&mut self.loading) {
            self.queue.push(PageEvent::DomContentLoaded);
        }
    }

    pub fn append_specs(&mut self, specs: &[NodeSpec]) -> Vec<Id> {
        self.append_to_main(specs.iter().map(NodeSpec::to_node).collect())
    }

    /// Append subtrees to `main` as one mutation record.
    pub fn append_to_main(&mut self, nodes: Vec<Node>) -> Vec<Id> {
        let mut added = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            self.stamp(&mut node);
            added.push(node);
        }
        let ids = added.iter().map(Node::id).collect::<Vec<_>>();
        if let Some(children) = self.content.children_mut() {
            children.extend(added.iter().cloned());
        }
        self.record_content_mutation(MutationRecord::added(self.content.id(), added));
        ids
    }

    pub fn clear_main(&mut self) {
        let removed = self
            .content
            .children_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        if removed.is_empty() {
            return;
        }
        self.record_content_mutation(MutationRecord {
            target: self.content.id(),
            added: Vec::new(),
            removed: removed.iter().map(Node::id).collect(),
        });
    }

    fn record_content_mutation(&mut self, record: MutationRecord) {
        let watchers = self
            .observers
            .iter()
            .filter_map(|(id, o)| match o {
                Observer::Content(detail) => Some((*id, *detail)),
                _ => None,
            })
            .collect::<Vec<_>>();
        for (observer, detail) in watchers {
            let record = match detail {
                MutationDetail::AddedNodes => record.clone(),
                MutationDetail::Signal => MutationRecord {
                    target: record.target,
                    added: Vec::new(),
                    removed: Vec::new(),
                },
            };
            self.queue.push(PageEvent::Mutations {
                observer,
                records: vec![record],
            });
        }
        self.update_intersections();
    }

    pub fn push_state(&mut self, url: &str) {
        self.history.truncate(self.history_index + 1);
        self.history.push(url.to_string());
        self.history_index = self.history.len() - 1;
        self.location = url.to_string();
        if self.hooks_installed {
            self.queue.push(PageEvent::HistoryPushed);
        }
    }

    pub fn replace_state(&mut self, url: &str) {
        if let Some(slot) = self.history.get_mut(self.history_index) {
            *slot = url.to_string();
        }
        self.location = url.to_string();
        if self.hooks_installed {
            self.queue.push(PageEvent::HistoryReplaced);
        }
    }

    pub fn back(&mut self) {
        if self.history_index == 0 {
            return;
        }
        self.history_index -= 1;
        self.location = self.history[self.history_index].clone();
        if self.hooks_installed {
            self.queue.push(PageEvent::PopState);
        }
    }

    pub fn set_location_silently(&mut self, url: &str) {
        self.location = url.to_string();
    }

    pub fn click_link(&mut self, href: &str, navigate_after: Option<u64>) {
        if self.hooks_installed {
            self.queue.push(PageEvent::LinkActivated { href: href.to_string() });
        }
        if let Some(delay) = navigate_after {
            self.schedule(delay, ScriptAction::SetLocation { url: href.to_string() });
        }
    }

    pub fn set_title(&mut self, text: &str) {
        if self.title.is_none() {
            return;
        }
        self.title = Some(text.to_string());
        let watchers = self
            .observers
            .iter()
            .filter(|(_, o)| matches!(o, Observer::Title))
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        for observer in watchers {
            self.queue.push(PageEvent::Mutations {
                observer,
                records: vec![MutationRecord::default()],
            });
        }
    }

    pub fn resize(&mut self, width: f64) {
        self.viewport_width = width;
        if !self.listeners.is_empty() {
            self.queue.push(PageEvent::Resized { width });
        }
        self.update_intersections();
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
        self.update_intersections();
    }

    /// Simulate a click on a panel node; reported for the nearest ancestor
    /// carrying a click key, like the browser host does.
    pub fn click_panel(&mut self, key: PatchKey) -> bool {
        if !self.panel.is_attached(key) {
            return false;
        }
        let mut current = Some(key);
        while let Some(k) = current {
            if let Some(target) = self.panel.attr(k, CLICK_KEY_ATTR).and_then(PatchKey::parse) {
                self.queue.push(PageEvent::PanelClicked { key: target });
                return true;
            }
            current = self.panel.parent(k);
        }
        false
    }

    pub fn set_stored(&mut self, key: &str, value: &str) {
        self.storage.entries.insert(key.to_string(), value.to_string());
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn stored(&self, key: &str) -> Option<&str> {
        self.storage.entries.get(key).map(String::as_str)
    }

    pub fn storage_writes(&self) -> usize {
        self.storage.writes
    }

    pub fn events_delivered(&self) -> usize {
        self.delivered
    }

    /// Mutation and intersection callbacks delivered so far.
    pub fn observer_callbacks(&self) -> usize {
        self.observer_callbacks
    }

    pub fn content_observers(&self) -> usize {
        self.count_observers(|o| matches!(o, Observer::Content(_)))
    }

    pub fn intersection_observers(&self) -> usize {
        self.count_observers(|o| matches!(o, Observer::Intersections(_)))
    }

    pub fn title_observers(&self) -> usize {
        self.count_observers(|o| matches!(o, Observer::Title))
    }

    fn count_observers(&self, pred: impl Fn(&Observer) -> bool) -> usize {
        self.observers.values().filter(|o| pred(o)).count()
    }

    pub fn resize_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.clock.engine_timers()
    }

    pub fn hooks_installed(&self) -> bool {
        self.hooks_installed
    }

    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    pub fn patch_errors(&self) -> &[DomPatchError] {
        &self.patch_errors
    }

    pub fn window_scrolls(&self) -> &[(f64, ScrollBehavior)] {
        &self.window_scrolls
    }

    pub fn panel_reveals(&self) -> &[PatchKey] {
        &self.panel_reveals
    }

    /// Top-level nodes appended to the body.
    pub fn panel_count(&self) -> usize {
        self.panel.mounted().len()
    }

    pub fn panel_root(&self) -> Option<PatchKey> {
        self.panel.mounted().first().copied()
    }

    pub fn panel_snapshot(&self) -> Option<Node> {
        self.panel_root().and_then(|root| self.panel.materialize(root))
    }

    pub fn panel_attr(&self, name: &str) -> Option<String> {
        let root = self.panel_root()?;
        self.panel.attr(root, name).map(str::to_string)
    }

    pub fn panel_has_class(&self, class: &str) -> bool {
        self.panel_root().is_some_and(|root| self.panel.has_class(root, class))
    }

    /// First attached panel element carrying `class`.
    pub fn panel_element_with_class(&self, class: &str) -> Option<PatchKey> {
        self.panel
            .attached_elements()
            .into_iter()
            .find(|key| self.panel.has_class(*key, class))
    }

    pub fn panel_text(&self, key: PatchKey) -> String {
        self.panel.text_content(key)
    }

    /// `(anchor, text)` of every outline link in document order.
    pub fn panel_links(&self) -> Vec<(String, String)> {
        self.panel
            .attached_elements()
            .into_iter()
            .filter_map(|key| {
                let anchor = self.panel.attr(key, "data-id")?;
                Some((anchor.to_string(), self.panel.text_content(key)))
            })
            .collect()
    }

    pub fn panel_link_key(&self, anchor: &str) -> Option<PatchKey> {
        self.panel
            .attached_elements()
            .into_iter()
            .find(|key| self.panel.attr(*key, "data-id") == Some(anchor))
    }

    /// Anchors of links currently marked active.
    pub fn active_links(&self) -> Vec<String> {
        self.panel
            .attached_elements()
            .into_iter()
            .filter(|key| self.panel.has_class(*key, "active"))
            .filter_map(|key| self.panel.attr(key, "data-id").map(str::to_string))
            .collect()
    }

    /// Page node for the first heading whose text is `text`.
    pub fn heading(&self, text: &str) -> Option<&Node> {
        let mut found = None;
        walk_with_ancestors(&self.content, |node, _| {
            if found.is_some() {
                return Walk::SkipChildren;
            }
            if node.name().and_then(heading_level).is_some()
                && collapse_whitespace(&text_content(node)) == text
            {
                found = Some(node);
                return Walk::SkipChildren;
            }
            Walk::Continue
        });
        found
    }

    /// Document offset of the first heading whose text is `text`.
    pub fn heading_offset(&self, text: &str) -> Option<f64> {
        let id = self.heading(text)?.id();
        self.document_top(id)
    }

    fn document_top(&self, target: Id) -> Option<f64> {
        let mut row = 0usize;
        let mut found = None;
        walk_with_ancestors(&self.content, |node, ancestors| {
            if found.is_some() || node.name().is_none() {
                return Walk::SkipChildren;
            }
            if ancestors.is_empty() {
                // the content root itself takes no row
                return Walk::Continue;
            }
            if node.id() == target {
                found = Some(row as f64 * CONTENT_ROW);
                return Walk::SkipChildren;
            }
            row += 1;
            Walk::Continue
        });
        found
    }

    fn content_rect(&self, id: Id) -> Option<Rect> {
        let top = self.document_top(id)? - self.scroll_y;
        Some(Rect::new(top, top + CONTENT_ROW))
    }

    /// Offset of a panel element inside the scroll area, if it is in one.
    fn panel_row(&self, key: PatchKey) -> Option<(PatchKey, f64)> {
        let mut current = self.panel.parent(key);
        while let Some(ancestor) = current {
            if self.panel.has_class(ancestor, PANEL_SCROLL_CLASS) {
                let index = self.panel.descendants(ancestor).iter().position(|k| *k == key)?;
                return Some((ancestor, index as f64 * PANEL_ROW));
            }
            current = self.panel.parent(ancestor);
        }
        None
    }

    fn panel_rect(&self, key: PatchKey) -> Option<Rect> {
        if !self.panel.is_attached(key) {
            return None;
        }
        if self.panel.has_class(key, PANEL_SCROLL_CLASS) {
            return Some(Rect::new(PANEL_TOP, PANEL_TOP + self.panel_viewport));
        }
        match self.panel_row(key) {
            Some((_, offset)) => {
                let top = PANEL_TOP + offset - self.panel_scroll;
                Some(Rect::new(top, top + PANEL_ROW))
            }
            None => Some(Rect::new(PANEL_TOP - PANEL_ROW, PANEL_TOP)),
        }
    }

    fn intersecting(&self, id: Id, margin: &RootMargin) -> bool {
        let (top, bottom) = margin.vertical_band(self.viewport_height);
        self.content_rect(id)
            .is_some_and(|r| r.bottom > top && r.top < bottom)
    }

    /// Re-evaluate every intersection observer and queue entries for targets
    /// whose state flipped.
    fn update_intersections(&mut self) {
        let mut batches = Vec::new();
        for (observer, kind) in &self.observers {
            let Observer::Intersections(watch) = kind else {
                continue;
            };
            let entries = watch
                .targets
                .iter()
                .filter_map(|id| {
                    let now = self.intersecting(*id, &watch.margin);
                    (watch.state.get(id) != Some(&now)).then_some(IntersectionEntry {
                        target: *id,
                        is_intersecting: now,
                    })
                })
                .collect::<Vec<_>>();
            if !entries.is_empty() {
                batches.push((*observer, entries));
            }
        }
        for (observer, entries) in batches {
            if let Some(Observer::Intersections(watch)) = self.observers.get_mut(&observer) {
                for entry in &entries {
                    watch.state.insert(entry.target, entry.is_intersecting);
                }
            }
            self.queue.push(PageEvent::Intersections { observer, entries });
        }
    }

    fn find_content_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
        if node.id() == id {
            return Some(node);
        }
        node.children_mut()?
            .iter_mut()
            .find_map(|child| Self::find_content_mut(child, id))
    }

    fn new_observer(&mut self, kind: Observer) -> ObserverId {
        self.next_observer += 1;
        let id = ObserverId::from_raw(self.next_observer);
        self.observers.insert(id, kind);
        id
    }
}

impl PageHost for SimPage {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn document(&mut self) -> Option<Node> {
        Some(self.content.clone())
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.clock.timeout(delay_ms(delay), None)
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        let ms = delay_ms(period);
        self.clock.timeout(ms, Some(ms))
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.clock.cancel(id);
        self.queue.purge(|e| matches!(e, PageEvent::TimerFired(t) if *t == id));
    }

    fn observe_content_mutations(&mut self, detail: MutationDetail) -> ObserverId {
        self.new_observer(Observer::Content(detail))
    }

    fn observe_title(&mut self) -> Option<ObserverId> {
        self.title.as_ref()?;
        Some(self.new_observer(Observer::Title))
    }

    fn observe_intersections(&mut self, targets: &[Id], margin: RootMargin) -> ObserverId {
        let id = self.new_observer(Observer::Intersections(IntersectionWatch {
            targets: targets.to_vec(),
            margin,
            state: HashMap::new(),
        }));
        // initial notification covers every target
        let entries = targets
            .iter()
            .map(|t| IntersectionEntry {
                target: *t,
                is_intersecting: self.intersecting(*t, &margin),
            })
            .collect::<Vec<_>>();
        if let Some(Observer::Intersections(watch)) = self.observers.get_mut(&id) {
            watch.state = entries.iter().map(|e| (e.target, e.is_intersecting)).collect();
        }
        self.queue.push(PageEvent::Intersections { observer: id, entries });
        id
    }

    fn disconnect(&mut self, id: ObserverId) {
        if self.observers.remove(&id).is_none() {
            return;
        }
        self.queue.purge(|e| match e {
            PageEvent::Mutations { observer, .. } | PageEvent::Intersections { observer, .. } => *observer == id,
            _ => false,
        });
    }

    fn install_navigation_hooks(&mut self) {
        self.hooks_installed = true;
    }

    fn listen_resize(&mut self) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId::from_raw(self.next_listener);
        self.listeners.insert(id);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
        if self.listeners.is_empty() {
            self.queue.purge(|e| matches!(e, PageEvent::Resized { .. }));
        }
    }

    fn apply_panel_patches(&mut self, patches: &[DomPatch]) -> Result<(), HostError> {
        self.panel.apply(patches).map_err(|err| {
            log::warn!(target: "page_sim", "patch rejected: {err}");
            self.patch_errors.push(err.clone());
            match err {
                DomPatchError::MissingKey(key) => HostError::UnknownKey(key.0),
                other => HostError::Rejected(other.to_string()),
            }
        })
    }

    fn remove_element_by_dom_id(&mut self, dom_id: &str) -> bool {
        let Some(key) = self
            .panel
            .attached_elements()
            .into_iter()
            .find(|key| self.panel.attr(*key, "id") == Some(dom_id))
        else {
            return false;
        };
        self.panel.apply(&[DomPatch::RemoveNode { key }]).is_ok()
    }

    fn assign_anchor(&mut self, node: Id, anchor: &str) {
        if let Some(target) = Self::find_content_mut(&mut self.content, node) {
            target.set_attr("id", anchor);
        }
    }

    fn ensure_stylesheet(&mut self, dom_id: &str, css: &str) -> bool {
        if self.stylesheets.contains_key(dom_id) {
            return false;
        }
        self.stylesheets.insert(dom_id.to_string(), css.to_string());
        true
    }

    fn rect(&self, node: NodeRef) -> Option<Rect> {
        match node {
            NodeRef::Page(id) => self.content_rect(id),
            NodeRef::Panel(key) => self.panel_rect(key),
        }
    }

    fn scroll_window_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.window_scrolls.push((top, behavior));
        self.scroll_to(top);
    }

    fn scroll_into_view(&mut self, node: NodeRef) {
        match node {
            NodeRef::Page(id) => {
                if let Some(top) = self.document_top(id) {
                    self.scroll_to(top - (self.viewport_height - CONTENT_ROW) / 2.0);
                }
            }
            NodeRef::Panel(key) => {
                if let Some((_, offset)) = self.panel_row(key) {
                    self.panel_scroll = (offset - (self.panel_viewport - PANEL_ROW) / 2.0).max(0.0);
                    self.panel_reveals.push(key);
                }
            }
        }
    }

    fn storage(&mut self) -> &mut dyn KeyValueStore {
        &mut self.storage
    }
}

fn delay_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
