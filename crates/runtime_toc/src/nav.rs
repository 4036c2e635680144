//! Navigation watcher.
//!
//! The host app navigates without page loads, so a URL change is inferred
//! from five independent channels: history push/replace, popstate, link
//! activation, `<title>` mutations and a polling interval. Every channel ends
//! in the same URL comparison, so duplicates collapse no matter which channel
//! fires first; polling bounds detection latency when all others miss.

use crate::config::TocConfig;
use crate::timers::{TimerPurpose, TimerRegistry};
use app_api::PageHost;
use bus::PageEvent;
use core_types::{ObserverId, TimerId};

#[derive(Debug, Default)]
pub struct NavigationWatcher {
    poll: Option<TimerId>,
    title_observer: Option<ObserverId>,
    hooks_installed: bool,
}

impl NavigationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry, config: &TocConfig) {
        if !self.hooks_installed {
            host.install_navigation_hooks();
            self.hooks_installed = true;
        }
        if self.title_observer.is_none() {
            self.title_observer = host.observe_title();
            if self.title_observer.is_none() {
                log::debug!(target: "toc.nav", "no <title> element; relying on other channels");
            }
        }
        if let Some(old) = self.poll.take() {
            timers.cancel(host, old);
        }
        self.poll = Some(timers.repeat(host, config.poll_interval, TimerPurpose::Poll));
        log::info!(target: "toc.nav", "URL observer setup complete");
    }

    /// Stop polling and title observation. History hooks stay installed;
    /// their signals are harmless once the controller is idle.
    pub fn stop(&mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry) {
        if let Some(id) = self.poll.take() {
            timers.cancel(host, id);
        }
        if let Some(id) = self.title_observer.take() {
            host.disconnect(id);
        }
    }

    pub fn is_title_observer(&self, id: ObserverId) -> bool {
        self.title_observer == Some(id)
    }

    /// Translate a navigation-channel event into deferred URL re-checks.
    /// Returns false for events that are not navigation signals.
    pub fn on_signal(
        &mut self,
        host: &mut dyn PageHost,
        timers: &mut TimerRegistry,
        config: &TocConfig,
        event: &PageEvent,
    ) -> bool {
        match event {
            PageEvent::HistoryPushed | PageEvent::HistoryReplaced | PageEvent::PopState => {
                log::trace!(target: "toc.nav", "{} signal", event.kind());
                timers.schedule(host, config.history_recheck_delay, TimerPurpose::UrlRecheck);
                true
            }
            PageEvent::LinkActivated { href } => {
                if config.scope.is_same_site(href) {
                    log::trace!(target: "toc.nav", "link activation to {href}");
                    for delay in &config.link_recheck_delays {
                        timers.schedule(host, *delay, TimerPurpose::UrlRecheck);
                    }
                }
                true
            }
            _ => false,
        }
    }
}

