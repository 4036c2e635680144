#![allow(dead_code)]

use page_sim::{NodeSpec, SimPage};
use runtime_toc::{Controller, TocConfig};

pub const SCRAP: &str = "https://zenn.dev/alice/scraps/abc123";
pub const OTHER_SCRAP: &str = "https://zenn.dev/bob/scraps/def456";
pub const ARTICLE: &str = "https://zenn.dev/alice/articles/abc123";
pub const SETTINGS_KEY: &str = "zenn-scrap-toc-settings";

/// Startup delay plus one tick.
pub const STARTUP: u64 = 500;

pub fn run(page: &mut SimPage, ctl: &mut Controller, ms: u64) {
    page.run_for(ms, |p, e| ctl.on_page_event(p, e));
}

pub fn started(page: SimPage, config: TocConfig) -> (SimPage, Controller) {
    let mut page = page;
    let mut ctl = Controller::new(config);
    ctl.start(&mut page);
    (page, ctl)
}

/// Page at `SCRAP` with the given content, engine started and initialised.
pub fn live(content: &[NodeSpec]) -> (SimPage, Controller) {
    let (mut page, mut ctl) = started(SimPage::new(SCRAP).with_content(content), TocConfig::default());
    run(&mut page, &mut ctl, STARTUP);
    assert!(ctl.is_initialized(), "expected a live panel after startup");
    (page, ctl)
}

pub fn abc() -> Vec<NodeSpec> {
    vec![
        NodeSpec::heading(1, "A"),
        NodeSpec::heading(2, "B"),
        NodeSpec::heading(2, "C"),
    ]
}

pub fn no_fallback() -> TocConfig {
    TocConfig {
        fallback_delay: None,
        ..TocConfig::default()
    }
}

pub fn link_texts(page: &SimPage) -> Vec<String> {
    page.panel_links().into_iter().map(|(_, text)| text).collect()
}
