mod common;

use app_api::PageHost;
use common::*;
use core_types::ScrollBehavior;
use page_sim::{NodeSpec, SimPage};
use runtime_toc::TocConfig;
use toc::{PanelPosition, PanelSettings};

fn spaced() -> Vec<NodeSpec> {
    let mut content = vec![NodeSpec::heading(1, "A")];
    content.extend((0..5).map(|i| NodeSpec::paragraph(&format!("a{i}"))));
    content.push(NodeSpec::heading(2, "B"));
    content.extend((0..5).map(|i| NodeSpec::paragraph(&format!("b{i}"))));
    content.push(NodeSpec::heading(2, "C"));
    content
}

#[test]
fn panel_structure_follows_the_outline() {
    let (page, _ctl) = live(&[
        NodeSpec::heading(1, "A"),
        NodeSpec::heading(2, "B"),
        NodeSpec::heading(2, "C"),
        NodeSpec::heading(1, "D"),
    ]);
    let root = page.panel_snapshot().unwrap();
    assert_eq!(root.attr("id"), Some("zenn-scrap-toc"));
    assert_eq!(root.attr("data-position"), Some("right"));
    assert!(page.panel_has_class("expanded"));
    assert!(page.panel_has_class("position-right"));

    let top = page.panel_element_with_class("zenn-toc-level-0").unwrap();
    let nested = page.panel_element_with_class("zenn-toc-level-1").unwrap();
    assert_eq!(page.panel_text(top), "ABCD");
    assert_eq!(page.panel_text(nested), "BC");
    assert_eq!(link_texts(&page), vec!["A", "B", "C", "D"]);
}

#[test]
fn excluded_headings_stay_out_of_the_panel() {
    let (page, _ctl) = live(&[
        NodeSpec::heading(2, "Quoted").within("blockquote"),
        NodeSpec::heading(2, "Folded").within("details"),
        NodeSpec::heading(2, "Kept"),
    ]);
    assert_eq!(link_texts(&page), vec!["Kept"]);
}

#[test]
fn toggle_flips_state_and_persists_immediately() {
    let (mut page, mut ctl) = live(&abc());
    let toggle = page.panel_element_with_class("zenn-toc-toggle").unwrap();
    assert_eq!(page.panel_text(toggle), "▼");

    assert!(page.click_panel(toggle));
    run(&mut page, &mut ctl, 0);
    assert!(page.panel_has_class("collapsed"));
    assert!(!page.panel_has_class("expanded"));
    assert_eq!(page.panel_text(toggle), "▶");
    assert_eq!(page.stored(SETTINGS_KEY), Some(r#"{"isExpanded":false,"position":"right"}"#));
    assert!(!ctl.settings().is_expanded);

    // the next panel picks the stored state up
    page.push_state(OTHER_SCRAP);
    run(&mut page, &mut ctl, 100);
    assert!(page.panel_has_class("collapsed"));

    let toggle = page.panel_element_with_class("zenn-toc-toggle").unwrap();
    page.click_panel(toggle);
    run(&mut page, &mut ctl, 0);
    assert!(page.panel_has_class("expanded"));
    assert_eq!(page.storage_writes(), 2);
}

#[test]
fn stored_position_is_applied() {
    let mut page = SimPage::new(SCRAP).with_content(&abc());
    page.set_stored(SETTINGS_KEY, r#"{"position":"left"}"#);
    let (mut page, mut ctl) = started(page, TocConfig::default());
    run(&mut page, &mut ctl, STARTUP);
    assert!(page.panel_has_class("position-left"));
    assert!(page.panel_has_class("expanded"));
    assert_eq!(page.panel_attr("data-position").as_deref(), Some("left"));
    assert_eq!(ctl.settings().position, PanelPosition::Left);
}

#[test]
fn corrupt_settings_fall_back_to_defaults() {
    let mut page = SimPage::new(SCRAP).with_content(&abc());
    page.set_stored(SETTINGS_KEY, "{definitely not json");
    let (mut page, mut ctl) = started(page, TocConfig::default());
    run(&mut page, &mut ctl, STARTUP);
    assert!(ctl.is_initialized());
    assert_eq!(ctl.settings(), PanelSettings::default());
    assert!(page.panel_has_class("expanded"));
    assert!(page.panel_has_class("position-right"));
}

#[test]
fn narrow_viewport_gets_compact_layout() {
    let (mut page, mut ctl) = started(
        SimPage::new(SCRAP).with_content(&abc()).with_viewport(1000.0, 800.0),
        TocConfig::default(),
    );
    run(&mut page, &mut ctl, STARTUP);
    assert!(page.panel_has_class("compact"));

    page.resize(1300.0);
    run(&mut page, &mut ctl, 100);
    page.resize(1250.0);
    run(&mut page, &mut ctl, 249);
    assert!(page.panel_has_class("compact"), "resize not debounced");
    run(&mut page, &mut ctl, 1);
    assert!(!page.panel_has_class("compact"));

    page.resize(800.0);
    run(&mut page, &mut ctl, 250);
    assert!(page.panel_has_class("compact"));
}

#[test]
fn scroll_spy_highlights_the_heading_near_the_top() {
    let (mut page, mut ctl) = live(&spaced());
    assert_eq!(ctl.active_anchor(), None);

    let b = page.heading_offset("B").unwrap();
    page.scroll_to(b - 100.0);
    run(&mut page, &mut ctl, 0);
    assert_eq!(ctl.active_anchor(), Some("b"));
    assert_eq!(page.active_links(), vec!["b"]);

    let c = page.heading_offset("C").unwrap();
    page.scroll_to(c - 100.0);
    run(&mut page, &mut ctl, 0);
    assert_eq!(page.active_links(), vec!["c"]);
}

#[test]
fn highlight_survives_an_outline_rebuild() {
    let (mut page, mut ctl) = live(&spaced());
    let b = page.heading_offset("B").unwrap();
    page.scroll_to(b - 100.0);
    run(&mut page, &mut ctl, 0);

    page.append_specs(&[NodeSpec::heading(2, "D")]);
    run(&mut page, &mut ctl, 500);
    assert_eq!(link_texts(&page), vec!["A", "B", "C", "D"]);
    assert_eq!(page.active_links(), vec!["b"]);
    // the spy was replaced, not duplicated
    assert_eq!(page.intersection_observers(), 1);
}

#[test]
fn active_entry_is_kept_visible_inside_the_panel() {
    let content = (0..40)
        .map(|i| NodeSpec::heading(2, &format!("Section {i}")))
        .collect::<Vec<_>>();
    let (mut page, mut ctl) = live(&content);

    let last = page.heading_offset("Section 39").unwrap();
    page.scroll_to(last - 100.0);
    run(&mut page, &mut ctl, 0);
    assert_eq!(ctl.active_anchor(), Some("section-39"));
    let key = page.panel_link_key("section-39").unwrap();
    assert_eq!(page.panel_reveals().last(), Some(&key));
}

#[test]
fn clicking_an_entry_scrolls_below_the_header() {
    let (mut page, mut ctl) = live(&spaced());
    let b = page.heading_offset("B").unwrap();
    let link = page.panel_link_key("b").unwrap();
    page.click_panel(link);
    run(&mut page, &mut ctl, 0);

    let clearance = ctl.config().header_clearance;
    assert_eq!(page.window_scrolls(), &[(b - clearance, ScrollBehavior::Smooth)]);
    assert_eq!(page.scroll_y(), b - clearance);
    assert_eq!(ctl.active_anchor(), Some("b"));
}

#[test]
fn standing_watcher_ignores_batches_without_headings() {
    let (mut page, mut ctl) = live(&abc());
    let before = page.panel_link_key("a");

    page.append_specs(&[NodeSpec::paragraph("comment")]);
    run(&mut page, &mut ctl, 1_000);
    assert_eq!(page.panel_link_key("a"), before);
}

#[test]
fn standing_watcher_remembers_headings_from_earlier_batches() {
    let (mut page, mut ctl) = live(&abc());
    page.append_specs(&[NodeSpec::heading(2, "D")]);
    run(&mut page, &mut ctl, 200);
    page.append_specs(&[NodeSpec::paragraph("after")]);
    run(&mut page, &mut ctl, 499);
    assert_eq!(link_texts(&page), vec!["A", "B", "C"]);
    run(&mut page, &mut ctl, 1);
    assert_eq!(link_texts(&page), vec!["A", "B", "C", "D"]);
}
