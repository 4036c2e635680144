mod common;

use app_api::PageHost;
use common::*;
use page_sim::{NodeSpec, SimPage};
use runtime_toc::TocConfig;

#[test]
fn startup_initialises_once_headings_are_present() {
    let (mut page, mut ctl) = started(SimPage::new(SCRAP).with_content(&abc()), TocConfig::default());
    assert!(page.hooks_installed());
    assert_eq!(page.title_observers(), 1);

    run(&mut page, &mut ctl, STARTUP - 1);
    assert!(!ctl.is_initialized());
    assert_eq!(page.panel_count(), 0);

    run(&mut page, &mut ctl, 1);
    assert!(ctl.is_initialized());
    assert!(!ctl.is_waiting_for_content());
    assert_eq!(page.panel_count(), 1);
    assert_eq!(page.stylesheet_count(), 1);
    assert_eq!(link_texts(&page), vec!["A", "B", "C"]);
    assert_eq!(page.content_observers(), 1);
    assert_eq!(page.intersection_observers(), 1);
    assert_eq!(page.resize_listeners(), 1);
    assert!(page.patch_errors().is_empty());
}

#[test]
fn generated_anchors_are_written_back() {
    let (page, _ctl) = live(&[
        NodeSpec::heading(2, "Hello World"),
        NodeSpec::heading(2, "Kept").with_id("custom"),
        NodeSpec::heading(2, "Hello World"),
    ]);
    assert_eq!(page.heading("Hello World").and_then(|h| h.attr("id")), Some("hello-world"));
    assert_eq!(page.heading("Kept").and_then(|h| h.attr("id")), Some("custom"));
    let anchors = page.panel_links().into_iter().map(|(a, _)| a).collect::<Vec<_>>();
    // identical text, identical anchor
    assert_eq!(anchors, vec!["hello-world", "custom", "hello-world"]);
}

#[test]
fn init_twice_yields_one_panel_and_one_spy() {
    let (mut page, mut ctl) = started(SimPage::new(SCRAP).with_content(&abc()), TocConfig::default());
    assert!(ctl.request_init(&mut page));
    assert!(!ctl.request_init(&mut page));
    run(&mut page, &mut ctl, STARTUP);
    assert_eq!(page.panel_count(), 1);
    assert_eq!(page.intersection_observers(), 1);
    assert_eq!(page.content_observers(), 1);
    assert_eq!(page.resize_listeners(), 1);
}

#[test]
fn watch_for_content_is_a_no_op_unless_idle() {
    let (mut page, mut ctl) = live(&abc());
    ctl.watch_for_content(&mut page);
    assert!(!ctl.is_waiting_for_content());
    assert_eq!(page.content_observers(), 1);

    ctl.teardown(&mut page);
    ctl.watch_for_content(&mut page);
    ctl.watch_for_content(&mut page);
    assert!(ctl.is_waiting_for_content());
    assert_eq!(page.content_observers(), 1);
}

#[test]
fn teardown_releases_everything() {
    let (mut page, mut ctl) = live(&abc());
    ctl.teardown(&mut page);

    assert!(!ctl.is_initialized());
    assert!(!ctl.is_waiting_for_content());
    assert_eq!(page.panel_count(), 0);
    assert_eq!(page.content_observers(), 0);
    assert_eq!(page.intersection_observers(), 0);
    assert_eq!(page.resize_listeners(), 0);

    let callbacks = page.observer_callbacks();
    page.append_specs(&[NodeSpec::heading(2, "D")]);
    page.scroll_to(400.0);
    run(&mut page, &mut ctl, 2_000);
    assert_eq!(page.observer_callbacks(), callbacks);
    assert_eq!(page.panel_count(), 0);

    // and the round trip works
    assert!(ctl.request_init(&mut page));
    assert_eq!(link_texts(&page), vec!["A", "B", "C", "D"]);
}

#[test]
fn teardown_is_safe_when_idle() {
    let (mut page, mut ctl) = started(SimPage::new(ARTICLE), TocConfig::default());
    ctl.teardown(&mut page);
    ctl.teardown(&mut page);
    assert_eq!(page.panel_count(), 0);
    assert!(page.patch_errors().is_empty());
}

#[test]
fn late_content_initialises_after_readiness_debounce() {
    let (mut page, mut ctl) = started(SimPage::new(SCRAP), no_fallback());
    run(&mut page, &mut ctl, STARTUP);
    assert!(ctl.is_waiting_for_content());
    assert_eq!(page.content_observers(), 1);

    run(&mut page, &mut ctl, 100);
    page.append_specs(&[NodeSpec::paragraph("loading...")]);
    run(&mut page, &mut ctl, 150);
    assert!(ctl.is_waiting_for_content(), "paragraphs alone are not content");

    page.append_specs(&[NodeSpec::heading(2, "Intro")]);
    run(&mut page, &mut ctl, 99);
    assert!(!ctl.is_initialized());
    run(&mut page, &mut ctl, 1);
    assert!(ctl.is_initialized());
    assert!(!ctl.is_waiting_for_content());
    // readiness observer gone, standing watcher in its place
    assert_eq!(page.content_observers(), 1);
    assert_eq!(link_texts(&page), vec!["Intro"]);
}

#[test]
fn readiness_gives_up_after_timeout() {
    let config = no_fallback();
    let timeout = config.readiness_timeout.as_millis() as u64;
    let (mut page, mut ctl) = started(SimPage::new(SCRAP), config);
    run(&mut page, &mut ctl, STARTUP);
    assert!(ctl.is_waiting_for_content());

    page.append_specs(&[NodeSpec::paragraph("still nothing")]);
    run(&mut page, &mut ctl, timeout - 1);
    assert!(ctl.is_waiting_for_content());

    run(&mut page, &mut ctl, 1);
    assert!(!ctl.is_waiting_for_content());
    assert!(!ctl.is_initialized());
    assert_eq!(page.content_observers(), 0);
    assert_eq!(page.panel_count(), 0);
    // only the poll interval survives
    assert_eq!(page.pending_timers(), 1);
}

#[test]
fn fallback_forces_an_empty_panel_then_standing_watcher_fills_it() {
    let config = TocConfig::default();
    let fallback = config.fallback_delay.map(|d| d.as_millis() as u64).unwrap_or_default();
    let (mut page, mut ctl) = started(SimPage::new(SCRAP), config);
    run(&mut page, &mut ctl, STARTUP + fallback - 1);
    assert!(ctl.is_waiting_for_content());

    run(&mut page, &mut ctl, 1);
    assert!(ctl.is_initialized());
    assert!(page.panel_element_with_class("zenn-toc-empty").is_some());
    assert!(link_texts(&page).is_empty());
    assert_eq!(page.content_observers(), 1);

    page.append_specs(&[NodeSpec::heading(2, "Late")]);
    run(&mut page, &mut ctl, 500);
    assert_eq!(link_texts(&page), vec!["Late"]);
    assert!(page.panel_element_with_class("zenn-toc-empty").is_none());
}

#[test]
fn loading_document_defers_startup_until_dom_ready() {
    let (mut page, mut ctl) = started(SimPage::loading(SCRAP).with_content(&abc()), TocConfig::default());
    run(&mut page, &mut ctl, 2_000);
    assert!(!ctl.is_initialized());

    page.finish_loading();
    run(&mut page, &mut ctl, STARTUP);
    assert!(ctl.is_initialized());
}

#[test]
fn out_of_scope_start_does_nothing() {
    let (mut page, mut ctl) = started(SimPage::new(ARTICLE).with_content(&abc()), TocConfig::default());
    run(&mut page, &mut ctl, 3_000);
    assert!(!ctl.is_initialized());
    assert!(!ctl.is_waiting_for_content());
    assert_eq!(page.panel_count(), 0);
    assert_eq!(page.content_observers(), 0);
    assert!(!ctl.request_init(&mut page));
}

#[test]
fn shutdown_stops_navigation_detection() {
    let (mut page, mut ctl) = live(&abc());
    ctl.shutdown(&mut page);
    assert_eq!(page.panel_count(), 0);
    assert_eq!(page.title_observers(), 0);
    assert_eq!(page.pending_timers(), 0);

    page.set_location_silently(OTHER_SCRAP);
    run(&mut page, &mut ctl, 2_000);
    assert_eq!(ctl.current_url(), Some(SCRAP));
    assert_eq!(page.location(), OTHER_SCRAP);
}
