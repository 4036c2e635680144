//! Timeline fixtures under `tests/fixtures/`, replayed against the engine.

use page_sim::{Expectation, Scenario, SimPage};
use runtime_toc::{Controller, TocConfig};
use std::path::{Path, PathBuf};

fn fixtures() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut paths = std::fs::read_dir(&dir)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", dir.display()))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect::<Vec<_>>();
    paths.sort();
    paths
}

fn check(page: &SimPage, ctl: &Controller, expect: &Expectation) -> Vec<String> {
    let mut problems = Vec::new();
    let mut compare = |what: &str, want: String, got: String| {
        if want != got {
            problems.push(format!("{what}: expected {want}, got {got}"));
        }
    };
    if let Some(want) = expect.initialized {
        compare("initialized", want.to_string(), ctl.is_initialized().to_string());
    }
    if let Some(want) = expect.waiting {
        compare("waiting", want.to_string(), ctl.is_waiting_for_content().to_string());
    }
    if let Some(want) = expect.panels {
        compare("panels", want.to_string(), page.panel_count().to_string());
    }
    if let Some(want) = &expect.links {
        let got = page.panel_links().into_iter().map(|(_, text)| text).collect::<Vec<_>>();
        compare("links", format!("{want:?}"), format!("{got:?}"));
    }
    if let Some(want) = expect.content_observers {
        compare("content observers", want.to_string(), page.content_observers().to_string());
    }
    if let Some(want) = expect.intersection_observers {
        compare(
            "intersection observers",
            want.to_string(),
            page.intersection_observers().to_string(),
        );
    }
    for class in expect.classes.iter().flatten() {
        if !page.panel_has_class(class) {
            problems.push(format!("panel root lacks class {class:?}"));
        }
    }
    problems
}

fn replay(path: &Path) -> Vec<String> {
    let scenario = match Scenario::load(path) {
        Ok(s) => s,
        Err(err) => return vec![err.to_string()],
    };
    let config: TocConfig = match toml::Value::Table(scenario.config.clone()).try_into() {
        Ok(c) => c,
        Err(err) => return vec![format!("config: {err}")],
    };

    let mut page = scenario.build_page();
    let mut ctl = Controller::new(config);
    ctl.start(&mut page);

    let mut failures = Vec::new();
    for expect in &scenario.expectations {
        let wait = expect.at.saturating_sub(page.now_ms());
        page.run_for(wait, |p, e| ctl.on_page_event(p, e));
        failures.extend(
            check(&page, &ctl, expect)
                .into_iter()
                .map(|p| format!("{} @{}ms: {p}", scenario.name, expect.at)),
        );
    }
    if !page.patch_errors().is_empty() {
        failures.push(format!("{}: rejected patches {:?}", scenario.name, page.patch_errors()));
    }
    failures
}

#[test]
fn fixtures_replay_cleanly() {
    let paths = fixtures();
    assert!(!paths.is_empty(), "no scenario fixtures found");
    let failures = paths.iter().flat_map(|p| replay(p)).collect::<Vec<_>>();
    assert!(failures.is_empty(), "scenario failures:\n{}", failures.join("\n"));
}
