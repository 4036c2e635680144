use runtime_toc::{ScopePattern, TocConfig};
use std::time::Duration;

fn from_toml(raw: &str) -> Result<TocConfig, toml::de::Error> {
    toml::from_str(raw)
}

#[test]
fn partial_override_keeps_other_defaults() {
    let config = from_toml(
        r#"
        poll_interval = 250
        link_recheck_delays = [50]
        compact_width = 900.0

        [panel.labels]
        title = "Contents"
        "#,
    )
    .unwrap();
    assert_eq!(config.poll_interval, Duration::from_millis(250));
    assert_eq!(config.link_recheck_delays, vec![Duration::from_millis(50)]);
    assert_eq!(config.compact_width, 900.0);
    assert_eq!(config.panel.labels.title, "Contents");
    assert_eq!(config.panel.labels.collapsed_glyph, "▶");
    assert_eq!(config.startup_delay, Duration::from_millis(500));
    assert_eq!(config.settings_key, "zenn-scrap-toc-settings");
}

#[test]
fn zero_fallback_disables_it() {
    assert_eq!(from_toml("fallback_delay = 0").unwrap().fallback_delay, None);
    assert_eq!(
        from_toml("fallback_delay = 1500").unwrap().fallback_delay,
        Some(Duration::from_millis(1500))
    );
}

#[test]
fn spy_margin_is_parsed() {
    let config = from_toml(r#"spy_margin = "-40px 0px -50% 0px""#).unwrap();
    assert_eq!(config.spy_margin.to_string(), "-40px 0px -50% 0px");
    assert!(from_toml(r#"spy_margin = "sideways""#).is_err());
}

#[test]
fn scope_and_locator_overrides() {
    let config = from_toml(
        r#"
        [scope]
        host = "example.com"

        [locator]
        max_level = 3
        excluded = ["blockquote"]
        "#,
    )
    .unwrap();
    assert!(config.scope.contains("https://example.com/carol/scraps/x1"));
    assert!(!config.scope.contains("https://zenn.dev/carol/scraps/x1"));
    assert_eq!(config.locator.max_level, 3);
    assert_eq!(config.locator.excluded, vec!["blockquote".to_string()]);
    assert_eq!(ScopePattern::default().host, "zenn.dev");
}
