//! Engine configuration. Every delay, threshold and identifier the engine
//! uses comes from here; durations deserialize from milliseconds.

use crate::scope::ScopePattern;
use core_types::RootMargin;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use toc::{LocatorConfig, PanelConfig};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    pub scope: ScopePattern,

    #[serde(deserialize_with = "ms::one")]
    pub history_recheck_delay: Duration,
    #[serde(deserialize_with = "ms::list")]
    pub link_recheck_delays: Vec<Duration>,
    #[serde(deserialize_with = "ms::one")]
    pub poll_interval: Duration,
    #[serde(deserialize_with = "ms::one")]
    pub startup_delay: Duration,
    #[serde(deserialize_with = "ms::optional")]
    pub fallback_delay: Option<Duration>,

    #[serde(deserialize_with = "ms::one")]
    pub readiness_debounce: Duration,
    #[serde(deserialize_with = "ms::one")]
    pub readiness_timeout: Duration,
    #[serde(deserialize_with = "ms::one")]
    pub standing_debounce: Duration,
    #[serde(deserialize_with = "ms::one")]
    pub resize_debounce: Duration,

    pub compact_width: f64,
    pub header_clearance: f64,
    #[serde(deserialize_with = "margin")]
    pub spy_margin: RootMargin,

    pub settings_key: String,
    pub locator: LocatorConfig,
    pub panel: PanelConfig,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            scope: ScopePattern::default(),
            history_recheck_delay: Duration::from_millis(100),
            link_recheck_delays: vec![Duration::from_millis(100), Duration::from_millis(500)],
            poll_interval: Duration::from_millis(500),
            startup_delay: Duration::from_millis(500),
            fallback_delay: Some(Duration::from_millis(800)),
            readiness_debounce: Duration::from_millis(100),
            readiness_timeout: Duration::from_secs(5),
            standing_debounce: Duration::from_millis(500),
            resize_debounce: Duration::from_millis(250),
            compact_width: 1200.0,
            header_clearance: 80.0,
            spy_margin: RootMargin::parse(SPY_MARGIN).unwrap_or_default(),
            settings_key: "zenn-scrap-toc-settings".into(),
            locator: LocatorConfig::default(),
            panel: PanelConfig::default(),
        }
    }
}

const SPY_MARGIN: &str = "-80px 0px -70% 0px";

fn margin<'de, D: Deserializer<'de>>(d: D) -> Result<RootMargin, D::Error> {
    let raw = String::deserialize(d)?;
    RootMargin::parse(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid root margin {raw:?}")))
}

mod ms {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn one<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        // TOML has no null; 0 disables
        let raw = Option::<u64>::deserialize(d)?;
        Ok(raw.filter(|v| *v > 0).map(Duration::from_millis))
    }

    pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Duration>, D::Error> {
        let raw = Vec::<u64>::deserialize(d)?;
        Ok(raw.into_iter().map(Duration::from_millis).collect())
    }
}
