//! Timeline fixtures.
//!
//! A scenario is a TOML file describing the initial page, engine config
//! overrides, scheduled page activity and expectations at points in time:
//!
//! ```toml
//! format = "toc-scenario-v1"
//! name = "content arrives late"
//!
//! [page]
//! url = "https://zenn.dev/alice/scraps/abc"
//!
//! [config]
//! fallback_delay = 0
//!
//! [[step]]
//! at = 1200
//! action = "append"
//! nodes = [{ tag = "h2", text = "Intro", class = "code-line" }]
//!
//! [[expect]]
//! at = 1500
//! initialized = true
//! links = ["Intro"]
//! ```
//!
//! `config` stays an untyped table so this crate does not depend on the
//! engine; the harness deserializes it into the engine's config type.

use crate::page::SimPage;
use crate::script::{NodeSpec, ScriptAction};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const SCENARIO_FORMAT_V1: &str = "toc-scenario-v1";

#[derive(Debug)]
pub enum ScenarioError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    UnsupportedFormat(String),
    /// Expectations must be listed in time order.
    Unordered { at: u64 },
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            ScenarioError::Parse(err) => write!(f, "invalid scenario: {err}"),
            ScenarioError::UnsupportedFormat(format) => write!(f, "unsupported scenario format {format:?}"),
            ScenarioError::Unordered { at } => write!(f, "expectation at {at}ms is out of order"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Io { source, .. } => Some(source),
            ScenarioError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PageSpec {
    pub url: String,
    #[serde(default)]
    pub loading: bool,
    #[serde(default = "default_title")]
    pub title: Option<String>,
    #[serde(default)]
    pub viewport_width: Option<f64>,
    #[serde(default)]
    pub content: Vec<NodeSpec>,
}

fn default_title() -> Option<String> {
    Some("Zenn".into())
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    pub at: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// Observable state at one instant; absent fields are not checked.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expectation {
    pub at: u64,
    pub initialized: Option<bool>,
    pub waiting: Option<bool>,
    pub panels: Option<usize>,
    /// Link texts in document order.
    pub links: Option<Vec<String>>,
    pub content_observers: Option<usize>,
    pub intersection_observers: Option<usize>,
    pub classes: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub format: String,
    pub name: String,
    pub page: PageSpec,
    #[serde(default)]
    pub config: toml::Table,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
    #[serde(default, rename = "expect")]
    pub expectations: Vec<Expectation>,
}

impl Scenario {
    pub fn parse(raw: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(raw).map_err(ScenarioError::Parse)?;
        if scenario.format != SCENARIO_FORMAT_V1 {
            return Err(ScenarioError::UnsupportedFormat(scenario.format));
        }
        let mut last = 0;
        for expectation in &scenario.expectations {
            if expectation.at < last {
                return Err(ScenarioError::Unordered { at: expectation.at });
            }
            last = expectation.at;
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Fresh page at t=0 with every step scheduled.
    pub fn build_page(&self) -> SimPage {
        let spec = &self.page;
        let mut page = if spec.loading {
            SimPage::loading(&spec.url)
        } else {
            SimPage::new(&spec.url)
        };
        page = page.with_content(&spec.content).with_title(spec.title.as_deref());
        if let Some(width) = spec.viewport_width {
            page = page.with_viewport(width, 800.0);
        }
        for step in &self.steps {
            page.schedule(step.at, step.action.clone());
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
format = "toc-scenario-v1"
name = "sample"

[page]
url = "https://zenn.dev/a/scraps/1"
content = [{ tag = "h2", text = "A", class = "code-line" }]

[config]
readiness_timeout = 3000

[[step]]
at = 100
action = "push-state"
url = "https://zenn.dev/a/scraps/2"
title = "Two"

[[step]]
at = 200
action = "clear-content"

[[expect]]
at = 50
panels = 0
"#;

    #[test]
    fn parses_steps_and_config() {
        let s = Scenario::parse(SAMPLE).unwrap();
        assert_eq!(s.steps.len(), 2);
        assert_eq!(
            s.steps[0].action,
            ScriptAction::PushState {
                url: "https://zenn.dev/a/scraps/2".into(),
                title: Some("Two".into())
            }
        );
        assert_eq!(s.steps[1].action, ScriptAction::ClearContent);
        assert_eq!(s.config.get("readiness_timeout").and_then(|v| v.as_integer()), Some(3000));
        assert_eq!(s.expectations[0].panels, Some(0));
    }

    #[test]
    fn rejects_unknown_format() {
        let raw = SAMPLE.replace("toc-scenario-v1", "v0");
        assert!(matches!(Scenario::parse(&raw), Err(ScenarioError::UnsupportedFormat(_))));
    }

    #[test]
    fn rejects_unordered_expectations() {
        let raw = format!("{SAMPLE}\n[[expect]]\nat = 10\n");
        assert!(matches!(Scenario::parse(&raw), Err(ScenarioError::Unordered { at: 10 })));
    }
}
