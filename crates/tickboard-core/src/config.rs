//! Runtime configuration.
//!
//! # Environment Variables
//!
//! | Setting | Env Var | Default |
//! |---------|---------|---------|
//! | API base URL | `TICKBOARD_API_URL` | `http://backend:8000` |
//! | Prefetch stagger | `TICKBOARD_STAGGER_MS` | `300` |
//! | Request timeout | `TICKBOARD_TIMEOUT_MS` | none |

use std::env;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://backend:8000";
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_url: String,
    /// Delay between successive background prefetches.
    pub prefetch_stagger: Duration,
    /// Per-request deadline. Unset by default: a slow backend is waited on.
    pub request_timeout_ms: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: String::from(DEFAULT_API_URL),
            prefetch_stagger: DEFAULT_STAGGER,
            request_timeout_ms: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by any `TICKBOARD_*` variables that are set.
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("TICKBOARD_API_URL") {
            config.api_url = url;
        }
        if let Some(ms) = parse_millis(&lookup, "TICKBOARD_STAGGER_MS") {
            config.prefetch_stagger = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_millis(&lookup, "TICKBOARD_TIMEOUT_MS") {
            config.request_timeout_ms = Some(ms);
        }
        config
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_prefetch_stagger(mut self, stagger: Duration) -> Self {
        self.prefetch_stagger = stagger;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_dashboard_backend() {
        let config = DashboardConfig::default();
        assert_eq!(config.api_url, "http://backend:8000");
        assert_eq!(config.prefetch_stagger, Duration::from_millis(300));
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("TICKBOARD_API_URL", "http://localhost:9000"),
            ("TICKBOARD_STAGGER_MS", "50"),
        ]));
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.prefetch_stagger, Duration::from_millis(50));
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[("TICKBOARD_TIMEOUT_MS", "soon")]));
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn timeout_is_opt_in() {
        let config = DashboardConfig::from_lookup(lookup(&[("TICKBOARD_TIMEOUT_MS", "5000")]));
        assert_eq!(config.request_timeout_ms, Some(5_000));
        assert_eq!(
            DashboardConfig::default()
                .with_request_timeout_ms(750)
                .request_timeout_ms,
            Some(750)
        );
    }
}
