//! Application configuration loaded from environment variables.

use commander::DefaultRulesPolicy;

/// Runtime configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `COMMANDER_DEFAULT_RULES`: `cached` or `per-call` (default: `cached`)
/// - `COMMANDER_DEMO_WIDGETS`: widgets pushed through the demo run (default: `3`)
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub default_rules: DefaultRulesPolicy,
    pub demo_widgets: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            default_rules: lookup("COMMANDER_DEFAULT_RULES")
                .map(|value| parse_policy(&value))
                .unwrap_or(defaults.default_rules),
            demo_widgets: lookup("COMMANDER_DEMO_WIDGETS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.demo_widgets),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_rules: DefaultRulesPolicy::Cached,
            demo_widgets: 3,
        }
    }
}

/// Unknown values fall back to caching.
fn parse_policy(value: &str) -> DefaultRulesPolicy {
    match value.trim().to_ascii_lowercase().as_str() {
        "per-call" | "per_call" | "percall" => DefaultRulesPolicy::PerCall,
        _ => DefaultRulesPolicy::Cached,
    }
}
