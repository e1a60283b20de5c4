pub const DEFAULT_LOG_FILTER: &str = "info,diktat=debug,tower_http=debug";

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, json_format: bool, level: Option<&str>) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            default_filter: level
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or(DEFAULT_LOG_FILTER)
                .to_string(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new("local", false, None)
    }
}
