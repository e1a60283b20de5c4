use diktat::infrastructure::observability::{DEFAULT_LOG_FILTER, TracingConfig};

#[test]
fn given_no_level_when_building_config_then_uses_default_filter() {
    let config = TracingConfig::new("production", true, None);

    assert_eq!(config.environment, "production");
    assert!(config.json_format);
    assert_eq!(config.default_filter, DEFAULT_LOG_FILTER);
}

#[test]
fn given_blank_level_when_building_config_then_falls_back_to_default_filter() {
    let config = TracingConfig::new("local", false, Some("   "));

    assert_eq!(config.default_filter, DEFAULT_LOG_FILTER);
}

#[test]
fn given_explicit_level_when_building_config_then_it_is_used_trimmed() {
    let config = TracingConfig::new("local", false, Some(" warn,diktat=info "));

    assert_eq!(config.default_filter, "warn,diktat=info");
}

#[test]
fn given_default_config_then_local_plain_text() {
    let config = TracingConfig::default();

    assert_eq!(config.environment, "local");
    assert!(!config.json_format);
}
