use media_processor::infrastructure::observability::TracingConfig;
use media_processor::presentation::config::{Environment, LoggingSettings};

#[test]
fn given_default_config_when_created_then_environment_is_set() {
    let config = TracingConfig::default();
    assert!(!config.environment.is_empty());
    assert_eq!(config.level, "info");
}

#[test]
fn given_logging_settings_when_building_config_then_fields_copied() {
    let settings = LoggingSettings {
        level: "warn".to_string(),
        json: true,
    };

    let config = TracingConfig::from_settings(&settings, Environment::Prod);

    assert_eq!(config.environment, "prod");
    assert!(config.json_format);
    assert_eq!(config.level, "warn");
}

#[test]
fn given_level_when_building_default_filter_then_crate_and_http_are_debug() {
    let config = TracingConfig::from_settings(
        &LoggingSettings {
            level: "info".to_string(),
            json: false,
        },
        Environment::Local,
    );

    assert_eq!(
        config.default_filter(),
        "info,media_processor=debug,tower_http=debug"
    );
}
