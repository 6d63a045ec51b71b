//! 选项加载器测试

use config_abstractions::OptionValue;
use config_impl::{EnvironmentOptionsProvider, FileOptionsProvider, MapOptionsProvider, OptionsLoader};
use di_common::{ConfigError, DiagnosticKind, Severity};
use std::collections::HashMap;
use std::io::Write;

#[tokio::test]
async fn test_defaults_without_providers() {
    let loaded = OptionsLoader::new().load().await.unwrap();
    assert!(loaded.diagnostics.is_empty());
    assert!(!loaded.options.header_compilation);
    assert!(loaded.options.warn_unused_scoped_bindings);
    assert!(loaded.options.emit_on_warnings);
}

#[tokio::test]
async fn test_higher_priority_source_wins() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "header_compilation = true").unwrap();
    writeln!(file, "strict_multibinding_ordering = true").unwrap();

    let mut variables = HashMap::new();
    variables.insert("DI_HEADER_COMPILATION".to_string(), "false".to_string());

    let loader = OptionsLoader::new()
        .with_provider(Box::new(FileOptionsProvider::new(file.path())))
        .with_provider(Box::new(
            EnvironmentOptionsProvider::new("DI").with_variables(variables),
        ))
        .with_provider(Box::new(
            MapOptionsProvider::new("command-line").with_argument("ahead_of_time_subcomponents=true"),
        ));
    let loaded = loader.load().await.unwrap();

    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    assert!(!loaded.options.header_compilation);
    assert!(loaded.options.strict_multibinding_ordering);
    assert!(loaded.options.ahead_of_time_subcomponents);
    assert_eq!(loaded.raw[0].source, "command-line");
}

#[tokio::test]
async fn test_plugin_options_are_kept_as_values() {
    let loader = OptionsLoader::new()
        .with_supported_options(["audit.level"])
        .with_provider(Box::new(
            MapOptionsProvider::new("command-line")
                .with_option("audit.level", "strict")
                .with_option("unknown", "1"),
        ));
    let loaded = loader.load().await.unwrap();

    assert_eq!(
        loaded.options.get("audit.level"),
        Some(&OptionValue::Text("strict".to_string()))
    );
    assert_eq!(loaded.diagnostics.len(), 1);
    assert_eq!(loaded.diagnostics[0].severity, Severity::Warning);
    assert!(!loaded.has_errors());
}

#[tokio::test]
async fn test_invalid_boolean_falls_back_to_default() {
    let loader = OptionsLoader::new().with_provider(Box::new(
        MapOptionsProvider::new("command-line").with_option("emit_on_warnings", "maybe"),
    ));
    let loaded = loader.load().await.unwrap();

    assert!(loaded.has_errors());
    assert_eq!(loaded.diagnostics[0].kind, DiagnosticKind::ConfigurationError);
    assert!(loaded.options.emit_on_warnings);
}

#[tokio::test]
async fn test_provider_failure_is_fatal() {
    let loader = OptionsLoader::new()
        .with_provider(Box::new(FileOptionsProvider::new("/nonexistent/di-options.toml")));
    assert!(matches!(
        loader.load().await,
        Err(ConfigError::FileNotFound { .. })
    ));
}
