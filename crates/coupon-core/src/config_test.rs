use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("GEMINI_API_KEY", "test-key");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "COUPON_ENV"));
}

#[test]
fn build_app_config_fails_without_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GEMINI_API_KEY"),
        "expected MissingEnvVar(GEMINI_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_api_key_as_missing() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_applies_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.gemini_api_key, "test-key");
    assert_eq!(cfg.gemini_model, DEFAULT_GEMINI_MODEL);
    assert_eq!(cfg.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.cors_origins.len(), 5);
    assert!(cfg
        .cors_origins
        .contains(&"http://localhost:5173".to_string()));
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("COUPON_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COUPON_BIND_ADDR"),
        "expected InvalidEnvVar(COUPON_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_empty_model() {
    let mut map = full_env();
    map.insert("COUPON_GEMINI_MODEL", "");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COUPON_GEMINI_MODEL")
    );
}

#[test]
fn build_app_config_honors_overrides() {
    let mut map = full_env();
    map.insert("COUPON_ENV", "production");
    map.insert("COUPON_BIND_ADDR", "127.0.0.1:9000");
    map.insert("COUPON_GEMINI_MODEL", "gemini-2.5-flash");
    map.insert("COUPON_GEMINI_BASE_URL", "http://localhost:1234");
    map.insert("COUPON_CORS_ORIGINS", " https://a.example , ,https://b.example");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
    assert_eq!(cfg.gemini_model, "gemini-2.5-flash");
    assert_eq!(cfg.gemini_base_url, "http://localhost:1234");
    assert_eq!(
        cfg.cors_origins,
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("test-key"));
    assert!(debug.contains("[redacted]"));
}
