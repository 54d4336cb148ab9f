use std::time::Duration;

use dbdiag::core::config::{usage_text, RawParams};

fn full_params() -> RawParams {
    RawParams {
        server: Some("dbhost01\\PROD".to_string()),
        database: Some("master".to_string()),
        query_timeout_secs: Some("30".to_string()),
        username: Some("diag".to_string()),
        password: Some("secret".to_string()),
        perf_log: Some("perf.csv".to_string()),
        out_log: Some("inventory.txt".to_string()),
        duration_minutes: Some("2".to_string()),
        interval_secs: Some("60".to_string()),
    }
}

const PARAM_NAMES: [&str; 9] = [
    "server",
    "database",
    "query-timeout",
    "user",
    "password",
    "perf-log",
    "out-log",
    "duration",
    "interval",
];

fn without(name: &str) -> RawParams {
    let mut params = full_params();
    match name {
        "server" => params.server = None,
        "database" => params.database = None,
        "query-timeout" => params.query_timeout_secs = None,
        "user" => params.username = None,
        "password" => params.password = None,
        "perf-log" => params.perf_log = None,
        "out-log" => params.out_log = None,
        "duration" => params.duration_minutes = None,
        "interval" => params.interval_secs = None,
        other => panic!("unknown parameter {}", other),
    }
    params
}

#[test]
fn test_all_params_present_produces_config() {
    let config = full_params().validate().expect("should validate");

    assert_eq!(config.server, "dbhost01\\PROD");
    assert_eq!(config.database, "master");
    assert_eq!(config.query_timeout, Duration::from_secs(30));
    assert_eq!(config.duration, Duration::from_secs(120));
    assert_eq!(config.interval, Duration::from_secs(60));
    assert_eq!(config.perf_log.to_str(), Some("perf.csv"));
    assert_eq!(config.out_log.to_str(), Some("inventory.txt"));
}

#[test]
fn test_omitting_any_parameter_fails_validation() {
    for name in PARAM_NAMES {
        let result = without(name).validate();
        let missing = result.expect_err("validation should fail");
        assert!(
            missing.contains(&name),
            "expected {} to be reported, got {:?}",
            name,
            missing
        );
    }
}

#[test]
fn test_empty_string_counts_as_missing() {
    let mut params = full_params();
    params.server = Some("   ".to_string());

    let missing = params.validate().expect_err("validation should fail");
    assert_eq!(missing, vec!["server"]);
}

#[test]
fn test_zero_and_non_numeric_values_rejected() {
    let mut params = full_params();
    params.duration_minutes = Some("0".to_string());
    let missing = params.validate().expect_err("zero duration should fail");
    assert!(missing.contains(&"duration"));

    let mut params = full_params();
    params.interval_secs = Some("sixty".to_string());
    let missing = params.validate().expect_err("non-numeric interval should fail");
    assert!(missing.contains(&"interval"));
}

#[test]
fn test_usage_text_mentions_example_and_recommendation() {
    let usage = usage_text();

    assert!(usage.contains("dbdiag --server"));
    // Worked example and the 7-day / 60-second recommendation
    assert!(usage.contains("dbhost01"));
    assert!(usage.contains("10080"));
    assert!(usage.contains("--interval 60"));
}
