use chrono::NaiveDate;
use report_filters::FilterManagerRegistry;
use report_filters::config::{
    ConfigError, SelectionSource, builtin_template_names, default_config, load_builtin_template,
    load_config, load_config_from_path,
};
use std::fs;
use tempfile::tempdir;

const CUSTOM: &str = r#"
profile_name = "regional"

[[panes]]
id = "regional-report-filters"

[[panes.ranges]]
id = "closedDate"
saved_key = "opp_date"
kind = "date"
enabled = true
comparator = "BF"
operand1 = "{year}-06-30"

[[panes.selections]]
id = "stage"
title = "Stage"
source = { kind = "hardcoded", options = ["Lead", "Won", "Lost"] }

[[panes.selections]]
id = "territories"
title = "Territory"
saved_key = "territory"
source = { kind = "data-source" }
"#;

#[test]
fn test_builtin_templates_are_listed() {
    assert!(builtin_template_names().contains(&"mgmt"));
    let config = load_builtin_template("config/templates/mgmt.toml").expect("template loads");
    assert_eq!(config.profile_name, "mgmt");
    assert!(load_builtin_template("nope").is_none());
}

#[test]
fn test_default_config_has_management_panes() {
    let config = default_config();
    assert_eq!(
        config.pane_ids(),
        vec!["mgmt-report-filters", "bst-mgmt-report-filters"]
    );
    assert!(config.tables.get("FORECAST_SECTOR").is_some());
}

#[test]
fn test_no_path_means_default_config() {
    let config = load_config(None).expect("default config");
    assert_eq!(config.profile_name, default_config().profile_name);
}

#[test]
fn test_custom_profile_from_file() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("regional.toml");
    fs::write(&path, CUSTOM).expect("write config");

    let config = load_config_from_path(&path).expect("config should parse");
    assert_eq!(config.profile_name, "regional");
    let pane = config.pane("regional-report-filters").expect("pane");
    assert_eq!(pane.ranges.len(), 1);
    assert!(matches!(
        &pane.selections[1].source,
        SelectionSource::DataSource { value_type: None, .. }
    ));

    let today = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");
    let mut registry = FilterManagerRegistry::from_config(&config, today).expect("registry");
    let manager = registry
        .get_mut("regional-report-filters")
        .expect("pane registered");
    let filters = manager.get_filters();
    assert_eq!(filters.range("closedDate").expect("range").operand1(), "2025-06-30");
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempdir().expect("create temp dir");
    let err = load_config_from_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_bad_toml_is_parse_error() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[[panes]\nid = ").expect("write config");

    let err = load_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn test_unknown_comparator_is_parse_error() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("bad-comparator.toml");
    fs::write(
        &path,
        r#"
[[panes]]
id = "p"

[[panes.ranges]]
id = "closedDate"
kind = "date"
comparator = "ZZ"
"#,
    )
    .expect("write config");

    assert!(matches!(
        load_config_from_path(&path),
        Err(ConfigError::Parse { .. })
    ));
}
