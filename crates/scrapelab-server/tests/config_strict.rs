#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use scrapelab_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:3000"
sim:
  cache_hit_ratioz: 0.7 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("invalid yaml"));
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen, "0.0.0.0:3000");
    assert_eq!(cfg.sim.tick_interval_ms, 5000);
    assert!((cfg.sim.cache_hit_ratio - 0.7).abs() < f64::EPSILON);
    assert!((cfg.sim.background_error_chance - 0.2).abs() < f64::EPSILON);
}

#[test]
fn unsupported_version_rejected() {
    let err = config::load_from_str("version: 2").expect_err("must fail");
    assert!(err.to_string().contains("unsupported config version"));
}

#[test]
fn tick_interval_range_enforced() {
    let bad = r#"
version: 1
sim:
  tick_interval_ms: 100
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("tick_interval_ms"));
}

#[test]
fn probabilities_must_be_unit_interval() {
    let bad = r#"
version: 1
sim:
  cache_hit_ratio: 1.5
"#;
    assert!(config::load_from_str(bad).is_err());

    let bad = r#"
version: 1
sim:
  background_error_chance: -0.1
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn db_delay_bounds_must_be_ordered() {
    let bad = r#"
version: 1
sim:
  db_delay_min_ms: 200
  db_delay_max_ms: 150
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("db_delay_min_ms"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let cfg = config::load_or_default("/nonexistent/scrapelab.yaml").expect("defaults");
    assert_eq!(cfg.version, 1);
}
