//! Exposition format vectors.
//!
//! Pins the exact byte-level output of `Registry::render()` so that any
//! scraper consuming the endpoint keeps working: exact sample lines,
//! registration order, first-seen series order, cumulative histogram
//! buckets, escaping, and render determinism.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use scrapelab_core::{Registry, ScrapeLabError};

#[test]
fn empty_registry_renders_empty_string() {
    let r = Registry::new();
    assert_eq!(r.render(), "");
}

#[test]
fn counter_exact_line() {
    let r = Registry::new();
    r.define_counter("orders_total", "Total orders processed.", &["status", "payment_method"])
        .unwrap();
    let h = r
        .get_or_create_series("orders_total", &["completed", "credit_card"])
        .unwrap();
    h.inc().unwrap();

    let out = r.render();
    assert_eq!(
        out,
        "# HELP orders_total Total orders processed.\n\
         # TYPE orders_total counter\n\
         orders_total{status=\"completed\",payment_method=\"credit_card\"} 1\n"
    );
}

#[test]
fn histogram_exact_lines() {
    let r = Registry::new();
    r.define_histogram("req_duration_seconds", "Request duration.", &[], &[0.1, 0.5, 1.0])
        .unwrap();
    let h = r.get_or_create_series("req_duration_seconds", &[]).unwrap();
    h.observe(0.3).unwrap();

    let out = r.render();
    assert_eq!(
        out,
        "# HELP req_duration_seconds Request duration.\n\
         # TYPE req_duration_seconds histogram\n\
         req_duration_seconds_bucket{le=\"0.1\"} 0\n\
         req_duration_seconds_bucket{le=\"0.5\"} 1\n\
         req_duration_seconds_bucket{le=\"1\"} 1\n\
         req_duration_seconds_bucket{le=\"+Inf\"} 1\n\
         req_duration_seconds_sum 0.3\n\
         req_duration_seconds_count 1\n"
    );
}

#[test]
fn labeled_histogram_appends_le_last() {
    let r = Registry::new();
    r.define_histogram("db_seconds", "DB time.", &["table"], &[0.5])
        .unwrap();
    let h = r.get_or_create_series("db_seconds", &["users"]).unwrap();
    h.observe(0.2).unwrap();

    let out = r.render();
    assert!(out.contains("db_seconds_bucket{table=\"users\",le=\"0.5\"} 1\n"));
    assert!(out.contains("db_seconds_bucket{table=\"users\",le=\"+Inf\"} 1\n"));
    assert!(out.contains("db_seconds_sum{table=\"users\"} 0.2\n"));
    assert!(out.contains("db_seconds_count{table=\"users\"} 1\n"));
}

#[test]
fn metrics_render_in_registration_order() {
    let r = Registry::new();
    r.define_gauge("zz_last_defined", "Defined first.", &[]).unwrap();
    r.define_counter("aa_first_alphabetically", "Defined second.", &[]).unwrap();

    let out = r.render();
    let zz = out.find("# HELP zz_last_defined").unwrap();
    let aa = out.find("# HELP aa_first_alphabetically").unwrap();
    assert!(zz < aa, "registration order, not name order:\n{out}");
}

#[test]
fn series_render_in_first_seen_order() {
    let r = Registry::new();
    r.define_counter("hits", "Hits.", &["path"]).unwrap();
    r.get_or_create_series("hits", &["/b"]).unwrap().inc().unwrap();
    r.get_or_create_series("hits", &["/a"]).unwrap().inc().unwrap();

    let out = r.render();
    let b = out.find("hits{path=\"/b\"}").unwrap();
    let a = out.find("hits{path=\"/a\"}").unwrap();
    assert!(b < a, "first-seen order:\n{out}");
}

#[test]
fn render_is_idempotent() {
    let r = Registry::new();
    r.define_counter("c", "A counter.", &["k"]).unwrap();
    r.define_histogram("h", "A histogram.", &["k"], &[1.0, 2.0]).unwrap();
    r.get_or_create_series("c", &["v"]).unwrap().add(3.0).unwrap();
    r.get_or_create_series("h", &["v"]).unwrap().observe(1.5).unwrap();

    assert_eq!(r.render(), r.render());
}

#[test]
fn counters_never_decrease_across_renders() {
    let r = Registry::new();
    r.define_counter("c", "A counter.", &[]).unwrap();
    let h = r.get_or_create_series("c", &[]).unwrap();

    let mut last = 0.0;
    for _ in 0..50 {
        h.add(0.25).unwrap();
        let now = r.counter_value("c", &[]).unwrap();
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn unset_label_value_renders_as_empty_string() {
    let r = Registry::new();
    r.define_counter("c", "A counter.", &["region"]).unwrap();
    r.get_or_create_series("c", &[""]).unwrap().inc().unwrap();

    assert!(r.render().contains("c{region=\"\"} 1\n"));
}

#[test]
fn label_values_are_escaped() {
    let r = Registry::new();
    r.define_counter("c", "A counter.", &["path"]).unwrap();
    r.get_or_create_series("c", &["a\\b\"c\nd"])
        .unwrap()
        .inc()
        .unwrap();

    assert!(r.render().contains("c{path=\"a\\\\b\\\"c\\nd\"} 1\n"));
}

#[test]
fn duplicate_metric_leaves_registry_unchanged() {
    let r = Registry::new();
    r.define_counter("c", "Original help.", &[]).unwrap();
    let before = r.render();

    let err = r.define_counter("c", "Different help.", &["x"]).expect_err("must fail");
    assert!(matches!(err, ScrapeLabError::DuplicateMetric(_)));
    assert_eq!(r.render(), before);
}

#[test]
fn concurrent_first_creation_yields_one_series() {
    let r = Arc::new(Registry::new());
    r.define_counter("c", "A counter.", &["k"]).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let r = Arc::clone(&r);
        handles.push(std::thread::spawn(move || {
            for _ in 0..100 {
                r.get_or_create_series("c", &["same"]).unwrap().inc().unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // All 800 increments landed on a single series.
    assert_eq!(r.counter_value("c", &["same"]), Some(800.0));
    let out = r.render();
    assert_eq!(out.matches("c{k=\"same\"}").count(), 1, "{out}");
}

#[test]
fn final_bucket_equals_total_count() {
    let r = Registry::new();
    r.define_histogram("h", "A histogram.", &[], &[0.1, 1.0, 10.0]).unwrap();
    let h = r.get_or_create_series("h", &[]).unwrap();
    for v in [0.05, 0.5, 5.0, 50.0, 0.5] {
        h.observe(v).unwrap();
    }

    let out = r.render();
    // +Inf bucket and _count agree; adjacent buckets are non-decreasing.
    assert!(out.contains("h_bucket{le=\"+Inf\"} 5\n"));
    assert!(out.contains("h_count 5\n"));
    assert!(out.contains("h_bucket{le=\"0.1\"} 1\n"));
    assert!(out.contains("h_bucket{le=\"1\"} 3\n"));
    assert!(out.contains("h_bucket{le=\"10\"} 4\n"));
}
