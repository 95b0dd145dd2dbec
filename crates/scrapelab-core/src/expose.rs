//! Prometheus text exposition format.
//!
//! Renders the registry into the text format scraped by a Prometheus
//! server or compatible agent: per metric a `# HELP` and `# TYPE` line in
//! registration order, then one sample line per series in first-seen
//! order. Rendering is a pure read over current registry state; with no
//! intervening mutation two renders are byte-identical.

use std::fmt::Write;
use std::sync::{Mutex, MutexGuard};

use crate::registry::{Registry, Value};

/// Content type served alongside the rendered body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Escape a label value: backslash, double quote, newline.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape HELP text: backslash and newline only (quotes are legal there).
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a sample value the way Prometheus expects: integral values
/// without a decimal point (`1`, not `1.0`), shortest representation
/// otherwise (`0.3`), and `+Inf`/`-Inf` spelled out.
fn fmt_value(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    format!("{v}")
}

/// `name1="v1",name2="v2"` for one series; empty string when unlabeled.
fn format_labels(names: &[String], values: &[String]) -> String {
    names
        .iter()
        .zip(values.iter())
        .map(|(n, v)| format!("{n}=\"{}\"", escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn sample_line(out: &mut String, name: &str, labels: &str, value: &str) {
    if labels.is_empty() {
        let _ = writeln!(out, "{name} {value}");
    } else {
        let _ = writeln!(out, "{name}{{{labels}}} {value}");
    }
}

impl Registry {
    /// Render every metric in Prometheus text exposition format.
    ///
    /// A registry with zero metrics renders the empty string. Histogram
    /// series read their buckets, sum and count under one lock, so a
    /// scrape concurrent with an observation sees the whole observation
    /// or none of it.
    pub fn render(&self) -> String {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut out = String::new();

        for metric in &inner.metrics {
            let name = &metric.spec.name;
            let _ = writeln!(out, "# HELP {name} {}", escape_help(&metric.spec.help));
            let _ = writeln!(out, "# TYPE {name} {}", metric.spec.kind.as_str());

            for series in &metric.series {
                let labels = format_labels(&metric.spec.label_names, &series.labels);
                match &series.value {
                    Value::Counter(c) => {
                        sample_line(&mut out, name, &labels, &fmt_value(*lock(c)));
                    }
                    Value::Gauge(g) => {
                        sample_line(&mut out, name, &labels, &fmt_value(*lock(g)));
                    }
                    Value::Histogram { bounds, state } => {
                        let st = lock(state);
                        let bucket_name = format!("{name}_bucket");
                        for (bound, count) in bounds.iter().zip(st.bucket_counts.iter()) {
                            let le = format!("le=\"{}\"", fmt_value(*bound));
                            let with_le = if labels.is_empty() {
                                le
                            } else {
                                format!("{labels},{le}")
                            };
                            sample_line(&mut out, &bucket_name, &with_le, &count.to_string());
                        }
                        // Implicit +Inf bucket holds the total count.
                        let inf = if labels.is_empty() {
                            "le=\"+Inf\"".to_string()
                        } else {
                            format!("{labels},le=\"+Inf\"")
                        };
                        sample_line(&mut out, &bucket_name, &inf, &st.count.to_string());
                        sample_line(&mut out, &format!("{name}_sum"), &labels, &fmt_value(st.sum));
                        sample_line(
                            &mut out,
                            &format!("{name}_count"),
                            &labels,
                            &st.count.to_string(),
                        );
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn value_formatting() {
        assert_eq!(fmt_value(1.0), "1");
        assert_eq!(fmt_value(0.0), "0");
        assert_eq!(fmt_value(0.3), "0.3");
        assert_eq!(fmt_value(42.5), "42.5");
        assert_eq!(fmt_value(f64::INFINITY), "+Inf");
        assert_eq!(fmt_value(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn label_escaping() {
        assert_eq!(escape_label(r"a\b"), r"a\\b");
        assert_eq!(escape_label("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_label("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn help_escaping_keeps_quotes() {
        assert_eq!(escape_help("a \"quoted\" word"), "a \"quoted\" word");
        assert_eq!(escape_help("two\nlines"), "two\\nlines");
    }
}
