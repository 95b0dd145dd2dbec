//! Metric registry and time series storage.
//!
//! One process-wide `Registry` owns every defined metric. Metrics are
//! defined once at startup (never redefined) and mutated through series
//! handles for the life of the process. Two API layers:
//!
//! - strict (`define*`, `get_or_create_series`, handle methods): returns
//!   `Result`, used at startup and in tests;
//! - lenient (`record_counter` / `set_gauge` / `record_histogram`): never
//!   fails, used on the request hot path. Arity mismatches are coerced to
//!   empty label values and logged instead of failing the request.
//!
//! Concurrency: the metric table sits behind an `RwLock` with short
//! critical sections (never held across an await point); each series value
//! has its own `Mutex` so a histogram observation updates buckets, sum and
//! count atomically with respect to `render()`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use crate::error::{Result, ScrapeLabError};

/// Lock helpers that survive poisoning (a panicked writer must not take
/// the whole registry down with it).
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Metric kind, fixed at definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Lowercase name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Full definition of a metric: name, kind, help text, ordered label
/// names, and (histograms only) strictly increasing bucket upper bounds.
#[derive(Debug, Clone)]
pub struct MetricSpec {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub label_names: Vec<String>,
    pub buckets: Vec<f64>,
}

/// Histogram series state: cumulative bucket counts plus sum and count.
/// `bucket_counts[i]` counts every observation `<= bounds[i]`.
#[derive(Debug)]
pub(crate) struct HistogramState {
    pub(crate) bucket_counts: Vec<u64>,
    pub(crate) count: u64,
    pub(crate) sum: f64,
}

#[derive(Debug)]
pub(crate) enum Value {
    Counter(Mutex<f64>),
    Gauge(Mutex<f64>),
    Histogram {
        bounds: Vec<f64>,
        state: Mutex<HistogramState>,
    },
}

/// One time series: a specific label-value assignment plus its value cell.
#[derive(Debug)]
pub(crate) struct Series {
    pub(crate) labels: Vec<String>,
    pub(crate) value: Value,
}

impl Series {
    fn zeroed(kind: MetricKind, labels: Vec<String>, bounds: &[f64]) -> Self {
        let value = match kind {
            MetricKind::Counter => Value::Counter(Mutex::new(0.0)),
            MetricKind::Gauge => Value::Gauge(Mutex::new(0.0)),
            MetricKind::Histogram => Value::Histogram {
                bounds: bounds.to_vec(),
                state: Mutex::new(HistogramState {
                    bucket_counts: vec![0; bounds.len()],
                    count: 0,
                    sum: 0.0,
                }),
            },
        };
        Self { labels, value }
    }
}

pub(crate) struct Metric {
    pub(crate) spec: MetricSpec,
    /// First-seen order; render iterates this, never the index map.
    pub(crate) series: Vec<Arc<Series>>,
    index: HashMap<Vec<String>, usize>,
}

pub(crate) struct Inner {
    pub(crate) metrics: Vec<Metric>,
    by_name: HashMap<String, usize>,
}

/// Process-wide metric registry. Explicitly constructed and passed by
/// reference (`Arc<Registry>`), never a global, so tests can hold as many
/// isolated registries as they like.
pub struct Registry {
    pub(crate) inner: RwLock<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                metrics: Vec::new(),
                by_name: HashMap::new(),
            }),
        }
    }

    /// Define a metric. Fails with `DuplicateMetric` if the name is taken
    /// (registry left untouched) and `InvalidDefinition` if the spec is
    /// malformed (histogram without strictly increasing buckets, buckets
    /// on a non-histogram).
    pub fn define(&self, spec: MetricSpec) -> Result<()> {
        validate_spec(&spec)?;

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.by_name.contains_key(&spec.name) {
            return Err(ScrapeLabError::DuplicateMetric(spec.name));
        }
        let idx = inner.metrics.len();
        inner.by_name.insert(spec.name.clone(), idx);
        inner.metrics.push(Metric {
            spec,
            series: Vec::new(),
            index: HashMap::new(),
        });
        Ok(())
    }

    pub fn define_counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<()> {
        self.define(MetricSpec {
            name: name.to_string(),
            kind: MetricKind::Counter,
            help: help.to_string(),
            label_names: owned(label_names),
            buckets: Vec::new(),
        })
    }

    pub fn define_gauge(&self, name: &str, help: &str, label_names: &[&str]) -> Result<()> {
        self.define(MetricSpec {
            name: name.to_string(),
            kind: MetricKind::Gauge,
            help: help.to_string(),
            label_names: owned(label_names),
            buckets: Vec::new(),
        })
    }

    pub fn define_histogram(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<()> {
        self.define(MetricSpec {
            name: name.to_string(),
            kind: MetricKind::Histogram,
            help: help.to_string(),
            label_names: owned(label_names),
            buckets: buckets.to_vec(),
        })
    }

    /// Get a handle to the series matching `label_values`, creating it
    /// zero-initialized if absent. Creation is race-free: the write lock
    /// serializes concurrent first-callers, so exactly one series exists
    /// per label set. Fails with `LabelCardinality` (creating nothing) if
    /// the value count does not match the declared label names.
    pub fn get_or_create_series(&self, name: &str, label_values: &[&str]) -> Result<SeriesHandle> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let idx = *inner
            .by_name
            .get(name)
            .ok_or_else(|| ScrapeLabError::UnknownMetric(name.to_string()))?;
        let metric = &mut inner.metrics[idx];

        if label_values.len() != metric.spec.label_names.len() {
            return Err(ScrapeLabError::LabelCardinality {
                metric: name.to_string(),
                expected: metric.spec.label_names.len(),
                got: label_values.len(),
            });
        }

        let key = owned(label_values);
        let kind = metric.spec.kind;
        let series = match metric.index.get(&key) {
            Some(&i) => Arc::clone(&metric.series[i]),
            None => {
                let s = Arc::new(Series::zeroed(kind, key.clone(), &metric.spec.buckets));
                let pos = metric.series.len();
                metric.index.insert(key, pos);
                metric.series.push(Arc::clone(&s));
                s
            }
        };
        Ok(SeriesHandle { kind, series })
    }

    // --------------------
    // Lenient hot-path facade
    // --------------------
    // Request handling must never fail because of metrics recording. These
    // coerce a wrong label arity to empty values, drop negative counter
    // increments, and ignore unknown metric names, warning via tracing in
    // every case.

    /// Add `v` to a counter series; never fails.
    pub fn record_counter(&self, name: &str, label_values: &[&str], v: f64) {
        if v < 0.0 {
            tracing::warn!(metric = name, value = v, "negative counter increment dropped");
            return;
        }
        self.with_coerced(name, label_values, |h| h.add(v));
    }

    /// Increment a counter series by one; never fails.
    pub fn inc_counter(&self, name: &str, label_values: &[&str]) {
        self.record_counter(name, label_values, 1.0);
    }

    /// Replace a gauge series value; never fails.
    pub fn set_gauge(&self, name: &str, label_values: &[&str], v: f64) {
        self.with_coerced(name, label_values, |h| h.set(v));
    }

    /// Record one histogram observation; never fails.
    pub fn record_histogram(&self, name: &str, label_values: &[&str], v: f64) {
        self.with_coerced(name, label_values, |h| h.observe(v));
    }

    fn with_coerced(
        &self,
        name: &str,
        label_values: &[&str],
        record: impl Fn(&SeriesHandle) -> Result<()>,
    ) {
        let result = match self.get_or_create_series(name, label_values) {
            Ok(handle) => record(&handle),
            Err(ScrapeLabError::LabelCardinality { expected, got, .. }) => {
                tracing::warn!(
                    metric = name,
                    expected,
                    got,
                    "label cardinality mismatch, coercing to empty values"
                );
                let mut coerced: Vec<&str> = label_values.iter().take(expected).copied().collect();
                coerced.resize(expected, "");
                match self.get_or_create_series(name, &coerced) {
                    Ok(handle) => record(&handle),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(metric = name, error = %e, "metric observation dropped");
        }
    }

    // --------------------
    // Read accessors (tests / introspection)
    // --------------------

    /// Current value of a counter series, if both metric and series exist.
    pub fn counter_value(&self, name: &str, label_values: &[&str]) -> Option<f64> {
        self.peek(name, label_values, |v| match v {
            Value::Counter(c) => Some(*lock(c)),
            _ => None,
        })
    }

    /// Current value of a gauge series, if both metric and series exist.
    pub fn gauge_value(&self, name: &str, label_values: &[&str]) -> Option<f64> {
        self.peek(name, label_values, |v| match v {
            Value::Gauge(g) => Some(*lock(g)),
            _ => None,
        })
    }

    /// Total observation count of a histogram series, if it exists.
    pub fn histogram_count(&self, name: &str, label_values: &[&str]) -> Option<u64> {
        self.peek(name, label_values, |v| match v {
            Value::Histogram { state, .. } => Some(lock(state).count),
            _ => None,
        })
    }

    fn peek<T>(
        &self,
        name: &str,
        label_values: &[&str],
        read: impl FnOnce(&Value) -> Option<T>,
    ) -> Option<T> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let idx = *inner.by_name.get(name)?;
        let metric = &inner.metrics[idx];
        let key = owned(label_values);
        let si = *metric.index.get(&key)?;
        read(&metric.series[si].value)
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn validate_spec(spec: &MetricSpec) -> Result<()> {
    match spec.kind {
        MetricKind::Histogram => {
            if spec.buckets.is_empty() {
                return Err(ScrapeLabError::InvalidDefinition {
                    metric: spec.name.clone(),
                    reason: "histogram requires at least one bucket".into(),
                });
            }
            if !spec.buckets.windows(2).all(|w| w[0] < w[1]) {
                return Err(ScrapeLabError::InvalidDefinition {
                    metric: spec.name.clone(),
                    reason: "histogram buckets must be strictly increasing".into(),
                });
            }
        }
        MetricKind::Counter | MetricKind::Gauge => {
            if !spec.buckets.is_empty() {
                return Err(ScrapeLabError::InvalidDefinition {
                    metric: spec.name.clone(),
                    reason: format!("buckets are not valid for a {}", spec.kind.as_str()),
                });
            }
        }
    }
    Ok(())
}

/// Mutable handle to one time series. Cheap to clone (Arc inside).
#[derive(Debug, Clone)]
pub struct SeriesHandle {
    kind: MetricKind,
    series: Arc<Series>,
}

impl SeriesHandle {
    /// Increment a counter by one.
    pub fn inc(&self) -> Result<()> {
        self.add(1.0)
    }

    /// Add a non-negative amount to a counter.
    pub fn add(&self, v: f64) -> Result<()> {
        if v < 0.0 || !v.is_finite() {
            return Err(ScrapeLabError::InvalidObservation(format!(
                "counter increment must be finite and >= 0, got {v}"
            )));
        }
        match &self.series.value {
            Value::Counter(c) => {
                *lock(c) += v;
                Ok(())
            }
            _ => Err(ScrapeLabError::InvalidObservation(
                "add() on a non-counter series".into(),
            )),
        }
    }

    /// Replace a gauge value (latest-known-state semantics).
    pub fn set(&self, v: f64) -> Result<()> {
        match &self.series.value {
            Value::Gauge(g) => {
                *lock(g) = v;
                Ok(())
            }
            _ => Err(ScrapeLabError::InvalidObservation(
                "set() on a non-gauge series".into(),
            )),
        }
    }

    /// Record one histogram observation: every bucket whose bound >= v,
    /// plus sum and count, updated under one lock so a concurrent render
    /// sees the whole observation or none of it.
    pub fn observe(&self, v: f64) -> Result<()> {
        match &self.series.value {
            Value::Histogram { bounds, state } => {
                let mut st = lock(state);
                for (i, b) in bounds.iter().enumerate() {
                    if v <= *b {
                        st.bucket_counts[i] += 1;
                    }
                }
                st.count += 1;
                st.sum += v;
                Ok(())
            }
            _ => Err(ScrapeLabError::InvalidObservation(
                "observe() on a non-histogram series".into(),
            )),
        }
    }

    /// Start a timer that records elapsed seconds into this histogram
    /// series when finished. Each timer owns its own start instant, so
    /// concurrent requests never share state.
    pub fn start_timer(&self) -> HistogramTimer {
        HistogramTimer {
            handle: self.clone(),
            start: Instant::now(),
        }
    }

    /// Whether two handles point at the same underlying series.
    pub fn same_series(&self, other: &SeriesHandle) -> bool {
        Arc::ptr_eq(&self.series, &other.series)
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }
}

/// In-flight histogram timer. Dropping without `observe_duration` records
/// nothing: an abandoned measurement is simply dropped, never partial.
pub struct HistogramTimer {
    handle: SeriesHandle,
    start: Instant,
}

impl HistogramTimer {
    /// Stop the timer and record the elapsed seconds.
    pub fn observe_duration(self) -> Result<()> {
        self.handle.observe(self.start.elapsed().as_secs_f64())
    }
}
