//! In-process metrics registry for the exporter.
//!
//! Series live in `DashMap`s keyed by their label values. All three
//! instruments of one (source, artifact_type) pair share a single
//! `MetricSample` entry, so a record is applied under one shard lock and a
//! concurrent render sees either all of it or none of it.

use dashmap::DashMap;
use std::fmt::Write;

use artiprobe_core::ProbeResult;

pub const SPEED_METRIC: &str = "artifact_download_speed_mbps";
pub const DURATION_METRIC: &str = "artifact_download_duration_seconds";
pub const SIZE_METRIC: &str = "artifact_size_mb";
pub const FAILURES_METRIC: &str = "artifact_download_failures_total";

/// Default bucket bounds, in seconds.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(labels: &[(&str, &str)]) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Exposition-format float: shortest round-trip, with Prometheus spellings
/// for the non-finite values.
pub(crate) fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        format!("{v}")
    }
}

fn render_header(name: &str, help: &str, kind: &str, out: &mut String) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Label pair identifying one probe series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub source: String,
    pub artifact_type: String,
}

impl SeriesKey {
    pub fn new(source: &str, artifact_type: &str) -> Self {
        Self {
            source: source.to_string(),
            artifact_type: artifact_type.to_string(),
        }
    }

    fn labels(&self) -> [(&str, &str); 2] {
        [
            ("source", self.source.as_str()),
            ("artifact_type", self.artifact_type.as_str()),
        ]
    }
}

/// Cumulative bucket histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub count: u64,
    pub sum: f64,
    /// Cumulative counts, one per bound in `DEFAULT_BUCKETS`.
    pub buckets: [u64; DEFAULT_BUCKETS.len()],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            buckets: [0; DEFAULT_BUCKETS.len()],
        }
    }
}

impl Histogram {
    pub fn observe(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        // Cumulative: every bucket whose bound holds the value.
        for (i, &le) in DEFAULT_BUCKETS.iter().enumerate() {
            if v <= le {
                self.buckets[i] += 1;
            }
        }
    }

    fn render(&self, name: &str, labels: &str, out: &mut String) {
        for (i, &le) in DEFAULT_BUCKETS.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}_bucket{{{},le=\"{}\"}} {}",
                name,
                labels,
                fmt_float(le),
                self.buckets[i]
            );
        }
        let _ = writeln!(out, "{}_bucket{{{},le=\"+Inf\"}} {}", name, labels, self.count);
        let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, fmt_float(self.sum));
        let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, self.count);
    }
}

/// Current state of one label pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSample {
    pub speed_mbps: f64,
    pub size_mb: f64,
    pub duration: Histogram,
}

/// The exporter's registry. Built once at startup and shared by `Arc`
/// between the probe runner and the metrics server.
#[derive(Default)]
pub struct ProbeMetrics {
    samples: DashMap<SeriesKey, MetricSample>,
    // (source, artifact_type, reason)
    failures: DashMap<(SeriesKey, &'static str), u64>,
}

impl ProbeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful probe: both gauges are overwritten, the
    /// duration lands in the histogram.
    ///
    /// Inputs must be finite and non-negative; `ProbeResult` guarantees that.
    pub fn record(
        &self,
        source: &str,
        artifact_type: &str,
        duration_seconds: f64,
        size_mb: f64,
        speed_mbps: f64,
    ) {
        let mut sample = self
            .samples
            .entry(SeriesKey::new(source, artifact_type))
            .or_default();
        sample.speed_mbps = speed_mbps;
        sample.size_mb = size_mb;
        sample.duration.observe(duration_seconds);
    }

    pub fn record_result(&self, r: &ProbeResult) {
        self.record(
            &r.source,
            &r.artifact_type,
            r.duration_seconds,
            r.size_megabytes,
            r.speed_mbps,
        );
    }

    /// Count a dropped probe. Samples are left alone.
    pub fn record_failure(&self, source: &str, artifact_type: &str, reason: &'static str) {
        *self
            .failures
            .entry((SeriesKey::new(source, artifact_type), reason))
            .or_insert(0) += 1;
    }

    pub fn sample(&self, source: &str, artifact_type: &str) -> Option<MetricSample> {
        self.samples
            .get(&SeriesKey::new(source, artifact_type))
            .map(|r| r.value().clone())
    }

    pub fn failures(&self, source: &str, artifact_type: &str, reason: &'static str) -> u64 {
        self.failures
            .get(&(SeriesKey::new(source, artifact_type), reason))
            .map(|r| *r.value())
            .unwrap_or(0)
    }

    /// Number of label pairs with at least one successful record.
    pub fn series_count(&self) -> usize {
        self.samples.len()
    }

    /// Render all families in text exposition format.
    ///
    /// Samples are copied out first so every family is rendered from the
    /// same snapshot and no shard lock is held while formatting.
    pub fn render(&self) -> String {
        let mut samples: Vec<(SeriesKey, MetricSample)> = self
            .samples
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        samples.sort_by(|a, b| a.0.cmp(&b.0));

        let mut failures: Vec<((SeriesKey, &'static str), u64)> = self
            .failures
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect();
        failures.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();

        render_header(SPEED_METRIC, "Download speed in MB/s", "gauge", &mut out);
        for (key, s) in &samples {
            let _ = writeln!(
                out,
                "{}{{{}}} {}",
                SPEED_METRIC,
                label_str(&key.labels()),
                fmt_float(s.speed_mbps)
            );
        }

        render_header(
            DURATION_METRIC,
            "Time spent downloading artifacts",
            "histogram",
            &mut out,
        );
        for (key, s) in &samples {
            s.duration
                .render(DURATION_METRIC, &label_str(&key.labels()), &mut out);
        }

        render_header(SIZE_METRIC, "Size of artifacts in MB", "gauge", &mut out);
        for (key, s) in &samples {
            let _ = writeln!(
                out,
                "{}{{{}}} {}",
                SIZE_METRIC,
                label_str(&key.labels()),
                fmt_float(s.size_mb)
            );
        }

        render_header(
            FAILURES_METRIC,
            "Probe downloads dropped, by failure reason",
            "counter",
            &mut out,
        );
        for ((key, reason), n) in &failures {
            let [source, artifact_type] = key.labels();
            let labels = label_str(&[source, artifact_type, ("reason", *reason)]);
            let _ = writeln!(out, "{}{{{}}} {}", FAILURES_METRIC, labels, n);
        }

        out
    }
}
