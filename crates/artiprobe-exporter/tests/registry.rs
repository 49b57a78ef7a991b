#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use artiprobe_core::{ProbeResult, ProbeTarget};
use artiprobe_exporter::obs::ProbeMetrics;

fn line_value(body: &str, series: &str) -> Option<f64> {
    body.lines()
        .find(|l| l.starts_with(series) && l[series.len()..].starts_with(' '))
        .and_then(|l| l[series.len() + 1..].parse().ok())
}

const SPEED: &str = r#"artifact_download_speed_mbps{source="azure",artifact_type="weights"}"#;
const SIZE: &str = r#"artifact_size_mb{source="azure",artifact_type="weights"}"#;
const COUNT: &str =
    r#"artifact_download_duration_seconds_count{source="azure",artifact_type="weights"}"#;
const SUM: &str =
    r#"artifact_download_duration_seconds_sum{source="azure",artifact_type="weights"}"#;

fn bucket(le: &str, n: u64) -> String {
    format!(
        r#"artifact_download_duration_seconds_bucket{{source="azure",artifact_type="weights",le="{le}"}} {n}"#
    )
}

#[test]
fn ten_megabytes_in_two_seconds() {
    let target = ProbeTarget {
        artifact_type: "weights".into(),
        source: "azure".into(),
        url: "https://example.com/w".into(),
    };
    let r =
        ProbeResult::from_transfer(&target, 10 * 1024 * 1024, Duration::from_secs(2)).unwrap();

    let m = ProbeMetrics::new();
    m.record_result(&r);

    let body = m.render();
    assert_eq!(line_value(&body, SPEED), Some(5.0));
    assert_eq!(line_value(&body, SIZE), Some(10.0));
    assert_eq!(line_value(&body, SUM), Some(2.0));
    assert_eq!(line_value(&body, COUNT), Some(1.0));
    // 2.0 falls in le=2.5 but not le=1.
    assert!(body.contains(&bucket("2.5", 1)));
    assert!(body.contains(&bucket("1", 0)));
    assert!(body.contains(&bucket("+Inf", 1)));
}

#[test]
fn gauges_are_last_write_wins_and_histogram_accumulates() {
    let m = ProbeMetrics::new();
    m.record("azure", "weights", 2.0, 10.0, 5.0);
    m.record("azure", "weights", 4.0, 12.0, 3.0);

    let body = m.render();
    assert_eq!(body.lines().filter(|l| l.starts_with(SPEED)).count(), 1);
    assert_eq!(body.lines().filter(|l| l.starts_with(SIZE)).count(), 1);
    assert_eq!(line_value(&body, SPEED), Some(3.0));
    assert_eq!(line_value(&body, SIZE), Some(12.0));
    assert_eq!(line_value(&body, COUNT), Some(2.0));
    assert_eq!(line_value(&body, SUM), Some(6.0));

    let s = m.sample("azure", "weights").unwrap();
    assert_eq!(s.duration.count, 2);
}

#[test]
fn failures_do_not_touch_samples() {
    let m = ProbeMetrics::new();
    m.record("azure", "weights", 2.0, 10.0, 5.0);
    m.record_failure("azure", "weights", "timeout");
    m.record_failure("aws", "mlir", "transport");

    let s = m.sample("azure", "weights").unwrap();
    assert_eq!(s.speed_mbps, 5.0);
    assert_eq!(s.duration.count, 1);
    assert!(m.sample("aws", "mlir").is_none());
    assert_eq!(m.series_count(), 1);
    assert_eq!(m.failures("azure", "weights", "timeout"), 1);

    let body = m.render();
    assert!(body.contains(
        r#"artifact_download_failures_total{source="aws",artifact_type="mlir",reason="transport"} 1"#
    ));
    assert!(!body.contains(r#"artifact_size_mb{source="aws""#));
}

#[test]
fn render_declares_all_families_even_when_empty() {
    let body = ProbeMetrics::new().render();
    for family in [
        "# TYPE artifact_download_speed_mbps gauge",
        "# TYPE artifact_download_duration_seconds histogram",
        "# TYPE artifact_size_mb gauge",
        "# TYPE artifact_download_failures_total counter",
    ] {
        assert!(body.contains(family), "missing {family}");
    }
}

#[test]
fn label_values_are_escaped() {
    let m = ProbeMetrics::new();
    m.record("we\"ird", "a\\b", 1.0, 1.0, 1.0);
    let body = m.render();
    assert!(body.contains(r#"source="we\"ird",artifact_type="a\\b""#), "{body}");
}

#[test]
fn concurrent_render_sees_consistent_samples() {
    let m = Arc::new(ProbeMetrics::new());
    let writers: Vec<_> = (0..4)
        .map(|w| {
            let m = Arc::clone(&m);
            std::thread::spawn(move || {
                for i in 0..500 {
                    // Duration always 1.0, so sum must equal count.
                    let at = if w % 2 == 0 { "weights" } else { "mlir" };
                    m.record("azure", at, 1.0, i as f64, i as f64);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let m = Arc::clone(&m);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let body = m.render();
                    for at in ["weights", "mlir"] {
                        let labels = format!(r#"{{source="azure",artifact_type="{at}"}}"#);
                        let count = format!("artifact_download_duration_seconds_count{labels}");
                        let sum = format!("artifact_download_duration_seconds_sum{labels}");
                        assert_eq!(line_value(&body, &count), line_value(&body, &sum));
                    }
                }
            })
        })
        .collect();

    for h in writers.into_iter().chain(readers) {
        h.join().unwrap();
    }

    assert_eq!(m.sample("azure", "weights").unwrap().duration.count, 1000);
    assert_eq!(m.sample("azure", "mlir").unwrap().duration.count, 1000);
}
