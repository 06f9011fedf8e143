//! Aggregator record/render behaviour.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use relayprobe_core::metrics::BUCKETS_SECONDS;
use relayprobe_core::{DurationStorage, MetricsAggregator};

/// Value of the first exposition line starting with `prefix`.
fn value_of(out: &str, prefix: &str) -> Option<String> {
    out.lines()
        .find(|l| l.starts_with(prefix))
        .and_then(|l| l.rsplit(' ').next())
        .map(str::to_string)
}

#[test]
fn record_then_render_adds_one_observation() {
    let m = MetricsAggregator::new("1.0.0");
    m.record("/version", 200, Duration::from_millis(20));
    let before = m.render();
    assert_eq!(value_of(&before, "http_requests_total{path=\"/version\"}").as_deref(), Some("1"));

    m.record("/version", 200, Duration::from_millis(20));
    let after = m.render();

    assert_eq!(value_of(&after, "http_requests_total{path=\"/version\"}").as_deref(), Some("2"));
    assert_eq!(
        value_of(&after, "http_response_status_total{path=\"/version\",code=\"200\"}").as_deref(),
        Some("2")
    );
    assert_eq!(
        value_of(&after, "http_request_duration_seconds_count{path=\"/version\"}").as_deref(),
        Some("2")
    );
    let sum: f64 = value_of(&after, "http_request_duration_seconds_sum{path=\"/version\"}")
        .unwrap()
        .parse()
        .unwrap();
    assert!((sum - 0.04).abs() < 1e-9);
}

#[test]
fn every_qualifying_bucket_increments() {
    let m = MetricsAggregator::new("1.0.0");
    let d = Duration::from_millis(120);
    m.record("/", 200, d);
    let out = m.render();

    for b in BUCKETS_SECONDS {
        let line = format!("http_request_duration_seconds_bucket{{path=\"/\",le=\"{b}\"}}");
        let expected = if b >= d.as_secs_f64() { "1" } else { "0" };
        assert_eq!(value_of(&out, &line).as_deref(), Some(expected), "le={b}");
    }
    assert_eq!(
        value_of(&out, "http_request_duration_seconds_bucket{path=\"/\",le=\"+Inf\"}").as_deref(),
        Some("1")
    );
}

#[test]
fn inf_bucket_counts_slow_requests() {
    let m = MetricsAggregator::new("1.0.0");
    m.record("/slow", 504, Duration::from_secs(30));
    let out = m.render();
    assert_eq!(
        value_of(&out, "http_request_duration_seconds_bucket{path=\"/slow\",le=\"10\"}").as_deref(),
        Some("0")
    );
    assert_eq!(
        value_of(&out, "http_request_duration_seconds_bucket{path=\"/slow\",le=\"+Inf\"}").as_deref(),
        Some("1")
    );
}

#[test]
fn family_order_is_fixed() {
    let m = MetricsAggregator::new("1.0.0");
    m.record("/b", 200, Duration::from_millis(1));
    m.record("/a", 404, Duration::from_millis(1));
    let out = m.render();

    let pos = |needle: &str| out.find(needle).unwrap();
    assert!(pos("app_info{") < pos("app_uptime_seconds "));
    assert!(pos("app_uptime_seconds ") < pos("http_requests_total{"));
    assert!(pos("http_requests_total{") < pos("http_response_status_total{"));
    assert!(pos("http_response_status_total{") < pos("http_request_duration_seconds_bucket{"));
    // sorted by path key
    assert!(pos("http_requests_total{path=\"/a\"}") < pos("http_requests_total{path=\"/b\"}"));
}

#[test]
fn trailing_slash_gets_its_own_key() {
    let m = MetricsAggregator::new("1.0.0");
    m.record("/version", 200, Duration::from_millis(1));
    m.record("/version/", 404, Duration::from_millis(1));
    assert_eq!(m.total_for("/version"), 1);
    assert_eq!(m.total_for("/version/"), 1);
    assert_eq!(m.path_keys().len(), 2);
}

#[test]
fn version_label_is_escaped() {
    let m = MetricsAggregator::new("1.0\"beta\"");
    assert!(m.render().contains("app_info{version=\"1.0\\\"beta\\\"\"} 1"));
}

#[test]
fn folded_storage_renders_identically() {
    let raw = MetricsAggregator::with_storage("1.0.0", DurationStorage::Raw);
    let folded = MetricsAggregator::with_storage("1.0.0", DurationStorage::Folded);
    for ms in [1u64, 7, 30, 260, 1200, 12_000] {
        raw.record("/x", 200, Duration::from_millis(ms));
        folded.record("/x", 200, Duration::from_millis(ms));
    }
    let strip = |s: String| {
        s.lines()
            .filter(|l| !l.starts_with("app_uptime_seconds "))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(raw.render()), strip(folded.render()));
    assert_eq!(folded.observations_for("/x"), 6);
}

#[test]
fn concurrent_records_lose_nothing() {
    let m = Arc::new(MetricsAggregator::new("1.0.0"));
    let threads = 16;
    let per_thread = 1000 / threads + 1;

    std::thread::scope(|s| {
        for t in 0..threads {
            let m = Arc::clone(&m);
            s.spawn(move || {
                for i in 0..per_thread {
                    let code = if (t + i) % 2 == 0 { 200 } else { 503 };
                    m.record("/", code, Duration::from_micros(i as u64));
                    if i % 50 == 0 {
                        let _ = m.render();
                    }
                }
            });
        }
    });

    let expected = (threads * per_thread) as u64;
    assert_eq!(m.total_for("/"), expected);
    assert_eq!(m.observations_for("/"), expected);
    assert_eq!(m.status_for("/", 200) + m.status_for("/", 503), expected);
}
