use std::time::Duration;

use serde_json::{json, Value};

use txlens_core::PortError;

mod common;
use common::{recorded, spawn_mock_server, test_http};

/// First request succeeds, every later one fails with 500.
fn flaky(idx: usize, _url: &str, _body: &str) -> (u16, String) {
    if idx == 0 {
        (200, json!({ "version": 1 }).to_string())
    } else {
        (500, "{}".to_owned())
    }
}

#[tokio::test]
async fn fresh_entries_are_served_from_memory() {
    let (base, calls) = spawn_mock_server(flaky);
    let http = test_http(Duration::from_secs(60), false);
    let url = format!("{base}/resource");

    assert_eq!(http.get_json(&url).await.unwrap(), json!({ "version": 1 }));
    assert_eq!(http.get_json(&url).await.unwrap(), json!({ "version": 1 }));
    assert!(http.is_cached(&url));
    assert_eq!(recorded(&calls).len(), 1);
}

#[tokio::test]
async fn stale_entry_covers_upstream_failure() {
    let (base, calls) = spawn_mock_server(flaky);
    let http = test_http(Duration::ZERO, true);
    let url = format!("{base}/resource");

    assert_eq!(http.get_json(&url).await.unwrap(), json!({ "version": 1 }));
    assert_eq!(http.get_json(&url).await.unwrap(), json!({ "version": 1 }));
    assert_eq!(recorded(&calls).len(), 2);
}

#[tokio::test]
async fn upstream_failure_surfaces_without_stale() {
    let (base, _) = spawn_mock_server(flaky);
    let http = test_http(Duration::ZERO, false);
    let url = format!("{base}/resource");

    http.get_json(&url).await.unwrap();
    let err = http.get_json(&url).await.unwrap_err();
    assert!(matches!(err, PortError::Status(500)));
}

#[tokio::test]
async fn no_content_is_null() {
    let (base, _) = spawn_mock_server(|_, _, _| (204, String::new()));
    let http = test_http(Duration::from_secs(60), false);

    assert_eq!(http.get_json(&format!("{base}/empty")).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn oldest_entry_is_evicted_at_capacity() {
    let (base, calls) = spawn_mock_server(|idx, _, _| (200, json!({ "n": idx }).to_string()));
    let http = test_http(Duration::from_secs(60), false).with_capacity(2);
    let [a, b, c] = ["a", "b", "c"].map(|path| format!("{base}/{path}"));

    http.get_json(&a).await.unwrap();
    http.get_json(&b).await.unwrap();
    http.get_json(&c).await.unwrap();

    assert!(!http.is_cached(&a));
    assert!(http.is_cached(&b));
    assert!(http.is_cached(&c));

    assert_eq!(http.get_json(&a).await.unwrap(), json!({ "n": 3 }));
    assert_eq!(recorded(&calls).len(), 4);
}
