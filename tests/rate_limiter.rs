mod common;

use chrono::TimeDelta;
use std::time::Duration;

use common::Harness;
use linkcache::application::services::rate_limiter::fingerprint;
use linkcache::infrastructure::cache::keys::rate_key;

#[tokio::test]
async fn test_five_admits_then_deny_within_window() {
    let h = Harness::new();
    let limiter = &h.state.rate_limiter;

    for _ in 0..5 {
        assert!(limiter.admit("curl/8.5.0").await.unwrap());
    }
    assert!(!limiter.admit("curl/8.5.0").await.unwrap());
    assert!(!limiter.admit("curl/8.5.0").await.unwrap());
}

#[tokio::test]
async fn test_window_elapses_and_admits_resume() {
    let h = Harness::new();
    let limiter = &h.state.rate_limiter;

    for _ in 0..6 {
        limiter.admit("curl/8.5.0").await.unwrap();
    }
    assert!(!limiter.admit("curl/8.5.0").await.unwrap());

    h.advance(TimeDelta::hours(1) + TimeDelta::seconds(1));

    assert!(limiter.admit("curl/8.5.0").await.unwrap());
}

#[tokio::test]
async fn test_identities_are_counted_separately() {
    let h = Harness::new();
    let limiter = &h.state.rate_limiter;

    for _ in 0..5 {
        assert!(limiter.admit("agent-a").await.unwrap());
    }
    assert!(!limiter.admit("agent-a").await.unwrap());
    assert!(limiter.admit("agent-b").await.unwrap());
}

#[tokio::test]
async fn test_window_opens_on_first_request() {
    let h = Harness::new();
    let key = rate_key(&fingerprint("agent"));

    h.state.rate_limiter.admit("agent").await.unwrap();
    assert_eq!(h.cache.ttl(&key), Some(Some(Duration::from_secs(3600))));

    h.advance(TimeDelta::minutes(10));
    h.state.rate_limiter.admit("agent").await.unwrap();

    // Later requests in the same window do not extend it
    assert_eq!(h.cache.ttl(&key), Some(Some(Duration::from_secs(3000))));
}

#[tokio::test]
async fn test_custom_limits() {
    let h = Harness::with_rate_limit(2, Duration::from_secs(60));
    let limiter = &h.state.rate_limiter;

    assert!(limiter.admit("agent").await.unwrap());
    assert!(limiter.admit("agent").await.unwrap());
    assert!(!limiter.admit("agent").await.unwrap());

    h.advance(TimeDelta::seconds(61));
    assert!(limiter.admit("agent").await.unwrap());
}
