//! Validator and coordinator against mock proxies on localhost.

use proxy_harvest::{
    Candidate, CandidatePool, Coordinator, FailureReason, ProxyValidator, ValidationOutcome,
    ValidatorConfig,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;
use common::{refused_candidate, start_mock_proxy, Behavior, Gauge};

const TEST_URL: &str = "http://proxy-check.test/ip";

fn validator(timeout: Duration) -> ProxyValidator {
    ProxyValidator::with_config(
        ValidatorConfig::new()
            .with_test_url(TEST_URL)
            .with_timeout(timeout),
    )
}

#[tokio::test]
async fn test_two_responsive_proxies_both_work() {
    let gauge = Arc::new(Gauge::default());
    let a = start_mock_proxy(Behavior::ok(5), gauge.clone()).await;
    let b = start_mock_proxy(Behavior::ok(5), gauge.clone()).await;
    let pool = vec![a.clone(), b.clone()];

    let coordinator = Coordinator::new(validator(Duration::from_secs(5)), 10);
    let report = coordinator.run(&pool).await;

    assert_eq!(report.attempted, 2);
    assert_eq!(report.working_count(), 2);
    for proxy in &report.working {
        assert!(pool.contains(&proxy.candidate));
        assert!(proxy.latency > Duration::ZERO);
    }
    assert_eq!(gauge.requests(), 2);
}

#[tokio::test]
async fn test_refused_connection_is_connection_error() {
    let candidate = refused_candidate().await;

    let outcome = validator(Duration::from_secs(5)).check_proxy(&candidate).await;
    assert_eq!(
        outcome,
        ValidationOutcome::failed(FailureReason::ConnectionError)
    );

    let report = Coordinator::new(validator(Duration::from_secs(5)), 10)
        .run(&[candidate])
        .await;
    assert!(report.working.is_empty());
    assert_eq!(report.failures.get("connection-error"), Some(&1));
}

#[tokio::test]
async fn test_slow_proxy_times_out_promptly() {
    let candidate = start_mock_proxy(Behavior::Hang, Arc::new(Gauge::default())).await;
    let timeout = Duration::from_millis(300);

    let start = Instant::now();
    let outcome = validator(timeout).check_proxy(&candidate).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome, ValidationOutcome::failed(FailureReason::Timeout));
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + Duration::from_secs(1), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_non_success_status_is_bad_status() {
    let behavior = Behavior::Respond {
        status: 502,
        delay: Duration::ZERO,
    };
    let candidate = start_mock_proxy(behavior, Arc::new(Gauge::default())).await;

    let outcome = validator(Duration::from_secs(5)).check_proxy(&candidate).await;
    assert_eq!(outcome, ValidationOutcome::failed(FailureReason::BadStatus(502)));
}

#[tokio::test]
async fn test_redirect_is_bad_status_single_request() {
    let gauge = Arc::new(Gauge::default());
    let behavior = Behavior::Respond {
        status: 302,
        delay: Duration::ZERO,
    };
    let candidate = start_mock_proxy(behavior, gauge.clone()).await;

    let outcome = validator(Duration::from_secs(5)).check_proxy(&candidate).await;
    assert_eq!(outcome, ValidationOutcome::failed(FailureReason::BadStatus(302)));
    // the redirect target is never fetched through the proxy
    assert_eq!(gauge.requests(), 1);
}

#[tokio::test]
async fn test_concurrent_latency_excludes_client_setup() {
    let gauge = Arc::new(Gauge::default());
    let mut pool = Vec::new();
    for _ in 0..8 {
        pool.push(start_mock_proxy(Behavior::ok(1), gauge.clone()).await);
    }
    let slow = start_mock_proxy(Behavior::ok(400), gauge.clone()).await;
    pool.push(slow.clone());

    let coordinator = Coordinator::new(validator(Duration::from_secs(5)), 9);
    let mut report = coordinator.run(&pool).await;
    report.sort_by_latency();

    assert_eq!(report.working_count(), 9);
    assert_eq!(report.working.last().unwrap().candidate, slow);
    for proxy in &report.working[..8] {
        assert!(proxy.latency < Duration::from_millis(400), "{:?}", proxy);
    }
}

#[tokio::test]
async fn test_hundred_candidates_ten_workers() {
    let gauge = Arc::new(Gauge::default());
    let mut pool = Vec::new();
    for _ in 0..100 {
        pool.push(start_mock_proxy(Behavior::ok(20), gauge.clone()).await);
    }

    let coordinator = Coordinator::new(validator(Duration::from_secs(10)), 10);
    let mut outcomes = 0;
    let report = coordinator
        .run_with_progress(&pool, |_, _| outcomes += 1)
        .await;

    assert_eq!(outcomes, 100);
    assert_eq!(report.attempted, 100);
    assert_eq!(report.working_count(), 100);
    assert_eq!(gauge.requests(), 100);
    assert!(gauge.peak() <= 10, "peak concurrent requests was {}", gauge.peak());

    let unique: HashSet<_> = report.working.iter().map(|p| p.candidate.clone()).collect();
    assert_eq!(unique.len(), 100);
}

#[tokio::test]
async fn test_failures_do_not_affect_neighbours() {
    let gauge = Arc::new(Gauge::default());
    let good_a = start_mock_proxy(Behavior::ok(5), gauge.clone()).await;
    let good_b = start_mock_proxy(Behavior::ok(5), gauge.clone()).await;
    let hanging = start_mock_proxy(Behavior::Hang, Arc::new(Gauge::default())).await;
    let refused = refused_candidate().await;

    let pool = vec![good_a.clone(), hanging, refused, good_b.clone()];
    let report = Coordinator::new(validator(Duration::from_millis(500)), 4)
        .run(&pool)
        .await;

    assert_eq!(report.attempted, 4);
    let working: HashSet<Candidate> = report.working.iter().map(|p| p.candidate.clone()).collect();
    assert_eq!(working, HashSet::from([good_a, good_b]));
    assert_eq!(report.failures.get("timeout"), Some(&1));
    assert_eq!(report.failures.get("connection-error"), Some(&1));
}

#[tokio::test]
async fn test_duplicates_validated_once() {
    let gauge = Arc::new(Gauge::default());
    let candidate = start_mock_proxy(Behavior::ok(1), gauge.clone()).await;
    let raw = candidate.to_simple_string();

    let pool = CandidatePool::from_raw(vec![
        vec![raw.clone(), raw.clone()],
        vec![format!("http://{}", raw)],
    ]);
    assert_eq!(pool.len(), 1);

    let report = Coordinator::new(validator(Duration::from_secs(5)), 5)
        .run(pool.candidates())
        .await;
    assert_eq!(report.attempted, 1);
    assert_eq!(gauge.requests(), 1);
}
