//! Coordinator behavior against a counting rewriter.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tone_grid::cache::{CacheConfig, CacheStore};
use tone_grid::types::{RawAxes, ToneAxes, ToneRequest};
use tone_grid::{Error, ErrorContext, RequestCoordinator, TransportError, SERVICE_FAILURE_MESSAGE};

/// Succeeds from the `fail_first`+1-th call on, counting every call.
struct Counting {
    calls: AtomicUsize,
    fail_first: usize,
    delay: Duration,
}

impl Counting {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            delay: Duration::ZERO,
        })
    }

    fn failing_first(n: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first: n,
            delay: Duration::ZERO,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl tone_grid::rewrite::Rewriter for Counting {
    async fn rewrite(&self, text: &str, axes: &ToneAxes) -> tone_grid::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if n < self.fail_first {
            return Err(Error::Transport(TransportError::Other(
                "connection reset by 10.0.0.3:443".into(),
            )));
        }
        Ok(format!("{} ({})", text, axes.id()))
    }
}

fn axes(formality: &str, verbosity: &str) -> Option<RawAxes> {
    Some(RawAxes {
        formality: Some(formality.into()),
        verbosity: Some(verbosity.into()),
    })
}

fn coordinator(rewriter: Arc<Counting>, config: CacheConfig) -> RequestCoordinator {
    RequestCoordinator::new(CacheStore::new(config), rewriter)
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let rewriter = Counting::new();
    let c = coordinator(rewriter.clone(), CacheConfig::default());
    let req = ToneRequest::new("Hello.", axes("formal", "concise"));

    let first = c.handle(&req).await.unwrap();
    let second = c.handle(&req).await.unwrap();

    assert_eq!(first, "Hello. (formal-concise)");
    assert_eq!(first, second);
    assert_eq!(rewriter.calls(), 1);
    let stats = c.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_distinct_axes_are_distinct_entries() {
    let rewriter = Counting::new();
    let c = coordinator(rewriter.clone(), CacheConfig::default());
    c.handle(&ToneRequest::new("Hello.", axes("formal", "concise")))
        .await
        .unwrap();
    c.handle(&ToneRequest::new("Hello.", axes("casual", "concise")))
        .await
        .unwrap();
    assert_eq!(rewriter.calls(), 2);
}

#[tokio::test]
async fn test_omitted_axes_share_entry_with_center_cell() {
    let rewriter = Counting::new();
    let c = coordinator(rewriter.clone(), CacheConfig::default());
    c.handle(&ToneRequest::new("Hello.", None)).await.unwrap();
    let out = c
        .handle(&ToneRequest::new("Hello.", axes("neutral", "balanced")))
        .await
        .unwrap();
    assert_eq!(out, "Hello. (neutral-balanced)");
    assert_eq!(rewriter.calls(), 1);
}

#[tokio::test]
async fn test_blank_text_never_reaches_cache_or_upstream() {
    let rewriter = Counting::new();
    let c = coordinator(rewriter.clone(), CacheConfig::default());

    for text in [None, Some("   ")] {
        let req = ToneRequest {
            text: text.map(str::to_string),
            axes: axes("formal", "concise"),
        };
        let err = c.handle(&req).await.unwrap_err();
        assert!(err.is_validation());
    }

    let reply = c.respond(&ToneRequest::new("", None)).await;
    assert_eq!(reply.status(), 400);
    assert_eq!(
        reply.to_json()["error"],
        serde_json::json!("Invalid or missing \"text\" field")
    );
    assert_eq!(rewriter.calls(), 0);
    let stats = c.cache_stats();
    assert_eq!(stats.hits + stats.misses + stats.sets, 0);
}

#[tokio::test]
async fn test_invalid_axis_is_rejected_before_upstream() {
    let rewriter = Counting::new();
    let c = coordinator(rewriter.clone(), CacheConfig::default());
    let err = c
        .handle(&ToneRequest::new("Hello.", axes("formal", "wordy")))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.context().and_then(|ctx| ctx.field_path.as_deref()),
        Some("axes.verbosity")
    );
    assert_eq!(rewriter.calls(), 0);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let rewriter = Counting::failing_first(1);
    let c = coordinator(rewriter.clone(), CacheConfig::default());
    let req = ToneRequest::new("Hello.", axes("formal", "concise"));

    let reply = c.respond(&req).await;
    assert_eq!(reply.status(), 502);
    let body = reply.to_json();
    assert_eq!(body["error"], serde_json::json!(SERVICE_FAILURE_MESSAGE));
    assert!(!body.to_string().contains("10.0.0.3"));

    assert!(c.handle(&req).await.is_ok());
    assert!(c.handle(&req).await.is_ok());
    assert_eq!(rewriter.calls(), 2);
}

#[tokio::test]
async fn test_expired_entry_goes_back_upstream() {
    let rewriter = Counting::new();
    let c = coordinator(
        rewriter.clone(),
        CacheConfig::new().with_ttl(Duration::from_millis(40)),
    );
    let req = ToneRequest::new("Hello.", axes("formal", "concise"));

    c.handle(&req).await.unwrap();
    c.handle(&req).await.unwrap();
    assert_eq!(rewriter.calls(), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    c.handle(&req).await.unwrap();
    assert_eq!(rewriter.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_identical_requests_both_go_upstream() {
    let rewriter = Counting::slow(Duration::from_millis(30));
    let c = coordinator(rewriter.clone(), CacheConfig::default());
    let req = ToneRequest::new("Hello.", axes("formal", "concise"));

    let (a, b) = tokio::join!(c.handle(&req), c.handle(&req));
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(rewriter.calls(), 2);

    c.handle(&req).await.unwrap();
    assert_eq!(rewriter.calls(), 2);
}

#[tokio::test]
async fn test_service_error_message_passes_through() {
    struct Refusing;

    #[async_trait]
    impl tone_grid::rewrite::Rewriter for Refusing {
        async fn rewrite(&self, _text: &str, _axes: &ToneAxes) -> tone_grid::Result<String> {
            Err(Error::service_with_context(
                SERVICE_FAILURE_MESSAGE,
                ErrorContext::new().with_details("upstream 503"),
            ))
        }
    }

    let c = RequestCoordinator::new(CacheStore::default(), Arc::new(Refusing));
    let reply = c.respond(&ToneRequest::new("Hello.", None)).await;
    assert_eq!(reply.status(), 502);
    assert_eq!(reply.to_json()["error"], serde_json::json!(SERVICE_FAILURE_MESSAGE));
}
