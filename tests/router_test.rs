use async_trait::async_trait;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use notifybox::error::DispatchError;
use notifybox::providers::{Delivery, Message, Provider, ProviderError, SendContext};
use notifybox::router::{
    FallbackOptions, PlaceholderError, Router, RouterOptions, SendOptions, UNKNOWN_PROVIDER,
};
use notifybox::uri::ParseError;

type Sent = Arc<Mutex<Vec<(String, String)>>>;

/// Always succeeds; records (url, body) pairs
struct Echo {
    scheme: &'static str,
    sent: Sent,
}

#[async_trait]
impl Provider for Echo {
    fn id(&self) -> &str {
        "echo"
    }

    fn schemas(&self) -> Vec<&str> {
        vec![self.scheme]
    }

    async fn send(&self, message: &Message, ctx: SendContext<'_>) -> Result<Delivery, ProviderError> {
        let host = ctx.parsed.hostname.clone().unwrap_or_default();
        self.sent
            .lock()
            .unwrap()
            .push((ctx.url.to_string(), message.body.clone()));
        Ok(Delivery::with_raw(serde_json::json!({ "host": host })))
    }
}

/// Always rejects and counts calls
#[derive(Default)]
struct Failing {
    calls: AtomicUsize,
}

#[async_trait]
impl Provider for Failing {
    fn id(&self) -> &str {
        "failing"
    }

    fn schemas(&self) -> Vec<&str> {
        vec!["fail"]
    }

    async fn send(&self, _message: &Message, _ctx: SendContext<'_>) -> Result<Delivery, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Panics after yielding once
struct Exploding;

#[async_trait]
impl Provider for Exploding {
    fn id(&self) -> &str {
        "exploding"
    }

    fn schemas(&self) -> Vec<&str> {
        vec!["boom"]
    }

    async fn send(&self, _message: &Message, _ctx: SendContext<'_>) -> Result<Delivery, ProviderError> {
        tokio::task::yield_now().await;
        panic!("provider blew up");
    }
}

fn echo(scheme: &'static str) -> (Arc<Echo>, Sent) {
    let sent: Sent = Arc::default();
    (
        Arc::new(Echo {
            scheme,
            sent: sent.clone(),
        }),
        sent,
    )
}

fn hermetic() -> RouterOptions {
    RouterOptions::new().skip_builtins(true).skip_env(true)
}

#[tokio::test]
async fn test_tag_filter_selects_matching_destination() {
    let (provider, sent) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(provider)
            .tagged_url("x://h1/t1", ["u"])
            .tagged_url("x://h2/t2", ["n"]),
    )
    .unwrap();

    let results = router
        .send(&Message::new("hello"), &SendOptions::new().tags(["u"]))
        .await;

    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].provider_id, "echo");
    assert_eq!(results[0].url, "x://h1/t1");
    assert_eq!(results[0].raw, Some(serde_json::json!({ "host": "h1" })));
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_filter_sends_everything_in_order() {
    let (provider, sent) = echo("x");
    let mut router = Router::new(hermetic().provider(provider).url("x://first")).unwrap();
    router.add("x://second", ["a"]);
    router.add("x://third", Vec::<String>::new());

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["x://first", "x://second", "x://third"]);

    let empty_filter = router
        .send(&Message::new("m"), &SendOptions::new().tags(Vec::<String>::new()))
        .await;
    assert_eq!(empty_filter.len(), 3);
    assert_eq!(sent.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn test_empty_selection_is_not_an_error() {
    let (provider, _) = echo("x");
    let router = Router::new(hermetic().provider(provider).tagged_url("x://h", ["a"])).unwrap();

    let results = router
        .send(&Message::new("m"), &SendOptions::new().tags(["zzz"]))
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_unknown_scheme_does_not_abort_batch() {
    let (provider, sent) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(provider)
            .url("nope://somewhere")
            .url("x://host/path"),
    )
    .unwrap();

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;

    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert_eq!(results[0].provider_id, UNKNOWN_PROVIDER);
    assert_eq!(
        results[0].error,
        Some(DispatchError::ProviderNotFound {
            scheme: "nope".to_string()
        })
    );
    assert!(results[1].success);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_placeholder_fails_only_that_destination() {
    let (provider, sent) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(provider)
            .url("x://{missing}/t")
            .url("x://{host}/{path}"),
    )
    .unwrap();

    let options = SendOptions::new()
        .param("host", "example")
        .param("path", "path one");
    let results = router.send(&Message::new("m"), &options).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].provider_id, UNKNOWN_PROVIDER);
    assert!(matches!(
        &results[0].error,
        Some(DispatchError::Placeholder(PlaceholderError::Missing { key, .. })) if key == "missing"
    ));
    assert!(results[1].success);
    assert_eq!(sent.lock().unwrap()[0].0, "x://example/path%20one");
}

#[tokio::test]
async fn test_destination_without_scheme() {
    let (provider, _) = echo("x");
    let router = Router::new(hermetic().provider(provider).url("just-a-host")).unwrap();

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;
    assert!(matches!(
        results[0].error,
        Some(DispatchError::Parse(ParseError::MissingScheme { .. }))
    ));
}

#[tokio::test]
async fn test_provider_panic_is_captured() {
    let (provider, sent) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(Arc::new(Exploding))
            .provider(provider)
            .url("boom://host")
            .url("x://host"),
    )
    .unwrap();

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;

    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert_eq!(results[0].provider_id, "exploding");
    assert!(matches!(
        &results[0].error,
        Some(DispatchError::Panicked { message, .. }) if message == "provider blew up"
    ));
    assert!(results[1].success);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_provider_error_is_captured() {
    let failing = Arc::new(Failing::default());
    let router = Router::new(hermetic().provider(failing.clone()).url("fail://host")).unwrap();

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider_id, "failing");
    assert_eq!(results[0].error.as_ref().unwrap().code(), "PROVIDER_ERROR");
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fallback_skipped_when_failed_send_used_fallback_tag() {
    let failing = Arc::new(Failing::default());
    let router = Router::new(
        hermetic()
            .provider(failing.clone())
            .tagged_url("fail://primary", ["a"])
            .on_error(FallbackOptions::new().fallback_tags(["a"])),
    )
    .unwrap();

    let results = router
        .send(&Message::new("m"), &SendOptions::new().tags(["a"]))
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    assert_eq!(router.stats().fallback_failures, 0);
    assert_eq!(router.stats().fallbacks_sent, 0);
}

#[tokio::test]
async fn test_fallback_notifies_other_audience() {
    let failing = Arc::new(Failing::default());
    let (provider, sent) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(failing.clone())
            .provider(provider)
            .tagged_url("fail://primary", ["b"])
            .tagged_url("x://pager", ["a"])
            .on_error(FallbackOptions::new().fallback_tags(["a"])),
    )
    .unwrap();

    let results = router
        .send(&Message::new("m"), &SendOptions::new().tags(["b"]))
        .await;

    assert_eq!(results.len(), 1);
    assert!(!results[0].success);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "x://pager");
    assert!(sent[0].1.starts_with("Notification failed: [failing]"));
    assert_eq!(router.stats().fallbacks_sent, 1);
}

#[tokio::test]
async fn test_fallback_failures_do_not_cascade() {
    let failing = Arc::new(Failing::default());
    let router = Router::new(
        hermetic()
            .provider(failing.clone())
            .tagged_url("fail://primary", ["b"])
            .tagged_url("fail://backup", ["a"])
            .on_error(FallbackOptions::new().fallback_tags(["a", "b"])),
    )
    .unwrap();

    let results = router
        .send(&Message::new("m"), &SendOptions::new().tags(["b"]))
        .await;

    assert_eq!(results.len(), 1);
    // primary once, backup once as the fallback, nothing further
    assert_eq!(failing.calls.load(Ordering::SeqCst), 2);
    assert_eq!(router.stats().fallback_failures, 1);
}

#[tokio::test]
async fn test_callback_and_formatter() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_callback = seen.clone();
    let (provider, sent) = echo("x");

    let fallback = FallbackOptions::new()
        .fallback_tags(["oncall"])
        .callback(move |error, context| {
            seen_by_callback
                .lock()
                .unwrap()
                .push(format!("{}|{}", context.provider_id, error.code()));
            Err("callback storage offline".into())
        })
        .formatter(|_, context| {
            Message::new(format!("{} is down", context.url)).with_title("Delivery problem")
        });

    let router = Router::new(
        hermetic()
            .provider(provider)
            .tagged_url("nope://primary", ["team"])
            .tagged_url("x://pager", ["oncall"])
            .on_error(fallback),
    )
    .unwrap();

    let results = router
        .send(&Message::new("m"), &SendOptions::new().tags(["team"]))
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["unknown|PROVIDER_NOT_FOUND"]);
    assert_eq!(sent.lock().unwrap()[0].1, "nope://primary is down");
}

#[tokio::test]
async fn test_panicking_callback_is_contained() {
    let (provider, _) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(provider)
            .url("nope://a")
            .url("x://b")
            .on_error(FallbackOptions::new().callback(|_, _| panic!("callback bug"))),
    )
    .unwrap();

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;
    assert_eq!(results.len(), 2);
    assert!(results[1].success);
}

#[tokio::test]
async fn test_caller_provider_overrides_builtin() {
    let (provider, sent) = echo("json");
    let router = Router::new(
        RouterOptions::new()
            .skip_env(true)
            .provider(provider)
            .url("JSON://hooks.example.com"),
    )
    .unwrap();

    assert_eq!(router.registry().resolve("json").unwrap().id(), "echo");
    assert!(router.registry().has_scheme("ntfy"));

    let results = router.send(&Message::new("m"), &SendOptions::new()).await;
    assert!(results[0].success);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_config_file_destinations_and_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("notifybox.yml");
    fs::write(
        &config_path,
        r#"
urls:
  - url: fail://primary
    tags: team
  - url: x://pager
    tags: [oncall]
fallback:
  tags: [oncall]
"#,
    )
    .unwrap();

    let (provider, sent) = echo("x");
    let router = Router::new(
        hermetic()
            .provider(provider)
            .provider(Arc::new(Failing::default()))
            .tagged_url("x://inline", ["team"])
            .config_path(&config_path),
    )
    .unwrap();

    let urls: Vec<&str> = router.destinations().iter().map(|d| d.url.as_str()).collect();
    assert_eq!(urls, vec!["x://inline", "fail://primary", "x://pager"]);
    assert_eq!(router.fallback().unwrap().tags, vec!["oncall"]);

    let results = router
        .send(&Message::new("m"), &SendOptions::new().tags(["TEAM"]))
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert!(!results[1].success);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].0, "x://pager");
}

#[test]
fn test_missing_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Router::new(hermetic().config_path(temp_dir.path().join("absent.toml")));
    assert!(result.is_err());
}
