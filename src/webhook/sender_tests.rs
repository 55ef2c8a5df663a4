//! Tests for `WebhookSender` and `HttpWebhook`.

use super::*;
use crate::monitor::NetworkClass;
use crate::time::InstantSleeper;
use crate::webhook::HttpResponse;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

/// Mock HTTP client that replays a scripted sequence of results.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn status(status: http::StatusCode) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse::status_only(status))
    }

    fn success() -> Self {
        Self::new(vec![Self::status(http::StatusCode::OK)])
    }

    fn failing_then_success(failures: usize) -> Self {
        let mut responses: Vec<_> = (0..failures).map(|_| Err(HttpError::Timeout)).collect();
        responses.push(Self::status(http::StatusCode::OK));
        Self::new(responses)
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn captured(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(HttpError::Timeout);
        }
        responses.remove(0)
    }
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl Sleeper for &RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn test_url() -> url::Url {
    url::Url::parse("https://hooks.example.com/net").unwrap()
}

fn wifi_to_offline() -> Transition {
    Transition::new(
        NetworkClass::WifiLike,
        NetworkClass::Offline,
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
    )
}

fn webhook(client: MockClient) -> HttpWebhook<MockClient, InstantSleeper> {
    HttpWebhook::new(client, test_url()).with_sleeper(InstantSleeper)
}

mod builder {
    use super::*;

    #[test]
    fn new_uses_post_and_default_policy() {
        let webhook = HttpWebhook::new(MockClient::success(), test_url());

        assert_eq!(webhook.url().as_str(), "https://hooks.example.com/net");
        assert_eq!(*webhook.method(), http::Method::POST);
        assert_eq!(*webhook.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn with_method_and_policy() {
        let webhook = HttpWebhook::new(MockClient::success(), test_url())
            .with_method(http::Method::PUT)
            .with_retry_policy(RetryPolicy::no_retry());

        assert_eq!(*webhook.method(), http::Method::PUT);
        assert_eq!(webhook.retry_policy().max_attempts, 1);
    }
}

mod body {
    use super::*;

    #[tokio::test]
    async fn default_body_is_json_payload() {
        let webhook = webhook(MockClient::success());

        webhook.send(&wifi_to_offline()).await.unwrap();

        let request = &webhook.client.captured()[0];
        let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "from": "wifi_like",
                "to": "offline",
                "connected": false,
                "metered": false,
                "timestamp": 1_700_000_000_u64,
            })
        );
        assert_eq!(
            request.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn template_renders_transition_fields() {
        let webhook = webhook(MockClient::success())
            .with_body_template("{{from}}>{{to}} up={{connected}} metered={{metered}} at {{timestamp}}");
        let transition = Transition::new(
            NetworkClass::Offline,
            NetworkClass::CellularMetered,
            SystemTime::UNIX_EPOCH + Duration::from_secs(42),
        );

        webhook.send(&transition).await.unwrap();

        let request = &webhook.client.captured()[0];
        assert_eq!(
            request.body_text(),
            Some("offline>cellular_metered up=true metered=true at 42")
        );
        assert!(request.headers.get(http::header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn configured_headers_are_sent_and_content_type_kept() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            http::HeaderValue::from_static("Bearer secret"),
        );
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/vnd.alert+json"),
        );
        let webhook = webhook(MockClient::success()).with_headers(headers);

        webhook.send(&wifi_to_offline()).await.unwrap();

        let request = &webhook.client.captured()[0];
        assert_eq!(request.headers.get(http::header::AUTHORIZATION).unwrap(), "Bearer secret");
        assert_eq!(
            request.headers.get_all(http::header::CONTENT_TYPE).iter().count(),
            1
        );
        assert_eq!(
            request.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/vnd.alert+json"
        );
    }

    #[tokio::test]
    async fn unknown_template_variable_fails_without_sending() {
        let webhook = webhook(MockClient::success()).with_body_template("{{adapter}}");

        let result = webhook.send(&wifi_to_offline()).await;

        assert!(matches!(
            result,
            Err(WebhookError::NonRetryable(RetryableError::Template(_)))
        ));
        assert_eq!(webhook.client.calls(), 0);
    }
}

mod retry {
    use super::*;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let webhook = webhook(MockClient::failing_then_success(2));

        webhook.send(&wifi_to_offline()).await.unwrap();

        assert_eq!(webhook.client.calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let webhook = webhook(MockClient::new(vec![
            MockClient::status(http::StatusCode::BAD_GATEWAY),
            MockClient::status(http::StatusCode::BAD_GATEWAY),
            MockClient::status(http::StatusCode::SERVICE_UNAVAILABLE),
        ]));

        let result = webhook.send(&wifi_to_offline()).await;

        let Err(WebhookError::MaxRetriesExceeded { attempts, last_error }) = result else {
            panic!("expected MaxRetriesExceeded");
        };
        assert_eq!(attempts, 3);
        assert!(matches!(
            last_error,
            RetryableError::NonSuccessStatus { status, .. } if status == http::StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(webhook.client.calls(), 3);
    }

    #[tokio::test]
    async fn client_error_status_is_not_retried() {
        let webhook = webhook(MockClient::new(vec![MockClient::status(
            http::StatusCode::UNAUTHORIZED,
        )]));

        let result = webhook.send(&wifi_to_offline()).await;

        assert!(matches!(result, Err(WebhookError::NonRetryable(_))));
        assert_eq!(webhook.client.calls(), 1);
    }

    #[tokio::test]
    async fn too_many_requests_is_retried() {
        let webhook = webhook(MockClient::new(vec![
            MockClient::status(http::StatusCode::TOO_MANY_REQUESTS),
            MockClient::status(http::StatusCode::NO_CONTENT),
        ]));

        webhook.send(&wifi_to_offline()).await.unwrap();

        assert_eq!(webhook.client.calls(), 2);
    }

    #[tokio::test]
    async fn sleeps_follow_backoff_schedule() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new()
            .with_max_attempts(4)
            .with_initial_delay(Duration::from_secs(1));
        let webhook = HttpWebhook::new(MockClient::new(vec![]), test_url())
            .with_retry_policy(policy.clone())
            .with_sleeper(&sleeper);

        let result = webhook.send(&wifi_to_offline()).await;

        assert!(matches!(result, Err(WebhookError::MaxRetriesExceeded { attempts: 4, .. })));
        assert_eq!(*sleeper.delays.lock().unwrap(), policy.delays().collect::<Vec<_>>());
    }
}

mod retryable {
    use super::*;

    #[test]
    fn http_errors() {
        assert!(HttpError::Timeout.is_retryable());
        assert!(HttpError::Connection("reset".into()).is_retryable());
        assert!(!HttpError::InvalidRequest("bad header".to_string()).is_retryable());
    }

    #[test]
    fn statuses() {
        let status = |code: u16| RetryableError::NonSuccessStatus {
            status: http::StatusCode::from_u16(code).unwrap(),
            body: None,
        };

        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(408).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn template_errors_are_permanent() {
        assert!(!RetryableError::Template("x".to_string()).is_retryable());
    }
}
