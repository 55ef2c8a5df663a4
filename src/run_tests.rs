//! Tests for the run module.

use super::*;
use reachwatch::network::Transport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

mod run_error {
    use super::*;

    #[test]
    fn stream_terminated_displays_message() {
        let error = RunError::StreamTerminated;
        assert_eq!(error.to_string(), "Transition stream terminated unexpectedly");
    }

    #[test]
    fn observer_start_displays_source() {
        let error = RunError::ObserverStart(ObserverError::PlatformUnavailable(
            PlatformError::unavailable("no interfaces"),
        ));

        assert!(error.to_string().contains("Failed to start network observer"));
        assert!(error.to_string().contains("no interfaces"));
    }
}

mod render {
    use super::*;

    fn eth0() -> InterfaceInfo {
        InterfaceInfo {
            index: 2,
            name: "eth0".to_string(),
            transport: Transport::Ethernet,
            is_up: true,
            is_loopback: false,
            is_default: true,
            has_gateway: true,
            address_count: 1,
        }
    }

    #[test]
    fn status_text_shows_class_and_snapshot() {
        let text = render_status(&RawSnapshot::online(Transport::Wifi), false).unwrap();

        assert!(text.starts_with("wifi_like (connected, unmetered)"));
        assert!(text.contains("transports=wifi"));
    }

    #[test]
    fn status_text_offline() {
        let text = render_status(&RawSnapshot::offline(), false).unwrap();
        assert!(text.starts_with("offline (disconnected, unmetered)"));
    }

    #[test]
    fn status_json_has_class_and_flags() {
        let snapshot = RawSnapshot::online(Transport::Cellular).with_metered(true);
        let json = render_status(&snapshot, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["class"], "cellular_metered");
        assert_eq!(value["connected"], true);
        assert_eq!(value["metered"], true);
        assert_eq!(value["snapshot"]["transports"], serde_json::json!(["cellular"]));
    }

    #[test]
    fn interfaces_text_is_one_line_each() {
        let mut wlan = eth0();
        wlan.index = 3;
        wlan.name = "wlan0".to_string();
        wlan.transport = Transport::Wifi;
        wlan.is_default = false;

        let text = render_interfaces(&[eth0(), wlan], false).unwrap();

        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("eth0"));
    }

    #[test]
    fn interfaces_empty_text() {
        assert_eq!(render_interfaces(&[], false).unwrap(), "no interfaces");
    }

    #[test]
    fn interfaces_json_is_array() {
        let json = render_interfaces(&[eth0()], true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["name"], "eth0");
        assert_eq!(value[0]["transport"], "ethernet");
    }
}

mod create_webhook {
    use super::*;
    use reachwatch::config::Cli;

    fn webhook_config(args: &[&str]) -> WebhookConfig {
        let mut full = vec!["reachwatch", "--url", "https://hooks.example.com/net"];
        full.extend(args);
        ValidatedConfig::from_raw(&Cli::parse_from_iter(full), None)
            .unwrap()
            .webhook
            .unwrap()
    }

    #[test]
    fn uses_configured_url_and_method() {
        let webhook = create_webhook(&webhook_config(&["--method", "PUT"])).unwrap();

        assert_eq!(webhook.url().as_str(), "https://hooks.example.com/net");
        assert_eq!(*webhook.method(), http::Method::PUT);
    }

    #[test]
    fn uses_configured_retry_policy() {
        let webhook = create_webhook(&webhook_config(&["--retry-max", "5"])).unwrap();
        assert_eq!(webhook.retry_policy().max_attempts, 5);
    }
}

mod handle_transition {
    use super::*;
    use reachwatch::webhook::{HttpError, RetryableError, WebhookError};

    struct MockSender {
        sent: AtomicUsize,
        fail: bool,
    }

    impl MockSender {
        const fn new() -> Self {
            Self {
                sent: AtomicUsize::new(0),
                fail: false,
            }
        }

        const fn failing() -> Self {
            Self {
                sent: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn send_count(&self) -> usize {
            self.sent.load(Ordering::SeqCst)
        }
    }

    impl WebhookSender for MockSender {
        async fn send(&self, _transition: &Transition) -> Result<(), WebhookError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WebhookError::MaxRetriesExceeded {
                    attempts: 3,
                    last_error: RetryableError::Http(HttpError::Timeout),
                });
            }
            Ok(())
        }
    }

    fn transition() -> Transition {
        Transition::new(
            NetworkClass::WifiLike,
            NetworkClass::Offline,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn sends_webhook_when_not_dry_run() {
        let sender = MockSender::new();
        handle_transition(&transition(), Some(&sender), false).await;
        assert_eq!(sender.send_count(), 1);
    }

    #[tokio::test]
    async fn skips_webhook_in_dry_run() {
        let sender = MockSender::new();
        handle_transition(&transition(), Some(&sender), true).await;
        assert_eq!(sender.send_count(), 0);
    }

    #[tokio::test]
    async fn handles_webhook_failure_gracefully() {
        let sender = MockSender::failing();
        handle_transition(&transition(), Some(&sender), false).await;
        assert_eq!(sender.send_count(), 1);
    }

    #[tokio::test]
    async fn logs_only_without_webhook() {
        handle_transition::<MockSender>(&transition(), None, false).await;
    }
}
