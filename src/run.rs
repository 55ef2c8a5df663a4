//! Application execution logic.
//!
//! One-shot commands (`status`, `interfaces`) and the `watch` loop that
//! observes network class changes and reports them.

use serde::Serialize;
use thiserror::Error;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use reachwatch::config::{OutputArgs, ValidatedConfig, WebhookConfig};
use reachwatch::monitor::platform::NetwatcherSubscriber;
use reachwatch::monitor::{NetworkClass, ObserverBuilder, ObserverError, Transition, classify};
use reachwatch::network::platform::{
    InterfaceInfo, NetdevProvider, PlatformOptions, list_interfaces,
};
use reachwatch::network::{PlatformError, RawSnapshot, SnapshotProvider};
use reachwatch::webhook::{HttpError, HttpWebhook, ReqwestClient, WebhookSender};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The observer could not start.
    #[error("Failed to start network observer: {0}")]
    ObserverStart(#[source] ObserverError),

    /// A one-shot platform query failed.
    #[error("Failed to query network state: {0}")]
    Query(#[source] PlatformError),

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// Output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Output(#[source] serde_json::Error),

    /// Unexpected stream termination.
    #[error("Transition stream terminated unexpectedly")]
    StreamTerminated,
}

/// JSON shape of `reachwatch status --json`.
#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    class: NetworkClass,
    connected: bool,
    metered: bool,
    snapshot: &'a RawSnapshot,
}

/// Prints the classification of a single snapshot.
///
/// Excluded from coverage - requires platform APIs.
#[cfg(not(tarpaulin_include))]
pub fn status(options: PlatformOptions, output: OutputArgs) -> Result<(), RunError> {
    let snapshot = NetdevProvider::new(options)
        .snapshot()
        .map_err(RunError::Query)?;
    println!("{}", render_status(&snapshot, output.json)?);
    Ok(())
}

/// Prints every interface the classifier considers.
///
/// Excluded from coverage - requires platform APIs.
#[cfg(not(tarpaulin_include))]
pub fn interfaces(output: OutputArgs) -> Result<(), RunError> {
    let interfaces = list_interfaces().map_err(RunError::Query)?;
    println!("{}", render_interfaces(&interfaces, output.json)?);
    Ok(())
}

fn render_status(snapshot: &RawSnapshot, json: bool) -> Result<String, RunError> {
    let class = classify(snapshot);
    if json {
        let report = StatusReport {
            class,
            connected: class.is_connected(),
            metered: class.is_metered(),
            snapshot,
        };
        return serde_json::to_string_pretty(&report).map_err(RunError::Output);
    }

    let connectivity = if class.is_connected() {
        "connected"
    } else {
        "disconnected"
    };
    let metering = if class.is_metered() { "metered" } else { "unmetered" };
    Ok(format!("{class} ({connectivity}, {metering})\n  {snapshot}"))
}

fn render_interfaces(interfaces: &[InterfaceInfo], json: bool) -> Result<String, RunError> {
    if json {
        return serde_json::to_string_pretty(interfaces).map_err(RunError::Output);
    }
    if interfaces.is_empty() {
        return Ok("no interfaces".to_string());
    }

    Ok(interfaces
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Runs the watch loop until a shutdown signal.
///
/// This function:
/// 1. Starts an observer on the platform interface watcher
/// 2. Creates the webhook sender, if configured
/// 3. Logs (and delivers) every transition until Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - The observer cannot start (platform unavailable)
/// - The HTTP client cannot be built
/// - The transition stream ends unexpectedly
///
/// Excluded from coverage - requires platform APIs and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let webhook = config
        .webhook
        .as_ref()
        .map(create_webhook)
        .transpose()?;

    if config.dry_run {
        tracing::info!("Dry-run mode enabled - transitions will be logged but not sent");
    }
    if webhook.is_none() {
        tracing::info!("No webhook configured - transitions will only be logged");
    }

    let provider = NetdevProvider::new(config.platform);
    let (failure_tx, mut failures) = mpsc::unbounded_channel();
    let observer = ObserverBuilder::new()
        .with_failure_sink(failure_tx)
        .start(provider, NetwatcherSubscriber::new(provider))
        .map_err(RunError::ObserverStart)?;

    tracing::info!("Watching network changes (current: {})", observer.current());

    let mut transitions = observer.transitions();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                break Ok(());
            }

            Some(failure) = failures.recv() => {
                tracing::debug!("Listener failure reported: {failure}");
            }

            transition = transitions.next() => {
                match transition {
                    Some(transition) => {
                        handle_transition(&transition, webhook.as_ref(), config.dry_run).await;
                    }
                    None => break Err(RunError::StreamTerminated),
                }
            }
        }
    };

    observer.stop();
    result
}

/// Creates the HTTP webhook sender from configuration.
fn create_webhook(config: &WebhookConfig) -> Result<HttpWebhook<ReqwestClient>, RunError> {
    let client = ReqwestClient::new().map_err(RunError::HttpClient)?;
    let mut webhook = HttpWebhook::new(client, config.url.clone())
        .with_method(config.method.clone())
        .with_headers(config.headers.clone())
        .with_retry_policy(config.retry_policy.clone());

    if let Some(ref template) = config.body_template {
        webhook = webhook.with_body_template(template);
    }

    Ok(webhook)
}

/// Logs one transition and delivers it to the webhook.
async fn handle_transition<W: WebhookSender>(
    transition: &Transition,
    webhook: Option<&W>,
    dry_run: bool,
) {
    if transition.is_disconnect() {
        tracing::warn!("Network lost: {transition}");
    } else {
        tracing::info!("Network changed: {transition}");
    }

    let Some(webhook) = webhook else {
        return;
    };

    if dry_run {
        tracing::info!("Dry-run: skipping webhook for {transition}");
        return;
    }

    match webhook.send(transition).await {
        Ok(()) => tracing::debug!("Webhook sent for {transition}"),
        Err(e) => tracing::error!("Webhook failed: {e}"),
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed, that signal source is ignored.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
