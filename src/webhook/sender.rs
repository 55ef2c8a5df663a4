//! Webhook sender trait and HTTP implementation.

use std::future::Future;

use handlebars::Handlebars;
use serde::Serialize;

use crate::monitor::Transition;
use crate::time::{Sleeper, TokioSleeper};

use super::{HttpClient, HttpError, HttpRequest, RetryPolicy, RetryableError, WebhookError};

/// Trait for delivering network transitions to an external service.
///
/// Implementations handle retries internally, returning
/// [`WebhookError::MaxRetriesExceeded`] when all attempts fail.
pub trait WebhookSender: Send + Sync {
    /// Delivers one transition.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError`] if delivery fails after all retries or
    /// fails in a way retrying cannot fix.
    fn send(&self, transition: &Transition) -> impl Future<Output = Result<(), WebhookError>> + Send;
}

/// HTTP webhook with exponential backoff.
///
/// # Body
///
/// Without a template the body is JSON:
///
/// ```json
/// {"from":"wifi_like","to":"offline","connected":false,"metered":false,"timestamp":1700000000}
/// ```
///
/// and `Content-Type: application/json` is added unless configured
/// otherwise. With a Handlebars template the same fields are available as
/// `{{from}}`, `{{to}}`, `{{connected}}`, `{{metered}}` and `{{timestamp}}`;
/// `connected` and `metered` describe the new class.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between retries (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```no_run
/// use reachwatch::webhook::{HttpWebhook, ReqwestClient, RetryPolicy};
/// use url::Url;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let webhook = HttpWebhook::new(
///     ReqwestClient::new()?,
///     Url::parse("https://hooks.example.com/net")?,
/// )
/// .with_body_template(r#"{"text": "network {{from}} -> {{to}}"}"#)
/// .with_retry_policy(RetryPolicy::no_retry());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpWebhook<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    url: url::Url,
    method: http::Method,
    headers: http::HeaderMap,
    body_template: Option<String>,
    retry_policy: RetryPolicy,
}

impl<H> HttpWebhook<H, TokioSleeper> {
    /// Creates a POST webhook with no extra headers, the default JSON body
    /// and the default retry policy.
    #[must_use]
    pub fn new(client: H, url: url::Url) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            url,
            method: http::Method::POST,
            headers: http::HeaderMap::new(),
            body_template: None,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<H, S> HttpWebhook<H, S> {
    /// Replaces the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> HttpWebhook<H, S2> {
        HttpWebhook {
            client: self.client,
            sleeper,
            url: self.url,
            method: self.method,
            headers: self.headers,
            body_template: self.body_template,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the headers sent with every request.
    #[must_use]
    pub fn with_headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a Handlebars body template.
    #[must_use]
    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the target URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

/// Fields exposed to the JSON body and to templates.
#[derive(Debug, Serialize)]
struct TransitionPayload {
    from: &'static str,
    to: &'static str,
    connected: bool,
    metered: bool,
    timestamp: u64,
}

impl From<&Transition> for TransitionPayload {
    fn from(transition: &Transition) -> Self {
        Self {
            from: transition.from.as_str(),
            to: transition.to.as_str(),
            connected: transition.to.is_connected(),
            metered: transition.to.is_metered(),
            timestamp: transition.unix_seconds(),
        }
    }
}

impl<H: HttpClient, S: Sleeper> HttpWebhook<H, S> {
    fn render_body(&self, payload: &TransitionPayload) -> Result<Vec<u8>, RetryableError> {
        let Some(template) = &self.body_template else {
            return serde_json::to_vec(payload).map_err(RetryableError::Payload);
        };

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .render_template(template, payload)
            .map(String::into_bytes)
            .map_err(|e| RetryableError::Template(e.to_string()))
    }

    fn build_request(&self, transition: &Transition) -> Result<HttpRequest, RetryableError> {
        let body = self.render_body(&TransitionPayload::from(transition))?;
        let mut request = HttpRequest::new(self.method.clone(), self.url.clone()).with_body(body);

        for (name, value) in &self.headers {
            request.headers.append(name, value.clone());
        }
        if self.body_template.is_none() && !request.headers.contains_key(http::header::CONTENT_TYPE)
        {
            request.headers.insert(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/json"),
            );
        }

        Ok(request)
    }

    async fn execute_request(&self, request: &HttpRequest) -> Result<(), RetryableError> {
        let response = self.client.request(request.clone()).await?;

        if response.is_success() {
            return Ok(());
        }

        Err(RetryableError::NonSuccessStatus {
            status: response.status,
            body: response.body_text().map(ToString::to_string),
        })
    }

    async fn send_with_retry(&self, transition: &Transition) -> Result<(), WebhookError> {
        let request = self.build_request(transition)?;
        let max_attempts = self.retry_policy.max_attempts;
        let mut attempt = 1;

        loop {
            let error = match self.execute_request(&request).await {
                Ok(()) => {
                    tracing::debug!(%transition, attempt, "webhook delivered");
                    return Ok(());
                }
                Err(e) if !e.is_retryable() => return Err(e.into()),
                Err(e) => e,
            };

            if !self.retry_policy.should_retry(attempt) {
                return Err(WebhookError::MaxRetriesExceeded {
                    attempts: max_attempts,
                    last_error: error,
                });
            }

            let delay = self.retry_policy.delay_for_retry(attempt - 1);
            tracing::warn!(
                "Webhook attempt {attempt}/{max_attempts} failed: {error}; retrying in {delay:?}"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

impl<H: HttpClient, S: Sleeper> WebhookSender for HttpWebhook<H, S> {
    async fn send(&self, transition: &Transition) -> Result<(), WebhookError> {
        self.send_with_retry(transition).await
    }
}

/// Classifies errors as transient (worth retrying) or permanent.
pub trait IsRetryable {
    /// Returns true if a later attempt may succeed.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidRequest(_) => false,
        }
    }
}

impl IsRetryable for RetryableError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_retryable(),
            Self::NonSuccessStatus { status, .. } => {
                status.is_server_error()
                    || *status == http::StatusCode::TOO_MANY_REQUESTS
                    || *status == http::StatusCode::REQUEST_TIMEOUT
            }
            Self::Template(_) | Self::Payload(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "sender_tests.rs"]
mod tests;
