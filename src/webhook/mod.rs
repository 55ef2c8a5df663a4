//! Webhook layer for reporting transitions to external services.
//!
//! This module provides types and traits for:
//! - Building HTTP requests and responses ([`HttpRequest`], [`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`], [`ReqwestClient`])
//! - Delivering transitions with retries ([`WebhookSender`], [`HttpWebhook`])
//! - Backoff configuration ([`RetryPolicy`])

mod client;
mod error;
mod http;
mod retry;
mod sender;

pub use client::ReqwestClient;
pub use error::{HttpError, RetryableError, WebhookError};
pub use self::http::{HttpClient, HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
pub use sender::{HttpWebhook, IsRetryable, WebhookSender};
