// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Provider transport implementations.
//!
//! The dispatch loop sees only the `ProviderTransport` contract; these
//! implementations fold every failure mode into the returned outcome,
//! so a dead gateway surfaces as per-recipient failures rather than a
//! dispatch fault.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use wa_blast::{ProviderTransport, SendOutcome};

/// Request timeout for one gateway send.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire request for one message send.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    /// The destination phone in canonical form.
    phone: &'a str,
    /// The fully rendered message body.
    body: &'a str,
}

/// Wire response from the gateway.
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    /// Whether the provider accepted the message.
    success: bool,
    /// Provider error detail when the send was rejected.
    #[serde(default)]
    error: Option<String>,
}

/// Transport that delivers messages through an HTTP WhatsApp gateway.
///
/// Sends `POST {base_url}/instances/{instance_id}/messages` with a JSON
/// body and treats anything other than a successful, well-formed
/// acceptance as a per-recipient failure.
pub struct HttpProviderTransport {
    /// The shared HTTP client.
    client: reqwest::Client,
    /// Gateway base URL without a trailing slash.
    base_url: String,
}

impl HttpProviderTransport {
    /// Creates a transport against the given gateway base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client: reqwest::Client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProviderTransport for HttpProviderTransport {
    async fn send(&self, instance_id: &str, phone: &str, body: &str) -> SendOutcome {
        let url: String = format!("{}/instances/{instance_id}/messages", self.base_url);
        let request: SendMessageRequest<'_> = SendMessageRequest { phone, body };

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(instance_id, phone, error = %err, "Gateway request failed");
                return SendOutcome::failure(format!("Gateway request failed: {err}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail: String = response.text().await.unwrap_or_default();
            warn!(instance_id, phone, %status, "Gateway rejected send");
            return SendOutcome::failure(format!("Gateway returned {status}: {detail}"));
        }

        match response.json::<SendMessageResponse>().await {
            Ok(reply) if reply.success => {
                debug!(instance_id, phone, "Gateway accepted message");
                SendOutcome::ok()
            }
            Ok(reply) => SendOutcome::failure(
                reply
                    .error
                    .unwrap_or_else(|| String::from("Provider rejected the message")),
            ),
            Err(err) => SendOutcome::failure(format!("Malformed gateway response: {err}")),
        }
    }
}

/// Transport for dry runs: logs each message instead of delivering it.
///
/// Every send succeeds, so a dry run exercises the full dispatch loop
/// including delays, counters, and cancellation.
pub struct LoggingTransport;

#[async_trait]
impl ProviderTransport for LoggingTransport {
    async fn send(&self, instance_id: &str, phone: &str, body: &str) -> SendOutcome {
        tracing::info!(instance_id, phone, body, "Dry run: message not delivered");
        SendOutcome::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_transport_always_succeeds() {
        let outcome = LoggingTransport.send("primary", "0811", "Hi Alice").await;
        assert!(outcome.success);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_http_transport_folds_connection_failure_into_outcome() {
        // Nothing listens on this port; the failure must come back as an
        // outcome, not a panic or an Err.
        let transport =
            HttpProviderTransport::new("http://127.0.0.1:1/").expect("client should build");

        let outcome = transport.send("primary", "0811", "Hi Alice").await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("Gateway request failed"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport =
            HttpProviderTransport::new("http://gateway.local/").expect("client should build");
        assert_eq!(transport.base_url, "http://gateway.local");
    }
}
