use crate::transport::{PostRequest, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Reuse an existing client (connection pool, proxy settings, ...).
    pub fn with_client(client: Client) -> Self {
        ReqwestTransport {
            client,
            timeout: None,
        }
    }

    /// Bound each request; by default requests may take as long as the
    /// client allows.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &PostRequest) -> Result<u16, TransportError> {
        let mut builder = self
            .client
            .post(request.endpoint().clone())
            .body(request.body().to_string());

        for (name, value) in request.headers() {
            builder = builder.header(*name, *value);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            tracing::debug!(status = status.as_u16(), body = %text, "rollbar api returned an error");
        }
        Ok(status.as_u16())
    }
}
