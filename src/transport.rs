use async_trait::async_trait;
use url::Url;

/// Error returned by a [`Transport`] when a request could not be completed.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,
}

/// Asynchronous HTTP capability used to deliver items.
///
/// Implementations only move bytes: they do not retry and do not interpret
/// the status code. A notifier shares one transport between all callers, so
/// implementations must tolerate concurrent `execute` calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once.
    ///
    /// **Returns**
    /// - `Ok(status)` with the HTTP status code of the response.
    /// - `Err(..)` if no response was received (connection refused, DNS,
    ///   TLS, timeout, ...).
    async fn execute(&self, request: &PostRequest) -> Result<u16, TransportError>;
}

/// One JSON `POST` and the number of times it has been attempted.
#[derive(Debug, Clone)]
pub struct PostRequest {
    endpoint: Url,
    headers: Vec<(&'static str, &'static str)>,
    body: String,
    attempts: u32,
}

impl PostRequest {
    pub fn json(endpoint: Url, body: String) -> Self {
        PostRequest {
            endpoint,
            headers: vec![
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
            ],
            body,
            attempts: 0,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn method(&self) -> &'static str {
        "POST"
    }

    pub fn headers(&self) -> &[(&'static str, &'static str)] {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Number of completed calls to [`execute`](Self::execute).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Perform one attempt through `transport`.
    ///
    /// Returns `true` only for a 2xx response.
    pub async fn execute(&mut self, transport: &dyn Transport) -> bool {
        self.attempts += 1;
        match transport.execute(self).await {
            Ok(status) if (200..300).contains(&status) => true,
            Ok(status) => {
                tracing::debug!(attempt = self.attempts, status, "item rejected");
                false
            }
            Err(e) => {
                tracing::debug!(attempt = self.attempts, error = %e, "item delivery failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStatus(u16);

    #[async_trait]
    impl Transport for FixedStatus {
        async fn execute(&self, _request: &PostRequest) -> Result<u16, TransportError> {
            Ok(self.0)
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: &PostRequest) -> Result<u16, TransportError> {
            Err(TransportError::Request("connection refused".to_string()))
        }
    }

    fn request() -> PostRequest {
        let url = Url::parse("https://api.rollbar.com/api/1/item/").unwrap();
        PostRequest::json(url, "{}".to_string())
    }

    #[test]
    fn json_request_carries_headers() {
        let request = request();
        assert_eq!(request.method(), "POST");
        assert_eq!(
            request.headers(),
            &[
                ("Content-Type", "application/json"),
                ("Accept", "application/json")
            ]
        );
        assert_eq!(request.attempts(), 0);
    }

    #[tokio::test]
    async fn execute_counts_attempts_and_checks_status() {
        let mut request = request();

        assert!(request.execute(&FixedStatus(200)).await);
        assert!(!request.execute(&FixedStatus(429)).await);
        assert!(!request.execute(&FixedStatus(500)).await);
        assert!(!request.execute(&Unreachable).await);
        assert_eq!(request.attempts(), 4);
    }
}
