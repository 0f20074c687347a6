use crate::transport::{PostRequest, Transport, TransportError};
use async_trait::async_trait;

/// A transport that accepts every item without sending it anywhere.
///
/// Useful for measuring the cost of building and serializing items, and
/// for tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
    async fn execute(&self, _request: &PostRequest) -> Result<u16, TransportError> {
        Ok(200)
    }
}
