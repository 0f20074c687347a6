use std::sync::Arc;

use async_trait::async_trait;
use rollbar_notifier::host::SystemHostResolver;
use rollbar_notifier::transport::{PostRequest, Transport, TransportError};
use rollbar_notifier::{Level, Notifier, NotifierConfig, ReportedError};

/// Example of plugging in a completely custom transport by implementing
/// the `Transport` trait directly. Imagine this forwards items through a
/// company proxy for which this crate does not provide a client.
struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
    async fn execute(&self, request: &PostRequest) -> Result<u16, TransportError> {
        println!("[stdout-transport] {} {} attempt={}", request.method(), request.endpoint(), request.attempts());
        println!("{}", request.body());
        Ok(200)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = NotifierConfig::from_env();
    let notifier = Notifier::with_parts(config, Arc::new(StdoutTransport), &SystemHostResolver)?;

    notifier.notify_message(Level::Info, "custom transport example started").await;

    let err = std::fs::read_to_string("/definitely/not/here").unwrap_err();
    notifier.notify_error(Level::Error, &ReportedError::from_error(&err)).await;

    Ok(())
}
