use crate::attributes::AttributeProvider;
use crate::builder::NotificationBuilder;
use crate::config::{NotifierConfig, RetryPolicy};
use crate::document::Document;
use crate::error::{NotifierError, Result};
use crate::event::{Level, ReportedError};
use crate::host::HostResolver;
use crate::transport::{PostRequest, Transport};
use std::fmt;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Callback receiving failures that are neither delivery errors nor retry
/// exhaustion (for example a payload that cannot be serialized).
///
/// The callback runs on the task that called `notify`. It must not report
/// through the same notifier.
#[derive(Clone)]
pub struct FailureHandler(Arc<dyn Fn(&NotifierError) + Send + Sync>);

impl FailureHandler {
    pub fn new(handler: impl Fn(&NotifierError) + Send + Sync + 'static) -> Self {
        FailureHandler(Arc::new(handler))
    }

    pub fn handle(&self, error: &NotifierError) {
        (self.0)(error)
    }
}

impl Default for FailureHandler {
    /// Prints the failure to stderr.
    fn default() -> Self {
        FailureHandler::new(|e| eprintln!("rollbar notifier failure: {}", e))
    }
}

impl fmt::Debug for FailureHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FailureHandler(..)")
    }
}

/// Turns a built item into the request body.
pub type Encoder = fn(&Document) -> serde_json::Result<String>;

/// Final state of one `notify` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint accepted the item.
    Delivered { attempts: u32 },
    /// Every attempt failed; the item was dropped.
    GaveUp { attempts: u32 },
    /// Cancellation was requested while waiting to retry.
    Cancelled { attempts: u32 },
    /// An unexpected failure was passed to the [`FailureHandler`].
    Failed,
}

/// Builds items and posts them to the Rollbar API with bounded retry.
///
/// A notifier is read-only once configured and can be shared between tasks
/// behind an `Arc`; each `notify` call owns its own payload and attempt
/// state.
pub struct Notifier {
    endpoint: Url,
    builder: NotificationBuilder,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    on_failure: FailureHandler,
    encode: Encoder,
    cancel: CancellationToken,
}

impl Notifier {
    /// Create a notifier that posts with [`ReqwestTransport`] and reports
    /// the host found by [`SystemHostResolver`].
    ///
    /// **Errors**
    /// - [`NotifierError::InvalidEndpoint`] if `config.endpoint` is not a URL.
    /// - [`NotifierError::HostResolution`] if the local host cannot be
    ///   resolved.
    ///
    /// [`ReqwestTransport`]: crate::http::ReqwestTransport
    /// [`SystemHostResolver`]: crate::host::SystemHostResolver
    #[cfg(feature = "http")]
    pub fn new(config: NotifierConfig) -> Result<Self> {
        Self::with_parts(
            config,
            Arc::new(crate::http::ReqwestTransport::new()),
            &crate::host::SystemHostResolver,
        )
    }

    /// Create a notifier from an explicit transport and host resolver.
    ///
    /// The host is resolved here, once, and reused for every item.
    pub fn with_parts(
        config: NotifierConfig,
        transport: Arc<dyn Transport>,
        resolver: &dyn HostResolver,
    ) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let host = resolver.resolve().map_err(NotifierError::HostResolution)?;
        let builder = NotificationBuilder::new(
            config.access_token,
            config.environment,
            config.code_root.as_deref(),
            host,
        );

        Ok(Notifier {
            endpoint,
            builder,
            transport,
            retry: RetryPolicy::default(),
            on_failure: FailureHandler::default(),
            encode: serde_json::to_string::<Document>,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            max_attempts: policy.max_attempts.max(1),
            delay: policy.delay,
        };
        self
    }

    /// Replace the body encoder, e.g. with `serde_json::to_string_pretty`.
    /// Encoding errors are passed to the failure handler.
    pub fn with_encoder(mut self, encode: Encoder) -> Self {
        self.encode = encode;
        self
    }

    /// Replace the failure handler. Passing `None` is rejected and leaves
    /// the current handler in place.
    pub fn set_failure_handler(&mut self, handler: Option<FailureHandler>) -> Result<()> {
        let handler = handler.ok_or(NotifierError::MissingFailureHandler)?;
        self.on_failure = handler;
        Ok(())
    }

    /// Token that aborts retry waits of every in-flight `notify` call when
    /// cancelled, typically on application shutdown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn builder(&self) -> &NotificationBuilder {
        &self.builder
    }

    pub async fn notify_message(&self, level: Level, message: &str) -> Delivery {
        self.notify(level, Some(message), None, None).await
    }

    pub async fn notify_error(&self, level: Level, error: &ReportedError) -> Delivery {
        self.notify(level, None, Some(error), None).await
    }

    /// Build an item and deliver it, retrying failed attempts.
    ///
    /// Never returns an error: exhausted retries and cancellation end the
    /// call quietly, anything else goes to the failure handler.
    pub async fn notify(
        &self,
        level: Level,
        message: Option<&str>,
        error: Option<&ReportedError>,
        attributes: Option<&dyn AttributeProvider>,
    ) -> Delivery {
        self.notify_with(level, message, error, attributes, &self.cancel)
            .await
    }

    /// Like [`notify`](Self::notify), but retry waits observe `cancel`
    /// instead of the notifier's own token.
    pub async fn notify_with(
        &self,
        level: Level,
        message: Option<&str>,
        error: Option<&ReportedError>,
        attributes: Option<&dyn AttributeProvider>,
        cancel: &CancellationToken,
    ) -> Delivery {
        let document = self.builder.build(level, message, error, attributes);
        match self.deliver(&document, cancel).await {
            Ok(delivery) => delivery,
            Err(e) => {
                self.on_failure.handle(&e);
                Delivery::Failed
            }
        }
    }

    async fn deliver(&self, document: &Document, cancel: &CancellationToken) -> Result<Delivery> {
        let body = (self.encode)(document)?;
        let mut request = PostRequest::json(self.endpoint.clone(), body);

        let mut success = request.execute(&*self.transport).await;
        while !success && request.attempts() < self.retry.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(attempts = request.attempts(), "item delivery cancelled");
                    return Ok(Delivery::Cancelled { attempts: request.attempts() });
                }
                _ = sleep(self.retry.delay) => {}
            }
            success = request.execute(&*self.transport).await;
        }

        let attempts = request.attempts();
        if success {
            Ok(Delivery::Delivered { attempts })
        } else {
            tracing::warn!(attempts, "giving up on item delivery");
            Ok(Delivery::GaveUp { attempts })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostInfo, StaticHost};
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then answers 200. Records bodies.
    struct ScriptedTransport {
        failures: u32,
        calls: AtomicU32,
        bodies: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn failing(failures: u32) -> Arc<Self> {
            Arc::new(ScriptedTransport {
                failures,
                calls: AtomicU32::new(0),
                bodies: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: &PostRequest) -> std::result::Result<u16, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.bodies.lock().unwrap().push(request.body().to_string());
            if call <= self.failures {
                if call % 2 == 0 {
                    Ok(503)
                } else {
                    Err(TransportError::Request("connection reset".to_string()))
                }
            } else {
                Ok(200)
            }
        }
    }

    struct NoHost;

    impl HostResolver for NoHost {
        fn resolve(&self) -> io::Result<HostInfo> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no host"))
        }
    }

    fn config() -> NotifierConfig {
        NotifierConfig::new("tkn", "test").endpoint("http://127.0.0.1:9/api/1/item/")
    }

    fn notifier(transport: Arc<ScriptedTransport>) -> Notifier {
        Notifier::with_parts(config(), transport, &StaticHost::new("test-host", "127.0.0.1"))
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_on_first_attempt_without_waiting() {
        let transport = ScriptedTransport::failing(0);
        let notifier = notifier(transport.clone());

        let start = Instant::now();
        let delivery = notifier.notify_message(Level::Info, "hello").await;

        assert_eq!(delivery, Delivery::Delivered { attempts: 1 });
        assert_eq!(transport.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_fifth_attempt_succeeds() {
        let transport = ScriptedTransport::failing(4);
        let notifier = notifier(transport.clone());

        let start = Instant::now();
        let delivery = notifier.notify_message(Level::Error, "flaky").await;

        assert_eq!(delivery, Delivery::Delivered { attempts: 5 });
        assert_eq!(transport.calls(), 5);
        // four one-second waits between five attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_five_attempts() {
        let transport = ScriptedTransport::failing(u32::MAX);
        let notifier = notifier(transport.clone());

        let start = Instant::now();
        let delivery = notifier.notify_message(Level::Error, "down").await;

        assert_eq!(delivery, Delivery::GaveUp { attempts: 5 });
        assert_eq!(transport.calls(), 5);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_policy_is_configurable() {
        let transport = ScriptedTransport::failing(u32::MAX);
        let notifier = notifier(transport.clone()).with_retry_policy(RetryPolicy {
            max_attempts: 0,
            delay: Duration::from_millis(10),
        });

        let delivery = notifier.notify_message(Level::Error, "down").await;

        assert_eq!(delivery, Delivery::GaveUp { attempts: 1 });
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_retry_wait() {
        let transport = ScriptedTransport::failing(u32::MAX);
        let notifier = notifier(transport.clone());

        let token = notifier.cancellation_token();
        tokio::spawn(async move {
            sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });

        let delivery = notifier.notify_message(Level::Error, "shutting down").await;

        assert_eq!(delivery, Delivery::Cancelled { attempts: 3 });
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn cancelled_token_stops_after_first_attempt() {
        let transport = ScriptedTransport::failing(u32::MAX);
        let notifier = notifier(transport.clone());
        let token = CancellationToken::new();
        token.cancel();

        let delivery = notifier
            .notify_with(Level::Info, Some("bye"), None, None, &token)
            .await;

        assert_eq!(delivery, Delivery::Cancelled { attempts: 1 });
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn posts_serialized_document() {
        let transport = ScriptedTransport::failing(0);
        let notifier = notifier(transport.clone());
        let error = ReportedError::new("java.lang.IllegalArgumentException").with_message("bad id");

        notifier.notify_error(Level::Warning, &error).await;

        let bodies = transport.bodies.lock().unwrap();
        let doc: Value = serde_json::from_str(&bodies[0]).unwrap();
        assert_eq!(doc["access_token"], "tkn");
        assert_eq!(doc["data"]["level"], "WARNING");
        assert_eq!(doc["data"]["environment"], "test");
        assert_eq!(doc["data"]["server"]["host"], "test-host");
        assert_eq!(
            doc["data"]["body"]["trace_chain"][0]["exception"]["class"],
            "java.lang.IllegalArgumentException"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_notifies_build_independent_documents() {
        let transport = ScriptedTransport::failing(0);
        let notifier = Arc::new(notifier(transport.clone()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let notifier = Arc::clone(&notifier);
                tokio::spawn(async move {
                    let message = format!("event-{}", i);
                    notifier.notify_message(Level::Info, &message).await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Delivery::Delivered { attempts: 1 });
        }

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 16);

        let mut seen: Vec<String> = bodies
            .iter()
            .map(|body| {
                let doc: Value = serde_json::from_str(body).unwrap();
                let message = doc["data"]["body"]["message"]["body"].as_str().unwrap();
                assert_eq!(doc["data"]["custom"]["message"], message);
                message.to_string()
            })
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn rejects_missing_failure_handler() {
        let mut notifier = notifier(ScriptedTransport::failing(0));

        assert!(matches!(
            notifier.set_failure_handler(None),
            Err(NotifierError::MissingFailureHandler)
        ));
        assert!(notifier
            .set_failure_handler(Some(FailureHandler::new(|_| {})))
            .is_ok());
    }

    #[tokio::test]
    async fn encoding_failure_goes_to_failure_handler() {
        fn broken(_: &Document) -> serde_json::Result<String> {
            Err(<serde_json::Error as serde::ser::Error>::custom("unsupported value"))
        }

        let transport = ScriptedTransport::failing(0);
        let mut notifier = notifier(transport.clone()).with_encoder(broken);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        notifier
            .set_failure_handler(Some(FailureHandler::new(move |e| {
                sink.lock().unwrap().push(e.to_string())
            })))
            .unwrap();

        let delivery = notifier.notify_message(Level::Error, "lost").await;

        assert_eq!(delivery, Delivery::Failed);
        assert_eq!(transport.calls(), 0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("failed to serialize item payload"));
    }

    #[tokio::test]
    async fn custom_encoder_is_used_for_body() {
        let transport = ScriptedTransport::failing(0);
        let notifier =
            notifier(transport.clone()).with_encoder(serde_json::to_string_pretty::<Document>);

        notifier.notify_message(Level::Info, "pretty").await;

        let bodies = transport.bodies.lock().unwrap();
        assert!(bodies[0].contains('\n'));
        let doc: Value = serde_json::from_str(&bodies[0]).unwrap();
        assert_eq!(doc["data"]["body"]["message"]["body"], "pretty");
    }

    #[test]
    fn failure_handler_forwards_error_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = FailureHandler::new(move |e| sink.lock().unwrap().push(e.to_string()));

        handler.handle(&NotifierError::MissingFailureHandler);

        assert_eq!(*seen.lock().unwrap(), vec!["a failure handler is required".to_string()]);
    }

    #[test]
    fn construction_fails_on_bad_endpoint() {
        let result = Notifier::with_parts(
            config().endpoint("not a url"),
            ScriptedTransport::failing(0),
            &StaticHost::new("h", "127.0.0.1"),
        );
        assert!(matches!(result, Err(NotifierError::InvalidEndpoint(_))));
    }

    #[test]
    fn construction_fails_when_host_cannot_be_resolved() {
        let result = Notifier::with_parts(config(), ScriptedTransport::failing(0), &NoHost);
        assert!(matches!(result, Err(NotifierError::HostResolution(_))));
    }
}
