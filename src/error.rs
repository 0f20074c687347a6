use std::io;

/// Error type for notifier setup and for failures routed to the
/// [`FailureHandler`](crate::notifier::FailureHandler).
///
/// Delivery failures (connection errors, non-success statuses) are not
/// represented here: they are retried and, once retries are exhausted,
/// dropped.
#[derive(thiserror::Error, Debug)]
pub enum NotifierError {
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("could not resolve local host: {0}")]
    HostResolution(#[source] io::Error),

    #[error("failed to serialize item payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("a failure handler is required")]
    MissingFailureHandler,

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub type Result<T> = std::result::Result<T, NotifierError>;
