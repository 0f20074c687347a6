//! Rollbar notifier: turns messages and error chains into Rollbar items and
//! posts them to the item API, retrying failed attempts.
//!
//! ```no_run
//! use rollbar_notifier::{Level, Notifier, NotifierConfig};
//!
//! # async fn run() -> rollbar_notifier::Result<()> {
//! let notifier = Notifier::new(NotifierConfig::new("POST_SERVER_ITEM_TOKEN", "production"))?;
//! notifier.notify_message(Level::Info, "service started").await;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod builder;
pub mod config;
pub mod document;
pub mod env;
pub mod error;
pub mod event;
pub mod host;
pub mod notifier;
pub mod transport;

#[cfg(feature = "http")]
pub mod http;

pub mod init;
pub mod layer;
pub mod noop_transport;

pub use attributes::{AttributeProvider, Attributes, DefaultAttributes};
pub use config::{NotifierConfig, RetryPolicy};
pub use error::{NotifierError, Result};
pub use event::{Frame, Level, ReportedError};
pub use notifier::{Delivery, Encoder, FailureHandler, Notifier};
