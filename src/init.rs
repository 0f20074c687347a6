use crate::error::Result;
use crate::layer::{NotifierLayer, DEFAULT_MAX_IN_FLIGHT};
use crate::notifier::Notifier;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the global reporting layer.
///
/// **Fields**
/// - `max_level`: least severe level that is still reported.
/// - `max_in_flight`: bound on concurrent delivery tasks; events beyond it
///   are dropped.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to the [`NotifierLayer`] so events are also printed.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub max_level: Level,
    pub max_in_flight: usize,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            max_level: Level::ERROR,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            enable_stdout: true,
        }
    }
}

/// Install a [`Registry`] with a [`NotifierLayer`] as the global default
/// subscriber.
///
/// **Errors**
/// - [`NotifierError::Subscriber`](crate::error::NotifierError::Subscriber)
///   if a global subscriber was already set.
pub fn init_tracing_with_config(notifier: Arc<Notifier>, config: LayerConfig) -> Result<()> {
    let layer = NotifierLayer::new(notifier)
        .with_max_level(config.max_level)
        .with_max_in_flight(config.max_in_flight);

    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`]:
/// report `ERROR` events and echo everything to stdout.
pub fn init_tracing(notifier: Arc<Notifier>) -> Result<()> {
    init_tracing_with_config(notifier, LayerConfig::default())
}
