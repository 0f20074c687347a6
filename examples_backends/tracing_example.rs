use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use rollbar_notifier::init::init_tracing;
use rollbar_notifier::{Notifier, NotifierConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ROLLBAR_ACCESS_TOKEN / ROLLBAR_ENVIRONMENT / ROLLBAR_ENDPOINT
    let notifier = Arc::new(Notifier::new(NotifierConfig::from_env())?);
    init_tracing(Arc::clone(&notifier))?;

    info!("starting service");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    // give the delivery task time to finish
    sleep(Duration::from_secs(2)).await;
    notifier.cancellation_token().cancel();
    Ok(())
}
