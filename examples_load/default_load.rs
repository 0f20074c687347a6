use std::sync::Arc;
use std::time::Instant;

use rollbar_notifier::host::StaticHost;
use rollbar_notifier::noop_transport::NoopTransport;
use rollbar_notifier::{Attributes, Frame, Level, Notifier, NotifierConfig, ReportedError};

#[tokio::main]
async fn main() {
    let notifier = Notifier::with_parts(
        NotifierConfig::new("load-test", "bench"),
        Arc::new(NoopTransport),
        &StaticHost::new("bench-host", "127.0.0.1"),
    )
    .expect("build notifier");

    let error = ReportedError::new("com.acme.LoadException")
        .with_message("synthetic failure")
        .with_frames((0..32).map(|i| Frame::new("com.acme.Worker", "step").file("Worker.java").line(i)))
        .caused_by(ReportedError::new("java.io.IOException").with_message("broken pipe"));
    let attributes = Attributes::new().custom("run", "default_load");

    let n: u64 = 50_000;
    let start = Instant::now();

    for _ in 0..n {
        notifier
            .notify(Level::Error, Some("default load test error"), Some(&error), Some(&attributes))
            .await;
    }

    let elapsed = start.elapsed();
    println!("default config: built and sent {} items in {:?} (~{:.0} items/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
