use std::sync::Arc;
use std::time::Instant;

use rollbar_notifier::host::StaticHost;
use rollbar_notifier::noop_transport::NoopTransport;
use rollbar_notifier::{Level, Notifier, NotifierConfig};

#[tokio::main]
async fn main() {
    let notifier = Arc::new(
        Notifier::with_parts(
            NotifierConfig::new("load-test", "bench"),
            Arc::new(NoopTransport),
            &StaticHost::new("bench-host", "127.0.0.1"),
        )
        .expect("build notifier"),
    );

    let tasks: u64 = 64;
    let per_task: u64 = 2_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..tasks)
        .map(|t| {
            let notifier = Arc::clone(&notifier);
            tokio::spawn(async move {
                for i in 0..per_task {
                    let message = format!("task {} event {}", t, i);
                    notifier.notify_message(Level::Info, &message).await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("load task panicked");
    }

    let n = tasks * per_task;
    let elapsed = start.elapsed();
    println!("concurrent: {} tasks sent {} items in {:?} (~{:.0} items/s)",
        tasks,
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
