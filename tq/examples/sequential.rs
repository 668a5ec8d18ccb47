//! Strict one-at-a-time execution, with prepends jumping the line.

use std::time::{Duration, Instant};

use futures::future::join_all;
use rand::Rng;
use taskqueue::{BoxError, QueueConfig, TaskQueue};

async fn wait(name: &'static str) -> Result<u64, BoxError> {
    let ms = rand::rng().random_range(0..1000);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    println!("Item \"{name}\" waited {ms}ms");
    Ok(ms)
}

#[tokio::main]
async fn main() {
    let queue: TaskQueue<&'static str, u64> = TaskQueue::new(QueueConfig::default());

    let handles = vec![
        queue.submit("One", wait),
        queue.submit("Four", wait),
        queue.submit("Five", wait),
        queue.submit_front("Three", wait),
        queue.submit_front("Two", wait),
    ];

    println!(
        "Queued {} items ({} concurrent)",
        queue.len(),
        queue.concurrency()
    );

    let start = Instant::now();
    join_all(handles).await;
    println!("Total time: {}ms", start.elapsed().as_millis());
}
