//! Rate-limited burst with throttle changes made while the queue drains.
//!
//! Run with `RUST_LOG=taskqueue=debug` to watch the scheduler decisions.

use std::time::{Duration, Instant};

use futures::future::join_all;
use rand::Rng;
use taskqueue::{QueueConfig, TaskQueue};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let queue: TaskQueue<u32, ()> = TaskQueue::new(QueueConfig {
        concurrency: 10,
        throttle_ms: 100,
    });

    println!("item\tms\tactive\tpending\tthrottle");

    let mut handles = Vec::new();
    for i in 0..100u32 {
        let control = queue.clone();
        handles.push(queue.submit(i, move |i| async move {
            let ms = rand::rng().random_range(0..500);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            if i == 50 {
                control.set_throttle(Duration::from_millis(1000));
            }
            if i == 60 {
                control.set_throttle(Duration::ZERO);
            }
            println!(
                "i: {i:>2}\tms {ms:>3}\ta: {}\tp: {}\tt: {}ms",
                control.active_count(),
                control.pending_count(),
                control.throttle().as_millis()
            );
            Ok(())
        }));
    }

    let start = Instant::now();
    join_all(handles).await;

    let total = start.elapsed().as_millis();
    println!("\nTotal time: {total}ms");
    println!("Average time: {}ms", total as f64 / 100.0);
}
