//! Reorder waiting items while the queue is mid-drain.

use std::time::{Duration, Instant};

use futures::future::join_all;
use rand::Rng;
use taskqueue::{QueueConfig, TaskQueue};

#[tokio::main]
async fn main() {
    let queue: TaskQueue<u32, u64> = TaskQueue::new(QueueConfig::default());

    let mut handles = Vec::new();
    for n in 0..10u32 {
        let waiting = queue.clone();
        handles.push(queue.submit(n, move |n| async move {
            let ms = rand::rng().random_range(0..1000);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            // Reverse the remaining order halfway through.
            if n == 4 {
                waiting.sort_pending_by(|a, b| b.cmp(a));
            }
            println!("Item \"{n}\" waited {ms}ms");
            Ok(ms)
        }));
    }

    let start = Instant::now();
    join_all(handles).await;
    println!("\nTotal time: {}ms", start.elapsed().as_millis());
}
