//! Clearing rejects everything still waiting; running tasks finish normally.

use std::time::Duration;

use futures::future::join_all;
use taskqueue::{QueueConfig, TaskQueue};

#[tokio::main]
async fn main() {
    let queue: TaskQueue<u32, ()> = TaskQueue::new(QueueConfig {
        concurrency: 10,
        throttle_ms: 100,
    });

    let mut watchers = Vec::new();
    for i in 0..10u32 {
        let trigger = queue.clone();
        let handle = queue.submit(i, move |i| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("{i} was called");
            if i == 4 {
                trigger.clear();
            }
            Ok(())
        });
        watchers.push(tokio::spawn(async move {
            match handle.await {
                Ok(()) => println!("{i} was resolved"),
                Err(err) => println!("{i} was rejected ({err})"),
            }
        }));
    }
    join_all(watchers).await;

    // The queue stays usable after a clear.
    let mut watchers = Vec::new();
    for i in 10..15u32 {
        let handle = queue.submit(i, |_| async { Ok(()) });
        watchers.push(tokio::spawn(async move {
            if handle.await.is_ok() {
                println!("{i} was resolved");
            }
        }));
    }
    join_all(watchers).await;
}
