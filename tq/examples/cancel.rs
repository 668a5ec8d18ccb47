//! Cancel waiting items in sweeps; items already running are unaffected.

use std::time::Duration;

use futures::future::join_all;
use taskqueue::{QueueConfig, TaskQueue};

#[tokio::main]
async fn main() {
    let queue: TaskQueue<u32, ()> = TaskQueue::new(QueueConfig {
        concurrency: 1,
        throttle_ms: 10,
    });

    let mut watchers = Vec::new();
    for i in 0..100u32 {
        let counts = queue.clone();
        let handle = queue.submit(i, move |i| async move {
            println!("{i:>2}\tran\t({} waiting)", counts.pending_count());
            Ok(())
        });
        watchers.push(tokio::spawn(async move {
            if let Err(err) = handle.await {
                println!("{i:>2}\t{err}");
            }
        }));
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    for i in (0..50u32).step_by(2) {
        if !queue.cancel(&i) {
            println!("{i:>2}\talready ran");
        }
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    for i in (0..100u32).step_by(2) {
        if !queue.cancel(&i) {
            println!("{i:>2}\talready ran (or cancelled)");
        }
    }

    join_all(watchers).await;
}
