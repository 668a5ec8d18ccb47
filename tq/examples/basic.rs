//! Smallest possible usage: submit tasks and await their results.

use std::time::Duration;

use taskqueue::{QueueConfig, TaskQueue};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let queue: TaskQueue<&'static str, String> = TaskQueue::new(QueueConfig::default());

    // Fire and forget; the queue drives the task to completion on its own.
    let _ = queue.submit("task one", |name| async move {
        println!("{name} complete");
        Ok(String::new())
    });

    // Await the handle to get the value the callback returned.
    let message = queue
        .submit("task two", |name| async move { Ok(format!("{name} complete")) })
        .await?;
    println!("{message}");

    // Keys can be any Clone + Eq + Hash value, here the wait itself.
    let waits: TaskQueue<u64, ()> = TaskQueue::new(QueueConfig::default());
    waits
        .submit(250, |wait| async move {
            tokio::time::sleep(Duration::from_millis(wait)).await;
            println!("waited {wait}ms");
            Ok(())
        })
        .await?;

    Ok(())
}
