//! Failures settle the task's own handle; the queue itself keeps going.

use std::time::Duration;

use taskqueue::{QueueConfig, TaskQueue};

#[tokio::main]
async fn main() {
    let queue: TaskQueue<&'static str, ()> = TaskQueue::new(QueueConfig::default());

    // Inspect just the error the callback returned.
    let result = queue
        .submit("catch", |_| async {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            Err("catch errored!".into())
        })
        .await;
    if let Err(err) = result {
        if let Some(cause) = err.callback_error() {
            eprintln!("{cause}");
        }
    }

    // Or report the whole queue error.
    let outcome = queue
        .submit("try/catch", |_| async {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            Err("try/catch errored!".into())
        })
        .await;
    match outcome {
        Ok(()) => {}
        Err(err) => eprintln!("{err}"),
    }
}
