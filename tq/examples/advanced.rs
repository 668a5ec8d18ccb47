//! Struct keys, parallel execution, and results read back off the handles.

use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use taskqueue::{BoxError, QueueConfig, TaskQueue};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Item {
    name: String,
    ms: u64,
}

async fn wait(item: Item) -> Result<Item, BoxError> {
    tokio::time::sleep(Duration::from_millis(item.ms)).await;
    Ok(item)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let queue: TaskQueue<Item, Item> = TaskQueue::new(QueueConfig {
        concurrency: 5,
        ..QueueConfig::default()
    });

    let mut rng = rand::rng();
    let mut handles: FuturesUnordered<_> = ["One", "Two", "Three", "Four", "Five"]
        .into_iter()
        .map(|name| {
            let item = Item {
                name: name.to_string(),
                ms: rng.random_range(0..1000),
            };
            queue.submit(item, wait)
        })
        .collect();

    println!(
        "Queued {} items ({} concurrent)",
        queue.len(),
        queue.concurrency()
    );

    let start = Instant::now();
    while let Some(result) = handles.next().await {
        let Item { name, ms } = result?;
        println!("Item \"{name}\" waited {ms}ms");
    }
    println!("Total time: {}ms", start.elapsed().as_millis());

    Ok(())
}
