use std::sync::atomic::{AtomicUsize, Ordering};

use once_gate::Gate;
use tokio::time::{sleep, Duration};

static RUNS: AtomicUsize = AtomicUsize::new(0);
static CONNECT: Gate = Gate::new();

async fn connect() {
   CONNECT
      .call_once_async(|| async {
         // This async block runs only once
         RUNS.fetch_add(1, Ordering::Relaxed);
         println!("Connecting...");
         sleep(Duration::from_millis(50)).await;
      })
      .await;
}

#[tokio::main]
async fn main() {
   let tasks: Vec<_> = (0..5)
      .map(|i| {
         tokio::spawn(async move {
            connect().await;
            println!("Task {i} connected");
         })
      })
      .collect();

   for t in tasks {
      t.await.unwrap();
   }

   assert!(CONNECT.is_done());
   assert_eq!(RUNS.load(Ordering::Relaxed), 1); // Connected only once
}
