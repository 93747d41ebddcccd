use std::sync::atomic::{AtomicUsize, Ordering};

use once_gate::Gate;

static RUNS: AtomicUsize = AtomicUsize::new(0);
static SETUP: Gate = Gate::new();

fn setup() {
   SETUP.call_once(|| {
      // This closure runs only once
      RUNS.fetch_add(1, Ordering::Relaxed);
      println!("Running setup...");
      std::thread::sleep(std::time::Duration::from_millis(50));
   });
}

fn main() {
   let threads: Vec<_> = (0..5)
      .map(|i| {
         std::thread::spawn(move || {
            setup();
            println!("Thread {i} sees setup done: {}", SETUP.is_done());
         })
      })
      .collect();

   for t in threads {
      t.join().unwrap();
   }

   assert!(SETUP.is_done());
   assert_eq!(RUNS.load(Ordering::Relaxed), 1); // Setup ran only once
}
