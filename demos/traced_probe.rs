use std::sync::Arc;

use once_gate::{CallerFrame, Probe};

fn main() {
   let probe = Arc::new(Probe::new(|frame: &CallerFrame| {
      println!("Probe armed from {frame}");
   }));

   let threads: Vec<_> = (0..4)
      .map(|_| {
         let probe = Arc::clone(&probe);
         std::thread::spawn(move || probe.is_callable(Some(&42_u32)))
      })
      .collect();

   for t in threads {
      assert!(!t.join().unwrap());
   }

   // Only one of the threads above printed its frame
   assert!(probe.is_armed());
   assert!(!probe.is_callable(None));
}
