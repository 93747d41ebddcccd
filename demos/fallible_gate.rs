use once_gate::Gate;

static LOAD: Gate = Gate::new();

fn load(fail: bool) -> Result<(), &'static str> {
   LOAD.try_call_once(|| {
      println!("Attempting load (fail={fail})...");
      if fail {
         Err("load failed!")
      } else {
         Ok(())
      }
   })
}

fn main() {
   // First attempt fails
   match load(true) {
      Ok(()) => panic!("Should have failed"),
      Err(e) => println!("Caught error: {e}"),
   }
   assert!(!LOAD.is_done()); // Still unfulfilled

   // Second attempt succeeds
   load(false).expect("Should have succeeded");
   assert!(LOAD.is_done());

   // Later attempts, even failing ones, never run again
   load(true).expect("Should not have run again");
   println!("Gate fulfilled: {:?}", LOAD);
}
