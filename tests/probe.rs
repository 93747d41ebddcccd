use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use log::Level;
use once_gate::{CallerFrame, FrameSink, Gate, LogSink, Probe};

#[derive(Default)]
struct Recorder {
   frames: Mutex<Vec<CallerFrame>>,
}

impl FrameSink for Recorder {
   fn record(&self, frame: &CallerFrame) {
      self.frames.lock().unwrap().push(*frame);
   }
}

impl Recorder {
   fn frames(&self) -> Vec<CallerFrame> {
      self.frames.lock().unwrap().clone()
   }
}

#[test]
fn test_probe_always_false() {
   let probe = Probe::new(Recorder::default());
   assert!(!probe.is_armed());
   assert!(!probe.is_callable(None));
   assert!(!probe.is_callable(Some(&"not inspected")));
   assert!(!probe.check_quiet(Some(&1_u8)));
   assert!(probe.is_armed());
   assert!(probe.is_quiet_armed());
}

#[test]
fn test_probe_reports_its_caller_once() {
   let probe = Probe::new(Recorder::default());

   let line = line!() + 1;
   probe.is_callable(None);
   probe.is_callable(None);

   let frames = probe.sink().frames();
   assert_eq!(frames.len(), 1);
   assert_eq!(frames[0].file(), file!());
   assert_eq!(frames[0].line(), line);
}

#[test]
fn test_quiet_check_has_its_own_gate() {
   let probe = Probe::new(Recorder::default());
   assert!(!probe.check_quiet(None));
   assert!(probe.is_quiet_armed());
   assert!(!probe.is_armed());
   assert!(probe.sink().frames().is_empty());

   // The traced check still reports its first caller
   let line = line!() + 1;
   assert!(!probe.is_callable(None));
   assert!(!probe.is_callable(None));
   assert!(probe.is_armed());

   let frames = probe.sink().frames();
   assert_eq!(frames.len(), 1);
   assert_eq!(frames[0].line(), line);
}

#[test]
fn test_probe_concurrent_first_use() {
   const THREADS: usize = 32;
   let reports = Arc::new(AtomicUsize::new(0));
   let probe = {
      let reports = Arc::clone(&reports);
      Arc::new(Probe::new(move |_: &CallerFrame| {
         reports.fetch_add(1, Ordering::SeqCst);
      }))
   };
   let barrier = Arc::new(Barrier::new(THREADS));

   let threads: Vec<_> = (0..THREADS)
      .map(|i| {
         let probe = Arc::clone(&probe);
         let barrier = Arc::clone(&barrier);
         thread::spawn(move || {
            barrier.wait();
            probe.is_callable(Some(&i))
         })
      })
      .collect();

   for handle in threads {
      assert!(!handle.join().unwrap());
   }
   assert_eq!(reports.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn test_log_probe() {
   let probe = Probe::with_log();
   assert_eq!(probe.sink().level(), Level::Info);
   assert!(!probe.is_callable(None));
   assert!(probe.is_armed());
}

#[test_log::test]
fn test_log_sink_with_backtrace() {
   let sink = LogSink::new(Level::Debug)
      .with_target("once_gate::diagnostics")
      .with_backtrace(true);
   assert_eq!(sink.level(), Level::Debug);
   assert_eq!(sink.target(), "once_gate::diagnostics");

   let gate = Gate::new();
   let counter = AtomicUsize::new(0);
   gate.call_once_traced(&sink, || {
      counter.fetch_add(1, Ordering::SeqCst);
   });
   gate.call_once_traced(&sink, || {
      counter.fetch_add(1, Ordering::SeqCst);
   });
   assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_caller_frame_display() {
   let line = line!() + 1;
   let frame = CallerFrame::capture();
   assert_eq!(frame.file(), file!());
   assert_eq!(frame.line(), line);
   assert_eq!(
      frame.to_string(),
      format!("{}:{}:{}", file!(), line, frame.column())
   );
   assert_eq!(CallerFrame::from(std::panic::Location::caller()).file(), file!());
}
