use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_gate::{Gate, LogSink};

/// Target whose trace records the logger rejects.
const NO_TRACE_TARGET: &str = "log_sink::no_trace";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Captured {
   level: Level,
   target: String,
   message: String,
}

struct CaptureLogger {
   records: Mutex<Vec<Captured>>,
}

impl Log for CaptureLogger {
   fn enabled(&self, metadata: &Metadata<'_>) -> bool {
      !(metadata.target() == NO_TRACE_TARGET && metadata.level() == Level::Trace)
   }

   fn log(&self, record: &Record<'_>) {
      if !self.enabled(record.metadata()) {
         return;
      }
      self.records.lock().unwrap().push(Captured {
         level: record.level(),
         target: record.target().to_string(),
         message: record.args().to_string(),
      });
   }

   fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
   records: Mutex::new(Vec::new()),
};
static INSTALL: Gate = Gate::new();

/// Installs the capturing logger and returns the records logged so far on `target`.
fn records_for(target: &str) -> Vec<Captured> {
   INSTALL.call_once(|| {
      log::set_logger(&LOGGER).unwrap();
      log::set_max_level(LevelFilter::Trace);
   });
   LOGGER
      .records
      .lock()
      .unwrap()
      .iter()
      .filter(|r| r.target == target)
      .cloned()
      .collect()
}

#[test]
fn test_log_sink_writes_one_caller_line() {
   const TARGET: &str = "log_sink::plain";
   assert!(records_for(TARGET).is_empty());

   let sink = LogSink::new(Level::Warn).with_target(TARGET);
   let gate = Gate::new();
   let line = line!() + 1;
   gate.call_once_traced(&sink, || {});
   gate.call_once_traced(&sink, || panic!("Should not be called"));

   let records = records_for(TARGET);
   assert_eq!(records.len(), 1);
   assert_eq!(records[0].level, Level::Warn);
   assert_eq!(records[0].target, TARGET);
   let prefix = format!("once gate fulfilled from {}:{}:", file!(), line);
   assert!(
      records[0].message.starts_with(&prefix),
      "unexpected message: {}",
      records[0].message
   );
   let column = &records[0].message[prefix.len()..];
   assert!(column.parse::<u32>().is_ok(), "bad column in {}", records[0].message);
}

#[test]
fn test_log_sink_backtrace_follows_at_trace() {
   const TARGET: &str = "log_sink::backtrace";
   let sink = LogSink::new(Level::Info)
      .with_target(TARGET)
      .with_backtrace(true);

   let gate = Gate::new();
   records_for(TARGET);
   gate.call_once_traced(&sink, || {});

   let records = records_for(TARGET);
   assert_eq!(records.len(), 2);
   assert_eq!(records[0].level, Level::Info);
   assert!(records[0].message.starts_with("once gate fulfilled from "));
   assert_eq!(records[1].level, Level::Trace);
   assert!(!records[1].message.is_empty());
}

#[test]
fn test_log_sink_skips_backtrace_when_trace_disabled() {
   let sink = LogSink::new(Level::Info)
      .with_target(NO_TRACE_TARGET)
      .with_backtrace(true);

   let gate = Gate::new();
   records_for(NO_TRACE_TARGET);
   gate.call_once_traced(&sink, || {});

   let records = records_for(NO_TRACE_TARGET);
   assert_eq!(records.len(), 1);
   assert_eq!(records[0].level, Level::Info);
}

#[test]
fn test_log_sink_without_backtrace() {
   const TARGET: &str = "log_sink::no_backtrace";
   let sink = LogSink::new(Level::Debug).with_target(TARGET);

   let gate = Gate::new();
   records_for(TARGET);
   gate.call_once_traced(&sink, || {});

   let records = records_for(TARGET);
   assert_eq!(records.len(), 1);
   assert_eq!(records[0].level, Level::Debug);
}
