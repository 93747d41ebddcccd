//! Fixed-result probes that arm a gate on first use.
//!
//! A [`Probe`] answers "is this value a callable?" with a constant `false`.
//! It performs no inspection of the value at all; a caller that needs the
//! distinction should carry it in its own types. What a probe does do is run
//! its private [`Gate`] the first time it is asked, which makes it a convenient
//! fixture for observing one-time initialization from the outside.

use core::any::Any;

use crate::caller::{FrameSink, LogSink};
use crate::gate::Gate;

/// A pair of fixed-result checks, each running its own [`Gate`] on first use.
///
/// The traced check reports its first caller to `S`; the quiet check only arms
/// its gate. The two gates are independent, so using one check never silences
/// the other.
#[derive(Debug)]
pub struct Probe<S = LogSink> {
   traced: Gate,
   quiet: Gate,
   sink: S,
}

impl Probe<LogSink> {
   /// A probe reporting to the `log` facade at `Info`.
   #[must_use]
   pub fn with_log() -> Self {
      Self::new(LogSink::default())
   }
}

impl<S: FrameSink> Probe<S> {
   /// Creates a probe with both checks unarmed, reporting to `sink`.
   #[must_use]
   pub const fn new(sink: S) -> Self {
      Self {
         traced: Gate::new(),
         quiet: Gate::new(),
         sink,
      }
   }

   /// Always `false`; the value is not inspected.
   ///
   /// The first call through this check reports its caller to the sink, once,
   /// no matter how many threads ask concurrently.
   #[track_caller]
   pub fn is_callable(&self, _value: Option<&dyn Any>) -> bool {
      self.traced.call_once_traced(&self.sink, || {});
      false
   }

   /// Always `false`; the value is not inspected. Arms its own gate and
   /// reports nothing.
   pub fn check_quiet(&self, _value: Option<&dyn Any>) -> bool {
      self.quiet.call_once(|| {});
      false
   }

   /// Whether [`is_callable`](Self::is_callable) has gone through this probe yet.
   #[inline]
   pub fn is_armed(&self) -> bool {
      self.traced.is_done()
   }

   /// Whether [`check_quiet`](Self::check_quiet) has gone through this probe yet.
   #[inline]
   pub fn is_quiet_armed(&self) -> bool {
      self.quiet.is_done()
   }

   /// The sink receiving caller reports.
   pub fn sink(&self) -> &S {
      &self.sink
   }
}
