//! Caller diagnostics for gate initializers.
//!
//! A [`CallerFrame`] names the code location that entered a gate. It is
//! captured through `#[track_caller]`, so it survives inlining and stays
//! accurate in release builds. Frames are handed to a [`FrameSink`]; the
//! stock [`LogSink`] forwards them to the `log` facade.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

use log::Level;

/// A single call-stack entry: the source location of a gate's caller.
///
/// Renders as `file:line:column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerFrame {
   file: &'static str,
   line: u32,
   column: u32,
}

impl CallerFrame {
   /// Captures the location of the caller of the enclosing `#[track_caller]` chain.
   #[inline]
   #[must_use]
   #[track_caller]
   pub fn capture() -> Self {
      Self::from_location(Location::caller())
   }

   /// Builds a frame from an existing source location.
   #[inline]
   #[must_use]
   pub fn from_location(location: &'static Location<'static>) -> Self {
      Self {
         file: location.file(),
         line: location.line(),
         column: location.column(),
      }
   }

   /// Source file of the caller.
   #[inline]
   pub const fn file(&self) -> &'static str {
      self.file
   }

   /// 1-based line of the caller.
   #[inline]
   pub const fn line(&self) -> u32 {
      self.line
   }

   /// 1-based column of the caller.
   #[inline]
   pub const fn column(&self) -> u32 {
      self.column
   }
}

impl fmt::Display for CallerFrame {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}:{}:{}", self.file, self.line, self.column)
   }
}

impl From<&'static Location<'static>> for CallerFrame {
   fn from(location: &'static Location<'static>) -> Self {
      Self::from_location(location)
   }
}

/// Destination for caller frames reported by traced gates.
pub trait FrameSink: Send + Sync {
   /// Called once per fulfilled traced gate, before its initializer runs.
   fn record(&self, frame: &CallerFrame);
}

impl<F> FrameSink for F
where
   F: Fn(&CallerFrame) + Send + Sync,
{
   #[inline]
   fn record(&self, frame: &CallerFrame) {
      self(frame)
   }
}

/// Writes caller frames to the `log` facade.
///
/// Defaults to `Info` on this module's target. With [`with_backtrace`](Self::with_backtrace)
/// the full thread backtrace follows at `Trace` level, captured only when that
/// level is enabled for the target.
#[derive(Debug, Clone)]
pub struct LogSink {
   level: Level,
   target: &'static str,
   backtrace: bool,
}

impl LogSink {
   /// A sink writing at `level` on this module's target, without backtraces.
   #[must_use]
   pub const fn new(level: Level) -> Self {
      Self {
         level,
         target: module_path!(),
         backtrace: false,
      }
   }

   /// Overrides the log target.
   #[must_use]
   pub const fn with_target(mut self, target: &'static str) -> Self {
      self.target = target;
      self
   }

   /// Also writes the full backtrace at `Trace` when that level is enabled.
   #[must_use]
   pub const fn with_backtrace(mut self, enabled: bool) -> Self {
      self.backtrace = enabled;
      self
   }

   /// Level of the caller line.
   pub const fn level(&self) -> Level {
      self.level
   }

   /// Target of both the caller line and the backtrace.
   pub const fn target(&self) -> &'static str {
      self.target
   }
}

impl Default for LogSink {
   fn default() -> Self {
      Self::new(Level::Info)
   }
}

impl FrameSink for LogSink {
   fn record(&self, frame: &CallerFrame) {
      log::log!(target: self.target, self.level, "once gate fulfilled from {frame}");
      if self.backtrace && log::log_enabled!(target: self.target, Level::Trace) {
         log::trace!(target: self.target, "{}", Backtrace::force_capture());
      }
   }
}
