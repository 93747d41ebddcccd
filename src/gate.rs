//! One-time execution gate.
//!
//! This module provides [`Gate`], a flag that lets exactly one caller run an
//! initializer while every concurrent caller parks until it is done. It is
//! the value-less sibling of a once cell: the initializer is run for its side
//! effects, and the gate only remembers that it ran.
//!
//! The fast path (already fulfilled) is a single atomic load. The slow path
//! parks waiters on the state byte through `parking_lot_core`.

use core::fmt;
#[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
use core::future::Future;

use crate::caller::{CallerFrame, FrameSink};
use crate::error::{GateError, Result};
use crate::state::{Entry, GateState};

/// A caller-owned one-time execution gate.
///
/// Any number of threads may enter the gate concurrently. The first one runs
/// its initializer; the others block until it finishes, and every call made
/// after that returns immediately. Once fulfilled, a gate stays fulfilled.
///
/// # Failure
///
/// If the initializer returns an error, panics, or (for the async entry
/// points) is dropped before completing, the gate reverts to unfulfilled and
/// parked callers are woken. The next caller to enter runs its own
/// initializer. Failures are never cached.
///
/// # Re-entrancy
///
/// Entering a gate with a blocking method from inside its own initializer
/// deadlocks. [`call_once_now`](Self::call_once_now) reports
/// [`GateError::InProgress`] instead.
///
/// # Examples
///
/// ```rust
/// use once_gate::Gate;
///
/// static SETUP: Gate = Gate::new();
///
/// SETUP.call_once(|| println!("runs once"));
/// SETUP.call_once(|| unreachable!());
/// assert!(SETUP.is_done());
/// ```
pub struct Gate {
   state: GateState,
}

impl Gate {
   /// Creates an unfulfilled gate.
   #[inline]
   #[must_use]
   pub const fn new() -> Self {
      Self {
         state: GateState::new(),
      }
   }

   /// Creates a gate that is already fulfilled; no initializer will ever run through it.
   #[inline]
   #[must_use]
   pub const fn fulfilled() -> Self {
      Self {
         state: GateState::fulfilled(),
      }
   }

   /// Returns `true` once an initializer has completed through this gate.
   ///
   /// Never blocks. A `true` result also makes the initializer's effects visible
   /// to the calling thread.
   #[inline]
   pub fn is_done(&self) -> bool {
      self.state.is_done()
   }

   /// Runs `f` if the gate is unfulfilled, otherwise waits for whoever is running it.
   ///
   /// When this returns, the gate is fulfilled, either by `f` or by another caller.
   #[inline]
   pub fn call_once<F>(&self, f: F)
   where
      F: FnOnce(),
   {
      if self.is_done() {
         return;
      }
      self.initialize(f);
   }

   /// Fallible form of [`call_once`](Self::call_once).
   ///
   /// - If the gate is or becomes fulfilled without us, returns `Ok(())` and `f` is not called.
   /// - If `f` runs and returns `Ok(())`, fulfills the gate.
   /// - If `f` returns `Err(e)`, the gate stays unfulfilled and `Err(e)` is returned
   ///   to this caller only; a waiting caller takes over.
   pub fn try_call_once<F, E>(&self, f: F) -> core::result::Result<(), E>
   where
      F: FnOnce() -> core::result::Result<(), E>,
   {
      if self.is_done() {
         return Ok(());
      }
      self.try_initialize(f)
   }

   /// Runs `f` only if the gate can be entered right away.
   ///
   /// Never blocks: returns [`GateError::InProgress`] while another caller is running
   /// an initializer and [`GateError::Fulfilled`] once one has completed.
   pub fn call_once_now<F>(&self, f: F) -> Result<()>
   where
      F: FnOnce(),
   {
      match self.state.try_lock() {
         Entry::Acquired(guard) => {
            f();
            guard.commit();
            Ok(())
         }
         Entry::Fulfilled => Err(GateError::Fulfilled),
         Entry::Busy(_) => Err(GateError::InProgress),
      }
   }

   /// Like [`call_once`](Self::call_once), and reports the caller of this method to
   /// `sink` exactly once, right before `f` runs.
   ///
   /// Callers that find the gate fulfilled, or wait on someone else, report nothing.
   /// Mark wrapping functions `#[track_caller]` to report their own callers instead.
   #[inline]
   #[track_caller]
   pub fn call_once_traced<S, F>(&self, sink: &S, f: F)
   where
      S: FrameSink + ?Sized,
      F: FnOnce(),
   {
      if self.is_done() {
         return;
      }
      let frame = CallerFrame::capture();
      self.initialize(move || {
         sink.record(&frame);
         f()
      });
   }

   /// Blocks until the gate is fulfilled by another caller.
   ///
   /// Returns immediately if it already is. Does not run anything itself, so
   /// waiting on a gate nobody enters blocks forever.
   pub fn wait(&self) {
      if self.is_done() {
         return;
      }
      self.state.wait_done();
   }

   /// Async form of [`call_once`](Self::call_once).
   ///
   /// Concurrent tasks yield while the initializer runs. If the returned future is
   /// dropped while `f`'s future is pending, the gate reverts to unfulfilled.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub async fn call_once_async<F, Fut>(&self, f: F)
   where
      F: FnOnce() -> Fut,
      Fut: Future<Output = ()>,
   {
      if self.is_done() {
         return;
      }
      let Some(guard) = self.state.lock_async().await else {
         return;
      };
      f().await;
      guard.commit();
   }

   /// Async form of [`try_call_once`](Self::try_call_once).
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub async fn try_call_once_async<F, Fut, E>(&self, f: F) -> core::result::Result<(), E>
   where
      F: FnOnce() -> Fut,
      Fut: Future<Output = core::result::Result<(), E>>,
   {
      if self.is_done() {
         return Ok(());
      }
      let Some(guard) = self.state.lock_async().await else {
         return Ok(());
      };
      f().await?; // guard dropped on error, gate reverts
      guard.commit();
      Ok(())
   }

   #[cold]
   fn initialize<F>(&self, f: F)
   where
      F: FnOnce(),
   {
      let Some(guard) = self.state.lock() else {
         return;
      };
      f();
      guard.commit();
   }

   #[cold]
   fn try_initialize<F, E>(&self, f: F) -> core::result::Result<(), E>
   where
      F: FnOnce() -> core::result::Result<(), E>,
   {
      let Some(guard) = self.state.lock() else {
         return Ok(());
      };
      f()?; // guard dropped on error, gate reverts
      guard.commit();
      Ok(())
   }
}

impl Default for Gate {
   #[inline]
   fn default() -> Self {
      Self::new()
   }
}

impl From<bool> for Gate {
   /// `true` gives a fulfilled gate, `false` an unfulfilled one.
   #[inline]
   fn from(done: bool) -> Self {
      if done {
         Self::fulfilled()
      } else {
         Self::new()
      }
   }
}

impl fmt::Debug for Gate {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Gate").field("done", &self.is_done()).finish()
   }
}
