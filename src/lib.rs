//! A caller-owned, futex-backed one-time execution gate.
//!
//! [`Gate`] guarantees that an initializer runs exactly once, no matter how
//! many threads reach it at the same time. The first caller runs it, the
//! others park until it finishes, and everyone after that returns on a single
//! atomic load. Gates are plain values: put one in a `static`, a struct field
//! or an `Arc`, there is no hidden global registry.
//!
//! Around the gate the crate provides a few diagnostics:
//!
//! - [`CallerFrame`] and [`FrameSink`]: report which call site triggered the
//!   one execution, via [`Gate::call_once_traced`]. [`LogSink`] writes the
//!   report through the `log` facade.
//! - [`Probe`]: fixed-result checks that arm their own gate on first use.
//!
//! # Features
//!
//! - **Blocking, fallible and non-blocking entry points**: `call_once`,
//!   `try_call_once`, `call_once_now`, plus `wait` for pure observers.
//! - **Retry on failure**: an initializer that errors or panics leaves the gate
//!   unfulfilled for the next caller.
//! - **Async support** (`async-tokio`, `async-tokio-mt`): `call_once_async` and
//!   `try_call_once_async`.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//!
//! use once_gate::Gate;
//!
//! let gate = Arc::new(Gate::new());
//! let runs = Arc::new(AtomicUsize::new(0));
//!
//! let handles: Vec<_> = (0..8)
//!    .map(|_| {
//!       let gate = Arc::clone(&gate);
//!       let runs = Arc::clone(&runs);
//!       thread::spawn(move || {
//!          gate.call_once(|| {
//!             runs.fetch_add(1, Ordering::SeqCst);
//!          });
//!          assert!(gate.is_done());
//!       })
//!    })
//!    .collect();
//!
//! for h in handles {
//!    h.join().unwrap();
//! }
//! assert_eq!(runs.load(Ordering::SeqCst), 1);
//! ```

/// Caller frames and the sinks that receive them.
mod caller;

/// Error type for refused entries.
mod error;

/// The public gate.
mod gate;

/// Fixed-result probes.
mod probe;

/// Internal synchronization state management.
mod state;

pub use caller::{CallerFrame, FrameSink, LogSink};
pub use error::{GateError, Result};
pub use gate::Gate;
pub use probe::Probe;
