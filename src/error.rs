//! Error type for the non-blocking gate entry point.

use thiserror::Error;

/// Why [`Gate::call_once_now`](crate::Gate::call_once_now) did not run its initializer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
   /// Another caller is running the initializer right now.
   #[error("gate is being fulfilled by another caller")]
   InProgress,

   /// The gate was fulfilled before this call.
   #[error("gate is already fulfilled")]
   Fulfilled,
}

/// A specialized `Result` type for gate operations that can be refused.
pub type Result<T> = std::result::Result<T, GateError>;
