//! Atomic state machine behind [`Gate`](crate::Gate).
//!
//! The whole gate lives in one `AtomicU8`:
//! - Bit 0: DONE - the initializer completed; never cleared afterwards
//! - Bit 1: LOCKED - a caller is running the initializer
//! - Bit 2: WAITING - at least one caller is parked on the state byte
//! - Bits 3-7: EPOCH - bumped on every DONE/reset transition
//!
//! Parked callers sleep on the address of the byte through `parking_lot_core`
//! and are woken in bulk whenever the byte leaves the LOCKED state.

use core::mem;
use core::sync::atomic::{AtomicU8, Ordering};

use parking_lot_core::{DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};

/// Outcome of a single, non-parking attempt to enter the gate.
pub(crate) enum Entry<'a> {
   /// The caller now owns the right to run the initializer.
   Acquired(GateGuard<'a>),
   /// The gate is already fulfilled.
   Fulfilled,
   /// Another caller holds the gate. Carries the state observed, WAITING included if set.
   Busy(u8),
}

#[repr(transparent)]
pub(crate) struct GateState(AtomicU8);

impl GateState {
   const DONE: u8 = 1;
   const LOCKED: u8 = 2;
   const WAITING: u8 = 4;
   const EPOCH_1: u8 = 8;
   const EPOCH_MASK: u8 = !(Self::DONE | Self::LOCKED | Self::WAITING);

   #[inline(always)]
   const fn next_epoch(state: u8) -> u8 {
      (state & Self::EPOCH_MASK).wrapping_add(Self::EPOCH_1) & Self::EPOCH_MASK
   }

   #[inline]
   pub(crate) const fn new() -> Self {
      Self(AtomicU8::new(0))
   }

   #[inline]
   pub(crate) const fn fulfilled() -> Self {
      Self(AtomicU8::new(Self::DONE))
   }

   #[inline]
   pub(crate) fn is_done(&self) -> bool {
      // Acquire pairs with the Release swap in `finish`, publishing the
      // initializer's side effects to whoever observes DONE.
      self.0.load(Ordering::Acquire) & Self::DONE != 0
   }

   #[inline]
   fn notify_all(&self) {
      // SAFETY: park and unpark are keyed on the same address, the state byte.
      unsafe {
         parking_lot_core::unpark_all(self.0.as_ptr() as usize, DEFAULT_UNPARK_TOKEN);
      }
   }

   /// Parks the current thread while the state still equals `expected`.
   #[inline]
   fn park(&self, expected: u8) {
      // SAFETY: see `notify_all`.
      unsafe {
         // The validate closure runs under the bucket lock, so a concurrent
         // `notify_all` cannot slip between the check and the sleep.
         let _ = parking_lot_core::park(
            self.0.as_ptr() as usize,
            || self.0.load(Ordering::Acquire) == expected,
            || {},
            |_, _| {},
            DEFAULT_PARK_TOKEN,
            None,
         );
      }
   }

   /// Swaps in `DONE | next epoch` and wakes parked callers.
   #[inline]
   fn finish(&self) {
      let current = self.0.load(Ordering::Relaxed);
      let prev = self.0.swap(Self::DONE | Self::next_epoch(current), Ordering::Release);
      debug_assert!(prev & Self::DONE == 0, "gate fulfilled twice");
      if prev & Self::WAITING != 0 {
         self.notify_all();
      }
   }

   /// Clears LOCKED and WAITING after a failed attempt and wakes parked callers
   /// so one of them can take over.
   #[inline]
   fn reset(&self) {
      let current = self.0.load(Ordering::Relaxed);
      let prev = self.0.swap(Self::next_epoch(current), Ordering::Release);
      if prev & Self::WAITING != 0 {
         self.notify_all();
      }
   }

   /// One attempt at taking the gate.
   ///
   /// With `announce` set, a busy gate gets the WAITING flag so the holder
   /// knows to wake us; the returned `Busy` state then includes it.
   #[inline]
   fn step(&self, announce: bool) -> Entry<'_> {
      loop {
         let current = self.0.load(Ordering::Acquire);
         if current & Self::DONE != 0 {
            return Entry::Fulfilled;
         }

         if current & Self::LOCKED == 0 {
            match self.0.compare_exchange_weak(
               current,
               current | Self::LOCKED,
               Ordering::Acquire,
               Ordering::Relaxed,
            ) {
               Ok(_) => return Entry::Acquired(GateGuard::new(self)),
               Err(_) => {
                  std::hint::spin_loop();
                  continue;
               }
            }
         }

         if announce && current & Self::WAITING == 0 {
            let announced = current | Self::WAITING;
            match self.0.compare_exchange_weak(
               current,
               announced,
               Ordering::Relaxed,
               Ordering::Relaxed,
            ) {
               Ok(_) => return Entry::Busy(announced),
               Err(_) => {
                  std::hint::spin_loop();
                  continue;
               }
            }
         }
         return Entry::Busy(current);
      }
   }

   /// Takes the gate, parking while another caller holds it.
   ///
   /// Returns `None` once the gate is fulfilled, by us or anyone else.
   #[inline]
   pub(crate) fn lock(&self) -> Option<GateGuard<'_>> {
      loop {
         match self.step(true) {
            Entry::Acquired(guard) => return Some(guard),
            Entry::Fulfilled => return None,
            Entry::Busy(observed) => self.park(observed),
         }
      }
   }

   /// Takes the gate without parking.
   #[inline]
   pub(crate) fn try_lock(&self) -> Entry<'_> {
      self.step(false)
   }

   /// Parks until the gate is fulfilled, without ever taking it.
   pub(crate) fn wait_done(&self) {
      loop {
         let current = self.0.load(Ordering::Acquire);
         if current & Self::DONE != 0 {
            return;
         }
         if current & Self::WAITING == 0 {
            let announced = current | Self::WAITING;
            if self
               .0
               .compare_exchange_weak(current, announced, Ordering::Relaxed, Ordering::Relaxed)
               .is_err()
            {
               std::hint::spin_loop();
               continue;
            }
            self.park(announced);
         } else {
            self.park(current);
         }
      }
   }

   /// Takes the gate from async code.
   ///
   /// Yields to the runtime while the holder is busy. On a multi-threaded
   /// runtime a long wait falls back to a parked wait inside `block_in_place`;
   /// a current-thread runtime cannot block, so it keeps yielding.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub(crate) async fn lock_async(&self) -> Option<GateGuard<'_>> {
      loop {
         for _ in 0..16 {
            match self.step(false) {
               Entry::Acquired(guard) => return Some(guard),
               Entry::Fulfilled => return None,
               Entry::Busy(observed) => {
                  for _ in 0..32 {
                     tokio::task::yield_now().await;
                     if self.0.load(Ordering::Relaxed) != observed {
                        break;
                     }
                  }
               }
            }
         }

         #[cfg(feature = "async-tokio-mt")]
         if can_block_in_place() {
            return match self.step(false) {
               Entry::Acquired(guard) => Some(guard),
               Entry::Fulfilled => None,
               Entry::Busy(_) => tokio::task::block_in_place(|| self.lock()),
            };
         }
      }
   }
}

/// `block_in_place` panics outside a multi-threaded runtime.
#[cfg(feature = "async-tokio-mt")]
fn can_block_in_place() -> bool {
   use tokio::runtime::{Handle, RuntimeFlavor};

   Handle::try_current().is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread)
}

/// Exclusive right to run the initializer.
///
/// `commit` marks the gate fulfilled. Dropping the guard instead (error,
/// panic, cancelled future) reverts the gate so another caller can retry.
pub(crate) struct GateGuard<'a> {
   state: &'a GateState,
}

impl<'a> GateGuard<'a> {
   #[inline(always)]
   const fn new(state: &'a GateState) -> Self {
      Self { state }
   }

   #[inline(always)]
   pub(crate) fn commit(self) {
      self.state.finish();
      mem::forget(self);
   }
}

impl Drop for GateGuard<'_> {
   #[inline(always)]
   fn drop(&mut self) {
      self.state.reset();
   }
}
