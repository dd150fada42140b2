//! Single pending-callback slot shared between thread and interrupt context
//!
//! A slot is written from mainline code (`set` / `clear`) and drained from
//! interrupt or DMA-completion context (`fire`). Both sides go through a
//! critical section, so the interrupt never observes a half-written callable.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::Callback;

/// Holds at most one pending [`Callback`]
///
/// `const`-constructible so it can live in a `static`.
pub struct CallbackSlot {
    callback: Mutex<CriticalSectionRawMutex, RefCell<Callback>>,
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackSlot {
    /// An empty slot
    pub const fn new() -> Self {
        Self {
            callback: Mutex::new(RefCell::new(Callback::empty())),
        }
    }

    /// Store `callback`, silently replacing any pending one
    pub fn set(&self, callback: Callback) {
        let previous = self.callback.lock(|cell| cell.replace(callback));
        // Destructors run outside the critical section
        drop(previous);
    }

    /// Drop the pending callback, if any
    pub fn clear(&self) {
        let previous = self.callback.lock(|cell| cell.take());
        drop(previous);
    }

    /// Whether a callback is pending
    pub fn is_set(&self) -> bool {
        self.callback.lock(|cell| cell.borrow().is_set())
    }

    /// Run the pending callback, if any
    ///
    /// The callback is removed from the slot before it runs, so it fires at
    /// most once per `set` and may re-arm the slot from inside itself.
    /// Returns whether a callback ran.
    pub fn fire(&self) -> bool {
        let mut callback = self.callback.lock(|cell| cell.take());
        let pending = callback.is_set();
        callback.call();
        pending
    }
}

impl core::fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("set", &self.is_set())
            .finish()
    }
}
