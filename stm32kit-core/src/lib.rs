//! Interrupt-safe completion callbacks for STM32 peripheral wrappers
//!
//! Vendor HALs report transfer completion by calling a bare C function
//! pointer from interrupt context. This crate turns that into "run this
//! closure once the transfer is done", without a heap:
//!
//! | Piece | Role |
//! |-------|------|
//! | [`InplaceFn`] | Closure stored inline in a fixed-size buffer |
//! | [`CallbackSlot`] | One pending callback, guarded by a critical section |
//! | [`CallbackRegistry`] | Fixed arena of slots, claimed and released at runtime |
//! | [`unique_tag!`] | Declares a marker type that owns a static registry |
//! | [`trampoline_for`] | `extern "C"` function pointer that fires one slot |
//! | [`CallbackManager`] | RAII registration of a slot's trampoline with the HAL |
//!
//! ```
//! use stm32kit_core::{Callback, CallbackDispatch, CallbackManager, HalCallback};
//! use core::cell::Cell;
//!
//! stm32kit_core::unique_tag!(Uart1Tag);
//!
//! #[derive(Default)]
//! struct Hal(Cell<Option<HalCallback>>);
//!
//! impl CallbackDispatch for Hal {
//!     type EventId = ();
//!     type Error = ();
//!     fn register_callback(&self, _: (), cb: HalCallback) -> Result<(), ()> {
//!         self.0.set(Some(cb));
//!         Ok(())
//!     }
//!     fn unregister_callback(&self, _: ()) -> Result<(), ()> {
//!         self.0.set(None);
//!         Ok(())
//!     }
//! }
//!
//! let hal = Hal::default();
//! let manager = CallbackManager::new(&hal, (), Uart1Tag).unwrap();
//! manager.set(Callback::new(|| { /* transfer done */ }));
//!
//! // What the HAL's interrupt handler does on completion:
//! if let Some(cb) = hal.0.get() {
//!     cb(core::ptr::null_mut());
//! }
//! assert!(!manager.is_set());
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod dispatch;
#[allow(unsafe_code)]
pub mod inplace;
pub mod manager;
pub mod registry;
pub mod slot;
pub mod tag;

pub use dispatch::CallbackDispatch;
pub use inplace::{Align1, Align16, Align2, Align4, Align8, Alignment, InplaceFn, DEFAULT_CAPACITY};
pub use manager::{CallbackManager, ManagerError};
pub use registry::{CallbackRegistry, RegistryError, SlotClaim, SlotId, SlotRegistry, MAX_SLOTS};
pub use slot::CallbackSlot;
pub use tag::{trampoline_for, HalCallback, UniqueTag, DEFAULT_TAG_SLOTS};

/// Callback type held by every slot: 64 bytes of captures, 8-byte aligned
pub type Callback = InplaceFn;
