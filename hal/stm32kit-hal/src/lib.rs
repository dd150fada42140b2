//! STM32 peripheral wrappers with closure completion callbacks
//!
//! Each wrapper sits on top of a vendor HAL handle, expressed as a backend
//! trait, and turns the HAL's bare C completion callbacks into Rust closures
//! through `stm32kit-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  stm32kit-hal (Uart / Spi / I2c)        │
//! └─────────────────────────────────────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  stm32kit-core  │     │ backend traits  │
//! │  (callbacks)    │     │ (vendor HAL)    │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`mode`] - Blocking / Interrupt / DMA working modes
//! - [`message`] - Length clamping, timeouts, retry counts
//! - [`uart::Uart`], [`spi::Spi`], [`i2c::I2c`] - Peripheral wrappers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod i2c;
pub mod message;
pub mod mode;
pub mod spi;
pub mod uart;

pub use i2c::{I2c, I2cAddress, I2cBackend, I2cEvent, MemoryAddress, MemoryAddressSize};
pub use message::{clamp_len, MaxAttempts, Timeout, MAX_MESSAGE_LEN};
pub use mode::{AsyncMode, Blocking, Dma, Interrupt, TransferKind, WorkingMode};
pub use spi::{Spi, SpiBackend, SpiEvent};
pub use uart::{Uart, UartBackend, UartEvent};

use stm32kit_core::{CallbackDispatch, CallbackManager, UniqueTag};

/// Drop the callback armed for a transfer the HAL refused to start
pub(crate) fn disarm_on_error<T, D, E>(
    manager: &CallbackManager<'_, T, D>,
    started: Result<(), E>,
) -> Result<(), E>
where
    T: UniqueTag,
    D: CallbackDispatch,
{
    if started.is_err() {
        manager.clear();
    }
    started
}
