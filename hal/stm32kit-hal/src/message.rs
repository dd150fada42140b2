//! Transfer buffers, timeouts and retry counts

use core::num::NonZeroU32;

/// Largest transfer the vendor HAL can express (its length field is `u16`)
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;

/// Clamp a buffer length to what the HAL accepts
pub const fn clamp_len(len: usize) -> u16 {
    if len > MAX_MESSAGE_LEN {
        u16::MAX
    } else {
        len as u16
    }
}

/// The part of `data` a single transfer covers
///
/// Bytes past 65535 are silently left out.
pub fn clamp_message(data: &[u8]) -> &[u8] {
    &data[..clamp_len(data.len()) as usize]
}

/// Mutable counterpart of [`clamp_message`]
pub fn clamp_message_mut(data: &mut [u8]) -> &mut [u8] {
    let len = clamp_len(data.len()) as usize;
    &mut data[..len]
}

/// Blocking-operation timeout in milliseconds, never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeout(NonZeroU32);

impl Timeout {
    /// 100 ms
    pub const DEFAULT: Self = Self::millis(100);

    /// Timeout of `ms` milliseconds
    ///
    /// Panics (at compile time in const context) if `ms` is zero.
    pub const fn millis(ms: u32) -> Self {
        match NonZeroU32::new(ms) {
            Some(ms) => Self(ms),
            None => panic!("timeout must be greater than zero"),
        }
    }

    /// Fallible variant of [`Timeout::millis`]
    pub const fn try_millis(ms: u32) -> Option<Self> {
        match NonZeroU32::new(ms) {
            Some(ms) => Some(Self(ms)),
            None => None,
        }
    }

    pub const fn as_millis(self) -> u32 {
        self.0.get()
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Number of I2C device readiness checks, never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxAttempts(NonZeroU32);

impl MaxAttempts {
    /// 3 attempts
    pub const DEFAULT: Self = Self::new(3);

    /// Panics (at compile time in const context) if `attempts` is zero.
    pub const fn new(attempts: u32) -> Self {
        match NonZeroU32::new(attempts) {
            Some(attempts) => Self(attempts),
            None => panic!("max attempts must be greater than zero"),
        }
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for MaxAttempts {
    fn default() -> Self {
        Self::DEFAULT
    }
}
