//! Logging shims
//!
//! Forward to `defmt` when the `defmt` feature is enabled. Otherwise the
//! arguments are still type-checked and then discarded, so call sites compile
//! the same either way. Format strings must stay within the `{}` subset both
//! backends understand.

#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)+);
        #[cfg(not(feature = "defmt"))]
        let _ = ::core::format_args!($($arg)+);
    }};
}

macro_rules! debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)+);
        #[cfg(not(feature = "defmt"))]
        let _ = ::core::format_args!($($arg)+);
    }};
}

macro_rules! warn {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)+);
        #[cfg(not(feature = "defmt"))]
        let _ = ::core::format_args!($($arg)+);
    }};
}
