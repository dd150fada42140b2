//! Parametric CRC-16
//!
//! A table-driven CRC-16 calculator whose five model parameters are const
//! generics. The 256-entry lookup table is derived from the polynomial and
//! the input-reflection flag during constant evaluation, so every checksum
//! function is a `const fn` and nothing is computed at start-up.
//!
//! # Algorithm
//!
//! ```text
//! init ──► update(chunk) ──► update(chunk) ──► finalize ──► crc
//!            │                                   │
//!            └ table[(crc ^ byte) & 0xFF]        └ reflect if REFIN != REFOUT,
//!              (MSB- or LSB-first)                 then XOR with XOROUT
//! ```
//!
//! Eight named variants are provided as type aliases (CCITT-FALSE, XMODEM,
//! KERMIT, X-25, MODBUS, USB, IBM/ARC, DNP) and are listed together with
//! their published check values in [`params::CATALOGUE`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod digest;
pub mod engine;
pub mod params;
pub mod reflect;
pub mod table;
pub mod trailer;

pub use digest::Digest;
pub use engine::{
    Crc16, Crc16Algorithm, Crc16CcittFalse, Crc16Dnp, Crc16Ibm, Crc16Kermit, Crc16Modbus, Crc16Usb,
    Crc16X25, Crc16Xmodem,
};
pub use params::{Crc16Params, CATALOGUE, CHECK_INPUT};
pub use reflect::{reflect16, reflect8};
pub use trailer::CrcError;
