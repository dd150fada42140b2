//! CRC trailers on payload buffers
//!
//! Frame layout:
//! ```text
//! ┌─────────────┬──────────┐
//! │ PAYLOAD     │ CRC      │
//! │ 0–N bytes   │ 2 bytes  │
//! └─────────────┴──────────┘
//! ```
//!
//! Reflected-output variants (KERMIT, X-25, MODBUS, ...) put the low byte
//! first; MSB-first variants (CCITT-FALSE, XMODEM) put the high byte first.

use heapless::Vec;

use crate::engine::Crc16Algorithm;

/// Size of the CRC trailer in bytes
pub const TRAILER_SIZE: usize = 2;

/// Errors from trailer handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcError {
    /// Frame shorter than the trailer
    TooShort,
    /// Trailer does not match the payload
    Mismatch {
        /// CRC computed over the payload
        expected: u16,
        /// CRC found in the trailer
        actual: u16,
    },
    /// No room left in the buffer for the trailer
    BufferFull,
}

/// Encode a CRC in the byte order used on the wire by `A`
pub fn to_bytes<A: Crc16Algorithm>(crc: u16) -> [u8; TRAILER_SIZE] {
    if A::PARAMS.reflect_output {
        crc.to_le_bytes()
    } else {
        crc.to_be_bytes()
    }
}

/// Decode a CRC in the byte order used on the wire by `A`
pub fn from_bytes<A: Crc16Algorithm>(bytes: [u8; TRAILER_SIZE]) -> u16 {
    if A::PARAMS.reflect_output {
        u16::from_le_bytes(bytes)
    } else {
        u16::from_be_bytes(bytes)
    }
}

/// Append the CRC of the buffer's current contents
///
/// Returns the appended CRC. The buffer is left untouched on error.
pub fn append<A: Crc16Algorithm, const N: usize>(buffer: &mut Vec<u8, N>) -> Result<u16, CrcError> {
    if buffer.capacity() - buffer.len() < TRAILER_SIZE {
        return Err(CrcError::BufferFull);
    }

    let crc = A::checksum(buffer.as_slice());
    buffer
        .extend_from_slice(&to_bytes::<A>(crc))
        .map_err(|_| CrcError::BufferFull)?;
    Ok(crc)
}

/// Check a frame's trailer and return the payload in front of it
pub fn verify<A: Crc16Algorithm>(frame: &[u8]) -> Result<&[u8], CrcError> {
    if frame.len() < TRAILER_SIZE {
        return Err(CrcError::TooShort);
    }

    let (payload, trailer) = frame.split_at(frame.len() - TRAILER_SIZE);
    let expected = A::checksum(payload);
    let actual = from_bytes::<A>([trailer[0], trailer[1]]);

    if expected != actual {
        return Err(CrcError::Mismatch { expected, actual });
    }
    Ok(payload)
}
