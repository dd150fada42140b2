//! Const-generic CRC-16 engine and the named variants

use crate::params::Crc16Params;
use crate::reflect::reflect16;
use crate::table::{generate_table, TABLE_SIZE};

/// CRC-16 calculator configured entirely at compile time
///
/// | Parameter | Meaning |
/// |-----------|---------|
/// | `POLY`    | Generator polynomial, normal (MSB-first) form |
/// | `INIT`    | Register value before the first byte |
/// | `XOROUT`  | Mask applied to the register after the last byte |
/// | `REFIN`   | Process input bytes LSB first |
/// | `REFOUT`  | Emit the register bit-reversed (relative to `REFIN`) |
///
/// Every method is a `const fn`, so checksums of constant data can be
/// computed at compile time:
///
/// ```
/// use stm32kit_crc::Crc16CcittFalse;
///
/// const CHECK: u16 = Crc16CcittFalse::checksum(b"123456789");
/// assert_eq!(CHECK, 0x29B1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc16<
    const POLY: u16,
    const INIT: u16,
    const XOROUT: u16,
    const REFIN: bool,
    const REFOUT: bool,
>;

impl<const POLY: u16, const INIT: u16, const XOROUT: u16, const REFIN: bool, const REFOUT: bool>
    Crc16<POLY, INIT, XOROUT, REFIN, REFOUT>
{
    /// Generator polynomial
    pub const POLYNOMIAL: u16 = POLY;
    /// Initial register value
    pub const INITIAL_VALUE: u16 = INIT;
    /// Final XOR mask
    pub const FINAL_XOR: u16 = XOROUT;
    /// Input bytes are processed LSB first
    pub const REFLECT_INPUT: bool = REFIN;
    /// Output register is reflected
    pub const REFLECT_OUTPUT: bool = REFOUT;

    /// Parameters of this variant as a runtime value
    pub const PARAMS: Crc16Params = Crc16Params::new(POLY, INIT, XOROUT, REFIN, REFOUT);

    const TABLE: &'static [u16; TABLE_SIZE] = &generate_table(POLY, REFIN);

    /// Register value to start a streaming calculation from
    pub const fn init() -> u16 {
        INIT
    }

    /// Feed `data` into a running register without finalizing
    pub const fn update(mut crc: u16, data: &[u8]) -> u16 {
        let table = Self::TABLE;
        let mut i = 0;

        if REFIN {
            while i < data.len() {
                let index = ((crc ^ data[i] as u16) & 0xFF) as usize;
                crc = (crc >> 8) ^ table[index];
                i += 1;
            }
        } else {
            while i < data.len() {
                let index = (((crc >> 8) ^ data[i] as u16) & 0xFF) as usize;
                crc = (crc << 8) ^ table[index];
                i += 1;
            }
        }

        crc
    }

    /// Turn a running register into the checksum
    pub const fn finalize(mut crc: u16) -> u16 {
        if REFOUT != REFIN {
            crc = reflect16(crc);
        }
        crc ^ XOROUT
    }

    /// Checksum of a complete buffer
    ///
    /// An empty buffer yields `finalize(init())`.
    pub const fn checksum(data: &[u8]) -> u16 {
        Self::finalize(Self::update(INIT, data))
    }

    /// The precomputed lookup table
    pub const fn table() -> &'static [u16; TABLE_SIZE] {
        Self::TABLE
    }
}

/// Generic access to a CRC-16 variant
///
/// Implemented by every [`Crc16`] instantiation so streaming and framing
/// helpers can be written once for all variants.
pub trait Crc16Algorithm {
    /// Parameters of the variant
    const PARAMS: Crc16Params;

    /// Initial register value
    fn init() -> u16;

    /// Feed bytes into a running register
    fn update(crc: u16, data: &[u8]) -> u16;

    /// Finalize a running register
    fn finalize(crc: u16) -> u16;

    /// Checksum of a complete buffer
    fn checksum(data: &[u8]) -> u16 {
        Self::finalize(Self::update(Self::init(), data))
    }
}

impl<const POLY: u16, const INIT: u16, const XOROUT: u16, const REFIN: bool, const REFOUT: bool>
    Crc16Algorithm for Crc16<POLY, INIT, XOROUT, REFIN, REFOUT>
{
    const PARAMS: Crc16Params = Crc16Params::new(POLY, INIT, XOROUT, REFIN, REFOUT);

    fn init() -> u16 {
        Self::init()
    }

    fn update(crc: u16, data: &[u8]) -> u16 {
        Self::update(crc, data)
    }

    fn finalize(crc: u16) -> u16 {
        Self::finalize(crc)
    }

    fn checksum(data: &[u8]) -> u16 {
        Self::checksum(data)
    }
}

// ============================================================================
// Named variants
// ============================================================================

/// CRC-16/CCITT-FALSE (IBM-3740), the usual embedded default
pub type Crc16CcittFalse = Crc16<0x1021, 0xFFFF, 0x0000, false, false>;

/// CRC-16/XMODEM
pub type Crc16Xmodem = Crc16<0x1021, 0x0000, 0x0000, false, false>;

/// CRC-16/KERMIT, also known as CCITT-TRUE
pub type Crc16Kermit = Crc16<0x1021, 0x0000, 0x0000, true, true>;

/// CRC-16/X-25 (HDLC, SDLC)
pub type Crc16X25 = Crc16<0x1021, 0xFFFF, 0xFFFF, true, true>;

/// CRC-16/MODBUS (Modbus RTU)
pub type Crc16Modbus = Crc16<0x8005, 0xFFFF, 0x0000, true, true>;

/// CRC-16/USB
pub type Crc16Usb = Crc16<0x8005, 0xFFFF, 0xFFFF, true, true>;

/// CRC-16/ARC, also known as CRC-16/IBM or CRC-16/LHA
pub type Crc16Ibm = Crc16<0x8005, 0x0000, 0x0000, true, true>;

/// CRC-16/DNP (DNP3)
pub type Crc16Dnp = Crc16<0x3D65, 0x0000, 0xFFFF, true, true>;
