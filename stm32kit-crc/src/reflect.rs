//! Bit reflection helpers
//!
//! Both helpers swap adjacent bits, then bit pairs, then nibbles (and, for
//! 16-bit values, bytes). The sequence is fixed so results stay bit-exact
//! with the published CRC catalogues.

/// Reverse the bit order of an 8-bit value (`0b1011_0000` -> `0b0000_1101`)
pub const fn reflect8(mut value: u8) -> u8 {
    value = ((value & 0x55) << 1) | ((value & 0xAA) >> 1);
    value = ((value & 0x33) << 2) | ((value & 0xCC) >> 2);
    (value << 4) | (value >> 4)
}

/// Reverse the bit order of a 16-bit value
pub const fn reflect16(mut value: u16) -> u16 {
    value = ((value & 0x5555) << 1) | ((value & 0xAAAA) >> 1);
    value = ((value & 0x3333) << 2) | ((value & 0xCCCC) >> 2);
    value = ((value & 0x0F0F) << 4) | ((value & 0xF0F0) >> 4);
    (value << 8) | (value >> 8)
}
