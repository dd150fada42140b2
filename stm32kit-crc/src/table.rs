//! Lookup table generation
//!
//! The table is a pure function of the polynomial and the input-reflection
//! flag. Each entry is the register after eight division steps seeded with
//! the entry's index:
//!
//! - reflected: index in the low byte, LSB first, reversed polynomial, shift right
//! - normal: index in the high byte, MSB first, polynomial as given, shift left

use crate::reflect::reflect16;

/// Number of entries in a byte-wise lookup table
pub const TABLE_SIZE: usize = 256;

/// Generate the byte-wise lookup table for `polynomial`
pub const fn generate_table(polynomial: u16, reflect_input: bool) -> [u16; TABLE_SIZE] {
    let mut table = [0u16; TABLE_SIZE];
    let reversed = reflect16(polynomial);

    let mut index = 0;
    while index < TABLE_SIZE {
        let mut crc: u16;
        let mut bit = 0;

        if reflect_input {
            crc = index as u16;
            while bit < 8 {
                crc = if crc & 0x0001 != 0 {
                    (crc >> 1) ^ reversed
                } else {
                    crc >> 1
                };
                bit += 1;
            }
        } else {
            crc = (index as u16) << 8;
            while bit < 8 {
                crc = if crc & 0x8000 != 0 {
                    (crc << 1) ^ polynomial
                } else {
                    crc << 1
                };
                bit += 1;
            }
        }

        table[index] = crc;
        index += 1;
    }

    table
}
