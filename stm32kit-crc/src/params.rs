//! Runtime description of a CRC-16 model
//!
//! [`Crc16Params`] mirrors the const generic parameters of
//! [`Crc16`](crate::Crc16) as plain data. It is what gets logged or stored
//! alongside a payload, and it carries a table-free bitwise implementation
//! used to cross-check the table-driven engine.

use crate::reflect::reflect16;

/// The standard check input (`"123456789"`) used by CRC catalogues
pub const CHECK_INPUT: &[u8] = b"123456789";

/// Parameters of one CRC-16 variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crc16Params {
    /// Generator polynomial, normal (MSB-first) form
    pub polynomial: u16,
    /// Initial register value
    pub initial_value: u16,
    /// Final XOR mask
    pub final_xor: u16,
    /// Input bytes are processed LSB first
    pub reflect_input: bool,
    /// Output register is reflected
    pub reflect_output: bool,
}

impl Crc16Params {
    /// Create a parameter set
    pub const fn new(
        polynomial: u16,
        initial_value: u16,
        final_xor: u16,
        reflect_input: bool,
        reflect_output: bool,
    ) -> Self {
        Self {
            polynomial,
            initial_value,
            final_xor,
            reflect_input,
            reflect_output,
        }
    }

    /// Compute a checksum one bit at a time, without a lookup table
    ///
    /// Slow, but independent of the table generator. Useful when the model
    /// is only known at runtime.
    pub const fn checksum_bitwise(&self, data: &[u8]) -> u16 {
        let reversed = reflect16(self.polynomial);
        let mut crc = self.initial_value;
        let mut i = 0;

        while i < data.len() {
            let mut bit = 0;
            if self.reflect_input {
                crc ^= data[i] as u16;
                while bit < 8 {
                    crc = if crc & 0x0001 != 0 {
                        (crc >> 1) ^ reversed
                    } else {
                        crc >> 1
                    };
                    bit += 1;
                }
            } else {
                crc ^= (data[i] as u16) << 8;
                while bit < 8 {
                    crc = if crc & 0x8000 != 0 {
                        (crc << 1) ^ self.polynomial
                    } else {
                        crc << 1
                    };
                    bit += 1;
                }
            }
            i += 1;
        }

        if self.reflect_output != self.reflect_input {
            crc = reflect16(crc);
        }
        crc ^ self.final_xor
    }

    /// Look up a named variant in [`CATALOGUE`]
    pub fn by_name(name: &str) -> Option<&'static NamedVariant> {
        CATALOGUE
            .iter()
            .find(|variant| variant.name.eq_ignore_ascii_case(name))
    }
}

/// A catalogued variant with its published check value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NamedVariant {
    /// Catalogue name
    pub name: &'static str,
    /// Model parameters
    pub params: Crc16Params,
    /// Checksum of [`CHECK_INPUT`]
    pub check: u16,
}

/// The named variants this crate provides aliases for
pub const CATALOGUE: [NamedVariant; 8] = [
    NamedVariant {
        name: "CRC-16/CCITT-FALSE",
        params: Crc16Params::new(0x1021, 0xFFFF, 0x0000, false, false),
        check: 0x29B1,
    },
    NamedVariant {
        name: "CRC-16/XMODEM",
        params: Crc16Params::new(0x1021, 0x0000, 0x0000, false, false),
        check: 0x31C3,
    },
    NamedVariant {
        name: "CRC-16/KERMIT",
        params: Crc16Params::new(0x1021, 0x0000, 0x0000, true, true),
        check: 0x2189,
    },
    NamedVariant {
        name: "CRC-16/X-25",
        params: Crc16Params::new(0x1021, 0xFFFF, 0xFFFF, true, true),
        check: 0x906E,
    },
    NamedVariant {
        name: "CRC-16/MODBUS",
        params: Crc16Params::new(0x8005, 0xFFFF, 0x0000, true, true),
        check: 0x4B37,
    },
    NamedVariant {
        name: "CRC-16/USB",
        params: Crc16Params::new(0x8005, 0xFFFF, 0xFFFF, true, true),
        check: 0xB4C8,
    },
    NamedVariant {
        name: "CRC-16/ARC",
        params: Crc16Params::new(0x8005, 0x0000, 0x0000, true, true),
        check: 0xBB3D,
    },
    NamedVariant {
        name: "CRC-16/DNP",
        params: Crc16Params::new(0x3D65, 0x0000, 0xFFFF, true, true),
        check: 0xEA82,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::*;

    #[test]
    fn test_bitwise_reference_matches_catalogue() {
        for variant in CATALOGUE.iter() {
            assert_eq!(
                variant.params.checksum_bitwise(CHECK_INPUT),
                variant.check,
                "{}",
                variant.name
            );
        }
    }

    #[test]
    fn test_aliases_match_catalogue_params() {
        assert_eq!(Crc16CcittFalse::PARAMS, CATALOGUE[0].params);
        assert_eq!(Crc16Xmodem::PARAMS, CATALOGUE[1].params);
        assert_eq!(Crc16Kermit::PARAMS, CATALOGUE[2].params);
        assert_eq!(Crc16X25::PARAMS, CATALOGUE[3].params);
        assert_eq!(Crc16Modbus::PARAMS, CATALOGUE[4].params);
        assert_eq!(Crc16Usb::PARAMS, CATALOGUE[5].params);
        assert_eq!(Crc16Ibm::PARAMS, CATALOGUE[6].params);
        assert_eq!(Crc16Dnp::PARAMS, CATALOGUE[7].params);
    }

    #[test]
    fn test_by_name_is_case_insensitive() {
        let modbus = Crc16Params::by_name("crc-16/modbus").unwrap();
        assert_eq!(modbus.check, 0x4B37);
        assert!(Crc16Params::by_name("CRC-16/UNKNOWN").is_none());
    }

    #[test]
    fn test_bitwise_empty_input() {
        let xmodem = CATALOGUE[1].params;
        assert_eq!(xmodem.checksum_bitwise(&[]), 0x0000);
    }
}
