//! EPC identifier synthesis and encoding
//!
//! An EPC packs four fields into 96 bits: header (8), manager (28),
//! class (24) and serial (36). The canonical rendering is a 24-digit
//! uppercase hex string (2+7+6+9 digits); the wire rendering used by
//! downstream consumers is base64 over the 12 underlying bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;

/// Header value used when the caller does not supply one
pub const DEFAULT_HEADER: u8 = 0x35;

/// Manager number used when the caller does not supply one
pub const DEFAULT_MANAGER: u32 = 759_936;

/// Largest value representable in the 28-bit manager field
pub const MAX_MANAGER: u32 = 0x0FFF_FFFF;

/// Largest value representable in the 24-bit class field
pub const MAX_CLASS: u32 = 0x00FF_FFFF;

/// Largest value representable in the 36-bit serial field
pub const MAX_SERIAL: u64 = 0x000F_FFFF_FFFF;

/// Errors specific to EPC construction and parsing
#[derive(Debug)]
pub enum EpcError {
    /// A caller-supplied field exceeds its declared bit-width.
    /// Out-of-range input is rejected, never clamped.
    FieldOutOfRange { field: &'static str, value: u64, max: u64 },
    /// The hex rendering is not 24 hex digits
    InvalidHex(String),
}

impl std::fmt::Display for EpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpcError::FieldOutOfRange { field, value, max } => {
                write!(f, "EPC field '{}' out of range: {} (max {})", field, value, max)
            }
            EpcError::InvalidHex(s) => write!(f, "Invalid EPC hex string: '{}'", s),
        }
    }
}

impl std::error::Error for EpcError {}

/// A 96-bit synthetic tag identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epc {
    pub header: u8,
    pub manager: u32,
    pub class: u32,
    pub serial: u64,
}

impl Epc {
    /// Create an EPC from optional fields. Unspecified header and manager
    /// fall back to the fixed defaults; unspecified class and serial are
    /// drawn uniformly at random over their full field range.
    pub fn new(
        header: Option<u8>,
        manager: Option<u32>,
        class: Option<u32>,
        serial: Option<u64>,
    ) -> Result<Self, EpcError> {
        if let Some(m) = manager {
            if m > MAX_MANAGER {
                return Err(EpcError::FieldOutOfRange {
                    field: "manager",
                    value: m as u64,
                    max: MAX_MANAGER as u64,
                });
            }
        }
        if let Some(c) = class {
            if c > MAX_CLASS {
                return Err(EpcError::FieldOutOfRange {
                    field: "class",
                    value: c as u64,
                    max: MAX_CLASS as u64,
                });
            }
        }
        if let Some(s) = serial {
            if s > MAX_SERIAL {
                return Err(EpcError::FieldOutOfRange {
                    field: "serial",
                    value: s,
                    max: MAX_SERIAL,
                });
            }
        }

        let mut rng = rand::thread_rng();
        Ok(Epc {
            header: header.unwrap_or(DEFAULT_HEADER),
            manager: manager.unwrap_or(DEFAULT_MANAGER),
            class: class.unwrap_or_else(|| rng.gen_range(0..=MAX_CLASS)),
            serial: serial.unwrap_or_else(|| rng.gen_range(0..=MAX_SERIAL)),
        })
    }

    /// Synthesize a fully random-tail EPC with the default header/manager
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Epc {
            header: DEFAULT_HEADER,
            manager: DEFAULT_MANAGER,
            class: rng.gen_range(0..=MAX_CLASS),
            serial: rng.gen_range(0..=MAX_SERIAL),
        }
    }

    /// Render as exactly 24 uppercase hex digits (2+7+6+9)
    pub fn hex(&self) -> String {
        format!("{:02X}{:07X}{:06X}{:09X}", self.header, self.manager, self.class, self.serial)
    }

    /// Pack the four fields into the 12 underlying bytes, big-endian
    pub fn to_bytes(&self) -> [u8; 12] {
        let value: u128 = ((self.header as u128) << 88)
            | ((self.manager as u128) << 60)
            | ((self.class as u128) << 36)
            | (self.serial as u128);
        let wide = value.to_be_bytes();
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&wide[4..16]);
        bytes
    }

    /// Base64 rendering of the 12 underlying bytes
    pub fn b64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the canonical 24-digit hex rendering back into fields
    pub fn from_hex(s: &str) -> Result<Self, EpcError> {
        if s.len() != 24 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EpcError::InvalidHex(s.to_string()));
        }

        let header = u8::from_str_radix(&s[0..2], 16)
            .map_err(|_| EpcError::InvalidHex(s.to_string()))?;
        let manager = u32::from_str_radix(&s[2..9], 16)
            .map_err(|_| EpcError::InvalidHex(s.to_string()))?;
        let class = u32::from_str_radix(&s[9..15], 16)
            .map_err(|_| EpcError::InvalidHex(s.to_string()))?;
        let serial = u64::from_str_radix(&s[15..24], 16)
            .map_err(|_| EpcError::InvalidHex(s.to_string()))?;

        // 7 hex digits fit exactly in the 28-bit manager field and 9 hex
        // digits in the 36-bit serial field, so no range check is needed.
        Ok(Epc { header, manager, class, serial })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_width_is_fixed() {
        let epc = Epc::new(Some(0x01), Some(0), Some(0), Some(0)).unwrap();
        assert_eq!(epc.hex(), "010000000000000000000000");
    }

    #[test]
    fn test_rejects_out_of_range_manager() {
        let result = Epc::new(None, Some(MAX_MANAGER + 1), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_bytes_match_hex_nibbles() {
        let epc = Epc::new(None, None, Some(0xABCDEF), Some(0x123456789)).unwrap();
        let from_bytes: String =
            epc.to_bytes().iter().map(|b| format!("{:02X}", b)).collect();
        assert_eq!(from_bytes, epc.hex());
    }
}
