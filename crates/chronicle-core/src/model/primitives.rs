//! Fixed-width binary primitives
//!
//! Hashes, identifiers and keys are opaque byte strings produced by the wire
//! layer. This crate stores and compares them; it never derives or validates
//! them.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        // Not derived: std stops deriving Default at 32-element arrays
        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl $name {
            /// Width of the value in bytes
            pub const LEN: usize = $len;

            /// Borrow the raw bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Build from a byte slice, zero-padding short input
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
                if bytes.len() > $len {
                    return Err(ParseError::BadLength {
                        expected: $len,
                        actual: bytes.len(),
                    });
                }
                let mut buf = [0u8; $len];
                buf[..bytes.len()].copy_from_slice(bytes);
                Ok(Self(buf))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(s).map_err(|_| ParseError::BadHex {
                    value: s.to_string(),
                })?;
                if bytes.len() != $len {
                    return Err(ParseError::BadLength {
                        expected: $len,
                        actual: bytes.len(),
                    });
                }
                Self::from_slice(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// 256-bit hash identifying a ledger, transaction or ledger entry
    Hash256,
    32
);

fixed_bytes!(
    /// 128-bit hash (email hash field)
    Hash128,
    16
);

fixed_bytes!(
    /// 160-bit account identifier
    AccountId,
    20
);

fixed_bytes!(
    /// 160-bit currency code
    Currency,
    20
);

fixed_bytes!(
    /// 160-bit regular-key identifier
    RegularKey,
    20
);

fixed_bytes!(
    /// 264-bit compressed signing public key
    PublicKey,
    33
);

impl AccountId {
    /// Human-readable form used by the account dictionary
    pub fn human(&self) -> String {
        hex::encode(self.0)
    }
}

impl RegularKey {
    /// Human-readable form used by the regular-key dictionary
    pub fn human(&self) -> String {
        hex::encode(self.0)
    }
}

impl PublicKey {
    /// Human-readable form used by the public-key dictionary
    pub fn human(&self) -> String {
        hex::encode(self.0)
    }
}

impl Currency {
    /// Human-readable currency code
    ///
    /// The 3-character code lives at bytes 12..15 of the 20-byte field; the
    /// all-zero currency is the native coin, rendered as `XRP`.
    pub fn human(&self) -> String {
        if self.0 == [0u8; Self::LEN] {
            return "XRP".to_string();
        }
        let code = &self.0[12..15];
        if code.iter().all(|b| b.is_ascii_graphic()) {
            String::from_utf8_lossy(code).into_owned()
        } else {
            hex::encode(self.0)
        }
    }

    /// Build a currency from its 3-character code
    pub fn from_code(code: &str) -> Result<Self, ParseError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 {
            return Err(ParseError::BadLength {
                expected: 3,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; Self::LEN];
        buf[12..15].copy_from_slice(bytes);
        Ok(Self(buf))
    }
}

/// Fixed-point amount value in its canonical 8-byte big-endian form
///
/// The byte form is what the store persists and what amount columns in the
/// denormalized views carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Drops(pub u64);

impl Drops {
    /// Canonical 8-byte encoding
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode the canonical 8-byte encoding
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Decode from a slice; must be exactly 8 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let buf: [u8; 8] = bytes.try_into().map_err(|_| ParseError::BadLength {
            expected: 8,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(buf))
    }
}
