//! Issued and native amounts
//!
//! An amount is a fixed-point value qualified by a currency and its issuing
//! account. The store splits the three parts into separate columns; the
//! denormalized views reassemble them as one concatenated blob.

use serde::{Deserialize, Serialize};

use super::primitives::{AccountId, Currency, Drops};
use crate::errors::ParseError;

/// A value of one currency issued by one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Amount {
    pub value: Drops,
    pub currency: Currency,
    pub issuer: AccountId,
}

impl Amount {
    /// Width of the concatenated view encoding: value + currency + issuer
    pub const CONCAT_LEN: usize = 8 + Currency::LEN + AccountId::LEN;

    /// A native-coin amount (zero currency, zero issuer)
    pub fn native(drops: u64) -> Self {
        Self {
            value: Drops(drops),
            ..Self::default()
        }
    }

    /// Decode the view-layer concatenation `value || currency || issuer`
    pub fn from_concat(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() != Self::CONCAT_LEN {
            return Err(ParseError::BadAmountConcat {
                expected: Self::CONCAT_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            value: Drops::from_slice(&bytes[..8])?,
            currency: Currency::from_slice(&bytes[8..8 + Currency::LEN])?,
            issuer: AccountId::from_slice(&bytes[8 + Currency::LEN..])?,
        })
    }

    /// The view-layer concatenation `value || currency || issuer`
    pub fn to_concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::CONCAT_LEN);
        out.extend_from_slice(&self.value.to_bytes());
        out.extend_from_slice(self.currency.as_bytes());
        out.extend_from_slice(self.issuer.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_round_trip() {
        let amount = Amount {
            value: Drops(42),
            currency: Currency::from_code("USD").unwrap(),
            issuer: AccountId([7u8; 20]),
        };
        let concat = amount.to_concat();
        assert_eq!(concat.len(), Amount::CONCAT_LEN);
        assert_eq!(Amount::from_concat(&concat).unwrap(), amount);
    }

    #[test]
    fn test_concat_rejects_wrong_width() {
        assert!(Amount::from_concat(&[0u8; 47]).is_err());
    }
}
