//! Fixed-point currency amounts.
//!
//! Balances and transfer amounts are counted in integer minor units so that
//! repeated transfers never drift, and so the signed payload encodes the exact
//! value rather than a rendering of it.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits an [`Amount`] carries.
pub const AMOUNT_DECIMALS: usize = 8;
/// Minor units in one whole coin.
pub const MINOR_UNITS_PER_COIN: u64 = 100_000_000;

/// Non-negative amount of currency, stored as minor units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u64::MAX);

    /// Creates an amount from a raw minor-unit count.
    #[inline]
    pub const fn from_minor(minor: u64) -> Self {
        Amount(minor)
    }

    /// Creates an amount of whole coins, saturating at [`Amount::MAX`].
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Amount(units.saturating_mul(MINOR_UNITS_PER_COIN))
    }

    #[inline]
    pub const fn minor(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Fixed-width encoding used in signed payloads.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / MINOR_UNITS_PER_COIN,
            self.0 % MINOR_UNITS_PER_COIN,
            width = AMOUNT_DECIMALS
        )
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses decimal text such as `"50"`, `"50.0"` or `"0.00000001"` exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(LedgerError::InvalidAmount("amount is empty".to_string()));
        }
        if text.starts_with('-') {
            return Err(LedgerError::InvalidAmount(format!(
                "amount cannot be negative: {}",
                text
            )));
        }

        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(LedgerError::InvalidAmount(format!(
                "not a decimal number: {}",
                text
            )));
        }
        if fraction.len() > AMOUNT_DECIMALS {
            return Err(LedgerError::InvalidAmount(format!(
                "at most {} fractional digits allowed, got {}",
                AMOUNT_DECIMALS,
                fraction.len()
            )));
        }

        let overflow = || LedgerError::InvalidAmount(format!("amount out of range: {}", text));
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            format!("{:0<width$}", fraction, width = AMOUNT_DECIMALS)
                .parse()
                .map_err(|_| overflow())?
        };

        whole
            .checked_mul(MINOR_UNITS_PER_COIN)
            .and_then(|minor| minor.checked_add(fraction))
            .map(Amount)
            .ok_or_else(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!("50".parse::<Amount>().unwrap(), Amount::from_units(50));
        assert_eq!("50.0".parse::<Amount>().unwrap(), Amount::from_units(50));
        assert_eq!("0.5".parse::<Amount>().unwrap(), Amount::from_minor(50_000_000));
        assert_eq!(".5".parse::<Amount>().unwrap(), Amount::from_minor(50_000_000));
        assert_eq!("0.00000001".parse::<Amount>().unwrap(), Amount::from_minor(1));
        assert_eq!(" 12.34 ".parse::<Amount>().unwrap(), Amount::from_minor(1_234_000_000));
    }

    #[test]
    fn test_parse_rejects_negative_and_malformed() {
        for bad in ["", "-1", "-0.5", "+1", "1.2.3", "abc", "1e5", ".", "0.000000001"] {
            let result = bad.parse::<Amount>();
            assert!(
                matches!(result, Err(LedgerError::InvalidAmount(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let result = "184467440737.09551616".parse::<Amount>();
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
        assert_eq!(
            "184467440737.09551615".parse::<Amount>().unwrap(),
            Amount::MAX
        );
    }

    #[test]
    fn test_display_is_exact() {
        assert_eq!(Amount::from_units(50).to_string(), "50.00000000");
        assert_eq!(Amount::from_minor(1).to_string(), "0.00000001");
        assert_eq!(Amount::ZERO.to_string(), "0.00000000");
    }

    #[test]
    fn test_repeated_tenths_do_not_drift() {
        let tenth: Amount = "0.1".parse().unwrap();
        let mut total = Amount::ZERO;
        for _ in 0..10 {
            total = total.checked_add(tenth).unwrap();
        }
        assert_eq!(total, Amount::from_units(1));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Amount::ZERO.checked_sub(Amount::from_minor(1)), None);
        assert_eq!(Amount::MAX.checked_add(Amount::from_minor(1)), None);
        assert_eq!(Amount::from_units(u64::MAX), Amount::MAX);
    }
}
