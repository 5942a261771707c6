use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const SATS_PER_BTC: u64 = 100_000_000;
const DECIMAL_PLACES: u32 = 8;

/// A non-negative BTC amount held as whole satoshis, so the demo balances
/// stay exact (0.05 + 0.02 is 0.07, not 0.07000000000000001).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a decimal number")]
    NotANumber,
    #[error("amount has more than {DECIMAL_PLACES} decimal places")]
    TooPrecise,
    #[error("amount is out of range")]
    Overflow,
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_sats(sats: u64) -> Self {
        Amount(sats)
    }

    pub fn sats(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseAmountError::Empty);
        }
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(ParseAmountError::NotANumber);
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseAmountError::NotANumber);
        }
        if frac.len() > DECIMAL_PLACES as usize {
            return Err(ParseAmountError::TooPrecise);
        }

        let whole_sats = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| ParseAmountError::Overflow)?
                .checked_mul(SATS_PER_BTC)
                .ok_or(ParseAmountError::Overflow)?
        };
        let frac_sats = if frac.is_empty() {
            0
        } else {
            let scale = 10u64.pow(DECIMAL_PLACES - frac.len() as u32);
            frac.parse::<u64>()
                .map_err(|_| ParseAmountError::Overflow)?
                * scale
        };
        whole_sats
            .checked_add(frac_sats)
            .map(Amount)
            .ok_or(ParseAmountError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SATS_PER_BTC;
        let fractional = self.0 % SATS_PER_BTC;
        if fractional == 0 {
            write!(f, "{whole}")
        } else {
            write!(
                f,
                "{}.{}",
                whole,
                format!("{:08}", fractional).trim_end_matches('0')
            )
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn from_str__parses_whole_and_fractional_inputs() {
        assert_eq!("0.05".parse::<Amount>(), Ok(Amount::from_sats(5_000_000)));
        assert_eq!("1".parse::<Amount>(), Ok(Amount::from_sats(SATS_PER_BTC)));
        assert_eq!(".5".parse::<Amount>(), Ok(Amount::from_sats(50_000_000)));
        assert_eq!("0.00000001".parse::<Amount>(), Ok(Amount::from_sats(1)));
    }

    #[test]
    fn from_str__rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(ParseAmountError::Empty));
        assert_eq!(".".parse::<Amount>(), Err(ParseAmountError::NotANumber));
        assert_eq!("abc".parse::<Amount>(), Err(ParseAmountError::NotANumber));
        assert_eq!("-0.01".parse::<Amount>(), Err(ParseAmountError::NotANumber));
        assert_eq!("1e3".parse::<Amount>(), Err(ParseAmountError::NotANumber));
        assert_eq!(
            "0.000000001".parse::<Amount>(),
            Err(ParseAmountError::TooPrecise)
        );
        assert_eq!(
            "999999999999".parse::<Amount>(),
            Err(ParseAmountError::Overflow)
        );
    }

    #[test]
    fn display__trims_trailing_zeros() {
        assert_eq!(Amount::from_sats(5_000_000).to_string(), "0.05");
        assert_eq!(Amount::from_sats(7_000_000).to_string(), "0.07");
        assert_eq!(Amount::from_sats(SATS_PER_BTC).to_string(), "1");
        assert_eq!(Amount::from_sats(0).to_string(), "0");
    }
}
