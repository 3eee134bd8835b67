//! Coin and fee primitives.
//!
//! Amounts stay decimal strings end to end. Gas and sequence values arrive as
//! strings in Amino documents and must fit a 53-bit safe integer, the range a
//! JavaScript signer can represent without rounding.

use crate::{Error, Result};
use cosmrs::proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 2^53 - 1
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Parse a decimal string into an integer no larger than [`MAX_SAFE_INTEGER`].
pub fn parse_safe_integer(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok().filter(|v| *v <= MAX_SAFE_INTEGER)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Coin {
    /// Token denom, e.g. `orai`
    pub denom: String,
    /// Decimal integer amount in base units
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// Reject empty denoms and amounts that are not plain decimal integers
    pub fn validate(&self) -> Result<()> {
        if self.denom.is_empty() {
            return Err(Error::validation("denom", "non-empty denom"));
        }
        if self.amount.is_empty() || !self.amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(
                "amount",
                format!("decimal integer string, got '{}'", self.amount),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl From<Coin> for ProtoCoin {
    fn from(coin: Coin) -> Self {
        ProtoCoin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

impl From<&Coin> for ProtoCoin {
    fn from(coin: &Coin) -> Self {
        coin.clone().into()
    }
}

impl From<ProtoCoin> for Coin {
    fn from(coin: ProtoCoin) -> Self {
        Coin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

/// Transaction fee in the legacy (Amino) shape shared with CosmJS callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    /// Gas limit as a decimal string
    pub gas: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl StdFee {
    pub fn new(amount: Vec<Coin>, gas_limit: u64) -> Self {
        Self {
            amount,
            gas: gas_limit.to_string(),
            granter: None,
            payer: None,
        }
    }

    /// Fee for `gas_limit` units at `price`, rounded up
    pub fn calculate(gas_limit: u64, price: &GasPrice) -> Result<Self> {
        if gas_limit > MAX_SAFE_INTEGER {
            return Err(Error::InvalidFee(format!(
                "gas limit {} exceeds the safe integer range",
                gas_limit
            )));
        }
        let scale = 10u128.pow(price.decimals);
        let product = u128::from(gas_limit)
            .checked_mul(price.atomics)
            .ok_or_else(|| Error::InvalidFee("fee amount overflows".to_string()))?;
        let amount = product.div_ceil(scale);
        Ok(Self::new(
            vec![Coin::new(amount.to_string(), price.denom.clone())],
            gas_limit,
        ))
    }

    /// Gas limit as a safe integer
    pub fn gas_limit(&self) -> Result<u64> {
        parse_safe_integer(&self.gas).ok_or_else(|| {
            Error::InvalidFee(format!(
                "gas '{}' is not an integer in the safe range 0..={}",
                self.gas, MAX_SAFE_INTEGER
            ))
        })
    }

    /// Check every fee coin and the gas limit; returns the gas limit
    pub fn validate(&self) -> Result<u64> {
        for (i, coin) in self.amount.iter().enumerate() {
            coin.validate().map_err(|e| match e {
                Error::Validation { path, expected } => {
                    Error::validation(format!("amount[{}].{}", i, path), expected)
                }
                other => other,
            })?;
        }
        self.gas_limit()
    }

    pub fn granter_str(&self) -> &str {
        self.granter.as_deref().unwrap_or_default()
    }

    pub fn payer_str(&self) -> &str {
        self.payer.as_deref().unwrap_or_default()
    }
}

const MAX_GAS_PRICE_DECIMALS: u32 = 18;

/// A decimal gas price such as `0.002orai`, held as `atomics / 10^decimals`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    atomics: u128,
    decimals: u32,
    pub denom: String,
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidFee(format!("invalid gas price '{}'", s));

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let (number, denom) = s.split_at(split);
        if number.is_empty() || !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() || frac.contains('.') {
            return Err(invalid());
        }
        let decimals = frac.len() as u32;
        if decimals > MAX_GAS_PRICE_DECIMALS {
            return Err(invalid());
        }

        let digits = format!("{}{}", whole, frac);
        let atomics: u128 = digits.parse().map_err(|_| invalid())?;

        Ok(Self {
            atomics,
            decimals,
            denom: denom.to_string(),
        })
    }
}
