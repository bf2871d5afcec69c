use deep_space::Coin;
use num::bigint::BigInt;
use num::rational::BigRational;
use num::{pow, Bounded, Signed, Zero};
use num256::Uint256;
use std::fmt;
use std::str::FromStr;

/// A coin with a decimal amount, used for the validator local minimum gas prices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecCoin {
    pub denom: String,
    pub amount: BigRational,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: BigRational) -> DecCoin {
        DecCoin {
            denom: denom.into(),
            amount,
        }
    }

    pub fn from_integer(denom: impl Into<String>, amount: u64) -> DecCoin {
        DecCoin::new(denom, BigRational::from_integer(BigInt::from(amount)))
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_dec(&self.amount), self.denom)
    }
}

impl FromStr for DecCoin {
    type Err = String;

    /// Parses the `<decimal><denom>` format used by the node `minimum-gas-prices` setting
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let split_idx = value
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(idx, _)| idx)
            .ok_or_else(|| format!("missing denom in {}", value))?;
        let (amount, denom) = value.split_at(split_idx);
        let amount = parse_dec(amount).ok_or_else(|| format!("invalid decimal amount {}", amount))?;
        if amount.is_negative() {
            return Err(format!("negative amount {}", value));
        }
        Ok(DecCoin::new(denom, amount))
    }
}

/// Parses a comma separated list of decimal coins, for example `0.5aalthea,10ufootoken`
pub fn parse_dec_coins(value: &str) -> Result<Vec<DecCoin>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(DecCoin::from_str)
        .collect()
}

/// Parses a plain decimal string such as `1.25` into an exact rational
pub fn parse_dec(value: &str) -> Option<BigRational> {
    let value = value.trim();
    let (int_part, frac_part) = match value.find('.') {
        Some(idx) => (&value[..idx], &value[idx + 1..]),
        None => (value, ""),
    };
    let digits = format!("{}{}", int_part, frac_part);
    if digits.is_empty() || digits == "-" {
        return None;
    }
    let numer = BigInt::from_str(&digits).ok()?;
    let denom = pow(BigInt::from(10u8), frac_part.len());
    Some(BigRational::new(numer, denom))
}

/// Renders like the sdk LegacyDec, integers without a fraction
pub fn format_dec(value: &BigRational) -> String {
    if value.is_integer() {
        value.to_integer().to_string()
    } else {
        // 18 decimal places, like the sdk LegacyDec
        let scaled = (value * BigRational::from_integer(pow(BigInt::from(10u8), 18))).trunc();
        let raw = scaled.to_integer().abs().to_string();
        let padded = format!("{:0>19}", raw);
        let (int_part, frac_part) = padded.split_at(padded.len() - 18);
        let sign = if value.is_negative() { "-" } else { "" };
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}

/// Amount of `denom` in the list, zero when absent
pub fn amount_of(coins: &[DecCoin], denom: &str) -> BigRational {
    coins
        .iter()
        .find(|c| c.denom == denom)
        .map(|c| c.amount.clone())
        .unwrap_or_else(BigRational::zero)
}

pub fn is_all_zero(coins: &[DecCoin]) -> bool {
    coins.iter().all(|c| c.amount.is_zero())
}

pub fn uint256_to_bigint(value: &Uint256) -> BigInt {
    BigInt::from_str(&value.to_string()).unwrap_or_default()
}

/// Converts back to an unsigned amount, `None` for negatives or values beyond 256 bits
pub fn bigint_to_uint256(value: &BigInt) -> Option<Uint256> {
    if value.is_negative() {
        return None;
    }
    Uint256::from_str(&value.to_string()).ok()
}

/// Rounds towards zero, negative values clamp to zero
pub fn truncate_dec(value: &BigRational) -> Uint256 {
    bigint_to_uint256(&value.trunc().to_integer()).unwrap_or_else(Uint256::max_value)
}

pub fn ceil_dec(value: &BigRational) -> Uint256 {
    bigint_to_uint256(&value.ceil().to_integer()).unwrap_or_else(Uint256::max_value)
}

/// Normalizes a coin list the way `sdk.NewCoins` does, zero amounts are dropped and the
/// remaining coins are sorted by denom
pub fn new_coins(coins: Vec<Coin>) -> Vec<Coin> {
    let mut coins: Vec<Coin> = coins.into_iter().filter(|c| !c.amount.is_zero()).collect();
    coins.sort_by(|a, b| a.denom.cmp(&b.denom));
    coins
}

/// Comma separated rendering used in error messages
pub fn coins_to_string(coins: &[Coin]) -> String {
    coins
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<String>>()
        .join(",")
}

/// True when at least one coin of `coins` is greater or equal to the coin of the same denom in
/// `required`
pub fn is_any_gte(coins: &[Coin], required: &[Coin]) -> bool {
    if required.is_empty() {
        return false;
    }
    coins.iter().any(|coin| {
        required
            .iter()
            .any(|req| req.denom == coin.denom && coin.amount >= req.amount)
    })
}
