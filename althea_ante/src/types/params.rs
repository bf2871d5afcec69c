use super::coin::{format_dec, parse_dec};
use num::rational::BigRational;
use num::Zero;
use num256::Uint256;
use serde::{Deserialize as _, Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};

/// x/auth parameters consulted by the ante decorators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    pub max_memo_characters: u64,
    pub tx_sig_limit: u64,
    pub tx_size_cost_per_byte: u64,
    pub sig_verify_cost_ed25519: u64,
    pub sig_verify_cost_secp256k1: u64,
}

impl Default for AuthParams {
    fn default() -> Self {
        AuthParams {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_ed25519: 590,
            sig_verify_cost_secp256k1: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmParams {
    /// the only denom fees may be paid in
    pub evm_denom: String,
    pub enable_create: bool,
    pub enable_call: bool,
}

impl Default for EvmParams {
    fn default() -> Self {
        EvmParams {
            evm_denom: "aalthea".to_string(),
            enable_create: true,
            enable_call: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeMarketParams {
    pub base_fee: Uint256,
    /// chain wide minimum gas price, a decimal
    #[serde(serialize_with = "serialize_dec", deserialize_with = "deserialize_dec")]
    pub min_gas_price: BigRational,
}

impl Default for FeeMarketParams {
    fn default() -> Self {
        FeeMarketParams {
            base_fee: 1_000_000_000u64.into(),
            min_gas_price: BigRational::zero(),
        }
    }
}

/// Every parameter set the pipeline reads, loadable from a single JSON document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnteParams {
    pub auth: AuthParams,
    pub evm: EvmParams,
    pub fee_market: FeeMarketParams,
}

fn serialize_dec<S: Serializer>(value: &BigRational, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_dec(value))
}

fn deserialize_dec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigRational, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_dec(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal {}", value)))
}
