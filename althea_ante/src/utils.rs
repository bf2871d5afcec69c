use crate::error::{AnteError, AnteResult, ErrorKind};
use bytes::BytesMut;
use clarity::abi::get_hash;
use clarity::rlp::{pack_rlp, RlpToken};
use clarity::{Address as EthAddress, Signature, Transaction};
use deep_space::address::{cosmos_address_to_eth_address, eth_address_to_cosmos_address};
use deep_space::utils::bytes_to_hex_str;
use deep_space::Address;
use num256::Uint256;
use num_traits::{CheckedAdd, CheckedMul, ToPrimitive};
use prost::{DecodeError, Message};
use prost_types::Any;
use std::cmp::min;

/// Minimum gas of a plain Ethereum value transfer
pub const TX_GAS: u64 = 21000;

pub fn encode_any(input: impl prost::Message, type_url: impl Into<String>) -> Any {
    Any {
        type_url: type_url.into(),
        value: input.encode_to_vec(),
    }
}

pub fn decode_any<T: Message + Default>(any: Any) -> Result<T, DecodeError> {
    let bytes = any.value;

    decode_bytes(bytes)
}

pub fn decode_bytes<T: Message + Default>(bytes: Vec<u8>) -> Result<T, DecodeError> {
    let mut buf = BytesMut::with_capacity(bytes.len());
    buf.extend_from_slice(&bytes);

    T::decode(buf)
}

/// Gas limit of the Ethereum tx, values beyond 64 bits saturate
pub fn eth_tx_gas(tx: &Transaction) -> u64 {
    tx.get_gas_limit().to_u64().unwrap_or(u64::MAX)
}

/// Nonce of the Ethereum tx, values beyond 64 bits saturate
pub fn eth_tx_nonce(tx: &Transaction) -> u64 {
    tx.get_nonce().to_u64().unwrap_or(u64::MAX)
}

/// The maximum price per gas the sender agreed to pay, the fee cap for dynamic fee txs
pub fn eth_tx_gas_price(tx: &Transaction) -> Uint256 {
    match tx {
        Transaction::Legacy { gas_price, .. } | Transaction::Eip2930 { gas_price, .. } => {
            *gas_price
        }
        Transaction::Eip1559 {
            max_fee_per_gas, ..
        } => *max_fee_per_gas,
    }
}

/// Priority tip per gas, equal to the gas price for non dynamic fee txs
pub fn eth_tx_gas_tip_cap(tx: &Transaction) -> Uint256 {
    match tx {
        Transaction::Legacy { gas_price, .. } | Transaction::Eip2930 { gas_price, .. } => {
            *gas_price
        }
        Transaction::Eip1559 {
            max_priority_fee_per_gas,
            ..
        } => *max_priority_fee_per_gas,
    }
}

pub fn is_dynamic_fee_tx(tx: &Transaction) -> bool {
    matches!(tx, Transaction::Eip1559 { .. })
}

/// `gas price * gas`, the maximum the sender can be charged. `None` on overflow.
pub fn eth_tx_fee(tx: &Transaction) -> Option<Uint256> {
    eth_tx_gas_price(tx).checked_mul(&tx.get_gas_limit())
}

/// EIP-1559 effective gas price `min(tip + base fee, fee cap)`, the plain gas price for
/// legacy and access list txs
pub fn eth_tx_effective_gas_price(tx: &Transaction, base_fee: Uint256) -> Uint256 {
    match tx {
        Transaction::Eip1559 {
            max_priority_fee_per_gas,
            max_fee_per_gas,
            ..
        } => effective_gas_price(*max_priority_fee_per_gas, base_fee, *max_fee_per_gas),
        _ => eth_tx_gas_price(tx),
    }
}

/// `min(tip + base fee, fee cap)`, an overflowing sum is capped by the fee cap
pub fn effective_gas_price(tip_cap: Uint256, base_fee: Uint256, fee_cap: Uint256) -> Uint256 {
    match tip_cap.checked_add(&base_fee) {
        Some(sum) => min(sum, fee_cap),
        None => fee_cap,
    }
}

pub fn eth_tx_effective_fee(tx: &Transaction, base_fee: Uint256) -> Option<Uint256> {
    eth_tx_effective_gas_price(tx, base_fee).checked_mul(&tx.get_gas_limit())
}

/// Chain id the tx is bound to. Unprotected legacy txs are bound to none.
pub fn eth_tx_chain_id(tx: &Transaction) -> Option<Uint256> {
    match tx {
        Transaction::Legacy { signature, .. } => signature
            .as_ref()
            .and_then(Signature::legacy_network_id),
        Transaction::Eip2930 { chain_id, .. } | Transaction::Eip1559 { chain_id, .. } => {
            Some(*chain_id)
        }
    }
}

/// Replay protected txs commit to a chain id in their signature. Typed txs always do, legacy
/// txs only when `v` carries an EIP-155 chain id.
pub fn is_protected(tx: &Transaction) -> bool {
    match tx {
        Transaction::Legacy {
            signature: Some(Signature::LegacySignature { v, .. }),
            ..
        } => *v >= 37u8.into(),
        Transaction::Legacy { .. } => false,
        _ => true,
    }
}

/// Signs a legacy tx without EIP-155 replay protection, `v` ends up as 27 or 28
pub fn sign_unprotected(
    tx: &Transaction,
    key: &clarity::PrivateKey,
) -> Result<Transaction, clarity::Error> {
    let signed = tx.sign(key, None);
    let sig = signed.get_signature().ok_or(clarity::Error::NoSignature)?;
    let v = sig.get_signature_v()?;
    match signed {
        Transaction::Legacy {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            ..
        } => Ok(Transaction::Legacy {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            signature: Some(Signature::new_legacy(v.into(), sig.get_r(), sig.get_s())),
        }),
        other => Ok(other),
    }
}

pub fn eth_tx_hash_hex(tx: &Transaction) -> String {
    format!("0x{}", bytes_to_hex_str(&tx.hash()))
}

/// Recovers the signer for a node running `chain_id`. Protected txs bound to another chain are
/// rejected, unprotected legacy txs are recovered without a chain id.
pub fn recover_sender(tx: &Transaction, chain_id: u64) -> Result<EthAddress, String> {
    if is_protected(tx) {
        match eth_tx_chain_id(tx) {
            Some(tx_chain_id) if tx_chain_id == Uint256::from(chain_id) => {}
            Some(tx_chain_id) => {
                return Err(format!(
                    "invalid chain id for signer: have {} want {}",
                    tx_chain_id, chain_id
                ))
            }
            None => return Err("invalid chain id for signer".to_string()),
        }
    }
    match tx {
        Transaction::Legacy {
            signature: Some(signature @ Signature::LegacySignature { .. }),
            ..
        } if is_protected(tx) => {
            recover_eip155_sender(tx, signature, chain_id.into()).map_err(|e| e.to_string())
        }
        _ => tx.sender().map_err(|e| e.to_string()),
    }
}

/// clarity refuses legacy `v` values of 61480 and up, which every EIP-155 chain id past 30721
/// produces. The sighash is rebuilt here and `v` folded back to 27/28 before recovery.
fn recover_eip155_sender(
    tx: &Transaction,
    signature: &Signature,
    chain_id: Uint256,
) -> Result<EthAddress, clarity::Error> {
    let fields: Vec<RlpToken> = match tx {
        Transaction::Legacy {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            ..
        } => vec![
            nonce.into(),
            gas_price.into(),
            gas_limit.into(),
            to.into(),
            value.into(),
            RlpToken::String(data.clone()),
            chain_id.into(),
            0u8.into(),
            0u8.into(),
        ],
        _ => return Err(clarity::Error::InvalidV),
    };
    let sighash = get_hash(&pack_rlp(vec![RlpToken::List(fields)]));

    let recovery_v = signature.get_signature_v()?;
    let normalized = Signature::new(recovery_v == 28, signature.get_r(), signature.get_s());
    normalized.error_check()?;
    normalized.recover(&sighash)
}

/// Bech32 account address owning the given Ethereum address
pub fn eth_to_cosmos_address(address: EthAddress, prefix: &str) -> AnteResult<Address> {
    eth_address_to_cosmos_address(address, Some(prefix))
        .map_err(|e| AnteError::new(ErrorKind::InvalidAddress, e))
}

/// Ethereum address sharing the bytes of a bech32 account address
pub fn cosmos_to_eth_address(address: &Address) -> AnteResult<EthAddress> {
    cosmos_address_to_eth_address(*address)
        .map_err(|e| AnteError::new(ErrorKind::InvalidAddress, e))
}
