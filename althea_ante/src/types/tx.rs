use super::crypto::{PubKey, SignatureData, SignatureV2, SignerInfo};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::proto::ethermint::types::v1::ExtensionOptionDynamicFeeTx;
use crate::type_urls::{EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL, MSG_ETHEREUM_TX_TYPE_URL};
use crate::utils::{
    decode_any, eth_tx_fee, eth_tx_gas, eth_tx_gas_price, eth_tx_gas_tip_cap, eth_tx_hash_hex,
    is_dynamic_fee_tx, TX_GAS,
};
use clarity::Transaction;
use deep_space::{Address, Coin};
use num256::Uint256;
use num_traits::Zero;
use prost_types::Any;

/// Largest gas limit a transaction may declare
pub const MAX_GAS_WANTED: u64 = i64::MAX as u64;

/// An Ethereum transaction carried inside a Cosmos transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgEthereumTx {
    /// bech32 address of the sender, must match the signer of `tx`
    pub from: String,
    pub tx: Transaction,
}

impl MsgEthereumTx {
    pub fn new(tx: Transaction, from: &Address) -> MsgEthereumTx {
        MsgEthereumTx {
            from: from.to_string(),
            tx,
        }
    }

    pub fn from_address(&self) -> Option<Address> {
        if self.from.is_empty() {
            return None;
        }
        Address::from_bech32(self.from.clone()).ok()
    }

    pub fn hash_hex(&self) -> String {
        eth_tx_hash_hex(&self.tx)
    }

    /// Stateless checks of the sender and the embedded transaction
    pub fn validate_basic(&self) -> AnteResult<()> {
        if let Err(e) = Address::from_bech32(self.from.clone()) {
            return Err(AnteError::new(ErrorKind::InvalidAddress, e).wrap("invalid from address"));
        }
        validate_eth_tx_basic(&self.tx)
    }
}

fn fits_int256(value: &Uint256) -> bool {
    value.to_int256().is_some()
}

/// Gas, price, value and fee bounds of an Ethereum transaction
pub fn validate_eth_tx_basic(tx: &Transaction) -> AnteResult<()> {
    let gas = eth_tx_gas(tx);
    if gas < TX_GAS - 1 {
        return Err(AnteError::new(
            ErrorKind::InvalidGasLimit,
            format!("gas limit must be minimum: {}", TX_GAS),
        ));
    }
    if gas > MAX_GAS_WANTED {
        return Err(AnteError::new(
            ErrorKind::GasOverflow,
            "gas limit must be less than math.MaxInt64",
        ));
    }

    if is_dynamic_fee_tx(tx) {
        let tip_cap = eth_tx_gas_tip_cap(tx);
        let fee_cap = eth_tx_gas_price(tx);
        if !fits_int256(&tip_cap) || !fits_int256(&fee_cap) {
            return Err(AnteError::new(ErrorKind::InvalidGasCap, "out of bound"));
        }
        if fee_cap < tip_cap {
            return Err(AnteError::new(
                ErrorKind::InvalidGasCap,
                format!(
                    "max priority fee per gas higher than max fee per gas ({} > {})",
                    tip_cap, fee_cap
                ),
            ));
        }
    } else if !fits_int256(&eth_tx_gas_price(tx)) {
        return Err(AnteError::new(ErrorKind::InvalidGasPrice, "out of bound"));
    }

    if !fits_int256(&tx.get_value()) {
        return Err(AnteError::new(ErrorKind::InvalidAmount, "out of bound"));
    }

    match eth_tx_fee(tx) {
        Some(fee) if fits_int256(&fee) => Ok(()),
        _ => Err(AnteError::new(ErrorKind::InvalidGasFee, "out of bound")),
    }
}

/// A Cosmos message along with the signers the codec resolved for it
#[derive(Debug, Clone, PartialEq)]
pub struct CosmosMsg {
    pub msg: Any,
    pub signers: Vec<Address>,
}

impl CosmosMsg {
    pub fn new(msg: Any, signers: Vec<Address>) -> CosmosMsg {
        CosmosMsg { msg, signers }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TxMsg {
    Ethereum(MsgEthereumTx),
    Cosmos(CosmosMsg),
}

impl TxMsg {
    pub fn type_url(&self) -> &str {
        match self {
            TxMsg::Ethereum(_) => MSG_ETHEREUM_TX_TYPE_URL,
            TxMsg::Cosmos(m) => &m.msg.type_url,
        }
    }

    pub fn as_ethereum(&self) -> Option<&MsgEthereumTx> {
        match self {
            TxMsg::Ethereum(m) => Some(m),
            TxMsg::Cosmos(_) => None,
        }
    }

    pub fn is_ethereum(&self) -> bool {
        self.as_ethereum().is_some()
    }

    pub fn signers(&self) -> Vec<Address> {
        match self {
            TxMsg::Ethereum(m) => m.from_address().into_iter().collect(),
            TxMsg::Cosmos(m) => m.signers.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxBody {
    pub messages: Vec<TxMsg>,
    pub memo: String,
    pub timeout_height: u64,
    pub extension_options: Vec<Any>,
    pub non_critical_extension_options: Vec<Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
    /// bech32 fee payer, empty when the first signer pays
    pub payer: String,
    /// bech32 fee granter, empty when no allowance is used
    pub granter: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Option<Fee>,
}

/// A decoded transaction as handed over by the codec
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<Vec<u8>>,
}

impl Tx {
    pub fn messages(&self) -> &[TxMsg] {
        &self.body.messages
    }

    pub fn memo(&self) -> &str {
        &self.body.memo
    }

    pub fn timeout_height(&self) -> u64 {
        self.body.timeout_height
    }

    pub fn extension_options(&self) -> &[Any] {
        &self.body.extension_options
    }

    pub fn non_critical_extension_options(&self) -> &[Any] {
        &self.body.non_critical_extension_options
    }

    /// A tx without fee information cannot meter gas
    pub fn has_gas(&self) -> bool {
        self.auth_info.fee.is_some()
    }

    pub fn gas(&self) -> u64 {
        self.auth_info.fee.as_ref().map(|f| f.gas_limit).unwrap_or(0)
    }

    pub fn fee(&self) -> &[Coin] {
        match &self.auth_info.fee {
            Some(fee) => &fee.amount,
            None => &[],
        }
    }

    /// The account paying through a fee allowance, if the tx names one
    pub fn fee_granter(&self) -> AnteResult<Option<Address>> {
        match &self.auth_info.fee {
            Some(fee) if !fee.granter.is_empty() => Address::from_bech32(fee.granter.clone())
                .map(Some)
                .map_err(|e| {
                    AnteError::new(
                        ErrorKind::InvalidAddress,
                        format!("Invalid fee granter address ({}): {}", fee.granter, e),
                    )
                }),
            _ => Ok(None),
        }
    }

    /// Unique signers in order of first appearance
    pub fn signers(&self) -> Vec<Address> {
        let mut signers: Vec<Address> = Vec::new();
        for signer in self.body.messages.iter().flat_map(|m| m.signers()) {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        signers
    }

    /// The explicit fee payer, or the first signer
    pub fn fee_payer(&self) -> AnteResult<Address> {
        if let Some(fee) = &self.auth_info.fee {
            if !fee.payer.is_empty() {
                return Address::from_bech32(fee.payer.clone()).map_err(|e| {
                    AnteError::new(
                        ErrorKind::InvalidAddress,
                        format!("Invalid fee payer address ({}): {}", fee.payer, e),
                    )
                });
            }
        }
        self.signers()
            .into_iter()
            .next()
            .ok_or_else(|| AnteError::new(ErrorKind::InvalidRequest, "tx has no signers"))
    }

    /// Signatures paired with the registered keys, signers without a key in the tx are left out
    pub fn signatures_v2(&self) -> Vec<Option<SignatureV2>> {
        self.auth_info
            .signer_infos
            .iter()
            .map(|info| {
                info.pub_key.clone().map(|pub_key| SignatureV2 {
                    pub_key,
                    data: info.data.clone(),
                    sequence: info.sequence,
                })
            })
            .collect()
    }

    pub fn pub_keys(&self) -> Vec<Option<PubKey>> {
        self.auth_info
            .signer_infos
            .iter()
            .map(|info| info.pub_key.clone())
            .collect()
    }

    /// The priority tip of the dynamic fee extension option when one is attached. An option
    /// that does not decode fails the tx.
    pub fn dynamic_fee_extension(&self) -> AnteResult<Option<ExtensionOptionDynamicFeeTx>> {
        match self
            .body
            .extension_options
            .iter()
            .find(|opt| opt.type_url == EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL)
        {
            Some(opt) => decode_any::<ExtensionOptionDynamicFeeTx>(opt.clone())
                .map(Some)
                .map_err(|e| {
                    AnteError::new(
                        ErrorKind::TxDecode,
                        format!("invalid dynamic fee extension option: {}", e),
                    )
                }),
            None => Ok(None),
        }
    }

    /// Approximate size of the transaction in bytes, summed from its fields. The node charges
    /// tx size gas on the length of the raw bytes it received, which callers holding them pass
    /// through `Context::with_tx_size` instead.
    pub fn size(&self) -> u64 {
        let messages: usize = self
            .body
            .messages
            .iter()
            .map(|m| match m {
                TxMsg::Ethereum(m) => m.tx.to_bytes().len() + m.from.len(),
                TxMsg::Cosmos(m) => m.msg.type_url.len() + m.msg.value.len(),
            })
            .sum();
        let options: usize = self
            .body
            .extension_options
            .iter()
            .chain(self.body.non_critical_extension_options.iter())
            .map(|o| o.type_url.len() + o.value.len())
            .sum();
        let signatures: usize = self.signatures.iter().map(Vec::len).sum();
        let signer_infos: usize = self
            .auth_info
            .signer_infos
            .iter()
            .map(|i| i.pub_key.as_ref().map(|k| k.bytes().len()).unwrap_or(0) + 8)
            .sum();
        let fee: usize = self
            .fee()
            .iter()
            .map(|c| c.denom.len() + c.amount.to_string().len())
            .sum();
        (messages + options + signatures + signer_infos + fee + self.body.memo.len() + 16) as u64
    }

    /// Stateless checks every transaction must pass regardless of its lane
    pub fn validate_basic(&self) -> AnteResult<()> {
        let fee = self
            .auth_info
            .fee
            .as_ref()
            .ok_or_else(|| AnteError::new(ErrorKind::InvalidRequest, "missing fee"))?;
        if fee.gas_limit > MAX_GAS_WANTED {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                format!(
                    "invalid gas supplied; {} > {}",
                    fee.gas_limit, MAX_GAS_WANTED
                ),
            ));
        }
        if fee.amount.iter().any(|c| c.denom.is_empty()) {
            return Err(AnteError::new(
                ErrorKind::InsufficientFee,
                "invalid fee provided: missing denom",
            ));
        }
        if !fee.payer.is_empty() {
            self.fee_payer()?;
        }
        self.fee_granter()?;

        if self.signatures.is_empty() {
            return Err(ErrorKind::NoSignatures.into());
        }
        let signers = self.signers();
        if self.signatures.len() != signers.len() {
            return Err(AnteError::new(
                ErrorKind::Unauthorized,
                format!(
                    "wrong number of signers; expected {}, got {}",
                    signers.len(),
                    self.signatures.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Builds the single signature entry a key produces
pub fn single_signature(pub_key: PubKey, signature: Vec<u8>, sequence: u64) -> SignerInfo {
    SignerInfo {
        pub_key: Some(pub_key),
        data: SignatureData::Single(signature),
        sequence,
    }
}

/// Sum of the fee coins of `denom`
pub fn amount_of(coins: &[Coin], denom: &str) -> Uint256 {
    coins
        .iter()
        .filter(|c| c.denom == denom)
        .fold(Uint256::zero(), |acc, c| acc + c.amount)
}
