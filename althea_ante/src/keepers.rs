//! Interfaces of the chain modules the ante decorators read from and write to. Implementations
//! own their synchronization, every method takes `&self`.

use crate::error::AnteResult;
use crate::types::{
    AuthParams, BaseAccount, Context, EvmParams, FeeMarketParams, GasMeter, MsgEthereumTx, PubKey,
    SignatureData, SignatureV2, Tx, TxMsg,
};
use clarity::Address as EthAddress;
use deep_space::{Address, Coin};
use num256::Uint256;
use prost_types::Any;
use std::sync::Arc;

pub trait AccountKeeper: Send + Sync {
    fn get_params(&self) -> AuthParams;
    fn get_account(&self, address: &Address) -> Option<BaseAccount>;
    fn set_account(&self, account: BaseAccount);
    /// Bech32 prefix of account addresses on this chain
    fn address_prefix(&self) -> String;
    fn get_module_address(&self, module_name: &str) -> AnteResult<Address>;
}

pub trait BankKeeper: Send + Sync {
    fn send_coins_from_account_to_module(
        &self,
        sender: &Address,
        recipient_module: &str,
        amount: &[Coin],
    ) -> AnteResult<()>;
}

pub trait FeegrantKeeper: Send + Sync {
    /// Charges `fee` against the allowance `granter` gave to `grantee`
    fn use_granted_fees(
        &self,
        granter: &Address,
        grantee: &Address,
        fee: &[Coin],
        msgs: &[TxMsg],
    ) -> AnteResult<()>;
}

/// How the EVM should treat the ante side effects while dry running a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationOptions {
    /// undo the sequence increment made by the ante chain before executing
    pub rollback_ante_nonce: bool,
    /// the fee was already taken by the ante chain
    pub sender_paid_fee: bool,
}

pub trait EvmKeeper: Send + Sync {
    fn get_params(&self) -> EvmParams;
    /// EIP-155 chain id
    fn chain_id(&self) -> u64;
    fn get_base_fee(&self) -> Uint256;
    fn get_code_hash(&self, address: &EthAddress) -> Vec<u8>;

    fn set_flag_sender_nonce_increased_by_ante_handle(&self, increased: bool);
    fn is_sender_nonce_increased_by_ante_handle(&self) -> bool;
    fn set_flag_sender_paid_tx_fee_in_ante_handle(&self, paid: bool);
    fn is_sender_paid_tx_fee_in_ante_handle(&self) -> bool;

    /// Prepares the transient EVM state for `msg` and bumps the transient tx counter
    fn setup_execution_context(&self, ctx: Context, msg: &MsgEthereumTx) -> Context;
    fn get_tx_count_transient(&self) -> u64;

    /// Executes `msg` against a branch of the current state that is discarded afterwards
    fn simulate_message(
        &self,
        ctx: &Context,
        msg: &MsgEthereumTx,
        options: SimulationOptions,
    ) -> Result<(), String>;
}

pub trait FeeMarketKeeper: Send + Sync {
    fn get_params(&self) -> FeeMarketParams;
}

pub trait IbcKeeper: Send + Sync {
    /// Whether a receive, acknowledgement or timeout packet message was already processed
    fn is_packet_redundant(&self, msg: &Any) -> AnteResult<bool>;
    /// Rejects client updates that would fail on execution
    fn check_client_update(&self, msg: &Any) -> AnteResult<()>;
}

/// Proofs of externally owned accounts
pub trait VAuthKeeper: Send + Sync {
    fn has_proof_external_owned_account(&self, address: &Address) -> bool;
}

/// Everything a signature commits to besides the tx itself
#[derive(Debug, Clone, PartialEq)]
pub struct SignerData {
    pub address: Address,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub pub_key: PubKey,
}

pub trait SignModeHandler: Send + Sync {
    fn verify_signature(
        &self,
        signer: &SignerData,
        data: &SignatureData,
        tx: &Tx,
    ) -> Result<(), String>;
}

/// Decides whether a critical extension option is understood by this node
pub type ExtensionOptionChecker = Arc<dyn Fn(&Any) -> bool + Send + Sync>;

/// Charges the gas of verifying one signature
pub type SignatureVerificationGasConsumer =
    Arc<dyn Fn(&mut GasMeter, &SignatureV2, &AuthParams) -> AnteResult<()> + Send + Sync>;

/// Returns the fee to deduct and the mempool priority of a transaction
pub type TxFeeChecker = Arc<dyn Fn(&Context, &Tx) -> AnteResult<(Vec<Coin>, i64)> + Send + Sync>;
