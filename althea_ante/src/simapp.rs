//! In memory keepers and transaction helpers for driving the ante handler without a node.
//! Every keeper keeps its state behind a lock so one `SimApp` can be shared by concurrent
//! callers, the same way the real stores are shared between CheckTx and DeliverTx.

use crate::ante::AnteHandler;
use crate::duallane::{
    dual_lane_fee_checker, only_allow_dynamic_fee_extension_option_for_cosmos_txs,
    sig_verification_gas_consumer,
};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::handler_options::{default_disabled_nested_msgs, HandlerOptions};
use crate::keepers::{
    AccountKeeper, BankKeeper, EvmKeeper, FeeMarketKeeper, FeegrantKeeper, IbcKeeper,
    SignModeHandler, SignerData, SimulationOptions, VAuthKeeper,
};
use crate::type_urls::EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL;
use crate::types::account::FEE_COLLECTOR_NAME;
use crate::types::coin::{coins_to_string, new_coins};
use crate::types::crypto::{bit_array_count, bit_array_get_index};
use crate::types::{
    AnteParams, AuthParams, BaseAccount, Context, EvmParams, ExecMode, Fee, FeeMarketParams,
    MsgEthereumTx, PubKey, SignatureData, SignerInfo, Tx, TxBody, TxMsg,
};
use crate::types::{AuthInfo, CosmosMsg};
use crate::utils::{
    eth_to_cosmos_address, eth_tx_effective_fee, eth_tx_fee, eth_tx_gas, eth_tx_nonce,
};
use clarity::{Address as EthAddress, PrivateKey as EthPrivateKey, Signature, Transaction};
use deep_space::utils::hex_str_to_bytes;
use deep_space::{Address, Coin};
use num256::Uint256;
use num_traits::{CheckedAdd, Zero};
use prost_types::Any;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const SIM_ADDRESS_PREFIX: &str = "althea";
pub const SIM_EVM_CHAIN_ID: u64 = 417834;
pub const SIM_CHAIN_ID: &str = "althea_417834-1";

/// Module accounts that exist from genesis
const MODULE_ACCOUNTS: [&str; 2] = [FEE_COLLECTOR_NAME, "distribution"];

// a panicking writer leaves plain maps behind, there is no invariant to protect
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn module_address(name: &str) -> AnteResult<Address> {
    let hash = hex_str_to_bytes(&sha256::digest(name))
        .map_err(|e| AnteError::new(ErrorKind::Logic, e))?;
    Address::from_slice(&hash[..20], SIM_ADDRESS_PREFIX)
        .map_err(|e| AnteError::new(ErrorKind::InvalidAddress, e))
}

pub struct SimAccountKeeper {
    params: RwLock<AuthParams>,
    accounts: RwLock<HashMap<Address, BaseAccount>>,
    modules: HashMap<String, Address>,
    next_account_number: AtomicU64,
}

impl SimAccountKeeper {
    fn new(params: AuthParams) -> AnteResult<SimAccountKeeper> {
        let mut modules = HashMap::new();
        for name in MODULE_ACCOUNTS.iter() {
            modules.insert(name.to_string(), module_address(name)?);
        }
        Ok(SimAccountKeeper {
            params: RwLock::new(params),
            accounts: RwLock::new(HashMap::new()),
            modules,
            next_account_number: AtomicU64::new(0),
        })
    }

    pub fn set_params(&self, params: AuthParams) {
        *write(&self.params) = params;
    }

    /// Registers `address` with the next free account number, existing accounts are kept
    pub fn create_account(&self, address: Address) -> BaseAccount {
        let mut accounts = write(&self.accounts);
        accounts
            .entry(address)
            .or_insert_with(|| {
                let number = self.next_account_number.fetch_add(1, Ordering::SeqCst);
                BaseAccount::new(address, number)
            })
            .clone()
    }
}

impl AccountKeeper for SimAccountKeeper {
    fn get_params(&self) -> AuthParams {
        read(&self.params).clone()
    }

    fn get_account(&self, address: &Address) -> Option<BaseAccount> {
        read(&self.accounts).get(address).cloned()
    }

    fn set_account(&self, account: BaseAccount) {
        write(&self.accounts).insert(account.address, account);
    }

    fn address_prefix(&self) -> String {
        SIM_ADDRESS_PREFIX.to_string()
    }

    fn get_module_address(&self, module_name: &str) -> AnteResult<Address> {
        self.modules.get(module_name).copied().ok_or_else(|| {
            AnteError::new(
                ErrorKind::UnknownAddress,
                format!("module account {} does not exist", module_name),
            )
        })
    }
}

pub struct SimBankKeeper {
    account_keeper: Arc<SimAccountKeeper>,
    balances: RwLock<HashMap<(Address, String), Uint256>>,
}

impl SimBankKeeper {
    pub fn balance(&self, address: &Address, denom: &str) -> Uint256 {
        read(&self.balances)
            .get(&(*address, denom.to_string()))
            .copied()
            .unwrap_or_else(Uint256::zero)
    }

    pub fn set_balance(&self, address: &Address, coin: Coin) {
        write(&self.balances).insert((*address, coin.denom), coin.amount);
    }

    /// Mints `coin` into the account of `address`
    pub fn fund(&self, address: &Address, coin: Coin) {
        let balance = self.balance(address, &coin.denom);
        self.set_balance(address, Coin::new(balance + coin.amount, coin.denom));
    }
}

impl BankKeeper for SimBankKeeper {
    fn send_coins_from_account_to_module(
        &self,
        sender: &Address,
        recipient_module: &str,
        amount: &[Coin],
    ) -> AnteResult<()> {
        let recipient = self.account_keeper.get_module_address(recipient_module)?;
        let mut balances = write(&self.balances);

        for coin in amount {
            let key = (*sender, coin.denom.clone());
            let spendable = balances.get(&key).copied().unwrap_or_else(Uint256::zero);
            if spendable < coin.amount {
                return Err(AnteError::new(
                    ErrorKind::InsufficientFunds,
                    format!(
                        "spendable balance {}{} is smaller than {}",
                        spendable,
                        coin.denom,
                        coin
                    ),
                ));
            }
        }
        for coin in amount {
            let from = (*sender, coin.denom.clone());
            let spendable = balances.get(&from).copied().unwrap_or_else(Uint256::zero);
            balances.insert(from, spendable - coin.amount);
            let to = (recipient, coin.denom.clone());
            let received = balances.get(&to).copied().unwrap_or_else(Uint256::zero);
            balances.insert(to, received + coin.amount);
        }
        trace!(
            "moved {} from {} to module {}",
            coins_to_string(amount),
            sender,
            recipient_module
        );
        Ok(())
    }
}

/// Allowances without limits, a grant either exists or it does not
#[derive(Default)]
pub struct SimFeegrantKeeper {
    allowances: RwLock<HashSet<(Address, Address)>>,
}

impl SimFeegrantKeeper {
    pub fn grant_allowance(&self, granter: &Address, grantee: &Address) {
        write(&self.allowances).insert((*granter, *grantee));
    }

    pub fn revoke_allowance(&self, granter: &Address, grantee: &Address) {
        write(&self.allowances).remove(&(*granter, *grantee));
    }
}

impl FeegrantKeeper for SimFeegrantKeeper {
    fn use_granted_fees(
        &self,
        granter: &Address,
        grantee: &Address,
        _fee: &[Coin],
        _msgs: &[TxMsg],
    ) -> AnteResult<()> {
        if read(&self.allowances).contains(&(*granter, *grantee)) {
            Ok(())
        } else {
            Err(AnteError::new(ErrorKind::Unauthorized, "fee-grant not found"))
        }
    }
}

pub struct SimFeeMarketKeeper {
    params: RwLock<FeeMarketParams>,
}

impl SimFeeMarketKeeper {
    pub fn set_params(&self, params: FeeMarketParams) {
        *write(&self.params) = params;
    }
}

impl FeeMarketKeeper for SimFeeMarketKeeper {
    fn get_params(&self) -> FeeMarketParams {
        read(&self.params).clone()
    }
}

/// Tracks nonces and balances well enough to dry run plain value transfers
pub struct SimEvmKeeper {
    params: RwLock<EvmParams>,
    chain_id: u64,
    account_keeper: Arc<SimAccountKeeper>,
    bank_keeper: Arc<SimBankKeeper>,
    fee_market_keeper: Arc<SimFeeMarketKeeper>,
    code_hashes: RwLock<HashMap<EthAddress, Vec<u8>>>,
    sender_nonce_increased: AtomicBool,
    sender_paid_fee: AtomicBool,
    tx_count: AtomicU64,
}

impl SimEvmKeeper {
    pub fn set_params(&self, params: EvmParams) {
        *write(&self.params) = params;
    }

    /// Deploys "code" at `address`, the hash is all that is kept
    pub fn set_code_hash(&self, address: EthAddress, code_hash: Vec<u8>) {
        write(&self.code_hashes).insert(address, code_hash);
    }

    /// Starts a new block
    pub fn reset_transient(&self) {
        self.tx_count.store(0, Ordering::SeqCst);
        self.sender_nonce_increased.store(false, Ordering::SeqCst);
        self.sender_paid_fee.store(false, Ordering::SeqCst);
    }
}

impl EvmKeeper for SimEvmKeeper {
    fn get_params(&self) -> EvmParams {
        read(&self.params).clone()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn get_base_fee(&self) -> Uint256 {
        self.fee_market_keeper.get_params().base_fee
    }

    fn get_code_hash(&self, address: &EthAddress) -> Vec<u8> {
        read(&self.code_hashes)
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    fn set_flag_sender_nonce_increased_by_ante_handle(&self, increased: bool) {
        self.sender_nonce_increased.store(increased, Ordering::SeqCst);
    }

    fn is_sender_nonce_increased_by_ante_handle(&self) -> bool {
        self.sender_nonce_increased.load(Ordering::SeqCst)
    }

    fn set_flag_sender_paid_tx_fee_in_ante_handle(&self, paid: bool) {
        self.sender_paid_fee.store(paid, Ordering::SeqCst);
    }

    fn is_sender_paid_tx_fee_in_ante_handle(&self) -> bool {
        self.sender_paid_fee.load(Ordering::SeqCst)
    }

    fn setup_execution_context(&self, ctx: Context, msg: &MsgEthereumTx) -> Context {
        let index = self.tx_count.fetch_add(1, Ordering::SeqCst);
        trace!("tx {} is number {} in this block", msg.hash_hex(), index);
        ctx
    }

    fn get_tx_count_transient(&self) -> u64 {
        self.tx_count.load(Ordering::SeqCst)
    }

    fn simulate_message(
        &self,
        _ctx: &Context,
        msg: &MsgEthereumTx,
        options: SimulationOptions,
    ) -> Result<(), String> {
        let from = msg
            .from_address()
            .ok_or_else(|| format!("invalid sender {}", msg.from))?;
        let sequence = self
            .account_keeper
            .get_account(&from)
            .map(|a| a.sequence)
            .unwrap_or(0);
        let expected_nonce = if options.rollback_ante_nonce {
            sequence.saturating_sub(1)
        } else {
            sequence
        };
        let nonce = eth_tx_nonce(&msg.tx);
        if nonce != expected_nonce {
            return Err(format!(
                "invalid nonce; got {}, expected {}",
                nonce, expected_nonce
            ));
        }

        let mut cost = msg.tx.get_value();
        if !options.sender_paid_fee {
            let fee = eth_tx_effective_fee(&msg.tx, self.get_base_fee())
                .ok_or_else(|| "gas fee overflows".to_string())?;
            cost = cost
                .checked_add(&fee)
                .ok_or_else(|| "tx cost overflows".to_string())?;
        }
        let balance = self.bank_keeper.balance(&from, &self.get_params().evm_denom);
        if balance < cost {
            return Err(format!(
                "insufficient funds for gas * price + value: address {} have {} want {}",
                from, balance, cost
            ));
        }
        Ok(())
    }
}

/// Remembers which packets were already relayed
#[derive(Default)]
pub struct SimIbcKeeper {
    processed: RwLock<HashSet<Vec<u8>>>,
}

impl SimIbcKeeper {
    pub fn mark_processed(&self, msg: &Any) {
        write(&self.processed).insert(msg.value.clone());
    }
}

impl IbcKeeper for SimIbcKeeper {
    fn is_packet_redundant(&self, msg: &Any) -> AnteResult<bool> {
        Ok(read(&self.processed).contains(&msg.value))
    }

    fn check_client_update(&self, _msg: &Any) -> AnteResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct SimVAuthKeeper {
    proofs: RwLock<HashSet<Address>>,
}

impl SimVAuthKeeper {
    pub fn add_proof(&self, address: Address) {
        write(&self.proofs).insert(address);
    }
}

impl VAuthKeeper for SimVAuthKeeper {
    fn has_proof_external_owned_account(&self, address: &Address) -> bool {
        read(&self.proofs).contains(address)
    }
}

/// The bytes a Cosmos signer commits to
pub fn sign_bytes(chain_id: &str, account_number: u64, sequence: u64, tx: &Tx) -> Vec<u8> {
    let document = format!(
        "{}|{}|{}|{:?}|{:?}",
        chain_id, account_number, sequence, tx.body, tx.auth_info.fee
    );
    // sha256 hex output always decodes
    hex_str_to_bytes(&sha256::digest(document)).unwrap_or_default()
}

/// Verifies signatures made with eth_secp256k1 keys by recovering the signer
pub struct SimSignModeHandler {
    prefix: String,
}

impl SimSignModeHandler {
    fn verify(&self, digest: &[u8], pub_key: &PubKey, data: &SignatureData) -> Result<(), String> {
        match (pub_key, data) {
            (PubKey::EthSecp256k1(_), SignatureData::Single(sig)) => {
                let signature = Signature::from_bytes(sig).map_err(|e| e.to_string())?;
                let recovered = signature.recover(digest).map_err(|e| e.to_string())?;
                let expected = pub_key.address(&self.prefix).map_err(|e| e.to_string())?;
                if recovered.as_bytes() != expected.get_bytes() {
                    return Err(format!("signature does not belong to {}", expected));
                }
                Ok(())
            }
            (
                PubKey::Multisig { public_keys, .. },
                SignatureData::Multi {
                    bit_array,
                    signatures,
                },
            ) => {
                let mut signatures = signatures.iter();
                for (i, key) in public_keys.iter().enumerate().take(bit_array_count(bit_array)) {
                    if !bit_array_get_index(bit_array, i) {
                        continue;
                    }
                    let sig = signatures
                        .next()
                        .ok_or_else(|| "not enough signatures".to_string())?;
                    self.verify(digest, key, sig)?;
                }
                Ok(())
            }
            (key, _) => Err(format!("unsupported key type {}", key.type_url())),
        }
    }
}

impl SignModeHandler for SimSignModeHandler {
    fn verify_signature(
        &self,
        signer: &SignerData,
        data: &SignatureData,
        tx: &Tx,
    ) -> Result<(), String> {
        let digest = sign_bytes(&signer.chain_id, signer.account_number, signer.sequence, tx);
        self.verify(&digest, &signer.pub_key, data)
    }
}

/// A key pair along with every form of address derived from it
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub eth_key: EthPrivateKey,
    pub eth_address: EthAddress,
    pub address: Address,
    pub pub_key: PubKey,
}

impl TestAccount {
    /// Generates a fresh eth_secp256k1 key
    pub fn random() -> TestAccount {
        let mut rng = rand::thread_rng();
        loop {
            let secret: [u8; 32] = rng.gen();
            if let Some(account) = TestAccount::from_secret(secret) {
                return account;
            }
        }
    }

    /// `None` when `secret` is not a valid secp256k1 scalar
    pub fn from_secret(secret: [u8; 32]) -> Option<TestAccount> {
        let eth_key = EthPrivateKey::from_bytes(secret).ok()?;
        let secret_key = secp256k1::SecretKey::from_byte_array(secret).ok()?;
        let secp = secp256k1::Secp256k1::signing_only();
        let compressed = secp256k1::PublicKey::from_secret_key(&secp, &secret_key).serialize();
        let eth_address = eth_key.to_address();
        let address = eth_to_cosmos_address(eth_address, SIM_ADDRESS_PREFIX).ok()?;
        Some(TestAccount {
            eth_key,
            eth_address,
            address,
            pub_key: PubKey::EthSecp256k1(compressed.to_vec()),
        })
    }
}

/// A chain in a box, keepers wired to each other the way the app module wires them
pub struct SimApp {
    pub account_keeper: Arc<SimAccountKeeper>,
    pub bank_keeper: Arc<SimBankKeeper>,
    pub feegrant_keeper: Arc<SimFeegrantKeeper>,
    pub evm_keeper: Arc<SimEvmKeeper>,
    pub fee_market_keeper: Arc<SimFeeMarketKeeper>,
    pub ibc_keeper: Arc<SimIbcKeeper>,
    pub vauth_keeper: Arc<SimVAuthKeeper>,
    pub sign_mode_handler: Arc<SimSignModeHandler>,
}

impl Default for SimApp {
    fn default() -> Self {
        // the default module names always hash to valid addresses
        SimApp::new(AnteParams::default()).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl SimApp {
    pub fn new(params: AnteParams) -> AnteResult<SimApp> {
        let account_keeper = Arc::new(SimAccountKeeper::new(params.auth)?);
        let bank_keeper = Arc::new(SimBankKeeper {
            account_keeper: account_keeper.clone(),
            balances: RwLock::new(HashMap::new()),
        });
        let fee_market_keeper = Arc::new(SimFeeMarketKeeper {
            params: RwLock::new(params.fee_market),
        });
        let evm_keeper = Arc::new(SimEvmKeeper {
            params: RwLock::new(params.evm),
            chain_id: SIM_EVM_CHAIN_ID,
            account_keeper: account_keeper.clone(),
            bank_keeper: bank_keeper.clone(),
            fee_market_keeper: fee_market_keeper.clone(),
            code_hashes: RwLock::new(HashMap::new()),
            sender_nonce_increased: AtomicBool::new(false),
            sender_paid_fee: AtomicBool::new(false),
            tx_count: AtomicU64::new(0),
        });
        Ok(SimApp {
            account_keeper,
            bank_keeper,
            feegrant_keeper: Arc::new(SimFeegrantKeeper::default()),
            evm_keeper,
            fee_market_keeper,
            ibc_keeper: Arc::new(SimIbcKeeper::default()),
            vauth_keeper: Arc::new(SimVAuthKeeper::default()),
            sign_mode_handler: Arc::new(SimSignModeHandler {
                prefix: SIM_ADDRESS_PREFIX.to_string(),
            }),
        })
    }

    pub fn context(&self, block_height: i64, exec_mode: ExecMode) -> Context {
        Context::new(SIM_CHAIN_ID, block_height, exec_mode)
    }

    pub fn evm_denom(&self) -> String {
        self.evm_keeper.get_params().evm_denom
    }

    pub fn base_fee(&self) -> Uint256 {
        self.fee_market_keeper.get_params().base_fee
    }

    /// Every collaborator the full ante handler needs, wired to this app
    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            account_keeper: Some(self.account_keeper.clone()),
            bank_keeper: Some(self.bank_keeper.clone()),
            feegrant_keeper: Some(self.feegrant_keeper.clone()),
            ibc_keeper: Some(self.ibc_keeper.clone()),
            fee_market_keeper: Some(self.fee_market_keeper.clone()),
            evm_keeper: Some(self.evm_keeper.clone()),
            vauth_keeper: Some(self.vauth_keeper.clone()),
            extension_option_checker: Some(Arc::new(
                only_allow_dynamic_fee_extension_option_for_cosmos_txs,
            )),
            sign_mode_handler: Some(self.sign_mode_handler.clone()),
            sig_gas_consumer: Some(Arc::new(sig_verification_gas_consumer)),
            tx_fee_checker: Some(dual_lane_fee_checker(
                self.evm_keeper.clone(),
                self.fee_market_keeper.clone(),
            )),
            disabled_nested_msgs: default_disabled_nested_msgs(),
        }
    }

    pub fn ante_handler(&self) -> AnteResult<AnteHandler> {
        AnteHandler::new(self.handler_options())
    }

    /// A registered account holding `balance` of the EVM denom. The public key is not stored,
    /// like an account that only ever received funds.
    pub fn new_account(&self, balance: Uint256) -> TestAccount {
        let account = TestAccount::random();
        self.account_keeper.create_account(account.address);
        self.fund(&account.address, balance);
        account
    }

    /// A key the chain has never seen
    pub fn unregistered_account(&self) -> TestAccount {
        TestAccount::random()
    }

    pub fn fund(&self, address: &Address, amount: Uint256) {
        self.bank_keeper
            .fund(address, Coin::new(amount, self.evm_denom()));
    }

    pub fn balance(&self, address: &Address) -> Uint256 {
        self.bank_keeper.balance(address, &self.evm_denom())
    }

    pub fn set_pub_key(&self, account: &TestAccount) {
        let mut stored = self.account_keeper.create_account(account.address);
        stored.pub_key = Some(account.pub_key.clone());
        self.account_keeper.set_account(stored);
    }

    pub fn set_sequence(&self, account: &TestAccount, sequence: u64) {
        let mut stored = self.account_keeper.create_account(account.address);
        stored.sequence = sequence;
        self.account_keeper.set_account(stored);
    }

    pub fn sequence(&self, account: &TestAccount) -> u64 {
        self.account_keeper
            .get_account(&account.address)
            .map(|a| a.sequence)
            .unwrap_or(0)
    }

    pub fn legacy_tx(
        &self,
        nonce: u64,
        gas_price: Uint256,
        gas: u64,
        to: EthAddress,
        value: Uint256,
    ) -> Transaction {
        Transaction::Legacy {
            nonce: nonce.into(),
            gas_price,
            gas_limit: gas.into(),
            to,
            value,
            data: Vec::new(),
            signature: None,
        }
    }

    pub fn dynamic_fee_tx(
        &self,
        nonce: u64,
        fee_cap: Uint256,
        tip: Uint256,
        gas: u64,
        to: EthAddress,
        value: Uint256,
    ) -> Transaction {
        Transaction::Eip1559 {
            chain_id: self.evm_keeper.chain_id().into(),
            nonce: nonce.into(),
            max_priority_fee_per_gas: tip,
            max_fee_per_gas: fee_cap,
            gas_limit: gas.into(),
            to,
            value,
            data: Vec::new(),
            signature: None,
            access_list: Vec::new(),
        }
    }

    /// Signs `unsigned` for this chain and wraps it the way an Ethereum JSON-RPC node does
    pub fn ethereum_tx(&self, sender: &TestAccount, unsigned: Transaction) -> Tx {
        let signed = unsigned.sign(&sender.eth_key, Some(self.evm_keeper.chain_id()));
        self.wrap_signed_ethereum_tx(sender, signed)
    }

    /// Wraps an already signed transaction, declaring `sender` as its sender
    pub fn wrap_signed_ethereum_tx(&self, sender: &TestAccount, signed: Transaction) -> Tx {
        let fee = eth_tx_fee(&signed).unwrap_or_else(Uint256::zero);
        let gas = eth_tx_gas(&signed);
        Tx {
            body: TxBody {
                messages: vec![TxMsg::Ethereum(MsgEthereumTx::new(signed, &sender.address))],
                extension_options: vec![Any {
                    type_url: EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL.to_string(),
                    value: Vec::new(),
                }],
                ..Default::default()
            },
            auth_info: AuthInfo {
                signer_infos: Vec::new(),
                fee: Some(Fee {
                    amount: new_coins(vec![Coin::new(fee, self.evm_denom())]),
                    gas_limit: gas,
                    payer: String::new(),
                    granter: String::new(),
                }),
            },
            signatures: Vec::new(),
        }
    }
}

/// Assembles Cosmos txs
#[derive(Debug, Clone)]
pub struct TxBuilder {
    tx: Tx,
}

impl Default for TxBuilder {
    fn default() -> Self {
        TxBuilder::new()
    }
}

impl TxBuilder {
    pub fn new() -> TxBuilder {
        let mut tx = Tx::default();
        tx.auth_info.fee = Some(Fee::default());
        TxBuilder { tx }
    }

    pub fn message(mut self, msg: TxMsg) -> TxBuilder {
        self.tx.body.messages.push(msg);
        self
    }

    pub fn cosmos_message(self, msg: Any, signer: Address) -> TxBuilder {
        self.message(TxMsg::Cosmos(CosmosMsg::new(msg, vec![signer])))
    }

    fn fee_mut(&mut self) -> &mut Fee {
        self.tx.auth_info.fee.get_or_insert_with(Fee::default)
    }

    pub fn fee(mut self, amount: Vec<Coin>) -> TxBuilder {
        self.fee_mut().amount = amount;
        self
    }

    pub fn gas(mut self, gas_limit: u64) -> TxBuilder {
        self.fee_mut().gas_limit = gas_limit;
        self
    }

    pub fn payer(mut self, payer: Address) -> TxBuilder {
        self.fee_mut().payer = payer.to_string();
        self
    }

    pub fn granter(mut self, granter: Address) -> TxBuilder {
        self.fee_mut().granter = granter.to_string();
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> TxBuilder {
        self.tx.body.memo = memo.into();
        self
    }

    pub fn timeout_height(mut self, height: u64) -> TxBuilder {
        self.tx.body.timeout_height = height;
        self
    }

    pub fn extension_option(mut self, option: Any) -> TxBuilder {
        self.tx.body.extension_options.push(option);
        self
    }

    pub fn non_critical_extension_option(mut self, option: Any) -> TxBuilder {
        self.tx.body.non_critical_extension_options.push(option);
        self
    }

    /// The tx without any signature
    pub fn build(self) -> Tx {
        self.tx
    }

    /// Signs with `signers` in order, using their current on chain sequence and account number
    pub fn sign(self, app: &SimApp, signers: &[&TestAccount]) -> Tx {
        let mut tx = self.tx;
        let accounts: Vec<(u64, u64)> = signers
            .iter()
            .map(|s| {
                app.account_keeper
                    .get_account(&s.address)
                    .map(|a| (a.account_number, a.sequence))
                    .unwrap_or((0, 0))
            })
            .collect();

        let mut signer_infos = Vec::new();
        let mut signatures = Vec::new();
        for (signer, (account_number, sequence)) in signers.iter().zip(accounts) {
            let digest = sign_bytes(SIM_CHAIN_ID, account_number, sequence, &tx);
            let signature = signer.eth_key.sign_hash(&digest).to_bytes().to_vec();
            signer_infos.push(SignerInfo {
                pub_key: Some(signer.pub_key.clone()),
                data: SignatureData::Single(signature.clone()),
                sequence,
            });
            signatures.push(signature);
        }
        tx.auth_info.signer_infos = signer_infos;
        tx.signatures = signatures;
        tx
    }
}
