use super::coin::DecCoin;
use super::gas::{GasConfig, GasMeter};
use crate::error::AnteResult;

/// Which ABCI entry point is running the ante chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// mempool admission
    CheckTx,
    /// mempool re-validation after a block was committed
    ReCheckTx,
    /// block execution
    DeliverTx,
}

/// An event emitted while processing a transaction, indexed by the consensus engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Event {
        Event {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Event {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Request scoped execution context. It is moved through the decorator chain and every stage
/// hands a (possibly derived) context to the next one.
#[derive(Debug, Clone)]
pub struct Context {
    chain_id: String,
    block_height: i64,
    exec_mode: ExecMode,
    tx_size: u64,
    max_block_gas: Option<u64>,
    min_gas_prices: Vec<DecCoin>,
    gas_meter: GasMeter,
    kv_gas_config: GasConfig,
    transient_kv_gas_config: GasConfig,
    priority: i64,
    events: Vec<Event>,
}

impl Context {
    pub fn new(chain_id: impl Into<String>, block_height: i64, exec_mode: ExecMode) -> Context {
        Context {
            chain_id: chain_id.into(),
            block_height,
            exec_mode,
            tx_size: 0,
            max_block_gas: None,
            min_gas_prices: Vec::new(),
            gas_meter: GasMeter::infinite(),
            kv_gas_config: GasConfig::kv(),
            transient_kv_gas_config: GasConfig::transient(),
            priority: 0,
            events: Vec::new(),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn block_height(&self) -> i64 {
        self.block_height
    }

    pub fn exec_mode(&self) -> ExecMode {
        self.exec_mode
    }

    /// True for both check and re-check, like the sdk `IsCheckTx`
    pub fn is_check_tx(&self) -> bool {
        matches!(self.exec_mode, ExecMode::CheckTx | ExecMode::ReCheckTx)
    }

    pub fn is_recheck_tx(&self) -> bool {
        self.exec_mode == ExecMode::ReCheckTx
    }

    /// Size in bytes of the encoded transaction
    pub fn tx_size(&self) -> u64 {
        self.tx_size
    }

    /// Block gas limit from the consensus params, `None` when unlimited
    pub fn max_block_gas(&self) -> Option<u64> {
        self.max_block_gas
    }

    pub fn min_gas_prices(&self) -> &[DecCoin] {
        &self.min_gas_prices
    }

    pub fn gas_meter(&self) -> &GasMeter {
        &self.gas_meter
    }

    pub fn gas_meter_mut(&mut self) -> &mut GasMeter {
        &mut self.gas_meter
    }

    pub fn consume_gas(&mut self, amount: u64, descriptor: &str) -> AnteResult<()> {
        self.gas_meter.consume_gas(amount, descriptor)
    }

    pub fn kv_gas_config(&self) -> GasConfig {
        self.kv_gas_config
    }

    pub fn transient_kv_gas_config(&self) -> GasConfig {
        self.transient_kv_gas_config
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn with_block_height(mut self, block_height: i64) -> Context {
        self.block_height = block_height;
        self
    }

    pub fn with_exec_mode(mut self, exec_mode: ExecMode) -> Context {
        self.exec_mode = exec_mode;
        self
    }

    pub fn with_tx_size(mut self, tx_size: u64) -> Context {
        self.tx_size = tx_size;
        self
    }

    pub fn with_max_block_gas(mut self, max_block_gas: Option<u64>) -> Context {
        self.max_block_gas = max_block_gas;
        self
    }

    pub fn with_min_gas_prices(mut self, min_gas_prices: Vec<DecCoin>) -> Context {
        self.min_gas_prices = min_gas_prices;
        self
    }

    pub fn with_gas_meter(mut self, gas_meter: GasMeter) -> Context {
        self.gas_meter = gas_meter;
        self
    }

    pub fn with_kv_gas_config(mut self, config: GasConfig) -> Context {
        self.kv_gas_config = config;
        self
    }

    pub fn with_transient_kv_gas_config(mut self, config: GasConfig) -> Context {
        self.transient_kv_gas_config = config;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Context {
        self.priority = priority;
        self
    }

    /// Removes store level gas costs, the EVM accounts for gas itself
    pub fn with_zero_gas_config(self) -> Context {
        self.with_kv_gas_config(GasConfig::zero())
            .with_transient_kv_gas_config(GasConfig::zero())
    }
}
