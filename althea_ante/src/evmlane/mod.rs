//! Stages that only act on Ethereum txs, Cosmos txs pass through untouched

mod eoa;
mod exec;

pub use eoa::{is_empty_code_hash, EvmLaneValidateBasicEoaDecorator, EMPTY_CODE_HASH};
pub use exec::{
    EvmLaneEmitEventDecorator, EvmLaneExecWithoutErrorDecorator, EvmLaneSetupExecutionDecorator,
    ATTRIBUTE_KEY_ETHEREUM_TX_HASH, ATTRIBUTE_KEY_TX_INDEX, EVENT_TYPE_ETHEREUM_TX,
};
