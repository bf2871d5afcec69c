use crate::ante::{AnteDecorator, Next};
use crate::duallane::single_ethereum_msg;
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{EvmKeeper, SimulationOptions};
use crate::types::{Context, Event, Tx};
use std::sync::Arc;

pub const EVENT_TYPE_ETHEREUM_TX: &str = "ethereum_tx";
pub const ATTRIBUTE_KEY_ETHEREUM_TX_HASH: &str = "ethereumTxHash";
pub const ATTRIBUTE_KEY_TX_INDEX: &str = "txIndex";

/// Prepares the transient EVM state the message is executed against
#[derive(Clone)]
pub struct EvmLaneSetupExecutionDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
}

impl EvmLaneSetupExecutionDecorator {
    pub fn new(evm_keeper: Arc<dyn EvmKeeper>) -> EvmLaneSetupExecutionDecorator {
        EvmLaneSetupExecutionDecorator { evm_keeper }
    }
}

impl AnteDecorator for EvmLaneSetupExecutionDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let msg = match single_ethereum_msg(tx) {
            Some(msg) => msg,
            None => return next.run(ctx, tx, simulate),
        };
        let new_ctx = self.evm_keeper.setup_execution_context(ctx, msg);
        next.run(new_ctx, tx, simulate)
    }
}

/// Once an Ethereum tx got this far its fee is gone and its nonce used, so it is announced even
/// if execution fails later (for example by running out of block gas)
#[derive(Clone)]
pub struct EvmLaneEmitEventDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
}

impl EvmLaneEmitEventDecorator {
    pub fn new(evm_keeper: Arc<dyn EvmKeeper>) -> EvmLaneEmitEventDecorator {
        EvmLaneEmitEventDecorator { evm_keeper }
    }
}

impl AnteDecorator for EvmLaneEmitEventDecorator {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let msg = match single_ethereum_msg(tx) {
            Some(msg) => msg,
            None => return next.run(ctx, tx, simulate),
        };

        let tx_index = self.evm_keeper.get_tx_count_transient().saturating_sub(1);
        ctx.emit_event(
            Event::new(EVENT_TYPE_ETHEREUM_TX)
                .with_attribute(ATTRIBUTE_KEY_ETHEREUM_TX_HASH, msg.hash_hex())
                .with_attribute(ATTRIBUTE_KEY_TX_INDEX, tx_index.to_string()),
        );

        next.run(ctx, tx, simulate)
    }
}

/// Dry runs the message on a discarded branch during mempool admission and simulation, txs
/// that would fail are kept out of the mempool
#[derive(Clone)]
pub struct EvmLaneExecWithoutErrorDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
}

impl EvmLaneExecWithoutErrorDecorator {
    pub fn new(evm_keeper: Arc<dyn EvmKeeper>) -> EvmLaneExecWithoutErrorDecorator {
        EvmLaneExecWithoutErrorDecorator { evm_keeper }
    }
}

impl AnteDecorator for EvmLaneExecWithoutErrorDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !ctx.is_check_tx() && !simulate {
            return next.run(ctx, tx, simulate);
        }
        let msg = match single_ethereum_msg(tx) {
            Some(msg) => msg,
            None => return next.run(ctx, tx, simulate),
        };

        let options = SimulationOptions {
            rollback_ante_nonce: self.evm_keeper.is_sender_nonce_increased_by_ante_handle(),
            sender_paid_fee: self.evm_keeper.is_sender_paid_tx_fee_in_ante_handle(),
        };
        if let Err(e) = self.evm_keeper.simulate_message(&ctx, msg, options) {
            debug!("simulation of {} failed: {}", msg.hash_hex(), e);
            return Err(AnteError::new(
                ErrorKind::Logic,
                format!("tx simulation execution failed: {}", e),
            ));
        }

        next.run(ctx, tx, simulate)
    }
}
