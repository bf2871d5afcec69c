//! The decorator contract and the assembled ante handler

use crate::cosmoslane::{
    CosmosLaneRejectAuthzMsgsDecorator, CosmosLaneRejectEthereumMsgsDecorator,
    CosmosLaneVestingMessagesAuthorizationDecorator,
};
use crate::duallane::{
    DualLaneConsumeTxSizeGasDecorator, DualLaneDeductFeeDecorator,
    DualLaneExtensionOptionsDecorator, DualLaneIncrementSequenceDecorator,
    DualLaneRedundantRelayDecorator, DualLaneSetPubKeyDecorator, DualLaneSetupContextDecorator,
    DualLaneSigGasConsumeDecorator, DualLaneSigVerificationDecorator,
    DualLaneTxTimeoutHeightDecorator, DualLaneValidateBasicDecorator,
    DualLaneValidateMemoDecorator, DualLaneValidateSigCountDecorator,
};
use crate::error::AnteResult;
use crate::evmlane::{
    EvmLaneEmitEventDecorator, EvmLaneExecWithoutErrorDecorator,
    EvmLaneSetupExecutionDecorator, EvmLaneValidateBasicEoaDecorator,
};
use crate::handler_options::HandlerOptions;
use crate::sdkante::{
    ConsumeTxSizeGasDecorator, DeductFeeDecorator, ExtensionOptionsDecorator,
    IncrementSequenceDecorator, RedundantRelayDecorator, SetPubKeyDecorator,
    SetUpContextDecorator, SigGasConsumeDecorator, SigVerificationDecorator,
    TxTimeoutHeightDecorator, ValidateBasicDecorator, ValidateMemoDecorator,
    ValidateSigCountDecorator,
};
use crate::types::{Context, Tx};

/// One stage of the ante chain. A decorator either rejects the transaction or hands a
/// (possibly derived) context to `next`.
pub trait AnteDecorator: Send + Sync {
    fn ante_handle(&self, ctx: Context, tx: &Tx, simulate: bool, next: Next<'_>)
        -> AnteResult<Context>;
}

/// The remainder of the chain after the running decorator
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Box<dyn AnteDecorator>],
}

impl<'a> Next<'a> {
    pub fn new(rest: &'a [Box<dyn AnteDecorator>]) -> Next<'a> {
        Next { rest }
    }

    /// Terminates a chain, returning the context unchanged
    pub fn terminator() -> Next<'static> {
        Next { rest: &[] }
    }

    pub fn run(self, ctx: Context, tx: &Tx, simulate: bool) -> AnteResult<Context> {
        match self.rest.split_first() {
            Some((first, rest)) => first.ante_handle(ctx, tx, simulate, Next { rest }),
            None => Ok(ctx),
        }
    }
}

/// Runs `decorators` in order against one transaction
pub fn chain_decorators(
    decorators: &[Box<dyn AnteDecorator>],
    ctx: Context,
    tx: &Tx,
    simulate: bool,
) -> AnteResult<Context> {
    Next::new(decorators).run(ctx, tx, simulate)
}

/// The full dual lane ante handler, built once per node
pub struct AnteHandler {
    decorators: Vec<Box<dyn AnteDecorator>>,
}

impl AnteHandler {
    /// Validates the options and assembles the ordered decorator chain
    pub fn new(options: HandlerOptions) -> AnteResult<AnteHandler> {
        let o = options.validate()?;

        let decorators: Vec<Box<dyn AnteDecorator>> = vec![
            // must run first, everything after depends on the gas meter
            Box::new(DualLaneSetupContextDecorator::new(
                o.evm_keeper.clone(),
                SetUpContextDecorator::new(),
            )),
            Box::new(DualLaneExtensionOptionsDecorator::new(
                ExtensionOptionsDecorator::new(o.extension_option_checker.clone()),
            )),
            Box::new(DualLaneValidateBasicDecorator::new(
                o.evm_keeper.clone(),
                ValidateBasicDecorator::new(),
            )),
            Box::new(EvmLaneValidateBasicEoaDecorator::new(o.evm_keeper.clone())),
            Box::new(DualLaneTxTimeoutHeightDecorator::new(
                TxTimeoutHeightDecorator::new(),
            )),
            Box::new(DualLaneValidateMemoDecorator::new(
                ValidateMemoDecorator::new(o.account_keeper.clone()),
            )),
            Box::new(DualLaneConsumeTxSizeGasDecorator::new(
                ConsumeTxSizeGasDecorator::new(o.account_keeper.clone()),
            )),
            Box::new(DualLaneDeductFeeDecorator::new(
                o.evm_keeper.clone(),
                DeductFeeDecorator::new(
                    o.account_keeper.clone(),
                    o.bank_keeper.clone(),
                    o.feegrant_keeper.clone(),
                    o.tx_fee_checker.clone(),
                ),
            )),
            // before every signature verification stage
            Box::new(DualLaneSetPubKeyDecorator::new(SetPubKeyDecorator::new(
                o.account_keeper.clone(),
            ))),
            Box::new(DualLaneValidateSigCountDecorator::new(
                ValidateSigCountDecorator::new(o.account_keeper.clone()),
            )),
            Box::new(DualLaneSigGasConsumeDecorator::new(
                SigGasConsumeDecorator::new(
                    o.account_keeper.clone(),
                    o.sig_gas_consumer.clone(),
                ),
            )),
            Box::new(DualLaneSigVerificationDecorator::new(
                o.account_keeper.clone(),
                o.evm_keeper.clone(),
                SigVerificationDecorator::new(
                    o.account_keeper.clone(),
                    o.sign_mode_handler.clone(),
                ),
            )),
            Box::new(DualLaneIncrementSequenceDecorator::new(
                o.account_keeper.clone(),
                o.evm_keeper.clone(),
                IncrementSequenceDecorator::new(o.account_keeper.clone()),
            )),
            Box::new(DualLaneRedundantRelayDecorator::new(
                RedundantRelayDecorator::new(o.ibc_keeper.clone()),
            )),
            // no upstream decorators past this point

            // Ethereum lane only
            Box::new(EvmLaneSetupExecutionDecorator::new(o.evm_keeper.clone())),
            // last stage with effects on the Ethereum lane
            Box::new(EvmLaneEmitEventDecorator::new(o.evm_keeper.clone())),
            Box::new(EvmLaneExecWithoutErrorDecorator::new(o.evm_keeper.clone())),
            // Cosmos lane only
            Box::new(CosmosLaneRejectEthereumMsgsDecorator::new()),
            Box::new(CosmosLaneRejectAuthzMsgsDecorator::new(
                o.disabled_nested_msgs.clone(),
            )),
            Box::new(CosmosLaneVestingMessagesAuthorizationDecorator::new(
                o.vauth_keeper.clone(),
            )),
        ];

        Ok(AnteHandler { decorators })
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Runs the whole chain for one transaction
    pub fn handle(&self, ctx: Context, tx: &Tx, simulate: bool) -> AnteResult<Context> {
        let result = chain_decorators(&self.decorators, ctx, tx, simulate);
        if let Err(e) = &result {
            debug!("ante handler rejected tx: {}", e);
        }
        result
    }
}
