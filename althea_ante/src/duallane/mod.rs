//! Stages shared by both lanes. Each one checks the Ethereum lane rules itself when the tx
//! holds a single `MsgEthereumTx` and hands every other tx to the wrapped Cosmos SDK decorator.

mod basic;
mod fee;
mod fee_checker;
mod ibc;
mod sigverify;

pub use basic::{
    only_allow_dynamic_fee_extension_option_for_cosmos_txs, DualLaneExtensionOptionsDecorator,
    DualLaneSetupContextDecorator, DualLaneTxTimeoutHeightDecorator,
    DualLaneValidateBasicDecorator, DualLaneValidateMemoDecorator,
};
pub use fee::{DualLaneConsumeTxSizeGasDecorator, DualLaneDeductFeeDecorator};
pub use fee_checker::{
    cosmos_tx_dynamic_fee_checker, dual_lane_fee_checker, ethereum_tx_dynamic_fee_checker,
};
pub use ibc::DualLaneRedundantRelayDecorator;
pub use sigverify::{
    consume_multisignature_verification_gas, sig_verification_gas_consumer,
    DualLaneIncrementSequenceDecorator, DualLaneSetPubKeyDecorator,
    DualLaneSigGasConsumeDecorator, DualLaneSigVerificationDecorator,
    DualLaneValidateSigCountDecorator, ETH_SECP256K1_VERIFY_COST,
};

use crate::types::{MsgEthereumTx, Tx};

/// The `MsgEthereumTx` of a tx already classified as Ethereum lane
pub(crate) fn single_ethereum_msg(tx: &Tx) -> Option<&MsgEthereumTx> {
    match tx.messages() {
        [msg] => msg.as_ethereum(),
        _ => None,
    }
}
