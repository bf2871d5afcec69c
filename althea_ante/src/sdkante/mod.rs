//! The Cosmos SDK decorators the dual lane stages delegate to for Cosmos transactions

mod basic;
mod fee;
mod ibc;
mod setup;
mod sigverify;

pub use basic::{
    ConsumeTxSizeGasDecorator, ExtensionOptionsDecorator, TxTimeoutHeightDecorator,
    ValidateBasicDecorator, ValidateMemoDecorator,
};
pub use fee::{DeductFeeDecorator, FEE_EVENT_TYPE};
pub use ibc::RedundantRelayDecorator;
pub use setup::SetUpContextDecorator;
pub use sigverify::{
    get_signer_account, IncrementSequenceDecorator, SetPubKeyDecorator, SigGasConsumeDecorator,
    SigVerificationDecorator, ValidateSigCountDecorator, SIM_SECP256K1_PUBKEY,
};
