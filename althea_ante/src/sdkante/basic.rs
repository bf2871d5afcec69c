use super::sigverify::SIM_SECP256K1_PUBKEY;
use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{AccountKeeper, ExtensionOptionChecker};
use crate::types::crypto::SignatureData;
use crate::types::{Context, PubKey, Tx};
use std::sync::Arc;

/// Length of a secp256k1 signature without the recovery byte
const SIM_SECP256K1_SIG_LEN: u64 = 64;

/// Rejects critical extension options the checker does not understand
#[derive(Clone)]
pub struct ExtensionOptionsDecorator {
    checker: ExtensionOptionChecker,
}

impl ExtensionOptionsDecorator {
    pub fn new(checker: ExtensionOptionChecker) -> ExtensionOptionsDecorator {
        ExtensionOptionsDecorator { checker }
    }
}

impl AnteDecorator for ExtensionOptionsDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if tx.extension_options().iter().any(|opt| !(self.checker)(opt)) {
            return Err(ErrorKind::UnknownExtensionOptions.into());
        }
        next.run(ctx, tx, simulate)
    }
}

/// Stateless validation of the tx, skipped on recheck
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateBasicDecorator;

impl ValidateBasicDecorator {
    pub fn new() -> ValidateBasicDecorator {
        ValidateBasicDecorator
    }
}

impl AnteDecorator for ValidateBasicDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if ctx.is_recheck_tx() {
            return next.run(ctx, tx, simulate);
        }
        tx.validate_basic()?;
        next.run(ctx, tx, simulate)
    }
}

/// Rejects transactions included after their timeout height
#[derive(Debug, Clone, Copy, Default)]
pub struct TxTimeoutHeightDecorator;

impl TxTimeoutHeightDecorator {
    pub fn new() -> TxTimeoutHeightDecorator {
        TxTimeoutHeightDecorator
    }
}

impl AnteDecorator for TxTimeoutHeightDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let timeout_height = tx.timeout_height();
        if timeout_height > 0 && ctx.block_height() > 0 && ctx.block_height() as u64 > timeout_height
        {
            return Err(AnteError::new(
                ErrorKind::TxTimeoutHeight,
                format!(
                    "block height: {}, timeout height: {}",
                    ctx.block_height(),
                    timeout_height
                ),
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

/// Enforces the memo length limit of the auth params
#[derive(Clone)]
pub struct ValidateMemoDecorator {
    ak: Arc<dyn AccountKeeper>,
}

impl ValidateMemoDecorator {
    pub fn new(ak: Arc<dyn AccountKeeper>) -> ValidateMemoDecorator {
        ValidateMemoDecorator { ak }
    }
}

impl AnteDecorator for ValidateMemoDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let params = self.ak.get_params();
        let memo_length = tx.memo().len() as u64;
        if memo_length > 0 && memo_length > params.max_memo_characters {
            return Err(AnteError::new(
                ErrorKind::MemoTooLarge,
                format!(
                    "maximum number of characters is {} but received {} characters",
                    params.max_memo_characters, memo_length
                ),
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

/// Charges gas for every byte of the encoded tx. Simulations also pay for the signatures a
/// real submission would carry.
#[derive(Clone)]
pub struct ConsumeTxSizeGasDecorator {
    ak: Arc<dyn AccountKeeper>,
}

impl ConsumeTxSizeGasDecorator {
    pub fn new(ak: Arc<dyn AccountKeeper>) -> ConsumeTxSizeGasDecorator {
        ConsumeTxSizeGasDecorator { ak }
    }
}

fn is_incomplete_signature(data: &SignatureData) -> bool {
    match data {
        SignatureData::Single(sig) => sig.is_empty(),
        SignatureData::Multi { signatures, .. } => {
            signatures.is_empty() || signatures.iter().any(is_incomplete_signature)
        }
    }
}

impl AnteDecorator for ConsumeTxSizeGasDecorator {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let params = self.ak.get_params();
        let size_cost = params.tx_size_cost_per_byte.saturating_mul(ctx.tx_size());
        ctx.consume_gas(size_cost, "txSize")?;

        if simulate {
            let infos = &tx.auth_info.signer_infos;
            for (i, signer) in tx.signers().iter().enumerate() {
                if let Some(info) = infos.get(i) {
                    if !is_incomplete_signature(&info.data) {
                        continue;
                    }
                }
                let pub_key = self
                    .ak
                    .get_account(signer)
                    .and_then(|acc| acc.pub_key)
                    .unwrap_or_else(|| PubKey::Secp256k1(SIM_SECP256K1_PUBKEY.to_vec()));
                // amino encoded signature with its key
                let mut cost = SIM_SECP256K1_SIG_LEN + pub_key.bytes().len() as u64 + 6;
                if let PubKey::Multisig { .. } = pub_key {
                    cost = cost.saturating_mul(params.tx_sig_limit);
                }
                ctx.consume_gas(params.tx_size_cost_per_byte.saturating_mul(cost), "txSize")?;
            }
        }

        next.run(ctx, tx, simulate)
    }
}
