use crate::ante::{AnteDecorator, Next};
use crate::duallane::single_ethereum_msg;
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::EvmKeeper;
use crate::types::{Context, Tx};
use crate::utils::cosmos_to_eth_address;
use deep_space::utils::bytes_to_hex_str;
use std::sync::Arc;

/// keccak256 of empty code
pub const EMPTY_CODE_HASH: [u8; 32] = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03,
    0xc0, 0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85,
    0xa4, 0x70,
];

/// Accounts that never stored code have no hash at all
pub fn is_empty_code_hash(code_hash: &[u8]) -> bool {
    code_hash.is_empty() || code_hash == EMPTY_CODE_HASH
}

/// Contracts cannot send transactions, the sender must be an externally owned account. Missing
/// accounts are not created here.
#[derive(Clone)]
pub struct EvmLaneValidateBasicEoaDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
}

impl EvmLaneValidateBasicEoaDecorator {
    pub fn new(evm_keeper: Arc<dyn EvmKeeper>) -> EvmLaneValidateBasicEoaDecorator {
        EvmLaneValidateBasicEoaDecorator { evm_keeper }
    }
}

impl AnteDecorator for EvmLaneValidateBasicEoaDecorator {
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

        let from = msg.from_address().ok_or_else(|| {
            AnteError::new(ErrorKind::InvalidAddress, "from address cannot be empty")
        })?;
        let from_eth = cosmos_to_eth_address(&from)?;

        let code_hash = self.evm_keeper.get_code_hash(&from_eth);
        if !is_empty_code_hash(&code_hash) {
            return Err(AnteError::new(
                ErrorKind::InvalidType,
                format!(
                    "the sender is not EOA: address {}, codeHash <0x{}>",
                    from_eth,
                    bytes_to_hex_str(&code_hash)
                ),
            ));
        }

        next.run(ctx, tx, simulate)
    }
}
