//! Routes transactions to the Ethereum or the Cosmos lane. Both predicates are pure functions
//! of the message list and the extension options.

use crate::type_urls::EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL;
use crate::types::{Tx, TxMsg};

/// True when the tx holds exactly one message and it is a `MsgEthereumTx`
pub fn has_single_ethereum_message(tx: &Tx) -> bool {
    matches!(tx.messages(), [TxMsg::Ethereum(_)])
}

/// A single `MsgEthereumTx` with no extension option other than one Ethereum tx marker
pub fn is_ethereum_tx(tx: &Tx) -> bool {
    if !has_single_ethereum_message(tx) {
        return false;
    }
    if !tx.non_critical_extension_options().is_empty() {
        return false;
    }
    match tx.extension_options() {
        [] => true,
        [opt] => opt.type_url == EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL,
        _ => false,
    }
}
