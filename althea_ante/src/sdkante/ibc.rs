use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::IbcKeeper;
use crate::type_urls::{
    MSG_ACKNOWLEDGEMENT_TYPE_URL, MSG_RECV_PACKET_TYPE_URL, MSG_TIMEOUT_ON_CLOSE_TYPE_URL,
    MSG_TIMEOUT_TYPE_URL, MSG_UPDATE_CLIENT_TYPE_URL,
};
use crate::types::{Context, Tx, TxMsg};
use std::sync::Arc;

/// Keeps relayers from filling blocks with packets another relayer already delivered. Only
/// mempool admission is affected, a tx made of nothing but redundant packets is rejected.
#[derive(Clone)]
pub struct RedundantRelayDecorator {
    ibc_keeper: Arc<dyn IbcKeeper>,
}

impl RedundantRelayDecorator {
    pub fn new(ibc_keeper: Arc<dyn IbcKeeper>) -> RedundantRelayDecorator {
        RedundantRelayDecorator { ibc_keeper }
    }
}

impl AnteDecorator for RedundantRelayDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !ctx.is_check_tx() {
            return next.run(ctx, tx, simulate);
        }

        let mut redundancies = 0i64;
        let mut packet_msgs = 0i64;
        for msg in tx.messages() {
            let any = match msg {
                TxMsg::Cosmos(m) => &m.msg,
                TxMsg::Ethereum(_) => {
                    packet_msgs = -1;
                    continue;
                }
            };
            match any.type_url.as_str() {
                MSG_RECV_PACKET_TYPE_URL
                | MSG_ACKNOWLEDGEMENT_TYPE_URL
                | MSG_TIMEOUT_TYPE_URL
                | MSG_TIMEOUT_ON_CLOSE_TYPE_URL => {
                    if self.ibc_keeper.is_packet_redundant(any)? {
                        redundancies += 1;
                    }
                    packet_msgs += 1;
                }
                MSG_UPDATE_CLIENT_TYPE_URL => self.ibc_keeper.check_client_update(any)?,
                // a tx with anything else is never considered redundant
                _ => packet_msgs = -1,
            }
        }

        if redundancies == packet_msgs && packet_msgs > 0 {
            return Err(AnteError::new(
                ErrorKind::RedundantTx,
                "packet messages are redundant",
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CosmosMsg, ExecMode};
    use prost_types::Any;

    struct FixedIbc {
        redundant: bool,
    }

    impl IbcKeeper for FixedIbc {
        fn is_packet_redundant(&self, _msg: &Any) -> AnteResult<bool> {
            Ok(self.redundant)
        }

        fn check_client_update(&self, _msg: &Any) -> AnteResult<()> {
            Ok(())
        }
    }

    fn tx_of(type_urls: &[&str]) -> Tx {
        let mut tx = Tx::default();
        tx.body.messages = type_urls
            .iter()
            .map(|url| {
                TxMsg::Cosmos(CosmosMsg::new(
                    Any {
                        type_url: url.to_string(),
                        value: Vec::new(),
                    },
                    Vec::new(),
                ))
            })
            .collect();
        tx
    }

    fn run(redundant: bool, mode: ExecMode, tx: &Tx) -> AnteResult<Context> {
        let decorator = RedundantRelayDecorator::new(Arc::new(FixedIbc { redundant }));
        decorator.ante_handle(Context::new("test", 1, mode), tx, false, Next::terminator())
    }

    #[test]
    fn all_redundant_packets_rejected_in_check_tx() {
        let tx = tx_of(&[MSG_UPDATE_CLIENT_TYPE_URL, MSG_RECV_PACKET_TYPE_URL, MSG_TIMEOUT_TYPE_URL]);
        let err = run(true, ExecMode::CheckTx, &tx).unwrap_err();
        assert!(err.is(ErrorKind::RedundantTx));
        assert!(run(true, ExecMode::ReCheckTx, &tx).is_err());
        assert!(run(true, ExecMode::DeliverTx, &tx).is_ok());
        assert!(run(false, ExecMode::CheckTx, &tx).is_ok());
    }

    #[test]
    fn other_messages_disable_the_check() {
        let tx = tx_of(&[MSG_RECV_PACKET_TYPE_URL, "/cosmos.bank.v1beta1.MsgSend"]);
        assert!(run(true, ExecMode::CheckTx, &tx).is_ok());
        let only_update = tx_of(&[MSG_UPDATE_CLIENT_TYPE_URL]);
        assert!(run(true, ExecMode::CheckTx, &only_update).is_ok());
    }
}
