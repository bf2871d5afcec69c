use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::lane::has_single_ethereum_message;
use crate::type_urls::MSG_ETHEREUM_TX_TYPE_URL;
use crate::types::{Context, Tx};

/// Ethereum messages may only travel alone, any other mix is rejected here
#[derive(Clone, Default)]
pub struct CosmosLaneRejectEthereumMsgsDecorator {}

impl CosmosLaneRejectEthereumMsgsDecorator {
    pub fn new() -> CosmosLaneRejectEthereumMsgsDecorator {
        CosmosLaneRejectEthereumMsgsDecorator {}
    }
}

impl AnteDecorator for CosmosLaneRejectEthereumMsgsDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if has_single_ethereum_message(tx) {
            return next.run(ctx, tx, simulate);
        }

        if tx.messages().iter().any(|m| m.is_ethereum()) {
            return Err(AnteError::new(
                ErrorKind::InvalidType,
                format!(
                    "{} cannot be mixed with Cosmos messages",
                    MSG_ETHEREUM_TX_TYPE_URL
                ),
            ));
        }

        next.run(ctx, tx, simulate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simapp::{SimApp, TxBuilder};
    use crate::type_urls::MSG_SEND_TYPE_URL;
    use crate::types::{ExecMode, TxMsg};
    use prost_types::Any;

    #[test]
    fn mixed_and_repeated_ethereum_messages_are_rejected() {
        let app = SimApp::default();
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let to = app.new_account(0u8.into());
        let eth = app.ethereum_tx(
            &sender,
            app.legacy_tx(0, app.base_fee(), 21000, to.eth_address, 1u8.into()),
        );
        let eth_msg = eth.messages()[0].clone();
        let send = Any {
            type_url: MSG_SEND_TYPE_URL.to_string(),
            value: Vec::new(),
        };
        let decorator = CosmosLaneRejectEthereumMsgsDecorator::new();
        let ctx = || app.context(5, ExecMode::DeliverTx);

        decorator
            .ante_handle(ctx(), &eth, false, Next::terminator())
            .unwrap();

        let doubled = TxBuilder::new()
            .message(eth_msg.clone())
            .message(eth_msg.clone())
            .build();
        let mixed = TxBuilder::new()
            .cosmos_message(send.clone(), sender.address)
            .message(eth_msg)
            .build();
        for tx in [doubled, mixed] {
            let err = decorator
                .ante_handle(ctx(), &tx, false, Next::terminator())
                .unwrap_err();
            assert!(err.is(ErrorKind::InvalidType));
            assert!(err.to_string().contains("cannot be mixed with Cosmos messages"));
        }

        let cosmos = TxBuilder::new().cosmos_message(send, sender.address).build();
        assert!(matches!(cosmos.messages(), [TxMsg::Cosmos(_)]));
        decorator
            .ante_handle(ctx(), &cosmos, false, Next::terminator())
            .unwrap();
    }
}
