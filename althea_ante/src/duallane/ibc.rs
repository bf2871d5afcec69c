use crate::ante::{AnteDecorator, Next};
use crate::error::AnteResult;
use crate::lane::has_single_ethereum_message;
use crate::sdkante::RedundantRelayDecorator;
use crate::types::{Context, Tx};

/// Relay redundancy only concerns IBC messages, Ethereum txs skip it
#[derive(Clone)]
pub struct DualLaneRedundantRelayDecorator {
    cd: RedundantRelayDecorator,
}

impl DualLaneRedundantRelayDecorator {
    pub fn new(cd: RedundantRelayDecorator) -> DualLaneRedundantRelayDecorator {
        DualLaneRedundantRelayDecorator { cd }
    }
}

impl AnteDecorator for DualLaneRedundantRelayDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !has_single_ethereum_message(tx) {
            return self.cd.ante_handle(ctx, tx, simulate, next);
        }
        next.run(ctx, tx, simulate)
    }
}
