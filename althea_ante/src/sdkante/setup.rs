use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::types::{Context, GasMeter, Tx};

/// Installs the gas meter of a Cosmos transaction. Simulations and genesis transactions run
/// on an infinite meter, everything else is limited to the gas the tx declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetUpContextDecorator;

impl SetUpContextDecorator {
    pub fn new() -> SetUpContextDecorator {
        SetUpContextDecorator
    }
}

fn gas_meter_for(simulate: bool, ctx: &Context, gas_limit: u64) -> GasMeter {
    if simulate || ctx.block_height() == 0 {
        GasMeter::infinite()
    } else {
        GasMeter::new(gas_limit)
    }
}

impl AnteDecorator for SetUpContextDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !tx.has_gas() {
            return Err(AnteError::new(ErrorKind::TxDecode, "Tx must be GasTx"));
        }
        let gas = tx.gas();
        let meter = gas_meter_for(simulate, &ctx, gas);
        let new_ctx = ctx.with_gas_meter(meter);

        if let Some(max_gas) = new_ctx.max_block_gas() {
            if gas > max_gas {
                return Err(AnteError::new(
                    ErrorKind::InvalidGasLimit,
                    format!("tx gas limit {} exceeds block max gas {}", gas, max_gas),
                ));
            }
        }

        next.run(new_ctx, tx, simulate)
    }
}
