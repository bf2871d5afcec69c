use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{AccountKeeper, BankKeeper, FeegrantKeeper, TxFeeChecker};
use crate::types::account::FEE_COLLECTOR_NAME;
use crate::types::coin::coins_to_string;
use crate::types::{Context, Event, Tx};
use deep_space::Coin;
use num_traits::Zero;
use std::sync::Arc;

pub const FEE_EVENT_TYPE: &str = "tx";
pub const ATTRIBUTE_KEY_FEE: &str = "fee";
pub const ATTRIBUTE_KEY_FEE_PAYER: &str = "fee_payer";

/// Takes the fee the fee checker settled on from the payer (or its granter) and moves it to
/// the fee collector. The priority computed by the checker is attached to the context.
#[derive(Clone)]
pub struct DeductFeeDecorator {
    ak: Arc<dyn AccountKeeper>,
    bank_keeper: Arc<dyn BankKeeper>,
    feegrant_keeper: Option<Arc<dyn FeegrantKeeper>>,
    tx_fee_checker: TxFeeChecker,
}

impl DeductFeeDecorator {
    pub fn new(
        ak: Arc<dyn AccountKeeper>,
        bank_keeper: Arc<dyn BankKeeper>,
        feegrant_keeper: Option<Arc<dyn FeegrantKeeper>>,
        tx_fee_checker: TxFeeChecker,
    ) -> DeductFeeDecorator {
        DeductFeeDecorator {
            ak,
            bank_keeper,
            feegrant_keeper,
            tx_fee_checker,
        }
    }

    fn check_deduct_fee(&self, ctx: &mut Context, tx: &Tx, fee: &[Coin]) -> AnteResult<()> {
        self.ak
            .get_module_address(FEE_COLLECTOR_NAME)
            .map_err(|e| {
                e.wrap(format!(
                    "fee collector module account ({}) has not been set",
                    FEE_COLLECTOR_NAME
                ))
            })?;

        let fee_payer = tx.fee_payer()?;
        let mut deduct_fees_from = fee_payer;

        if let Some(fee_granter) = tx.fee_granter()? {
            match &self.feegrant_keeper {
                None => {
                    return Err(AnteError::new(
                        ErrorKind::InvalidRequest,
                        "fee grants are not enabled",
                    ))
                }
                Some(feegrant) if fee_granter != fee_payer => {
                    feegrant
                        .use_granted_fees(&fee_granter, &fee_payer, fee, tx.messages())
                        .map_err(|e| {
                            e.wrap(format!(
                                "{} does not allow to pay fees for {}",
                                fee_granter, fee_payer
                            ))
                        })?;
                }
                Some(_) => {}
            }
            deduct_fees_from = fee_granter;
        }

        if self.ak.get_account(&deduct_fees_from).is_none() {
            return Err(AnteError::new(
                ErrorKind::UnknownAddress,
                format!("fee payer address: {} does not exist", deduct_fees_from),
            ));
        }

        if fee.iter().any(|c| !c.amount.is_zero()) {
            deduct_fees(self.bank_keeper.as_ref(), &deduct_fees_from, fee)?;
        }

        ctx.emit_event(
            Event::new(FEE_EVENT_TYPE)
                .with_attribute(ATTRIBUTE_KEY_FEE, coins_to_string(fee))
                .with_attribute(ATTRIBUTE_KEY_FEE_PAYER, deduct_fees_from.to_string()),
        );
        Ok(())
    }
}

fn deduct_fees(
    bank_keeper: &dyn BankKeeper,
    from: &deep_space::Address,
    fees: &[Coin],
) -> AnteResult<()> {
    if fees.iter().any(|c| c.denom.is_empty()) {
        return Err(AnteError::new(
            ErrorKind::InsufficientFee,
            format!("invalid fee amount: {}", coins_to_string(fees)),
        ));
    }
    bank_keeper
        .send_coins_from_account_to_module(from, FEE_COLLECTOR_NAME, fees)
        .map_err(|e| AnteError::new(ErrorKind::InsufficientFunds, e.message()))
}

impl AnteDecorator for DeductFeeDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !tx.has_gas() {
            return Err(AnteError::new(ErrorKind::TxDecode, "Tx must be a FeeTx"));
        }
        if !simulate && ctx.block_height() > 0 && tx.gas() == 0 {
            return Err(AnteError::new(
                ErrorKind::InvalidGasLimit,
                "must provide positive gas",
            ));
        }

        let mut fee = tx.fee().to_vec();
        let mut priority = 0;
        if !simulate {
            let (checked_fee, checked_priority) = (self.tx_fee_checker)(&ctx, tx)?;
            fee = checked_fee;
            priority = checked_priority;
        }

        let mut ctx = ctx;
        self.check_deduct_fee(&mut ctx, tx, &fee)?;
        trace!("deducted fee {} with priority {}", coins_to_string(&fee), priority);

        next.run(ctx.with_priority(priority), tx, simulate)
    }
}
