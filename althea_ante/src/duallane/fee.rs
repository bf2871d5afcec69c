use crate::ante::{AnteDecorator, Next};
use crate::error::AnteResult;
use crate::keepers::EvmKeeper;
use crate::lane::has_single_ethereum_message;
use crate::sdkante::{ConsumeTxSizeGasDecorator, DeductFeeDecorator};
use crate::types::{Context, Tx};
use std::sync::Arc;

/// Tx size gas is a store level cost, Ethereum txs pay for their bytes inside the EVM
#[derive(Clone)]
pub struct DualLaneConsumeTxSizeGasDecorator {
    cd: ConsumeTxSizeGasDecorator,
}

impl DualLaneConsumeTxSizeGasDecorator {
    pub fn new(cd: ConsumeTxSizeGasDecorator) -> DualLaneConsumeTxSizeGasDecorator {
        DualLaneConsumeTxSizeGasDecorator { cd }
    }
}

impl AnteDecorator for DualLaneConsumeTxSizeGasDecorator {
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

/// Both lanes go through the sdk fee deduction, the dual lane fee checker it is built with
/// already knows how to price Ethereum txs. Ethereum senders are flagged as having paid so the
/// EVM does not charge them again.
#[derive(Clone)]
pub struct DualLaneDeductFeeDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
    cd: DeductFeeDecorator,
}

impl DualLaneDeductFeeDecorator {
    pub fn new(evm_keeper: Arc<dyn EvmKeeper>, cd: DeductFeeDecorator) -> DualLaneDeductFeeDecorator {
        DualLaneDeductFeeDecorator { evm_keeper, cd }
    }
}

impl AnteDecorator for DualLaneDeductFeeDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if has_single_ethereum_message(tx) {
            self.evm_keeper
                .set_flag_sender_paid_tx_fee_in_ante_handle(true);
        }
        self.cd.ante_handle(ctx, tx, simulate, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duallane::dual_lane_fee_checker;
    use crate::error::ErrorKind;
    use crate::keepers::{AccountKeeper, FeegrantKeeper};
    use crate::sdkante::FEE_EVENT_TYPE;
    use crate::simapp::{SimApp, TxBuilder};
    use crate::type_urls::MSG_SEND_TYPE_URL;
    use crate::types::ExecMode;
    use deep_space::Coin;
    use num256::Uint256;
    use prost_types::Any;

    fn send_msg() -> Any {
        Any {
            type_url: MSG_SEND_TYPE_URL.to_string(),
            value: Vec::new(),
        }
    }

    fn deduct_fee(app: &SimApp, with_feegrant: bool) -> DualLaneDeductFeeDecorator {
        let feegrant: Option<Arc<dyn FeegrantKeeper>> = if with_feegrant {
            Some(app.feegrant_keeper.clone())
        } else {
            None
        };
        DualLaneDeductFeeDecorator::new(
            app.evm_keeper.clone(),
            DeductFeeDecorator::new(
                app.account_keeper.clone(),
                app.bank_keeper.clone(),
                feegrant,
                dual_lane_fee_checker(app.evm_keeper.clone(), app.fee_market_keeper.clone()),
            ),
        )
    }

    fn evm_coin(app: &SimApp, amount: Uint256) -> Coin {
        Coin::new(amount, app.evm_denom())
    }

    #[test]
    fn ethereum_fee_is_taken_and_flagged() {
        let app = SimApp::default();
        let start: Uint256 = 1_000_000_000_000_000u64.into();
        let sender = app.new_account(start);
        let to = app.new_account(0u8.into());
        let gas_price = app.base_fee();
        let tx = app.ethereum_tx(
            &sender,
            app.legacy_tx(0, gas_price, 21000, to.eth_address, 1u8.into()),
        );

        let out = deduct_fee(&app, false)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap();
        assert!(app.evm_keeper.is_sender_paid_tx_fee_in_ante_handle());
        assert_eq!(
            app.balance(&sender.address),
            start - gas_price * Uint256::from(21000u32)
        );
        assert_eq!(app.balance(&to.address), 0u8.into());
        assert_eq!(out.priority(), 1_000_000_000);
        assert!(out
            .events()
            .iter()
            .any(|e| e.kind == FEE_EVENT_TYPE
                && e.attribute("fee_payer") == Some(sender.address.to_string().as_str())));
    }

    #[test]
    fn cosmos_fee_goes_to_fee_collector() {
        let app = SimApp::default();
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let fee: Uint256 = (2_000_000_000u64 * 100_000).into();
        let tx = TxBuilder::new()
            .cosmos_message(send_msg(), sender.address)
            .fee(vec![evm_coin(&app, fee)])
            .gas(100_000)
            .build();

        let out = deduct_fee(&app, false)
            .ante_handle(app.context(5, ExecMode::CheckTx), &tx, false, Next::terminator())
            .unwrap();
        assert!(!app.evm_keeper.is_sender_paid_tx_fee_in_ante_handle());
        assert_eq!(out.priority(), 2_000_000_000);
        let collector = app
            .account_keeper
            .get_module_address("fee_collector")
            .unwrap();
        assert_eq!(app.balance(&collector), fee);
    }

    #[test]
    fn missing_funds_and_zero_gas() {
        let app = SimApp::default();
        let poor = app.new_account(0u8.into());
        let tx = TxBuilder::new()
            .cosmos_message(send_msg(), poor.address)
            .fee(vec![evm_coin(&app, (1_000_000_000u64 * 100_000).into())])
            .gas(100_000)
            .build();
        let err = deduct_fee(&app, false)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err.is(ErrorKind::InsufficientFunds));

        let zero_gas = TxBuilder::new()
            .cosmos_message(send_msg(), poor.address)
            .build();
        let err = deduct_fee(&app, false)
            .ante_handle(
                app.context(5, ExecMode::DeliverTx),
                &zero_gas,
                false,
                Next::terminator(),
            )
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidGasLimit));
    }

    #[test]
    fn fee_granter_pays_when_allowed() {
        let app = SimApp::default();
        let granter = app.new_account(1_000_000_000_000_000u64.into());
        let grantee = app.new_account(0u8.into());
        let fee: Uint256 = (1_000_000_000u64 * 100_000).into();
        let tx = TxBuilder::new()
            .cosmos_message(send_msg(), grantee.address)
            .fee(vec![evm_coin(&app, fee)])
            .gas(100_000)
            .granter(granter.address)
            .build();

        let err = deduct_fee(&app, false)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err.to_string().starts_with("fee grants are not enabled"));

        let err = deduct_fee(&app, true)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err.to_string().contains("does not allow to pay fees for"));

        app.feegrant_keeper
            .grant_allowance(&granter.address, &grantee.address);
        deduct_fee(&app, true)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap();
        assert_eq!(
            app.balance(&granter.address),
            Uint256::from(1_000_000_000_000_000u64) - fee
        );

        app.feegrant_keeper
            .revoke_allowance(&granter.address, &grantee.address);
        let err = deduct_fee(&app, true)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[test]
    fn simulation_skips_the_fee_checker() {
        let app = SimApp::default();
        let sender = app.new_account(0u8.into());
        // a fee below the base fee would fail the checker
        let tx = TxBuilder::new()
            .cosmos_message(send_msg(), sender.address)
            .fee(vec![evm_coin(&app, 0u8.into())])
            .gas(100_000)
            .build();
        let out = deduct_fee(&app, false)
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, true, Next::terminator())
            .unwrap();
        assert_eq!(out.priority(), 0);
    }
}
