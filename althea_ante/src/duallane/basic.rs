use super::single_ethereum_msg;
use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::EvmKeeper;
use crate::lane::{has_single_ethereum_message, is_ethereum_tx};
use crate::sdkante::{
    ExtensionOptionsDecorator, SetUpContextDecorator, TxTimeoutHeightDecorator,
    ValidateBasicDecorator, ValidateMemoDecorator,
};
use crate::type_urls::EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL;
use crate::types::coin::{coins_to_string, new_coins};
use crate::types::{Context, GasMeter, Tx};
use crate::utils::{eth_tx_fee, eth_tx_gas, is_protected, recover_sender};
use deep_space::Coin;
use prost_types::Any;
use std::sync::Arc;

/// Extension option checker for Cosmos txs, only the dynamic fee option is understood
pub fn only_allow_dynamic_fee_extension_option_for_cosmos_txs(option: &Any) -> bool {
    option.type_url == EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL
}

/// Ethereum txs run on an infinite meter with zero store costs, the EVM does its own gas
/// accounting. The transient ante flags of a previous run are cleared.
#[derive(Clone)]
pub struct DualLaneSetupContextDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
    cd: SetUpContextDecorator,
}

impl DualLaneSetupContextDecorator {
    pub fn new(
        evm_keeper: Arc<dyn EvmKeeper>,
        cd: SetUpContextDecorator,
    ) -> DualLaneSetupContextDecorator {
        DualLaneSetupContextDecorator { evm_keeper, cd }
    }
}

impl AnteDecorator for DualLaneSetupContextDecorator {
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
        trace!("setting up ethereum tx context");

        if !tx.has_gas() {
            return Err(AnteError::new(
                ErrorKind::InvalidType,
                "invalid transaction type, expected GasTx",
            ));
        }

        let new_ctx = ctx
            .with_gas_meter(GasMeter::infinite())
            .with_zero_gas_config();

        self.evm_keeper
            .set_flag_sender_nonce_increased_by_ante_handle(false);
        self.evm_keeper
            .set_flag_sender_paid_tx_fee_in_ante_handle(false);

        next.run(new_ctx, tx, simulate)
    }
}

/// Ethereum txs may carry nothing but the Ethereum tx marker option
#[derive(Clone)]
pub struct DualLaneExtensionOptionsDecorator {
    cd: ExtensionOptionsDecorator,
}

impl DualLaneExtensionOptionsDecorator {
    pub fn new(cd: ExtensionOptionsDecorator) -> DualLaneExtensionOptionsDecorator {
        DualLaneExtensionOptionsDecorator { cd }
    }
}

impl AnteDecorator for DualLaneExtensionOptionsDecorator {
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
        if !is_ethereum_tx(tx) {
            return Err(ErrorKind::UnknownExtensionOptions.into());
        }
        next.run(ctx, tx, simulate)
    }
}

/// Stateless checks. Cosmos txs must not smuggle a `MsgEthereumTx` next to other messages,
/// Ethereum txs must leave every Cosmos only field empty and declare exactly the fee and gas of
/// the embedded transaction.
#[derive(Clone)]
pub struct DualLaneValidateBasicDecorator {
    evm_keeper: Arc<dyn EvmKeeper>,
    cd: ValidateBasicDecorator,
}

impl DualLaneValidateBasicDecorator {
    pub fn new(
        evm_keeper: Arc<dyn EvmKeeper>,
        cd: ValidateBasicDecorator,
    ) -> DualLaneValidateBasicDecorator {
        DualLaneValidateBasicDecorator { evm_keeper, cd }
    }

    fn validate_ethereum_tx(&self, tx: &Tx) -> AnteResult<()> {
        if !is_ethereum_tx(tx) {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                "transaction has single MsgEthereumTx but is not a valid Ethereum tx",
            ));
        }

        // the signature lives inside the embedded transaction
        if let Err(e) = tx.validate_basic() {
            if !e.is(ErrorKind::NoSignatures) {
                return Err(e.wrap("tx basic validation failed"));
            }
        }

        let auth_info = &tx.auth_info;
        if !auth_info.signer_infos.is_empty() {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                "for ETH txs, AuthInfo SignerInfos should be empty",
            ));
        }
        if let Some(fee) = &auth_info.fee {
            if !fee.payer.is_empty() || !fee.granter.is_empty() {
                return Err(AnteError::new(
                    ErrorKind::InvalidRequest,
                    "for ETH txs, AuthInfo Fee payer and granter should be empty",
                ));
            }
        }
        if !tx.signatures.is_empty() {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                "for ETH txs, Signatures should be empty",
            ));
        }

        let msg = single_ethereum_msg(tx).ok_or_else(|| {
            AnteError::new(ErrorKind::InvalidRequest, "missing MsgEthereumTx")
        })?;
        msg.validate_basic()
            .map_err(|e| e.wrap("msg basic validation failed"))?;

        let params = self.evm_keeper.get_params();
        let eth_tx = &msg.tx;
        if recover_sender(eth_tx, self.evm_keeper.chain_id()).is_err() {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                "cannot cast to Ethereum core message",
            ));
        }

        if !params.enable_create && eth_tx.is_contract_creation() {
            return Err(AnteError::new(
                ErrorKind::CreateDisabled,
                "failed to create new contract",
            ));
        } else if !params.enable_call && !eth_tx.is_contract_creation() {
            return Err(AnteError::new(
                ErrorKind::CallDisabled,
                "failed to call contract",
            ));
        }

        if !is_protected(eth_tx) {
            return Err(AnteError::new(
                ErrorKind::NotSupported,
                "unprotected Ethereum tx is not allowed",
            ));
        }

        let fee_amount = eth_tx_fee(eth_tx)
            .ok_or_else(|| AnteError::new(ErrorKind::InvalidGasFee, "out of bound"))?;
        let expected_fee = new_coins(vec![Coin::new(fee_amount, params.evm_denom)]);
        if tx.fee() != expected_fee.as_slice() {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                format!(
                    "invalid AuthInfo Fee Amount ({} != {})",
                    coins_to_string(tx.fee()),
                    coins_to_string(&expected_fee)
                ),
            ));
        }

        let eth_tx_gas_limit = eth_tx_gas(eth_tx);
        if tx.gas() != eth_tx_gas_limit {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                format!(
                    "invalid AuthInfo Fee GasLimit ({} != {})",
                    tx.gas(),
                    eth_tx_gas_limit
                ),
            ));
        }
        Ok(())
    }
}

impl AnteDecorator for DualLaneValidateBasicDecorator {
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

        if !has_single_ethereum_message(tx) {
            if tx.messages().iter().any(|m| m.is_ethereum()) {
                return Err(AnteError::new(
                    ErrorKind::Logic,
                    "MsgEthereumTx is not allowed to combine with other messages",
                ));
            }
            return self.cd.ante_handle(ctx, tx, simulate, next);
        }

        self.validate_ethereum_tx(tx)?;
        next.run(ctx, tx, simulate)
    }
}

/// Timeout heights are a Cosmos concept, Ethereum txs must leave it at zero
#[derive(Clone)]
pub struct DualLaneTxTimeoutHeightDecorator {
    cd: TxTimeoutHeightDecorator,
}

impl DualLaneTxTimeoutHeightDecorator {
    pub fn new(cd: TxTimeoutHeightDecorator) -> DualLaneTxTimeoutHeightDecorator {
        DualLaneTxTimeoutHeightDecorator { cd }
    }
}

impl AnteDecorator for DualLaneTxTimeoutHeightDecorator {
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
        if tx.timeout_height() != 0 {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                "for ETH txs, TimeoutHeight should be zero",
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

#[derive(Clone)]
pub struct DualLaneValidateMemoDecorator {
    cd: ValidateMemoDecorator,
}

impl DualLaneValidateMemoDecorator {
    pub fn new(cd: ValidateMemoDecorator) -> DualLaneValidateMemoDecorator {
        DualLaneValidateMemoDecorator { cd }
    }
}

impl AnteDecorator for DualLaneValidateMemoDecorator {
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
        if !tx.memo().is_empty() {
            return Err(AnteError::new(
                ErrorKind::InvalidRequest,
                "for ETH txs, memo should be empty",
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simapp::{SimApp, TxBuilder};
    use crate::type_urls::{EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL, MSG_SEND_TYPE_URL};
    use crate::types::{ExecMode, TxMsg};
    use crate::utils::sign_unprotected;
    use clarity::Address as EthAddress;
    use num256::Uint256;

    fn any(type_url: &str) -> Any {
        Any {
            type_url: type_url.to_string(),
            value: Vec::new(),
        }
    }

    fn validate(app: &SimApp, ctx: Context, tx: &Tx) -> AnteResult<Context> {
        DualLaneValidateBasicDecorator::new(app.evm_keeper.clone(), ValidateBasicDecorator::new())
            .ante_handle(ctx, tx, false, Next::terminator())
    }

    fn transfer(app: &SimApp) -> (crate::simapp::TestAccount, Tx) {
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let to = app.new_account(0u8.into());
        let tx = app.ethereum_tx(
            &sender,
            app.legacy_tx(0, app.base_fee(), 21000, to.eth_address, 1u8.into()),
        );
        (sender, tx)
    }

    #[test]
    fn ethereum_setup_uses_infinite_meter_and_resets_flags() {
        let app = SimApp::default();
        let (_, tx) = transfer(&app);
        app.evm_keeper
            .set_flag_sender_nonce_increased_by_ante_handle(true);
        app.evm_keeper.set_flag_sender_paid_tx_fee_in_ante_handle(true);

        let decorator = DualLaneSetupContextDecorator::new(
            app.evm_keeper.clone(),
            SetUpContextDecorator::new(),
        );
        let out = decorator
            .ante_handle(app.context(5, ExecMode::CheckTx), &tx, false, Next::terminator())
            .unwrap();
        assert!(out.gas_meter().is_infinite());
        assert!(out.kv_gas_config().is_zero());
        assert!(out.transient_kv_gas_config().is_zero());
        assert!(!app.evm_keeper.is_sender_nonce_increased_by_ante_handle());
        assert!(!app.evm_keeper.is_sender_paid_tx_fee_in_ante_handle());

        // cosmos txs get the declared gas limit
        let sender = app.new_account(0u8.into());
        let cosmos = TxBuilder::new()
            .cosmos_message(any(MSG_SEND_TYPE_URL), sender.address)
            .gas(123_456)
            .build();
        let out = decorator
            .ante_handle(app.context(5, ExecMode::CheckTx), &cosmos, false, Next::terminator())
            .unwrap();
        assert_eq!(out.gas_meter().limit(), 123_456);
        assert!(!out.kv_gas_config().is_zero());
    }

    #[test]
    fn ethereum_tx_extension_options() {
        let app = SimApp::default();
        let (_, mut tx) = transfer(&app);
        let decorator = DualLaneExtensionOptionsDecorator::new(ExtensionOptionsDecorator::new(
            Arc::new(only_allow_dynamic_fee_extension_option_for_cosmos_txs),
        ));
        let ctx = app.context(5, ExecMode::CheckTx);
        assert!(decorator
            .ante_handle(ctx.clone(), &tx, false, Next::terminator())
            .is_ok());

        tx.body.extension_options = vec![any(EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL)];
        let err = decorator
            .ante_handle(ctx.clone(), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err.is(ErrorKind::UnknownExtensionOptions));

        tx.body.extension_options = vec![any(EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL)];
        tx.body.non_critical_extension_options = vec![any("/some.Option")];
        assert!(decorator
            .ante_handle(ctx.clone(), &tx, false, Next::terminator())
            .is_err());

        // the dynamic fee option is fine on cosmos txs
        let cosmos = TxBuilder::new()
            .cosmos_message(any(MSG_SEND_TYPE_URL), app.new_account(0u8.into()).address)
            .extension_option(any(EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL))
            .build();
        assert!(decorator
            .ante_handle(ctx, &cosmos, false, Next::terminator())
            .is_ok());
    }

    #[test]
    fn valid_ethereum_tx_passes_validate_basic() {
        let app = SimApp::default();
        let (_, tx) = transfer(&app);
        assert!(validate(&app, app.context(5, ExecMode::CheckTx), &tx).is_ok());
    }

    #[test]
    fn mixed_messages_are_a_logic_error() {
        let app = SimApp::default();
        let (sender, eth) = transfer(&app);
        let mut tx = eth.clone();
        tx.body.messages.push(eth.body.messages[0].clone());
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.is(ErrorKind::Logic));
        assert!(err
            .to_string()
            .starts_with("MsgEthereumTx is not allowed to combine with other messages"));

        let mut tx = eth;
        tx.body.messages.push(TxMsg::Cosmos(crate::types::CosmosMsg::new(
            any(MSG_SEND_TYPE_URL),
            vec![sender.address],
        )));
        assert!(validate(&app, app.context(5, ExecMode::DeliverTx), &tx)
            .unwrap_err()
            .is(ErrorKind::Logic));

        // recheck skips the stage entirely
        assert!(validate(&app, app.context(5, ExecMode::ReCheckTx), &tx).is_ok());
    }

    #[test]
    fn ethereum_tx_must_leave_cosmos_fields_empty() {
        let app = SimApp::default();
        let (sender, eth) = transfer(&app);

        let mut tx = eth.clone();
        tx.signatures = vec![vec![1u8; 65]];
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.to_string().contains("Signatures should be empty"));

        let mut tx = eth.clone();
        if let Some(fee) = tx.auth_info.fee.as_mut() {
            fee.payer = sender.address.to_string();
        }
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.is(ErrorKind::InvalidRequest));

        let mut tx = eth;
        tx.auth_info.signer_infos = vec![crate::types::tx::single_signature(
            sender.pub_key.clone(),
            Vec::new(),
            0,
        )];
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("for ETH txs, AuthInfo SignerInfos should be empty"));
    }

    #[test]
    fn declared_fee_and_gas_must_match_embedded_tx() {
        let app = SimApp::default();
        let (_, eth) = transfer(&app);

        let mut tx = eth.clone();
        if let Some(fee) = tx.auth_info.fee.as_mut() {
            fee.amount[0].amount = fee.amount[0].amount + Uint256::from(1u8);
        }
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.to_string().starts_with("invalid AuthInfo Fee Amount ("));

        let mut tx = eth;
        if let Some(fee) = tx.auth_info.fee.as_mut() {
            fee.gas_limit += 1;
        }
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid AuthInfo Fee GasLimit (21001 != 21000): invalid request"
        );
    }

    #[test]
    fn unprotected_and_disabled_features_rejected() {
        let app = SimApp::default();
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let unsigned = app.legacy_tx(0, app.base_fee(), 21000, EthAddress::default(), 0u8.into());
        // a zero recipient is a contract creation
        let mut params = app.evm_keeper.get_params();
        params.enable_create = false;
        app.evm_keeper.set_params(params.clone());
        let tx = app.ethereum_tx(&sender, unsigned.clone());
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.is(ErrorKind::CreateDisabled));

        params.enable_create = true;
        params.enable_call = false;
        app.evm_keeper.set_params(params.clone());
        let to = app.new_account(0u8.into());
        let call = app.ethereum_tx(
            &sender,
            app.legacy_tx(0, app.base_fee(), 21000, to.eth_address, 0u8.into()),
        );
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &call).unwrap_err();
        assert!(err.is(ErrorKind::CallDisabled));

        params.enable_call = true;
        app.evm_keeper.set_params(params);
        let unprotected = sign_unprotected(
            &app.legacy_tx(0, app.base_fee(), 21000, to.eth_address, 0u8.into()),
            &sender.eth_key,
        )
        .unwrap();
        let tx = app.wrap_signed_ethereum_tx(&sender, unprotected);
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.is(ErrorKind::NotSupported));
    }

    #[test]
    fn wrong_chain_id_cannot_be_cast() {
        let app = SimApp::default();
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let to = app.new_account(0u8.into());
        let signed = app
            .legacy_tx(0, app.base_fee(), 21000, to.eth_address, 0u8.into())
            .sign(&sender.eth_key, Some(1));
        let tx = app.wrap_signed_ethereum_tx(&sender, signed);
        let err = validate(&app, app.context(5, ExecMode::CheckTx), &tx).unwrap_err();
        assert!(err.is(ErrorKind::InvalidRequest));
        assert!(err
            .to_string()
            .starts_with("cannot cast to Ethereum core message"));
    }

    #[test]
    fn memo_and_timeout_height_are_cosmos_only() {
        let app = SimApp::default();
        let (sender, eth) = transfer(&app);
        let ctx = app.context(5, ExecMode::CheckTx);

        let memo = DualLaneValidateMemoDecorator::new(ValidateMemoDecorator::new(
            app.account_keeper.clone(),
        ));
        let timeout = DualLaneTxTimeoutHeightDecorator::new(TxTimeoutHeightDecorator::new());

        let mut tx = eth.clone();
        tx.body.memo = "hello".to_string();
        let err = memo
            .ante_handle(ctx.clone(), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err.to_string().starts_with("for ETH txs, memo should be empty"));

        let mut tx = eth;
        tx.body.timeout_height = 100;
        let err = timeout
            .ante_handle(ctx.clone(), &tx, false, Next::terminator())
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("for ETH txs, TimeoutHeight should be zero"));

        let cosmos = TxBuilder::new()
            .cosmos_message(any(MSG_SEND_TYPE_URL), sender.address)
            .memo("hello".to_string())
            .timeout_height(100)
            .build();
        assert!(memo
            .ante_handle(ctx.clone(), &cosmos, false, Next::terminator())
            .is_ok());
        assert!(timeout
            .ante_handle(ctx, &cosmos, false, Next::terminator())
            .is_ok());
    }
}
