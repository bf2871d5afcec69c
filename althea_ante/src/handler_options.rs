use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{
    AccountKeeper, BankKeeper, EvmKeeper, ExtensionOptionChecker, FeeMarketKeeper,
    FeegrantKeeper, IbcKeeper, SignModeHandler, SignatureVerificationGasConsumer, TxFeeChecker,
    VAuthKeeper,
};
use crate::type_urls::{
    MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL, MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL,
    MSG_CREATE_VESTING_ACCOUNT_TYPE_URL, MSG_ETHEREUM_TX_TYPE_URL,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Message types that may never be granted through or executed by `x/authz`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledNestedMsgs {
    type_urls: BTreeSet<String>,
}

impl DisabledNestedMsgs {
    pub fn new<I, S>(type_urls: I) -> AnteResult<DisabledNestedMsgs>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let type_urls: BTreeSet<String> = type_urls.into_iter().map(Into::into).collect();
        if type_urls.is_empty() {
            return Err(AnteError::new(
                ErrorKind::Logic,
                "disabled nested msgs is required for AnteHandler",
            ));
        }
        Ok(DisabledNestedMsgs { type_urls })
    }

    pub fn contains(&self, type_url: &str) -> bool {
        self.type_urls.contains(type_url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.type_urls.iter().map(String::as_str)
    }
}

pub fn default_disabled_nested_msgs() -> Vec<String> {
    vec![
        MSG_ETHEREUM_TX_TYPE_URL.to_string(),
        MSG_CREATE_VESTING_ACCOUNT_TYPE_URL.to_string(),
        MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL.to_string(),
        MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL.to_string(),
    ]
}

/// The keepers and strategies the ante handler is assembled from. Every field but the fee
/// grant keeper is required.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    pub account_keeper: Option<Arc<dyn AccountKeeper>>,
    pub bank_keeper: Option<Arc<dyn BankKeeper>>,
    pub feegrant_keeper: Option<Arc<dyn FeegrantKeeper>>,
    pub ibc_keeper: Option<Arc<dyn IbcKeeper>>,
    pub fee_market_keeper: Option<Arc<dyn FeeMarketKeeper>>,
    pub evm_keeper: Option<Arc<dyn EvmKeeper>>,
    pub vauth_keeper: Option<Arc<dyn VAuthKeeper>>,
    pub extension_option_checker: Option<ExtensionOptionChecker>,
    pub sign_mode_handler: Option<Arc<dyn SignModeHandler>>,
    pub sig_gas_consumer: Option<SignatureVerificationGasConsumer>,
    pub tx_fee_checker: Option<TxFeeChecker>,
    pub disabled_nested_msgs: Vec<String>,
}

/// [`HandlerOptions`] after validation, nothing required is missing
#[derive(Clone)]
pub struct ValidatedHandlerOptions {
    pub account_keeper: Arc<dyn AccountKeeper>,
    pub bank_keeper: Arc<dyn BankKeeper>,
    pub feegrant_keeper: Option<Arc<dyn FeegrantKeeper>>,
    pub ibc_keeper: Arc<dyn IbcKeeper>,
    pub fee_market_keeper: Arc<dyn FeeMarketKeeper>,
    pub evm_keeper: Arc<dyn EvmKeeper>,
    pub vauth_keeper: Arc<dyn VAuthKeeper>,
    pub extension_option_checker: ExtensionOptionChecker,
    pub sign_mode_handler: Arc<dyn SignModeHandler>,
    pub sig_gas_consumer: SignatureVerificationGasConsumer,
    pub tx_fee_checker: TxFeeChecker,
    pub disabled_nested_msgs: Arc<DisabledNestedMsgs>,
}

fn required<T: Clone>(value: &Option<T>, name: &str) -> AnteResult<T> {
    value.clone().ok_or_else(|| {
        AnteError::new(
            ErrorKind::Logic,
            format!("{} is required for AnteHandler", name),
        )
    })
}

impl HandlerOptions {
    pub fn with_default_disabled_nested_msgs(mut self) -> HandlerOptions {
        self.disabled_nested_msgs = default_disabled_nested_msgs();
        self
    }

    /// Checks that every required collaborator is present
    pub fn validate(&self) -> AnteResult<ValidatedHandlerOptions> {
        Ok(ValidatedHandlerOptions {
            account_keeper: required(&self.account_keeper, "account keeper")?,
            bank_keeper: required(&self.bank_keeper, "bank keeper")?,
            feegrant_keeper: self.feegrant_keeper.clone(),
            ibc_keeper: required(&self.ibc_keeper, "ibc keeper")?,
            fee_market_keeper: required(&self.fee_market_keeper, "fee market keeper")?,
            evm_keeper: required(&self.evm_keeper, "evm keeper")?,
            extension_option_checker: required(
                &self.extension_option_checker,
                "extension option checker",
            )?,
            vauth_keeper: required(&self.vauth_keeper, "vauth keeper")?,
            sig_gas_consumer: required(&self.sig_gas_consumer, "signature gas consumer")?,
            sign_mode_handler: required(&self.sign_mode_handler, "sign mode handler")?,
            tx_fee_checker: required(&self.tx_fee_checker, "tx fee checker")?,
            disabled_nested_msgs: Arc::new(DisabledNestedMsgs::new(
                self.disabled_nested_msgs.iter().cloned(),
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_fail_on_first_missing_keeper() {
        let err = HandlerOptions::default().validate().err().unwrap();
        assert!(err.is(ErrorKind::Logic));
        assert_eq!(
            err.to_string(),
            "account keeper is required for AnteHandler: internal logic error"
        );
    }

    #[test]
    fn disabled_nested_msgs_must_not_be_empty() {
        let err = DisabledNestedMsgs::new(Vec::<String>::new()).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("disabled nested msgs is required for AnteHandler"));

        let options = HandlerOptions::default().with_default_disabled_nested_msgs();
        let set = DisabledNestedMsgs::new(options.disabled_nested_msgs).unwrap();
        assert!(set.contains(MSG_ETHEREUM_TX_TYPE_URL));
        assert!(set.contains(MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL));
        assert_eq!(set.iter().count(), 4);
    }
}
