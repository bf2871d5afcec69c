use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::VAuthKeeper;
use crate::lane::has_single_ethereum_message;
use crate::type_urls::{
    MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL, MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL,
    MSG_CREATE_VESTING_ACCOUNT_TYPE_URL,
};
use crate::types::{Context, Tx, TxMsg};
use crate::utils::decode_any;
use althea_proto::cosmos_sdk_proto::cosmos::vesting::v1beta1::{
    MsgCreatePeriodicVestingAccount, MsgCreatePermanentLockedAccount, MsgCreateVestingAccount,
};
use deep_space::Address;
use prost::DecodeError;
use prost_types::Any;
use std::sync::Arc;

/// Name of the module holding the externally owned account proofs
pub const VAUTH_MODULE_NAME: &str = "vauth";

/// The account a vesting creation message targets, `None` for any other message
fn vesting_target(msg: &Any) -> Option<Result<String, DecodeError>> {
    let any = msg.clone();
    match msg.type_url.as_str() {
        MSG_CREATE_VESTING_ACCOUNT_TYPE_URL => {
            Some(decode_any::<MsgCreateVestingAccount>(any).map(|m| m.to_address))
        }
        MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL => {
            Some(decode_any::<MsgCreatePeriodicVestingAccount>(any).map(|m| m.to_address))
        }
        MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL => {
            Some(decode_any::<MsgCreatePermanentLockedAccount>(any).map(|m| m.to_address))
        }
        _ => None,
    }
}

/// Vesting accounts may only be created for addresses that proved they are externally owned,
/// otherwise funds could be locked into module or contract addresses
#[derive(Clone)]
pub struct CosmosLaneVestingMessagesAuthorizationDecorator {
    vauth_keeper: Arc<dyn VAuthKeeper>,
}

impl CosmosLaneVestingMessagesAuthorizationDecorator {
    pub fn new(vauth_keeper: Arc<dyn VAuthKeeper>) -> CosmosLaneVestingMessagesAuthorizationDecorator {
        CosmosLaneVestingMessagesAuthorizationDecorator { vauth_keeper }
    }
}

impl AnteDecorator for CosmosLaneVestingMessagesAuthorizationDecorator {
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

        for msg in tx.messages() {
            let any = match msg {
                TxMsg::Cosmos(m) => &m.msg,
                TxMsg::Ethereum(_) => continue,
            };
            let account = match vesting_target(any) {
                Some(Ok(account)) => account,
                Some(Err(e)) => return Err(AnteError::new(ErrorKind::TxDecode, e)),
                None => continue,
            };
            let address = Address::from_bech32(account.clone()).map_err(|e| {
                AnteError::new(
                    ErrorKind::InvalidAddress,
                    format!("invalid vesting account address {}: {}", account, e),
                )
            })?;

            if self.vauth_keeper.has_proof_external_owned_account(&address) {
                continue;
            }
            return Err(AnteError::new(
                ErrorKind::Unauthorized,
                format!(
                    "must prove account is external owned account (EOA) via `x/{}` module before able to create vesting account: {}",
                    VAUTH_MODULE_NAME, account
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
    use crate::types::ExecMode;
    use crate::utils::encode_any;

    #[test]
    fn vesting_requires_eoa_proof() {
        let app = SimApp::default();
        let funder = app.new_account(0u8.into());
        let target = app.new_account(0u8.into());
        let decorator = CosmosLaneVestingMessagesAuthorizationDecorator::new(app.vauth_keeper.clone());
        let msgs = vec![
            encode_any(
                MsgCreateVestingAccount {
                    from_address: funder.address.to_string(),
                    to_address: target.address.to_string(),
                    amount: Vec::new(),
                    end_time: 100,
                    delayed: false,
                },
                MSG_CREATE_VESTING_ACCOUNT_TYPE_URL,
            ),
            encode_any(
                MsgCreatePermanentLockedAccount {
                    from_address: funder.address.to_string(),
                    to_address: target.address.to_string(),
                    amount: Vec::new(),
                },
                MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL,
            ),
            encode_any(
                MsgCreatePeriodicVestingAccount {
                    from_address: funder.address.to_string(),
                    to_address: target.address.to_string(),
                    start_time: 0,
                    vesting_periods: Vec::new(),
                },
                MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL,
            ),
        ];

        for msg in msgs.iter() {
            let tx = TxBuilder::new()
                .cosmos_message(msg.clone(), funder.address)
                .build();
            let err = decorator
                .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
                .unwrap_err();
            assert!(err.is(ErrorKind::Unauthorized));
            assert!(err.to_string().contains("via `x/vauth` module"));
            assert!(err.to_string().contains(&target.address.to_string()));
        }

        app.vauth_keeper.add_proof(target.address);
        for msg in msgs {
            let tx = TxBuilder::new().cosmos_message(msg, funder.address).build();
            decorator
                .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
                .unwrap();
        }
    }
}
