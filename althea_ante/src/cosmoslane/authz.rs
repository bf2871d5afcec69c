use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::handler_options::DisabledNestedMsgs;
use crate::lane::has_single_ethereum_message;
use crate::type_urls::{
    GENERIC_AUTHORIZATION_TYPE_URL, MSG_EXEC_TYPE_URL, MSG_GRANT_TYPE_URL, MSG_SEND_TYPE_URL,
    MSG_TRANSFER_TYPE_URL, SEND_AUTHORIZATION_TYPE_URL, TRANSFER_AUTHORIZATION_TYPE_URL,
};
use crate::types::{Context, Tx, TxMsg};
use crate::utils::decode_any;
use althea_proto::cosmos_sdk_proto::cosmos::authz::v1beta1::{
    GenericAuthorization, MsgExec, MsgGrant,
};
use prost_types::Any;
use std::sync::Arc;

/// Cap on how deep `MsgExec` messages may be nested, the top level counts as 1
pub const MAX_NESTED_LEVELS: usize = 3;

/// Keeps disabled message types from being granted through or executed by `x/authz`
#[derive(Clone)]
pub struct CosmosLaneRejectAuthzMsgsDecorator {
    disabled_nested_msgs: Arc<DisabledNestedMsgs>,
}

impl CosmosLaneRejectAuthzMsgsDecorator {
    pub fn new(disabled_nested_msgs: Arc<DisabledNestedMsgs>) -> CosmosLaneRejectAuthzMsgsDecorator {
        CosmosLaneRejectAuthzMsgsDecorator {
            disabled_nested_msgs,
        }
    }

    fn check_disabled_msgs<'a, I>(&self, msgs: I, nested_level: usize) -> AnteResult<()>
    where
        I: IntoIterator<Item = &'a Any>,
    {
        if nested_level > MAX_NESTED_LEVELS {
            return Err(AnteError::new(
                ErrorKind::NotSupported,
                format!("nested level: {}/{}", nested_level, MAX_NESTED_LEVELS),
            ));
        }

        for msg in msgs {
            match msg.type_url.as_str() {
                MSG_EXEC_TYPE_URL => {
                    let exec: MsgExec = decode_any(msg.clone()).map_err(|e| {
                        AnteError::new(ErrorKind::Unauthorized, format!("invalid MsgExec: {}", e))
                    })?;
                    self.check_disabled_msgs(&exec.msgs, nested_level + 1)?;
                }
                MSG_GRANT_TYPE_URL => {
                    let target = grant_target(msg)?;
                    if self.disabled_nested_msgs.contains(&target) {
                        return Err(AnteError::new(
                            ErrorKind::Unauthorized,
                            format!("not allowed to grant: {}", target),
                        ));
                    }
                }
                url if nested_level > 1 && self.disabled_nested_msgs.contains(url) => {
                    return Err(AnteError::new(
                        ErrorKind::NotSupported,
                        format!("not allowed to be nested message: {}", url),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// The message type a `MsgGrant` authorizes its grantee to send
fn grant_target(msg: &Any) -> AnteResult<String> {
    let grant: MsgGrant = decode_any(msg.clone()).map_err(|e| {
        AnteError::new(ErrorKind::Unauthorized, format!("invalid MsgGrant: {}", e))
    })?;
    let authorization = grant
        .grant
        .and_then(|g| g.authorization)
        .ok_or_else(|| AnteError::new(ErrorKind::UnknownRequest, "failed to get authorization"))?;

    match authorization.type_url.as_str() {
        GENERIC_AUTHORIZATION_TYPE_URL => {
            let generic: GenericAuthorization = decode_any(authorization).map_err(|e| {
                AnteError::new(
                    ErrorKind::UnknownRequest,
                    format!("failed to get authorization: {}", e),
                )
            })?;
            Ok(generic.msg)
        }
        SEND_AUTHORIZATION_TYPE_URL => Ok(MSG_SEND_TYPE_URL.to_string()),
        TRANSFER_AUTHORIZATION_TYPE_URL => Ok(MSG_TRANSFER_TYPE_URL.to_string()),
        _ => Err(AnteError::new(
            ErrorKind::UnknownRequest,
            "failed to get authorization",
        )),
    }
}

impl AnteDecorator for CosmosLaneRejectAuthzMsgsDecorator {
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

        // a top level MsgEthereumTx is never an authz message
        let top_level = tx.messages().iter().filter_map(|m| match m {
            TxMsg::Cosmos(m) => Some(&m.msg),
            TxMsg::Ethereum(_) => None,
        });
        if let Err(e) = self.check_disabled_msgs(top_level, 1) {
            trace!("rejected authz usage: {}", e);
            return Err(e);
        }

        next.run(ctx, tx, simulate)
    }
}
