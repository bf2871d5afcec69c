use crate::utils::{
    assert_rejected, get_funded_account, get_sim_app, run_ante, send_msg, signed_cosmos_tx,
};
use althea_ante::error::ErrorKind;
use althea_ante::simapp::TestAccount;
use althea_ante::type_urls::{
    GENERIC_AUTHORIZATION_TYPE_URL, MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL,
    MSG_ETHEREUM_TX_TYPE_URL, MSG_EXEC_TYPE_URL, MSG_GRANT_TYPE_URL, MSG_SEND_TYPE_URL,
};
use althea_ante::types::ExecMode;
use althea_ante::utils::encode_any;
use althea_proto::cosmos_sdk_proto::cosmos::authz::v1beta1::{
    GenericAuthorization, Grant, MsgExec, MsgGrant,
};
use prost_types::Any;

fn exec(grantee: &TestAccount, msgs: Vec<Any>) -> Any {
    encode_any(
        MsgExec {
            grantee: grantee.address.to_string(),
            msgs,
        },
        MSG_EXEC_TYPE_URL,
    )
}

fn grant_generic(granter: &TestAccount, grantee: &TestAccount, msg: &str) -> Any {
    let authorization = encode_any(
        GenericAuthorization {
            msg: msg.to_string(),
        },
        GENERIC_AUTHORIZATION_TYPE_URL,
    );
    encode_any(
        MsgGrant {
            granter: granter.address.to_string(),
            grantee: grantee.address.to_string(),
            grant: Some(Grant {
                authorization: Some(authorization),
                expiration: None,
            }),
        },
        MSG_GRANT_TYPE_URL,
    )
}

/// Ethereum txs and vesting account creation can neither be granted through authz nor executed
/// from inside a MsgExec, and MsgExec nesting is capped
pub fn authz_nesting_test() {
    let app = get_sim_app();
    let granter = get_funded_account(&app);
    let grantee = get_funded_account(&app);

    info!("Granting and executing plain sends");
    let ok = signed_cosmos_tx(
        &app,
        &granter,
        vec![grant_generic(&granter, &grantee, MSG_SEND_TYPE_URL)],
    );
    run_ante(&app, ExecMode::DeliverTx, &ok, false).expect("Plain grant rejected");
    let ok = signed_cosmos_tx(&app, &grantee, vec![exec(&grantee, vec![send_msg()])]);
    run_ante(&app, ExecMode::DeliverTx, &ok, false).expect("Plain exec rejected");

    for disabled in [MSG_ETHEREUM_TX_TYPE_URL, MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL] {
        info!("Granting {}", disabled);
        let tx = signed_cosmos_tx(
            &app,
            &granter,
            vec![grant_generic(&granter, &grantee, disabled)],
        );
        assert_rejected(
            run_ante(&app, ExecMode::DeliverTx, &tx, false),
            ErrorKind::Unauthorized,
            "not allowed to grant",
        );

        info!("Executing {} through MsgExec", disabled);
        let nested = Any {
            type_url: disabled.to_string(),
            value: Vec::new(),
        };
        let tx = signed_cosmos_tx(&app, &grantee, vec![exec(&grantee, vec![nested])]);
        assert_rejected(
            run_ante(&app, ExecMode::DeliverTx, &tx, false),
            ErrorKind::NotSupported,
            "not allowed to be nested message",
        );
    }

    info!("Nesting MsgExec past the limit");
    let mut msg = send_msg();
    for _ in 0..2 {
        msg = exec(&grantee, vec![msg]);
    }
    let tx = signed_cosmos_tx(&app, &grantee, vec![msg.clone()]);
    run_ante(&app, ExecMode::DeliverTx, &tx, false).expect("Three levels should be allowed");
    let tx = signed_cosmos_tx(&app, &grantee, vec![exec(&grantee, vec![msg])]);
    assert_rejected(
        run_ante(&app, ExecMode::DeliverTx, &tx, false),
        ErrorKind::NotSupported,
        "nested level: 4/3",
    );
    info!("Successfully completed the authz nesting test");
}
