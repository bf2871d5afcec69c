use crate::utils::{assert_rejected, get_funded_account, get_sim_app, run_ante, signed_cosmos_tx};
use althea_ante::error::ErrorKind;
use althea_ante::simapp::TestAccount;
use althea_ante::type_urls::{
    MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL, MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL,
    MSG_CREATE_VESTING_ACCOUNT_TYPE_URL,
};
use althea_ante::types::ExecMode;
use althea_ante::utils::encode_any;
use althea_proto::cosmos_sdk_proto::cosmos::vesting::v1beta1::{
    MsgCreatePeriodicVestingAccount, MsgCreatePermanentLockedAccount, MsgCreateVestingAccount,
};
use prost_types::Any;

fn vesting_msgs(from: &TestAccount, to: &TestAccount) -> Vec<Any> {
    vec![
        encode_any(
            MsgCreateVestingAccount {
                from_address: from.address.to_string(),
                to_address: to.address.to_string(),
                amount: Vec::new(),
                end_time: 1_900_000_000,
                delayed: true,
            },
            MSG_CREATE_VESTING_ACCOUNT_TYPE_URL,
        ),
        encode_any(
            MsgCreatePeriodicVestingAccount {
                from_address: from.address.to_string(),
                to_address: to.address.to_string(),
                start_time: 1_800_000_000,
                vesting_periods: Vec::new(),
            },
            MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL,
        ),
        encode_any(
            MsgCreatePermanentLockedAccount {
                from_address: from.address.to_string(),
                to_address: to.address.to_string(),
                amount: Vec::new(),
            },
            MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL,
        ),
    ]
}

/// Every kind of vesting account creation needs the target to have proven it is externally
/// owned through x/vauth
pub fn vesting_test() {
    let app = get_sim_app();
    let funder = get_funded_account(&app);
    let target = app.unregistered_account();

    for msg in vesting_msgs(&funder, &target) {
        info!("Creating a vesting account with {}", msg.type_url);
        let tx = signed_cosmos_tx(&app, &funder, vec![msg]);
        assert_rejected(
            run_ante(&app, ExecMode::DeliverTx, &tx, false),
            ErrorKind::Unauthorized,
            "must prove account is external owned account (EOA)",
        );
    }

    info!("Proving {} is externally owned", target.address);
    app.vauth_keeper.add_proof(target.address);
    let tx = signed_cosmos_tx(&app, &funder, vesting_msgs(&funder, &target));
    run_ante(&app, ExecMode::DeliverTx, &tx, false).expect("Proven target rejected");
    info!("Successfully completed the vesting test");
}
