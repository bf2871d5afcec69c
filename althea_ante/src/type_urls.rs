// ethermint / evm
pub const MSG_ETHEREUM_TX_TYPE_URL: &str = "/ethermint.evm.v1.MsgEthereumTx";
pub const EXTENSION_OPTIONS_ETHEREUM_TX_TYPE_URL: &str =
    "/ethermint.evm.v1.ExtensionOptionsEthereumTx";
pub const EXTENSION_OPTION_DYNAMIC_FEE_TX_TYPE_URL: &str =
    "/ethermint.types.v1.ExtensionOptionDynamicFeeTx";

// authz
pub const GENERIC_AUTHORIZATION_TYPE_URL: &str = "/cosmos.authz.v1beta1.GenericAuthorization";
pub const MSG_GRANT_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgGrant";
pub const MSG_EXEC_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgExec";
pub const SEND_AUTHORIZATION_TYPE_URL: &str = "/cosmos.bank.v1beta1.SendAuthorization";
pub const TRANSFER_AUTHORIZATION_TYPE_URL: &str =
    "/ibc.applications.transfer.v1.TransferAuthorization";

// bank msgs
pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";

// vesting msgs
pub const MSG_CREATE_VESTING_ACCOUNT_TYPE_URL: &str =
    "/cosmos.vesting.v1beta1.MsgCreateVestingAccount";
pub const MSG_CREATE_PERIODIC_VESTING_ACCOUNT_TYPE_URL: &str =
    "/cosmos.vesting.v1beta1.MsgCreatePeriodicVestingAccount";
pub const MSG_CREATE_PERMANENT_LOCKED_ACCOUNT_TYPE_URL: &str =
    "/cosmos.vesting.v1beta1.MsgCreatePermanentLockedAccount";

// ibc-go msgs
pub const MSG_TRANSFER_TYPE_URL: &str = "/ibc.applications.transfer.v1.MsgTransfer";
pub const MSG_RECV_PACKET_TYPE_URL: &str = "/ibc.core.channel.v1.MsgRecvPacket";
pub const MSG_ACKNOWLEDGEMENT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgAcknowledgement";
pub const MSG_TIMEOUT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgTimeout";
pub const MSG_TIMEOUT_ON_CLOSE_TYPE_URL: &str = "/ibc.core.channel.v1.MsgTimeoutOnClose";
pub const MSG_UPDATE_CLIENT_TYPE_URL: &str = "/ibc.core.client.v1.MsgUpdateClient";
