//! Stages that only act on Cosmos txs, a single `MsgEthereumTx` passes through untouched

mod authz;
mod eth_msgs;
mod vesting;

pub use authz::{CosmosLaneRejectAuthzMsgsDecorator, MAX_NESTED_LEVELS};
pub use eth_msgs::CosmosLaneRejectEthereumMsgsDecorator;
pub use vesting::CosmosLaneVestingMessagesAuthorizationDecorator;
