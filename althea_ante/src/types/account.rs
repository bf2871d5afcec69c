use super::crypto::PubKey;
use deep_space::Address;

/// Module account receiving every deducted fee
pub const FEE_COLLECTOR_NAME: &str = "fee_collector";

/// The x/auth account record
#[derive(Debug, Clone, PartialEq)]
pub struct BaseAccount {
    pub address: Address,
    pub pub_key: Option<PubKey>,
    pub account_number: u64,
    pub sequence: u64,
}

impl BaseAccount {
    pub fn new(address: Address, account_number: u64) -> BaseAccount {
        BaseAccount {
            address,
            pub_key: None,
            account_number,
            sequence: 0,
        }
    }
}
