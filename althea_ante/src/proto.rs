//! Protobuf definitions for extension options the ante pipeline inspects that are not shipped
//! by `althea_proto`. Everything else (authz, bank, vesting, ethermint evm) is used from
//! `althea_proto` and its `cosmos_sdk_proto` re-export.

// THIRD PARTY PROTOS MANAGED IN THIS REPO
pub mod ethermint {
    pub mod types {
        pub mod v1 {
            include!("prost/ethermint.types.v1.rs");
        }
    }
}
