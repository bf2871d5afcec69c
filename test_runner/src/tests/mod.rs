pub mod authz_nesting;
pub mod min_gas_price;
pub mod vesting;
