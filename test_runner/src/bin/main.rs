//! This crate runs the scenarios defined in the src/tests library module against an in memory
//! chain. The bin and lib are separate so the scenarios can also run as cargo tests.
#[macro_use]
extern crate log;

use std::env;
use test_runner::tests::authz_nesting::authz_nesting_test;
use test_runner::tests::eth_only_fields::eth_only_fields_test;
use test_runner::tests::legacy_transfer::legacy_transfer_test;
use test_runner::tests::message_mixing::message_mixing_test;
use test_runner::tests::min_gas_price::min_gas_price_test;
use test_runner::tests::simulation::simulation_test;
use test_runner::tests::vesting::vesting_test;
use test_runner::utils::get_ante_params;

const SCENARIOS: [(&str, fn()); 7] = [
    ("LEGACY_TRANSFER", legacy_transfer_test),
    ("MESSAGE_MIXING", message_mixing_test),
    ("ETH_ONLY_FIELDS", eth_only_fields_test),
    ("MIN_GAS_PRICE", min_gas_price_test),
    ("AUTHZ_NESTING", authz_nesting_test),
    ("VESTING", vesting_test),
    ("SIMULATION", simulation_test),
];

pub fn main() {
    env_logger::init();
    info!("Starting Althea ante test-runner");
    info!("Chain parameters {:?}", get_ante_params());

    let test_type = env::var("TEST_TYPE");
    info!("Starting tests with {:?}", test_type);
    if let Ok(test_type) = test_type {
        match SCENARIOS.iter().find(|(name, _)| *name == test_type) {
            Some((name, scenario)) => {
                info!("Starting {} test", name);
                scenario();
                return;
            }
            None => panic!("Unknown TEST_TYPE {}", test_type),
        }
    }

    for (name, scenario) in SCENARIOS.iter() {
        info!("Starting {} test", name);
        scenario();
    }
    info!("All scenarios passed");
}
