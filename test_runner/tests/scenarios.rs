use test_runner::tests::authz_nesting::authz_nesting_test;
use test_runner::tests::eth_only_fields::eth_only_fields_test;
use test_runner::tests::legacy_transfer::legacy_transfer_test;
use test_runner::tests::message_mixing::message_mixing_test;
use test_runner::tests::min_gas_price::min_gas_price_test;
use test_runner::tests::simulation::simulation_test;
use test_runner::tests::vesting::vesting_test;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn legacy_transfer() {
    init_logging();
    legacy_transfer_test();
}

#[test]
fn message_mixing() {
    init_logging();
    message_mixing_test();
}

#[test]
fn eth_only_fields() {
    init_logging();
    eth_only_fields_test();
}

#[test]
fn min_gas_price() {
    init_logging();
    min_gas_price_test();
}

#[test]
fn authz_nesting() {
    init_logging();
    authz_nesting_test();
}

#[test]
fn vesting() {
    init_logging();
    vesting_test();
}

#[test]
fn simulation() {
    init_logging();
    simulation_test();
}
