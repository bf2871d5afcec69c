use crate::utils::{
    assert_rejected, block_context, get_funded_account, get_sim_app, run_ante, send_msg,
    signed_cosmos_tx,
};
use althea_ante::error::{AnteResult, ErrorKind};
use althea_ante::keepers::FeeMarketKeeper;
use althea_ante::simapp::SimApp;
use althea_ante::types::coin::uint256_to_bigint;
use althea_ante::types::{Context, DecCoin, ExecMode, Tx};
use num::{BigInt, BigRational};
use num256::Uint256;

/// The required gas price is the highest of the base fee, the node's own minimum (only while
/// admitting to the mempool) and the chain wide minimum
pub fn min_gas_price_test() {
    let app = get_sim_app();
    let sender = get_funded_account(&app);
    let base_fee = app.base_fee();

    info!("Raising the global minimum gas price above the base fee");
    let mut params = app.fee_market_keeper.get_params();
    params.min_gas_price = BigRational::from_integer(uint256_to_bigint(&base_fee) * 2);
    app.fee_market_keeper.set_params(params.clone());

    let cosmos = signed_cosmos_tx(&app, &sender, vec![send_msg()]);
    assert_rejected(
        run_ante(&app, ExecMode::DeliverTx, &cosmos, false),
        ErrorKind::InsufficientFee,
        "gas prices lower than minimum global fee",
    );
    let eth = app.ethereum_tx(
        &sender,
        app.legacy_tx(0, base_fee, 21000, sender.eth_address, 0u8.into()),
    );
    assert_rejected(
        run_ante(&app, ExecMode::DeliverTx, &eth, false),
        ErrorKind::InsufficientFee,
        "gas prices lower than minimum global fee",
    );

    info!("Relying on the node configured minimum gas price");
    params.min_gas_price = BigRational::from_integer(BigInt::from(0u8));
    app.fee_market_keeper.set_params(params);
    let node_min = vec![DecCoin::new(
        app.evm_denom(),
        BigRational::from_integer(uint256_to_bigint(&base_fee) * 3),
    )];
    assert_rejected(
        run_with_node_min(&app, ExecMode::CheckTx, &cosmos, &node_min),
        ErrorKind::InsufficientFee,
        "gas prices lower than node config",
    );
    // the node's own minimum does not apply to block execution or rechecks
    let ctx = run_with_node_min(&app, ExecMode::ReCheckTx, &cosmos, &node_min)
        .expect("Recheck should ignore the node minimum");
    assert_eq!(Uint256::from(ctx.priority() as u64), base_fee);
    let next = signed_cosmos_tx(&app, &sender, vec![send_msg()]);
    run_with_node_min(&app, ExecMode::DeliverTx, &next, &node_min)
        .expect("Block execution should ignore the node minimum");
    assert_eq!(app.sequence(&sender), 2);
    info!("Successfully completed the min gas price test");
}

fn run_with_node_min(
    app: &SimApp,
    mode: ExecMode,
    tx: &Tx,
    node_min: &[DecCoin],
) -> AnteResult<Context> {
    let handler = app.ante_handler().expect("Invalid handler options");
    let ctx = block_context(app, mode, tx).with_min_gas_prices(node_min.to_vec());
    handler.handle(ctx, tx, false)
}
