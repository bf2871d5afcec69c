use super::single_ethereum_msg;
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{EvmKeeper, FeeMarketKeeper, TxFeeChecker};
use crate::lane::has_single_ethereum_message;
use crate::types::coin::{
    amount_of as dec_amount_of, ceil_dec, coins_to_string, is_all_zero, is_any_gte, new_coins,
    truncate_dec,
};
use crate::types::tx::amount_of;
use crate::types::{Context, FeeMarketParams, Tx};
use crate::utils::{effective_gas_price, eth_tx_effective_fee, eth_tx_gas};
use deep_space::Coin;
use num::bigint::BigInt;
use num::rational::BigRational;
use num::Signed;
use num256::Uint256;
use num_traits::{ToPrimitive, Zero};
use std::str::FromStr;
use std::sync::Arc;

/// Picks the Ethereum or the Cosmos dynamic fee checker depending on the lane of the tx
pub fn dual_lane_fee_checker(
    evm_keeper: Arc<dyn EvmKeeper>,
    fee_market_keeper: Arc<dyn FeeMarketKeeper>,
) -> TxFeeChecker {
    let cosmos = cosmos_tx_dynamic_fee_checker(evm_keeper.clone(), fee_market_keeper.clone());
    let ethereum = ethereum_tx_dynamic_fee_checker(evm_keeper, fee_market_keeper);
    Arc::new(move |ctx: &Context, tx: &Tx| {
        if has_single_ethereum_message(tx) {
            ethereum(ctx, tx)
        } else {
            cosmos(ctx, tx)
        }
    })
}

/// Prices Cosmos txs like EIP-1559 txs. Without the dynamic fee extension option the declared
/// fee is charged as is, with it the fee is capped at `min(tip + base fee, fee / gas) * gas`.
pub fn cosmos_tx_dynamic_fee_checker(
    evm_keeper: Arc<dyn EvmKeeper>,
    fee_market_keeper: Arc<dyn FeeMarketKeeper>,
) -> TxFeeChecker {
    Arc::new(move |ctx: &Context, tx: &Tx| {
        if has_single_ethereum_message(tx) {
            panic!("wrong call");
        }
        if !tx.has_gas() {
            return Err(AnteError::new(ErrorKind::TxDecode, "Tx must be a FeeTx"));
        }

        if ctx.block_height() == 0 {
            // genesis txs
            return check_tx_fee_with_validator_min_gas_prices(ctx, tx);
        }

        let evm_denom = evm_keeper.get_params().evm_denom;
        let fee_market_params = fee_market_keeper.get_params();
        let base_fee = fee_market_params.base_fee;

        let fees = tx.fee();
        validate_single_fee(fees, &evm_denom)?;
        let fee = &fees[0];
        let gas = tx.gas();

        let effective_fee = match tx.dynamic_fee_extension()? {
            Some(ext) => {
                let gas_tip_cap = BigInt::from_str(ext.max_priority_price.trim()).map_err(|_| {
                    AnteError::new(
                        ErrorKind::TxDecode,
                        format!("invalid max priority price {}", ext.max_priority_price),
                    )
                })?;
                if gas_tip_cap.is_negative() {
                    return Err(AnteError::new(
                        ErrorKind::InsufficientFee,
                        "gas tip cap cannot be negative",
                    ));
                }

                let gas_fee_cap = if gas == 0 {
                    Uint256::zero()
                } else {
                    fee.amount / Uint256::from(gas)
                };
                // a tip beyond 256 bits always loses against the fee cap
                let effective_price = match Uint256::from_str(&gas_tip_cap.to_string()) {
                    Ok(tip) => effective_gas_price(tip, base_fee, gas_fee_cap),
                    Err(_) => gas_fee_cap,
                };
                new_coins(vec![Coin::new(
                    effective_price * Uint256::from(gas),
                    evm_denom.clone(),
                )])
            }
            None => fees.to_vec(),
        };

        let (min_gas_prices, source) =
            min_gas_prices_allowed(ctx, &fee_market_params, &evm_denom);
        let priority = tx_priority(
            amount_of(&effective_fee, &evm_denom),
            gas,
            min_gas_prices,
            source,
        )?;
        Ok((effective_fee, priority))
    })
}

/// Charges Ethereum txs the EIP-1559 effective fee of the embedded transaction
pub fn ethereum_tx_dynamic_fee_checker(
    evm_keeper: Arc<dyn EvmKeeper>,
    fee_market_keeper: Arc<dyn FeeMarketKeeper>,
) -> TxFeeChecker {
    Arc::new(move |ctx: &Context, tx: &Tx| {
        let msg = match single_ethereum_msg(tx) {
            Some(msg) if ctx.block_height() != 0 => msg,
            _ => panic!("wrong call"),
        };
        if !tx.has_gas() {
            return Err(AnteError::new(ErrorKind::TxDecode, "Tx must be a FeeTx"));
        }

        let evm_denom = evm_keeper.get_params().evm_denom;
        let fee_market_params = fee_market_keeper.get_params();

        validate_single_fee(tx.fee(), &evm_denom)?;

        let fee = eth_tx_effective_fee(&msg.tx, fee_market_params.base_fee)
            .ok_or_else(|| AnteError::new(ErrorKind::InvalidGasFee, "out of bound"))?;
        let effective_fee = new_coins(vec![Coin::new(fee, evm_denom.clone())]);

        let (min_gas_prices, source) =
            min_gas_prices_allowed(ctx, &fee_market_params, &evm_denom);
        let priority = tx_priority(
            amount_of(&effective_fee, &evm_denom),
            eth_tx_gas(&msg.tx),
            min_gas_prices,
            source,
        )?;
        Ok((effective_fee, priority))
    })
}

/// The validator local minimum gas price check, used for txs included in genesis
fn check_tx_fee_with_validator_min_gas_prices(
    ctx: &Context,
    tx: &Tx,
) -> AnteResult<(Vec<Coin>, i64)> {
    let fee_coins = tx.fee();
    let min_gas_prices = ctx.min_gas_prices();
    let gas = tx.gas();

    // local mempool policy only
    if ctx.is_check_tx() && !is_all_zero(min_gas_prices) {
        let gas_dec = BigRational::from_integer(BigInt::from(gas));
        let required_fees: Vec<Coin> = min_gas_prices
            .iter()
            .map(|gp| Coin::new(ceil_dec(&(&gp.amount * &gas_dec)), gp.denom.clone()))
            .collect();

        if !is_any_gte(fee_coins, &required_fees) {
            return Err(AnteError::new(
                ErrorKind::InsufficientFee,
                format!(
                    "insufficient fees; got: {} required: {}",
                    coins_to_string(fee_coins),
                    coins_to_string(&required_fees)
                ),
            ));
        }
    }

    let fee_amount = fee_coins
        .first()
        .map(|c| c.amount)
        .unwrap_or_else(Uint256::zero);
    let priority = tx_priority(fee_amount, gas, Uint256::zero(), "")?;
    Ok((fee_coins.to_vec(), priority))
}

/// Exactly one fee coin, in the EVM denom
fn validate_single_fee(fees: &[Coin], allowed_fee_denom: &str) -> AnteResult<()> {
    if fees.len() != 1 {
        return Err(AnteError::new(
            ErrorKind::InvalidCoins,
            format!("only one fee coin is allowed, got: {}", fees.len()),
        ));
    }
    if fees[0].denom != allowed_fee_denom {
        return Err(AnteError::new(
            ErrorKind::InvalidCoins,
            format!(
                "only '{}' is allowed as fee, got: {}",
                allowed_fee_denom, fees[0]
            ),
        ));
    }
    Ok(())
}

/// The highest of the base fee, the node minimum gas price (mempool admission only) and the
/// global minimum gas price, along with the name of the policy that set it
fn min_gas_prices_allowed(
    ctx: &Context,
    params: &FeeMarketParams,
    allowed_fee_denom: &str,
) -> (Uint256, &'static str) {
    let mut min_gas_prices = params.base_fee;
    let mut source = "base fee";

    if ctx.is_check_tx() && !ctx.is_recheck_tx() {
        let validator_min_gas_prices =
            truncate_dec(&dec_amount_of(ctx.min_gas_prices(), allowed_fee_denom));
        if min_gas_prices < validator_min_gas_prices {
            min_gas_prices = validator_min_gas_prices;
            source = "node config";
        }
    }

    let global_min_gas_prices = truncate_dec(&params.min_gas_price);
    if min_gas_prices < global_min_gas_prices {
        min_gas_prices = global_min_gas_prices;
        source = "minimum global fee";
    }
    (min_gas_prices, source)
}

/// Priority is the gas price `fee / gas`, saturated at `i64::MAX`
fn tx_priority(
    fee: Uint256,
    gas: u64,
    min_gas_prices: Uint256,
    source: &str,
) -> AnteResult<i64> {
    let gas_prices = if gas == 0 {
        Uint256::zero()
    } else {
        fee / Uint256::from(gas)
    };
    if gas_prices < min_gas_prices {
        return Err(AnteError::new(
            ErrorKind::InsufficientFee,
            format!(
                "gas prices lower than {}, got: {} required: {}. Please retry using a higher gas price or a higher fee",
                source, gas_prices, min_gas_prices
            ),
        ));
    }
    Ok(gas_prices.to_i64().unwrap_or(i64::MAX))
}
