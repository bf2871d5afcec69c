use althea_ante::error::{AnteError, AnteResult, ErrorKind};
use althea_ante::simapp::{SimApp, TestAccount, TxBuilder};
use althea_ante::type_urls::MSG_SEND_TYPE_URL;
use althea_ante::types::coin::parse_dec;
use althea_ante::types::{AnteParams, Context, ExecMode, Tx};
use deep_space::Coin;
use num::BigRational;
use num256::Uint256;
use prost_types::Any;
use std::env;
use std::fs;
use std::str::FromStr;

/// Gas every Cosmos scenario tx declares
pub const COSMOS_TX_GAS: u64 = 200_000;
/// Block height scenarios run at, anything but genesis
pub const BLOCK_HEIGHT: i64 = 10;
/// Starting balance of a funded scenario account, 1000 althea
pub const ONE_THOUSAND_ALTHEA: u128 = 1_000_000_000_000_000_000_000;

// Retrieve values from runtime ENV vars
lazy_static! {
    pub static ref STAKING_TOKEN: String =
        env::var("STAKING_TOKEN").unwrap_or_else(|_| "aalthea".to_owned());
    pub static ref BASE_FEE: Option<Uint256> = env::var("BASE_FEE")
        .ok()
        .map(|v| Uint256::from_str(&v).expect("BASE_FEE must be an integer"));
    pub static ref MIN_GAS_PRICE: Option<BigRational> = env::var("MIN_GAS_PRICE")
        .ok()
        .map(|v| parse_dec(&v).expect("MIN_GAS_PRICE must be a decimal"));
    pub static ref ANTE_PARAMS_FILE: Option<String> = env::var("ANTE_PARAMS_FILE").ok();
}

/// Chain parameters for a scenario: the params file if one is configured, then the env overrides
pub fn get_ante_params() -> AnteParams {
    let mut params = match ANTE_PARAMS_FILE.as_ref() {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Could not read params file {}: {:?}", path, e));
            serde_json::from_str(&contents)
                .unwrap_or_else(|e| panic!("Invalid params file {}: {:?}", path, e))
        }
        None => AnteParams::default(),
    };
    params.evm.evm_denom = STAKING_TOKEN.clone();
    if let Some(base_fee) = *BASE_FEE {
        params.fee_market.base_fee = base_fee;
    }
    if let Some(min_gas_price) = MIN_GAS_PRICE.as_ref() {
        params.fee_market.min_gas_price = min_gas_price.clone();
    }
    params
}

/// A fresh chain configured from the environment
pub fn get_sim_app() -> SimApp {
    SimApp::new(get_ante_params()).expect("Could not set up the simulated chain")
}

pub fn get_funded_account(app: &SimApp) -> TestAccount {
    app.new_account(ONE_THOUSAND_ALTHEA.into())
}

pub fn block_context(app: &SimApp, mode: ExecMode, tx: &Tx) -> Context {
    app.context(BLOCK_HEIGHT, mode).with_tx_size(tx.size())
}

/// Runs `tx` through a freshly built ante handler
pub fn run_ante(app: &SimApp, mode: ExecMode, tx: &Tx, simulate: bool) -> AnteResult<Context> {
    let handler = app.ante_handler().expect("Invalid handler options");
    handler.handle(block_context(app, mode, tx), tx, simulate)
}

/// The fee a Cosmos tx of `COSMOS_TX_GAS` pays at the current base fee
pub fn get_fee(app: &SimApp) -> Coin {
    Coin::new(
        app.base_fee() * Uint256::from(COSMOS_TX_GAS),
        app.evm_denom(),
    )
}

/// The ante chain only looks at the type of a bank send
pub fn send_msg() -> Any {
    Any {
        type_url: MSG_SEND_TYPE_URL.to_string(),
        value: Vec::new(),
    }
}

pub fn signed_cosmos_tx(app: &SimApp, signer: &TestAccount, msgs: Vec<Any>) -> Tx {
    msgs.into_iter()
        .fold(TxBuilder::new(), |b, m| b.cosmos_message(m, signer.address))
        .fee(vec![get_fee(app)])
        .gas(COSMOS_TX_GAS)
        .sign(app, &[signer])
}

/// Panics unless `res` is an error of `kind` whose message contains `needle`
pub fn assert_rejected<T>(res: AnteResult<T>, kind: ErrorKind, needle: &str) -> AnteError {
    match res {
        Ok(_) => panic!("Expected rejection with {:?} ({}), got success", kind, needle),
        Err(e) => {
            assert!(e.is(kind), "Expected {:?}, got {}", kind, e);
            assert!(
                e.to_string().contains(needle),
                "Expected '{}' in '{}'",
                needle,
                e
            );
            info!("Rejected as expected: {}", e);
            e
        }
    }
}
