pub mod account;
pub mod coin;
pub mod context;
pub mod crypto;
pub mod gas;
pub mod params;
pub mod tx;

pub use account::BaseAccount;
pub use coin::DecCoin;
pub use context::{Context, Event, ExecMode};
pub use crypto::{PubKey, SignatureData, SignatureV2, SignerInfo};
pub use gas::{Gas, GasConfig, GasMeter};
pub use params::{AnteParams, AuthParams, EvmParams, FeeMarketParams};
pub use tx::{AuthInfo, CosmosMsg, Fee, MsgEthereumTx, Tx, TxBody, TxMsg};
