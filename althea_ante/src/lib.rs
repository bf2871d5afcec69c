//! Dual lane ante handler for the Althea chain. Every transaction is routed either to the
//! Ethereum lane (a single `MsgEthereumTx`) or to the Cosmos lane before any state is touched.

#[macro_use]
extern crate log;

pub mod ante;
pub mod cosmoslane;
pub mod duallane;
pub mod error;
pub mod evmlane;
pub mod handler_options;
pub mod keepers;
pub mod lane;
pub mod proto;
pub mod sdkante;
pub mod simapp;
pub mod type_urls;
pub mod types;
pub mod utils;

pub use ante::{AnteDecorator, AnteHandler, Next};
pub use error::{AnteError, AnteResult, ErrorKind};
pub use handler_options::HandlerOptions;
