//! Classified errors returned by the ante pipeline. Every rejection carries an [`ErrorKind`] so
//! that RPC layers can map it onto an ABCI codespace and code, plus a human readable message
//! rendered the same way the Cosmos SDK renders wrapped errors (`"<context>: <kind>"`).

use std::fmt::Display;
use thiserror::Error;

pub type AnteResult<T> = Result<T, AnteError>;

pub const SDK_CODESPACE: &str = "sdk";
pub const EVM_CODESPACE: &str = "evm";
pub const IBC_CHANNEL_CODESPACE: &str = "channel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("tx parse error")]
    TxDecode,
    #[error("invalid sequence")]
    InvalidSequence,
    #[error("unauthorized")]
    Unauthorized,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("unknown request")]
    UnknownRequest,
    #[error("invalid address")]
    InvalidAddress,
    #[error("invalid pubkey")]
    InvalidPubKey,
    #[error("unknown address")]
    UnknownAddress,
    #[error("invalid coins")]
    InvalidCoins,
    #[error("out of gas")]
    OutOfGas,
    #[error("memo too large")]
    MemoTooLarge,
    #[error("insufficient fee")]
    InsufficientFee,
    #[error("maximum number of signatures exceeded")]
    TooManySignatures,
    #[error("no signatures supplied")]
    NoSignatures,
    #[error("invalid request")]
    InvalidRequest,
    #[error("tx intended signer does not match the given signer")]
    InvalidSigner,
    #[error("invalid type")]
    InvalidType,
    #[error("invalid chain-id")]
    InvalidChainId,
    #[error("tx timeout height")]
    TxTimeoutHeight,
    #[error("unknown extension options")]
    UnknownExtensionOptions,
    #[error("incorrect account sequence")]
    WrongSequence,
    #[error("internal logic error")]
    Logic,
    #[error("feature not supported")]
    NotSupported,
    #[error("invalid gas limit")]
    InvalidGasLimit,
    #[error("EVM Create operation is disabled")]
    CreateDisabled,
    #[error("EVM Call operation is disabled")]
    CallDisabled,
    #[error("invalid transaction amount")]
    InvalidAmount,
    #[error("invalid gas price")]
    InvalidGasPrice,
    #[error("invalid gas fee")]
    InvalidGasFee,
    #[error("invalid gas cap")]
    InvalidGasCap,
    #[error("gas computation overflow/underflow")]
    GasOverflow,
    #[error("packet messages are redundant")]
    RedundantTx,
}

impl ErrorKind {
    pub fn codespace(&self) -> &'static str {
        match self {
            ErrorKind::CreateDisabled
            | ErrorKind::CallDisabled
            | ErrorKind::InvalidAmount
            | ErrorKind::InvalidGasPrice
            | ErrorKind::InvalidGasFee
            | ErrorKind::InvalidGasCap
            | ErrorKind::GasOverflow => EVM_CODESPACE,
            ErrorKind::RedundantTx => IBC_CHANNEL_CODESPACE,
            _ => SDK_CODESPACE,
        }
    }

    /// ABCI response code within [`ErrorKind::codespace`]
    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::TxDecode => 2,
            ErrorKind::InvalidSequence => 3,
            ErrorKind::Unauthorized => 4,
            ErrorKind::InsufficientFunds => 5,
            ErrorKind::UnknownRequest => 6,
            ErrorKind::InvalidAddress => 7,
            ErrorKind::InvalidPubKey => 8,
            ErrorKind::UnknownAddress => 9,
            ErrorKind::InvalidCoins => 10,
            ErrorKind::OutOfGas => 11,
            ErrorKind::MemoTooLarge => 12,
            ErrorKind::InsufficientFee => 13,
            ErrorKind::TooManySignatures => 14,
            ErrorKind::NoSignatures => 15,
            ErrorKind::InvalidRequest => 18,
            ErrorKind::InvalidSigner => 24,
            ErrorKind::InvalidChainId => 28,
            ErrorKind::InvalidType => 29,
            ErrorKind::TxTimeoutHeight => 30,
            ErrorKind::UnknownExtensionOptions => 31,
            ErrorKind::WrongSequence => 32,
            ErrorKind::Logic => 35,
            ErrorKind::NotSupported => 37,
            ErrorKind::InvalidGasLimit => 41,
            ErrorKind::CreateDisabled => 10,
            ErrorKind::CallDisabled => 11,
            ErrorKind::InvalidAmount => 12,
            ErrorKind::InvalidGasPrice => 13,
            ErrorKind::InvalidGasFee => 14,
            ErrorKind::InvalidGasCap => 18,
            ErrorKind::GasOverflow => 20,
            ErrorKind::RedundantTx => 22,
        }
    }
}

/// A classified rejection produced by one of the ante decorators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AnteError {
    kind: ErrorKind,
    message: String,
}

impl AnteError {
    /// Builds an error of the given kind, prefixed with `context`
    pub fn new(kind: ErrorKind, context: impl Display) -> AnteError {
        AnteError {
            kind,
            message: format!("{}: {}", context, kind),
        }
    }

    /// Adds another layer of context in front of the existing message, the kind is kept
    pub fn wrap(self, context: impl Display) -> AnteError {
        AnteError {
            kind: self.kind,
            message: format!("{}: {}", context, self.message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ErrorKind> for AnteError {
    fn from(kind: ErrorKind) -> Self {
        AnteError {
            kind,
            message: kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_message_keeps_kind() {
        let err = AnteError::new(ErrorKind::NoSignatures, "inner").wrap("tx basic validation failed");
        assert_eq!(err.kind(), ErrorKind::NoSignatures);
        assert_eq!(
            err.to_string(),
            "tx basic validation failed: inner: no signatures supplied"
        );
    }

    #[test]
    fn bare_kind_renders_description() {
        let err: AnteError = ErrorKind::UnknownExtensionOptions.into();
        assert_eq!(err.to_string(), "unknown extension options");
        assert_eq!(err.kind().code(), 31);
        assert_eq!(err.kind().codespace(), SDK_CODESPACE);
        assert_eq!(ErrorKind::CallDisabled.codespace(), EVM_CODESPACE);
    }
}
