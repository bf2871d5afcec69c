use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{
    AccountKeeper, SignModeHandler, SignatureVerificationGasConsumer, SignerData,
};
use crate::types::crypto::{count_sub_keys, SignatureData};
use crate::types::{BaseAccount, Context, Event, PubKey, SignatureV2, Tx};
use deep_space::utils::bytes_to_hex_str;
use deep_space::Address;
use std::sync::Arc;

/// Compressed secp256k1 key standing in for keys that are not known yet while simulating
pub const SIM_SECP256K1_PUBKEY: [u8; 33] = [
    0x03, 0x5a, 0xd6, 0x81, 0x0a, 0x47, 0xf0, 0x73, 0x55, 0x3f, 0xf3, 0x0d, 0x2f, 0xcc, 0x7e,
    0x0d, 0x3b, 0x1c, 0x0b, 0x74, 0xb6, 0x1a, 0x1a, 0xaa, 0x25, 0x82, 0x34, 0x40, 0x37, 0x15,
    0x1e, 0x14, 0x3a,
];

pub const ATTRIBUTE_KEY_ACCOUNT_SEQUENCE: &str = "acc_seq";
pub const ATTRIBUTE_KEY_SIGNATURE: &str = "signature";

pub fn get_signer_account(ak: &dyn AccountKeeper, address: &Address) -> AnteResult<BaseAccount> {
    ak.get_account(address).ok_or_else(|| {
        AnteError::new(
            ErrorKind::UnknownAddress,
            format!("account {} does not exist", address),
        )
    })
}

fn sim_pub_key() -> PubKey {
    PubKey::Secp256k1(SIM_SECP256K1_PUBKEY.to_vec())
}

fn signature_bytes(data: &SignatureData) -> Vec<Vec<u8>> {
    match data {
        SignatureData::Single(sig) => vec![sig.clone()],
        SignatureData::Multi { signatures, .. } => {
            signatures.iter().flat_map(signature_bytes).collect()
        }
    }
}

/// Stores the public key of every signer that has none on chain yet
#[derive(Clone)]
pub struct SetPubKeyDecorator {
    ak: Arc<dyn AccountKeeper>,
}

impl SetPubKeyDecorator {
    pub fn new(ak: Arc<dyn AccountKeeper>) -> SetPubKeyDecorator {
        SetPubKeyDecorator { ak }
    }
}

impl AnteDecorator for SetPubKeyDecorator {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let prefix = self.ak.address_prefix();
        let signers = tx.signers();

        for (i, pub_key) in tx.pub_keys().into_iter().enumerate() {
            let signer = signers.get(i).ok_or_else(|| {
                AnteError::new(
                    ErrorKind::InvalidRequest,
                    format!("no signer for public key at index {}", i),
                )
            })?;
            let pub_key = match pub_key {
                Some(pub_key) => pub_key,
                // already stored on chain
                None if !simulate => continue,
                None => sim_pub_key(),
            };

            if !simulate {
                let key_address = pub_key
                    .address(&prefix)
                    .map_err(|e| AnteError::new(ErrorKind::InvalidPubKey, e))?;
                if key_address.get_bytes() != signer.get_bytes() {
                    return Err(AnteError::new(
                        ErrorKind::InvalidPubKey,
                        format!(
                            "pubKey does not match signer address {} with signer index: {}",
                            signer, i
                        ),
                    ));
                }
            }

            let mut account = get_signer_account(self.ak.as_ref(), signer)?;
            if account.pub_key.is_some() {
                continue;
            }
            account.pub_key = Some(pub_key);
            self.ak.set_account(account);
        }

        for (signer, info) in signers.iter().zip(tx.auth_info.signer_infos.iter()) {
            ctx.emit_event(Event::new("tx").with_attribute(
                ATTRIBUTE_KEY_ACCOUNT_SEQUENCE,
                format!("{}/{}", signer, info.sequence),
            ));
            for sig in signature_bytes(&info.data) {
                ctx.emit_event(
                    Event::new("tx")
                        .with_attribute(ATTRIBUTE_KEY_SIGNATURE, bytes_to_hex_str(&sig)),
                );
            }
        }

        next.run(ctx, tx, simulate)
    }
}

/// Caps the number of signatures, multisig members count individually
#[derive(Clone)]
pub struct ValidateSigCountDecorator {
    ak: Arc<dyn AccountKeeper>,
}

impl ValidateSigCountDecorator {
    pub fn new(ak: Arc<dyn AccountKeeper>) -> ValidateSigCountDecorator {
        ValidateSigCountDecorator { ak }
    }
}

impl AnteDecorator for ValidateSigCountDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let params = self.ak.get_params();
        let mut sig_count = 0u64;
        for pub_key in tx.pub_keys().iter().flatten() {
            sig_count += count_sub_keys(pub_key) as u64;
            if sig_count > params.tx_sig_limit {
                return Err(AnteError::new(
                    ErrorKind::TooManySignatures,
                    format!(
                        "signatures: {}, limit: {}",
                        sig_count, params.tx_sig_limit
                    ),
                ));
            }
        }
        next.run(ctx, tx, simulate)
    }
}

/// Charges the verification cost of every signature through the configured consumer
#[derive(Clone)]
pub struct SigGasConsumeDecorator {
    ak: Arc<dyn AccountKeeper>,
    sig_gas_consumer: SignatureVerificationGasConsumer,
}

impl SigGasConsumeDecorator {
    pub fn new(
        ak: Arc<dyn AccountKeeper>,
        sig_gas_consumer: SignatureVerificationGasConsumer,
    ) -> SigGasConsumeDecorator {
        SigGasConsumeDecorator {
            ak,
            sig_gas_consumer,
        }
    }
}

impl AnteDecorator for SigGasConsumeDecorator {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let params = self.ak.get_params();
        let signers = tx.signers();

        for (i, info) in tx.auth_info.signer_infos.iter().enumerate() {
            let signer = signers.get(i).ok_or_else(|| {
                AnteError::new(
                    ErrorKind::InvalidRequest,
                    format!("no signer for signature at index {}", i),
                )
            })?;
            let account = get_signer_account(self.ak.as_ref(), signer)?;
            let pub_key = match account.pub_key {
                Some(pub_key) => pub_key,
                // the costliest key type to verify
                None if simulate => sim_pub_key(),
                None => {
                    return Err(AnteError::new(
                        ErrorKind::InvalidPubKey,
                        "pubkey on account is not set",
                    ))
                }
            };
            let sig = SignatureV2 {
                pub_key,
                data: info.data.clone(),
                sequence: info.sequence,
            };
            (self.sig_gas_consumer)(ctx.gas_meter_mut(), &sig, &params)?;
        }

        next.run(ctx, tx, simulate)
    }
}

/// Checks sequences and signatures of every signer. Recheck and simulation skip the
/// cryptographic part.
#[derive(Clone)]
pub struct SigVerificationDecorator {
    ak: Arc<dyn AccountKeeper>,
    sign_mode_handler: Arc<dyn SignModeHandler>,
}

impl SigVerificationDecorator {
    pub fn new(
        ak: Arc<dyn AccountKeeper>,
        sign_mode_handler: Arc<dyn SignModeHandler>,
    ) -> SigVerificationDecorator {
        SigVerificationDecorator {
            ak,
            sign_mode_handler,
        }
    }
}

impl AnteDecorator for SigVerificationDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let infos = &tx.auth_info.signer_infos;
        let signers = tx.signers();
        if infos.len() != signers.len() {
            return Err(AnteError::new(
                ErrorKind::Unauthorized,
                format!(
                    "invalid number of signer;  expected: {}, got {}",
                    signers.len(),
                    infos.len()
                ),
            ));
        }

        for (info, signer) in infos.iter().zip(signers.iter()) {
            let account = get_signer_account(self.ak.as_ref(), signer)?;
            let pub_key = match (&account.pub_key, simulate) {
                (Some(pub_key), _) => Some(pub_key.clone()),
                (None, true) => None,
                (None, false) => {
                    return Err(AnteError::new(
                        ErrorKind::InvalidPubKey,
                        "pubkey on account is not set",
                    ))
                }
            };

            if info.sequence != account.sequence {
                return Err(AnteError::new(
                    ErrorKind::WrongSequence,
                    format!(
                        "account sequence mismatch, expected {}, got {}",
                        account.sequence, info.sequence
                    ),
                ));
            }

            let account_number = if ctx.block_height() == 0 {
                0
            } else {
                account.account_number
            };

            if simulate || ctx.is_recheck_tx() {
                continue;
            }
            if let Some(pub_key) = pub_key {
                let signer_data = SignerData {
                    address: account.address,
                    chain_id: ctx.chain_id().to_string(),
                    account_number,
                    sequence: account.sequence,
                    pub_key,
                };
                if let Err(e) =
                    self.sign_mode_handler
                        .verify_signature(&signer_data, &info.data, tx)
                {
                    debug!("signature of {} rejected: {}", signer, e);
                    return Err(AnteError::new(
                        ErrorKind::Unauthorized,
                        format!(
                            "signature verification failed; please verify account number ({}), sequence ({}) and chain-id ({})",
                            account_number,
                            account.sequence,
                            ctx.chain_id()
                        ),
                    ));
                }
            }
        }

        next.run(ctx, tx, simulate)
    }
}

/// Bumps the sequence of every signer, replayed txs fail the next sequence check
#[derive(Clone)]
pub struct IncrementSequenceDecorator {
    ak: Arc<dyn AccountKeeper>,
}

impl IncrementSequenceDecorator {
    pub fn new(ak: Arc<dyn AccountKeeper>) -> IncrementSequenceDecorator {
        IncrementSequenceDecorator { ak }
    }
}

impl AnteDecorator for IncrementSequenceDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        for signer in tx.signers() {
            let mut account = get_signer_account(self.ak.as_ref(), &signer)?;
            account.sequence += 1;
            self.ak.set_account(account);
        }
        next.run(ctx, tx, simulate)
    }
}
