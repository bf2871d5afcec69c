use super::single_ethereum_msg;
use crate::ante::{AnteDecorator, Next};
use crate::error::{AnteError, AnteResult, ErrorKind};
use crate::keepers::{AccountKeeper, EvmKeeper};
use crate::lane::has_single_ethereum_message;
use crate::sdkante::{
    IncrementSequenceDecorator, SetPubKeyDecorator, SigGasConsumeDecorator,
    SigVerificationDecorator, ValidateSigCountDecorator,
};
use crate::types::crypto::{bit_array_count, bit_array_get_index};
use crate::types::{AuthParams, Context, GasMeter, PubKey, SignatureData, SignatureV2, Tx};
use crate::utils::{eth_to_cosmos_address, eth_tx_nonce, recover_sender};
use althea_proto::cosmos_sdk_proto::cosmos::crypto::multisig::v1beta1::CompactBitArray;
use std::sync::Arc;

/// Gas charged for verifying an eth_secp256k1 signature
pub const ETH_SECP256K1_VERIFY_COST: u64 = 21000;

/// Ethereum senders are recovered from the signature, there is no key to store
#[derive(Clone)]
pub struct DualLaneSetPubKeyDecorator {
    cd: SetPubKeyDecorator,
}

impl DualLaneSetPubKeyDecorator {
    pub fn new(cd: SetPubKeyDecorator) -> DualLaneSetPubKeyDecorator {
        DualLaneSetPubKeyDecorator { cd }
    }
}

impl AnteDecorator for DualLaneSetPubKeyDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !has_single_ethereum_message(tx) {
            return self.cd.ante_handle(ctx, tx, simulate, next);
        }
        next.run(ctx, tx, simulate)
    }
}

#[derive(Clone)]
pub struct DualLaneValidateSigCountDecorator {
    cd: ValidateSigCountDecorator,
}

impl DualLaneValidateSigCountDecorator {
    pub fn new(cd: ValidateSigCountDecorator) -> DualLaneValidateSigCountDecorator {
        DualLaneValidateSigCountDecorator { cd }
    }
}

impl AnteDecorator for DualLaneValidateSigCountDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !has_single_ethereum_message(tx) {
            return self.cd.ante_handle(ctx, tx, simulate, next);
        }
        next.run(ctx, tx, simulate)
    }
}

#[derive(Clone)]
pub struct DualLaneSigGasConsumeDecorator {
    cd: SigGasConsumeDecorator,
}

impl DualLaneSigGasConsumeDecorator {
    pub fn new(cd: SigGasConsumeDecorator) -> DualLaneSigGasConsumeDecorator {
        DualLaneSigGasConsumeDecorator { cd }
    }
}

impl AnteDecorator for DualLaneSigGasConsumeDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !has_single_ethereum_message(tx) {
            return self.cd.ante_handle(ctx, tx, simulate, next);
        }
        next.run(ctx, tx, simulate)
    }
}

/// For Ethereum txs the signer recovered from the embedded transaction must be the declared
/// sender and its nonce must be the account sequence
#[derive(Clone)]
pub struct DualLaneSigVerificationDecorator {
    ak: Arc<dyn AccountKeeper>,
    evm_keeper: Arc<dyn EvmKeeper>,
    cd: SigVerificationDecorator,
}

impl DualLaneSigVerificationDecorator {
    pub fn new(
        ak: Arc<dyn AccountKeeper>,
        evm_keeper: Arc<dyn EvmKeeper>,
        cd: SigVerificationDecorator,
    ) -> DualLaneSigVerificationDecorator {
        DualLaneSigVerificationDecorator { ak, evm_keeper, cd }
    }
}

impl AnteDecorator for DualLaneSigVerificationDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let msg = match single_ethereum_msg(tx) {
            Some(msg) => msg,
            None => return self.cd.ante_handle(ctx, tx, simulate, next),
        };

        let sender = recover_sender(&msg.tx, self.evm_keeper.chain_id()).map_err(|e| {
            AnteError::new(
                ErrorKind::InvalidSigner,
                format!(
                    "couldn't retrieve sender address from the ethereum transaction: {}",
                    e
                ),
            )
        })?;

        let sender_address = eth_to_cosmos_address(sender, &self.ak.address_prefix())?;
        let sender_bech32 = sender_address.to_string();
        if msg.from != sender_bech32 {
            return Err(AnteError::new(
                ErrorKind::InvalidSigner,
                format!(
                    "mis-match sender address: {} != {} ({})",
                    msg.from, sender_bech32, sender
                ),
            ));
        }

        let account = match self.ak.get_account(&sender_address) {
            Some(account) => account,
            // fee deduction already required the account to exist
            None => panic!("{}", AnteError::new(ErrorKind::UnknownAddress, sender)),
        };

        let nonce = eth_tx_nonce(&msg.tx);
        if nonce != account.sequence {
            return Err(AnteError::new(
                ErrorKind::InvalidSequence,
                format!("invalid nonce; got {}, expected {}", nonce, account.sequence),
            ));
        }

        next.run(ctx, tx, simulate)
    }
}

/// Ethereum senders get their sequence bumped here already, so the increment survives a tx
/// that fails later for a reason outside the EVM. The EVM is told through the nonce flag and
/// reverts the extra increment before executing.
#[derive(Clone)]
pub struct DualLaneIncrementSequenceDecorator {
    ak: Arc<dyn AccountKeeper>,
    evm_keeper: Arc<dyn EvmKeeper>,
    cd: IncrementSequenceDecorator,
}

impl DualLaneIncrementSequenceDecorator {
    pub fn new(
        ak: Arc<dyn AccountKeeper>,
        evm_keeper: Arc<dyn EvmKeeper>,
        cd: IncrementSequenceDecorator,
    ) -> DualLaneIncrementSequenceDecorator {
        DualLaneIncrementSequenceDecorator { ak, evm_keeper, cd }
    }
}

impl AnteDecorator for DualLaneIncrementSequenceDecorator {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let msg = match single_ethereum_msg(tx) {
            Some(msg) => msg,
            None => return self.cd.ante_handle(ctx, tx, simulate, next),
        };

        let mut account = match msg
            .from_address()
            .and_then(|from| self.ak.get_account(&from))
        {
            Some(account) => account,
            None => panic!("{}", AnteError::new(ErrorKind::UnknownAddress, &msg.from)),
        };
        account.sequence += 1;
        trace!("ante increased sequence of {} to {}", msg.from, account.sequence);
        self.ak.set_account(account);
        self.evm_keeper
            .set_flag_sender_nonce_increased_by_ante_handle(true);

        next.run(ctx, tx, simulate)
    }
}

/// Gas for verifying one signature by key type. Only Ethereum keys and multisigs made of them
/// are accepted, ed25519 keys are charged and then refused.
pub fn sig_verification_gas_consumer(
    meter: &mut GasMeter,
    sig: &SignatureV2,
    params: &AuthParams,
) -> AnteResult<()> {
    match &sig.pub_key {
        PubKey::EthSecp256k1(_) => {
            meter.consume_gas(ETH_SECP256K1_VERIFY_COST, "ante verify: eth_secp256k1")
        }
        PubKey::Ed25519(_) => {
            meter.consume_gas(params.sig_verify_cost_ed25519, "ante verify: ed25519")?;
            Err(AnteError::new(
                ErrorKind::InvalidPubKey,
                "ED25519 public keys are unsupported",
            ))
        }
        PubKey::Multisig { public_keys, .. } => match &sig.data {
            SignatureData::Multi {
                bit_array,
                signatures,
            } => consume_multisignature_verification_gas(
                meter,
                bit_array,
                signatures,
                public_keys,
                params,
                sig.sequence,
            ),
            SignatureData::Single(_) => Err(AnteError::new(
                ErrorKind::InvalidType,
                "expected multisignature data, got single signature data",
            )),
        },
        other => Err(AnteError::new(
            ErrorKind::InvalidPubKey,
            format!("unrecognized/unsupported public key type: {}", other.type_url()),
        )),
    }
}

/// Charges every member key whose bit is set, signatures are matched to set bits in order
pub fn consume_multisignature_verification_gas(
    meter: &mut GasMeter,
    bit_array: &CompactBitArray,
    signatures: &[SignatureData],
    public_keys: &[PubKey],
    params: &AuthParams,
    sequence: u64,
) -> AnteResult<()> {
    let mut sig_index = 0;
    for i in 0..bit_array_count(bit_array) {
        if !bit_array_get_index(bit_array, i) {
            continue;
        }
        let (pub_key, data) = match (public_keys.get(i), signatures.get(sig_index)) {
            (Some(pub_key), Some(data)) => (pub_key, data),
            _ => {
                return Err(AnteError::new(
                    ErrorKind::InvalidPubKey,
                    format!("no key or signature for multisig member {}", i),
                ))
            }
        };
        let sig = SignatureV2 {
            pub_key: pub_key.clone(),
            data: data.clone(),
            sequence,
        };
        sig_verification_gas_consumer(meter, &sig, params)?;
        sig_index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::crypto::{bit_array_set_index, new_bit_array};
    use crate::types::ExecMode;
    use clarity::Address as EthAddress;

    fn eth_key() -> PubKey {
        PubKey::EthSecp256k1(vec![2; 33])
    }

    fn single(pub_key: PubKey) -> SignatureV2 {
        SignatureV2 {
            pub_key,
            data: SignatureData::Single(vec![1; 65]),
            sequence: 0,
        }
    }

    #[test]
    fn gas_by_key_type() {
        let params = AuthParams::default();

        let mut meter = GasMeter::new(100_000);
        sig_verification_gas_consumer(&mut meter, &single(eth_key()), &params).unwrap();
        assert_eq!(meter.gas_consumed(), ETH_SECP256K1_VERIFY_COST);

        let mut meter = GasMeter::new(100_000);
        let err =
            sig_verification_gas_consumer(&mut meter, &single(PubKey::Ed25519(vec![1; 32])), &params)
                .unwrap_err();
        assert!(err.is(ErrorKind::InvalidPubKey));
        assert_eq!(meter.gas_consumed(), params.sig_verify_cost_ed25519);

        let mut meter = GasMeter::new(100_000);
        let err = sig_verification_gas_consumer(
            &mut meter,
            &single(PubKey::Secp256k1(vec![2; 33])),
            &params,
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("unrecognized/unsupported public key type: /cosmos.crypto.secp256k1.PubKey"));
        assert_eq!(meter.gas_consumed(), 0);
    }

    #[test]
    fn multisig_charges_set_bits_only() {
        let params = AuthParams::default();
        let mut bit_array = new_bit_array(3);
        bit_array_set_index(&mut bit_array, 0, true);
        bit_array_set_index(&mut bit_array, 2, true);
        let sig = SignatureV2 {
            pub_key: PubKey::Multisig {
                threshold: 2,
                public_keys: vec![eth_key(), eth_key(), eth_key()],
            },
            data: SignatureData::Multi {
                bit_array,
                signatures: vec![
                    SignatureData::Single(vec![1; 65]),
                    SignatureData::Single(vec![2; 65]),
                ],
            },
            sequence: 4,
        };
        let mut meter = GasMeter::new(100_000);
        sig_verification_gas_consumer(&mut meter, &sig, &params).unwrap();
        assert_eq!(meter.gas_consumed(), 2 * ETH_SECP256K1_VERIFY_COST);

        let mut single_data = sig;
        single_data.data = SignatureData::Single(vec![1; 65]);
        assert!(sig_verification_gas_consumer(&mut GasMeter::new(100_000), &single_data, &params)
            .unwrap_err()
            .is(ErrorKind::InvalidType));
    }

    #[test]
    fn ethereum_signature_must_match_sender_and_nonce() {
        use crate::sdkante::SigVerificationDecorator;
        use crate::simapp::SimApp;

        let app = SimApp::default();
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let other = app.new_account(0u8.into());
        let decorator = DualLaneSigVerificationDecorator::new(
            app.account_keeper.clone(),
            app.evm_keeper.clone(),
            SigVerificationDecorator::new(app.account_keeper.clone(), app.sign_mode_handler.clone()),
        );
        let unsigned = app.legacy_tx(0, app.base_fee(), 21000, other.eth_address, 1u8.into());
        let ctx = || app.context(5, ExecMode::DeliverTx);

        let tx = app.ethereum_tx(&sender, unsigned.clone());
        decorator.ante_handle(ctx(), &tx, false, Next::terminator()).unwrap();

        // signed by one account, declared as sent by another
        let signed = unsigned
            .clone()
            .sign(&sender.eth_key, Some(app.evm_keeper.chain_id()));
        let spoofed = app.wrap_signed_ethereum_tx(&other, signed);
        let err = decorator
            .ante_handle(ctx(), &spoofed, false, Next::terminator())
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidSigner));
        assert!(err.to_string().starts_with("mis-match sender address"));

        let wrong_chain = unsigned.clone().sign(&sender.eth_key, Some(1));
        let err = decorator
            .ante_handle(
                ctx(),
                &app.wrap_signed_ethereum_tx(&sender, wrong_chain),
                false,
                Next::terminator(),
            )
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("couldn't retrieve sender address from the ethereum transaction"));

        let future = app.ethereum_tx(
            &sender,
            app.legacy_tx(2, app.base_fee(), 21000, other.eth_address, 1u8.into()),
        );
        let err = decorator
            .ante_handle(ctx(), &future, false, Next::terminator())
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidSequence));
        assert!(err.to_string().starts_with("invalid nonce; got 2, expected 0"));
    }

    #[test]
    fn ethereum_sequence_increment_sets_flag() {
        use crate::sdkante::IncrementSequenceDecorator;
        use crate::simapp::SimApp;

        let app = SimApp::default();
        let sender = app.new_account(1_000_000_000_000_000u64.into());
        let tx = app.ethereum_tx(
            &sender,
            app.legacy_tx(0, app.base_fee(), 21000, EthAddress::default(), 0u8.into()),
        );
        let decorator = DualLaneIncrementSequenceDecorator::new(
            app.account_keeper.clone(),
            app.evm_keeper.clone(),
            IncrementSequenceDecorator::new(app.account_keeper.clone()),
        );
        decorator
            .ante_handle(app.context(5, ExecMode::DeliverTx), &tx, false, Next::terminator())
            .unwrap();
        assert_eq!(
            app.account_keeper.get_account(&sender.address).unwrap().sequence,
            1
        );
        assert!(app.evm_keeper.is_sender_nonce_increased_by_ante_handle());
    }

    #[test]
    #[should_panic(expected = "unknown address")]
    fn ethereum_sequence_increment_requires_account() {
        use crate::sdkante::IncrementSequenceDecorator;
        use crate::simapp::SimApp;

        let app = SimApp::default();
        let ghost = app.unregistered_account();
        let tx = app.ethereum_tx(
            &ghost,
            app.legacy_tx(0, app.base_fee(), 21000, EthAddress::default(), 0u8.into()),
        );
        let decorator = DualLaneIncrementSequenceDecorator::new(
            app.account_keeper.clone(),
            app.evm_keeper.clone(),
            IncrementSequenceDecorator::new(app.account_keeper.clone()),
        );
        let _ = decorator.ante_handle(
            app.context(5, ExecMode::DeliverTx),
            &tx,
            false,
            Next::terminator(),
        );
    }
}
