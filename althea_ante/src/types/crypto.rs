use althea_proto::cosmos_sdk_proto::cosmos::crypto::multisig::v1beta1::CompactBitArray;
use deep_space::error::AddressError;
use deep_space::public_key::{CosmosPublicKey, EthermintPublicKey};
use deep_space::utils::hex_str_to_bytes;
use deep_space::{Address, PublicKey};

pub const ETH_SECP256K1_PUBKEY_TYPE_URL: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
pub const ED25519_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.ed25519.PubKey";
pub const MULTISIG_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.multisig.LegacyAminoPubKey";

/// The public key types a signer may register, keys are stored in their compressed form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubKey {
    EthSecp256k1(Vec<u8>),
    Secp256k1(Vec<u8>),
    Ed25519(Vec<u8>),
    Multisig {
        threshold: u32,
        public_keys: Vec<PubKey>,
    },
}

impl PubKey {
    pub fn type_url(&self) -> &'static str {
        match self {
            PubKey::EthSecp256k1(_) => ETH_SECP256K1_PUBKEY_TYPE_URL,
            PubKey::Secp256k1(_) => SECP256K1_PUBKEY_TYPE_URL,
            PubKey::Ed25519(_) => ED25519_PUBKEY_TYPE_URL,
            PubKey::Multisig { .. } => MULTISIG_PUBKEY_TYPE_URL,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        match self {
            PubKey::EthSecp256k1(b) | PubKey::Secp256k1(b) | PubKey::Ed25519(b) => b.clone(),
            PubKey::Multisig { public_keys, .. } => {
                public_keys.iter().flat_map(|k| k.bytes()).collect()
            }
        }
    }

    /// Derives the account address controlled by this key. Ethereum keys hash with keccak like
    /// an Ethereum account, Cosmos keys use the sha256 + ripemd160 scheme.
    pub fn address(&self, prefix: &str) -> Result<Address, AddressError> {
        match self {
            PubKey::EthSecp256k1(bytes) => {
                // the keccak derivation expects a point on the curve
                secp256k1::PublicKey::from_slice(bytes)
                    .map_err(|_| AddressError::BytesDecodeErrorWrongLength)?;
                EthermintPublicKey::from_slice(bytes, prefix)
                    .map_err(|_| AddressError::BytesDecodeErrorWrongLength)?
                    .to_address_with_prefix(prefix)
            }
            PubKey::Secp256k1(bytes) => CosmosPublicKey::from_slice(bytes, prefix)
                .map_err(|_| AddressError::BytesDecodeErrorWrongLength)?
                .to_address_with_prefix(prefix),
            PubKey::Ed25519(_) | PubKey::Multisig { .. } => {
                let hash = hex_str_to_bytes(&sha256::digest(self.bytes()))
                    .map_err(AddressError::HexDecodeError)?;
                Address::from_slice(&hash[..20], prefix)
            }
        }
    }
}

/// Signature material for one signer
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureData {
    Single(Vec<u8>),
    Multi {
        bit_array: CompactBitArray,
        signatures: Vec<SignatureData>,
    },
}

/// A signature paired with the key and sequence it was produced for
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureV2 {
    pub pub_key: PubKey,
    pub data: SignatureData,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignerInfo {
    pub pub_key: Option<PubKey>,
    pub data: SignatureData,
    pub sequence: u64,
}

/// Builds a bit array able to hold `bits` entries, all unset
pub fn new_bit_array(bits: usize) -> CompactBitArray {
    let extra = (bits % 8) as u32;
    CompactBitArray {
        extra_bits_stored: extra,
        elems: vec![0u8; (bits + 7) / 8],
    }
}

/// Number of usable bits
pub fn bit_array_count(array: &CompactBitArray) -> usize {
    if array.extra_bits_stored == 0 {
        array.elems.len() * 8
    } else {
        (array.elems.len().saturating_sub(1)) * 8 + array.extra_bits_stored as usize
    }
}

pub fn bit_array_get_index(array: &CompactBitArray, i: usize) -> bool {
    if i >= bit_array_count(array) {
        return false;
    }
    array
        .elems
        .get(i >> 3)
        .map(|b| b & (1 << (7 - (i % 8))) > 0)
        .unwrap_or(false)
}

/// Sets or clears bit `i`, returns false when the index is out of range
pub fn bit_array_set_index(array: &mut CompactBitArray, i: usize, value: bool) -> bool {
    if i >= bit_array_count(array) {
        return false;
    }
    match array.elems.get_mut(i >> 3) {
        Some(b) if value => *b |= 1 << (7 - (i % 8)),
        Some(b) => *b &= !(1 << (7 - (i % 8))),
        None => return false,
    }
    true
}

pub fn bit_array_num_true(array: &CompactBitArray) -> usize {
    (0..bit_array_count(array))
        .filter(|i| bit_array_get_index(array, *i))
        .count()
}

/// Number of leaf signatures contained in a signature, multisigs count each member
pub fn count_sub_keys(pub_key: &PubKey) -> usize {
    match pub_key {
        PubKey::Multisig { public_keys, .. } => public_keys.iter().map(count_sub_keys).sum(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_array_indexing() {
        let mut array = new_bit_array(10);
        assert_eq!(bit_array_count(&array), 10);
        assert!(bit_array_set_index(&mut array, 0, true));
        assert!(bit_array_set_index(&mut array, 9, true));
        assert!(!bit_array_set_index(&mut array, 10, true));
        assert!(bit_array_get_index(&array, 0));
        assert!(!bit_array_get_index(&array, 1));
        assert!(bit_array_get_index(&array, 9));
        assert_eq!(bit_array_num_true(&array), 2);

        let full = new_bit_array(16);
        assert_eq!(bit_array_count(&full), 16);
    }

    #[test]
    fn multisig_counts_leaves() {
        let key = PubKey::Multisig {
            threshold: 1,
            public_keys: vec![
                PubKey::Secp256k1(vec![2; 33]),
                PubKey::Multisig {
                    threshold: 1,
                    public_keys: vec![PubKey::Ed25519(vec![1; 32]), PubKey::Ed25519(vec![3; 32])],
                },
            ],
        };
        assert_eq!(count_sub_keys(&key), 3);
        assert_eq!(key.type_url(), MULTISIG_PUBKEY_TYPE_URL);
    }
}
