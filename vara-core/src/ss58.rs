//! SS58 address encoding over raw public keys.
//!
//! The on-wire layout is `base58(prefix ++ key ++ checksum)`, where the
//! checksum is the first two bytes of `BLAKE2b-512("SS58PRE" ++ prefix ++ key)`.

use std::fmt::{self, Display};

use blake2::{Blake2b512, Digest};
use thiserror::Error;

/// SS58 network identifier for Vara.
pub const VARA_SS58_PREFIX: u16 = 137;
/// Largest identifier representable in the two-byte prefix form.
pub const MAX_SS58_PREFIX: u16 = 16_383;

const CHECKSUM_CONTEXT: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const RESERVED_PREFIXES: [u16; 2] = [46, 47];
/// sr25519/ed25519 keys are 32 bytes; compressed ECDSA keys are 33.
const ACCEPTED_KEY_LENGTHS: [usize; 2] = [32, 33];

/// Errors produced while decoding or encoding an address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("address is not valid base58: {0}")]
    InvalidBase58(String),
    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
    #[error("invalid decoded length {len}")]
    InvalidLength { len: usize },
    #[error("invalid ss58 prefix {prefix}")]
    InvalidPrefix { prefix: u16 },
    #[error("ss58 prefix {prefix} is reserved")]
    ReservedPrefix { prefix: u16 },
    #[error("invalid checksum")]
    ChecksumMismatch,
}

/// Validated SS58 network identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ss58Prefix(u16);

impl Ss58Prefix {
    pub const VARA: Ss58Prefix = Ss58Prefix(VARA_SS58_PREFIX);

    pub fn new(value: u16) -> Result<Self, AddressError> {
        if value > MAX_SS58_PREFIX {
            return Err(AddressError::InvalidPrefix { prefix: value });
        }
        if RESERVED_PREFIXES.contains(&value) {
            return Err(AddressError::ReservedPrefix { prefix: value });
        }
        Ok(Self(value))
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Inverse of [`Ss58Prefix::to_bytes`] over a one- or two-byte prefix.
    fn ident_from_bytes(bytes: &[u8]) -> u16 {
        match bytes {
            [first, second] => {
                let lower = (first << 2) | (second >> 6);
                let upper = second & 0b0011_1111;
                u16::from(lower) | (u16::from(upper) << 8)
            }
            [first, ..] => u16::from(*first),
            [] => 0,
        }
    }

    fn to_bytes(self) -> Vec<u8> {
        let ident = self.0;
        match ident {
            0..=63 => vec![ident as u8],
            _ => {
                let first = ((ident & 0b0000_0000_1111_1100) as u8) >> 2;
                let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
                vec![first | 0b0100_0000, second]
            }
        }
    }
}

impl Default for Ss58Prefix {
    fn default() -> Self {
        Self::VARA
    }
}

impl TryFrom<u16> for Ss58Prefix {
    type Error = AddressError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Display for Ss58Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw account identity recovered from an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if !ACCEPTED_KEY_LENGTHS.contains(&bytes.len()) {
            return Err(AddressError::InvalidLength { len: bytes.len() });
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex of the key bytes, without a `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Decoder/encoder seam between address policy and the concrete address format.
pub trait AddressCodecProvider {
    fn decode(&self, address: &str) -> Result<PublicKey, AddressError>;
    fn encode(&self, key: &PublicKey, prefix: Ss58Prefix) -> Result<String, AddressError>;
}

/// Substrate SS58 codec. Also accepts `0x`-prefixed hex public keys on decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ss58Codec;

impl AddressCodecProvider for Ss58Codec {
    fn decode(&self, address: &str) -> Result<PublicKey, AddressError> {
        if address.is_empty() {
            return Err(AddressError::Empty);
        }

        if let Some(hex_body) = address.strip_prefix("0x") {
            let bytes =
                hex::decode(hex_body).map_err(|err| AddressError::InvalidHex(err.to_string()))?;
            return PublicKey::from_bytes(&bytes);
        }

        let data = bs58::decode(address)
            .into_vec()
            .map_err(|err| AddressError::InvalidBase58(err.to_string()))?;

        let prefix_len = match data.first().copied() {
            Some(0..=63) => 1,
            Some(64..=127) => 2,
            Some(byte) => {
                return Err(AddressError::InvalidPrefix {
                    prefix: u16::from(byte),
                })
            }
            None => return Err(AddressError::InvalidLength { len: 0 }),
        };

        if data.len() < prefix_len + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength { len: data.len() });
        }
        let ident = Ss58Prefix::ident_from_bytes(&data[..prefix_len]);
        if RESERVED_PREFIXES.contains(&ident) {
            return Err(AddressError::ReservedPrefix { prefix: ident });
        }
        let key_len = data.len() - prefix_len - CHECKSUM_LEN;
        if !ACCEPTED_KEY_LENGTHS.contains(&key_len) {
            return Err(AddressError::InvalidLength { len: data.len() });
        }

        let body_end = data.len() - CHECKSUM_LEN;
        let expected = checksum(&data[..body_end]);
        if data[body_end..] != expected[..] {
            return Err(AddressError::ChecksumMismatch);
        }

        PublicKey::from_bytes(&data[prefix_len..body_end])
    }

    fn encode(&self, key: &PublicKey, prefix: Ss58Prefix) -> Result<String, AddressError> {
        let mut payload = prefix.to_bytes();
        payload.extend_from_slice(key.as_bytes());
        let sum = checksum(&payload);
        payload.extend_from_slice(&sum);
        Ok(bs58::encode(payload).into_string())
    }
}

pub(crate) fn checksum(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_CONTEXT);
    hasher.update(body);
    let digest = hasher.finalize();
    [digest[0], digest[1]]
}
