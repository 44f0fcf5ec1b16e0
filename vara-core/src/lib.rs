//! Core library for Vara: SS58 address normalization, token amount
//! conversion, and email-login orchestration over an injected auth client.

#![forbid(unsafe_code)]
#![deny(clippy::float_arithmetic)]

pub mod address;
pub mod amount;
pub mod config;
pub mod output;
pub mod session;
pub mod ss58;

pub use address::{AddressCodec, AddressInfo};
pub use amount::{
    AmountConverter, AmountError, AmountValidation, BaseUnits, SuggestedAmount,
    MAX_VALIDATED_TOKENS,
};
pub use config::{
    AuthConfig, ConfigError, NetworkConfig, TokenConfig, VARA_DECIMALS, VARA_SYMBOL,
};
pub use output::{truncate_address, AgentError, OutputMode};
pub use session::{AccountSession, AuthProvider, Session, SessionError};
pub use ss58::{
    AddressCodecProvider, AddressError, PublicKey, Ss58Codec, Ss58Prefix, VARA_SS58_PREFIX,
};
