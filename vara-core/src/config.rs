//! Network and token constants, plus auth client settings read from the environment.

use thiserror::Error;
use tracing::error;

use crate::address::AddressCodec;
use crate::amount::AmountConverter;
use crate::ss58::{AddressError, Ss58Codec, Ss58Prefix};

/// Native token of the Vara network.
pub const VARA_SYMBOL: &str = "VARA";
/// 1 VARA = 10^12 base units.
pub const VARA_DECIMALS: u32 = 12;
/// Keeps every amount up to 10^20 whole tokens representable in `u128`.
pub const MAX_DECIMALS: u32 = 18;
pub const VARA_TESTNET_RPC: &str = "wss://testnet.vara.network";

/// Environment variable holding the auth SDK publishable key.
pub const API_KEY_VAR: &str = "MAGIC_PUBLISHABLE_KEY";
/// Optional RPC endpoint override.
pub const RPC_URL_VAR: &str = "VARA_RPC_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} environment variable is required for Vara network authentication")]
    MissingApiKey { var: &'static str },
    #[error("token decimals {decimals} unsupported (max: {max})")]
    UnsupportedDecimals { decimals: u32, max: u32 },
    #[error("token symbol is empty")]
    EmptySymbol,
    #[error(transparent)]
    Prefix(#[from] AddressError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    symbol: String,
    decimals: u32,
}

impl TokenConfig {
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Result<Self, ConfigError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if decimals > MAX_DECIMALS {
            return Err(ConfigError::UnsupportedDecimals {
                decimals,
                max: MAX_DECIMALS,
            });
        }
        Ok(Self { symbol, decimals })
    }

    pub fn vara() -> Self {
        Self {
            symbol: VARA_SYMBOL.to_string(),
            decimals: VARA_DECIMALS,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub const fn decimals(&self) -> u32 {
        self.decimals
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::vara()
    }
}

/// Fixed per-process network settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub ss58_prefix: Ss58Prefix,
    pub rpc_url: String,
    pub token: TokenConfig,
}

impl NetworkConfig {
    pub fn vara() -> Self {
        Self {
            name: "vara".to_string(),
            ss58_prefix: Ss58Prefix::VARA,
            rpc_url: VARA_TESTNET_RPC.to_string(),
            token: TokenConfig::vara(),
        }
    }

    pub fn address_codec(&self) -> AddressCodec<Ss58Codec> {
        AddressCodec::new(Ss58Codec, self.ss58_prefix)
    }

    pub fn amount_converter(&self) -> AmountConverter {
        AmountConverter::new(self.token.clone())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::vara()
    }
}

/// Settings handed to the email-OTP auth client at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_key: String,
    pub rpc_url: String,
    pub ss58_format: Ss58Prefix,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let Some(api_key) = read(API_KEY_VAR) else {
            error!(var = API_KEY_VAR, "auth api key missing");
            return Err(ConfigError::MissingApiKey { var: API_KEY_VAR });
        };

        Ok(Self {
            api_key,
            rpc_url: read(RPC_URL_VAR).unwrap_or_else(|| VARA_TESTNET_RPC.to_string()),
            ss58_format: Ss58Prefix::VARA,
        })
    }
}
