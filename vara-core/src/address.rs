//! Address normalization to the configured network prefix.
//!
//! [`AddressCodec::convert`] never fails: on a decode or encode error it logs
//! the condition and hands back the input unchanged. Callers that want the
//! failure should use [`AddressCodec::try_convert`] instead.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ss58::{AddressCodecProvider, AddressError, Ss58Codec, Ss58Prefix};

/// Debug descriptor for a single address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_formatted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddressInfo {
    fn invalid(error: Option<String>) -> Self {
        Self {
            is_valid: false,
            error,
            ..Self::default()
        }
    }
}

/// Re-encodes addresses under a fixed network prefix.
#[derive(Debug, Clone)]
pub struct AddressCodec<C = Ss58Codec> {
    codec: C,
    prefix: Ss58Prefix,
}

impl AddressCodec<Ss58Codec> {
    /// SS58 codec targeting the Vara prefix.
    pub fn vara() -> Self {
        Self::new(Ss58Codec, Ss58Prefix::VARA)
    }
}

impl Default for AddressCodec<Ss58Codec> {
    fn default() -> Self {
        Self::vara()
    }
}

impl<C: AddressCodecProvider> AddressCodec<C> {
    pub fn new(codec: C, prefix: Ss58Prefix) -> Self {
        Self { codec, prefix }
    }

    pub fn prefix(&self) -> Ss58Prefix {
        self.prefix
    }

    /// Decode `address` and re-encode it under the configured prefix.
    pub fn try_convert(&self, address: &str) -> Result<String, AddressError> {
        let key = self.codec.decode(address)?;
        self.codec.encode(&key, self.prefix)
    }

    /// Best-effort conversion: returns the input unchanged when it cannot be decoded.
    pub fn convert(&self, address: &str) -> String {
        if address.is_empty() {
            return String::new();
        }

        match self.try_convert(address) {
            Ok(formatted) => {
                debug!(original = address, formatted = %formatted, "converted address");
                formatted
            }
            Err(err) => {
                warn!(address, error = %err, "address conversion failed, passing input through");
                address.to_string()
            }
        }
    }

    /// True iff `address` is already the exact encoding under the configured prefix.
    pub fn is_formatted(&self, address: &str) -> bool {
        if address.is_empty() {
            return false;
        }
        matches!(self.try_convert(address), Ok(formatted) if formatted == address)
    }

    pub fn format_for_display(&self, address: &str) -> String {
        if address.is_empty() {
            return String::new();
        }
        self.convert(address)
    }

    pub fn inspect(&self, address: &str) -> AddressInfo {
        if address.is_empty() {
            return AddressInfo::invalid(None);
        }

        let key = match self.codec.decode(address) {
            Ok(key) => key,
            Err(err) => return AddressInfo::invalid(Some(err.to_string())),
        };
        let formatted = match self.codec.encode(&key, self.prefix) {
            Ok(formatted) => formatted,
            Err(err) => return AddressInfo::invalid(Some(err.to_string())),
        };

        AddressInfo {
            is_valid: true,
            original: Some(address.to_string()),
            is_formatted: Some(formatted == address),
            formatted: Some(formatted),
            public_key_hex: Some(key.to_hex()),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::ss58::{checksum, PublicKey};

    const ALICE_HEX: &str = "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const ALICE_GENERIC: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const ALICE_POLKADOT: &str = "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5";

    /// Codec whose encoder always fails, to exercise the encode-error paths.
    struct BrokenEncoder;

    impl AddressCodecProvider for BrokenEncoder {
        fn decode(&self, address: &str) -> Result<PublicKey, AddressError> {
            Ss58Codec.decode(address)
        }

        fn encode(&self, _key: &PublicKey, prefix: Ss58Prefix) -> Result<String, AddressError> {
            Err(AddressError::InvalidPrefix {
                prefix: prefix.as_u16(),
            })
        }
    }

    #[test]
    fn convert_reencodes_under_vara_prefix() {
        let codec = AddressCodec::vara();
        let from_generic = codec.convert(ALICE_GENERIC);
        let from_polkadot = codec.convert(ALICE_POLKADOT);

        assert_eq!(from_generic, from_polkadot);
        assert_ne!(from_generic, ALICE_GENERIC);
        assert!(codec.is_formatted(&from_generic));
    }

    #[test]
    fn convert_is_idempotent() {
        let codec = AddressCodec::vara();
        let once = codec.convert(ALICE_GENERIC);
        assert_eq!(codec.convert(&once), once);
    }

    #[test]
    fn convert_passes_through_malformed_input() {
        let codec = AddressCodec::vara();
        assert_eq!(codec.convert("not-an-address"), "not-an-address");
        assert_eq!(codec.convert(""), "");
    }

    #[test]
    fn padded_address_passes_through_unchanged() {
        let codec = AddressCodec::vara();
        let padded = format!(" {ALICE_GENERIC}");
        assert_eq!(codec.convert(&padded), padded);
        assert!(!codec.is_formatted(&padded));
        assert!(!codec.inspect(&padded).is_valid);

        let formatted = codec.convert(ALICE_GENERIC);
        assert!(!codec.is_formatted(&format!("{formatted} ")));
    }

    #[test]
    fn reserved_prefix_address_is_not_rewritten() {
        let mut data = vec![46_u8];
        data.extend_from_slice(&[7; 32]);
        let sum = checksum(&data);
        data.extend_from_slice(&sum);
        let reserved = bs58::encode(data).into_string();

        let codec = AddressCodec::vara();
        assert_eq!(codec.convert(&reserved), reserved);
        assert_eq!(
            codec.try_convert(&reserved),
            Err(AddressError::ReservedPrefix { prefix: 46 })
        );
        let info = codec.inspect(&reserved);
        assert!(!info.is_valid);
        assert_eq!(info.error.as_deref(), Some("ss58 prefix 46 is reserved"));
    }

    #[test]
    fn try_convert_surfaces_typed_failure() {
        let codec = AddressCodec::vara();
        assert!(matches!(
            codec.try_convert("not-an-address"),
            Err(AddressError::InvalidBase58(_))
        ));
        assert_eq!(codec.try_convert(""), Err(AddressError::Empty));
    }

    #[test]
    fn convert_passes_through_on_encode_failure() {
        let codec = AddressCodec::new(BrokenEncoder, Ss58Prefix::VARA);
        assert_eq!(codec.convert(ALICE_GENERIC), ALICE_GENERIC);
        assert!(!codec.is_formatted(ALICE_GENERIC));
    }

    #[test]
    fn is_formatted_matches_only_target_prefix() {
        let generic = AddressCodec::new(Ss58Codec, Ss58Prefix::new(42).unwrap());
        assert!(generic.is_formatted(ALICE_GENERIC));
        assert!(!generic.is_formatted(ALICE_POLKADOT));
        assert!(!generic.is_formatted(""));
        assert!(!generic.is_formatted("garbage"));
    }

    #[test]
    fn is_formatted_rejects_hex_input() {
        let generic = AddressCodec::new(Ss58Codec, Ss58Prefix::new(42).unwrap());
        let hex_input = format!("0x{ALICE_HEX}");
        assert!(!generic.is_formatted(&hex_input));
        assert_eq!(generic.convert(&hex_input), ALICE_GENERIC);
    }

    #[test]
    fn format_for_display_handles_empty() {
        let codec = AddressCodec::vara();
        assert_eq!(codec.format_for_display(""), "");
        assert_eq!(
            codec.format_for_display(ALICE_GENERIC),
            codec.convert(ALICE_GENERIC)
        );
    }

    #[test]
    fn inspect_empty_is_invalid_without_error() {
        let info = AddressCodec::vara().inspect("");
        assert_eq!(info, AddressInfo::invalid(None));
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({ "isValid": false })
        );
    }

    #[test]
    fn inspect_reports_decode_error() {
        let info = AddressCodec::vara().inspect("not-an-address");
        assert!(!info.is_valid);
        assert!(info.error.is_some());
        assert!(info.formatted.is_none());
    }

    #[test]
    fn inspect_reports_encode_error() {
        let info = AddressCodec::new(BrokenEncoder, Ss58Prefix::VARA).inspect(ALICE_GENERIC);
        assert!(!info.is_valid);
        assert_eq!(info.error.as_deref(), Some("invalid ss58 prefix 137"));
    }

    #[test]
    fn inspect_populates_all_fields() {
        let codec = AddressCodec::vara();
        let info = codec.inspect(ALICE_GENERIC);
        assert!(info.is_valid);
        assert_eq!(info.original.as_deref(), Some(ALICE_GENERIC));
        assert_eq!(info.formatted, Some(codec.convert(ALICE_GENERIC)));
        assert_eq!(info.is_formatted, Some(false));
        assert_eq!(info.public_key_hex.as_deref(), Some(ALICE_HEX));
        assert!(info.error.is_none());

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["publicKeyHex"], ALICE_HEX);
        assert_eq!(json["isFormatted"], false);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn inspect_of_formatted_address_is_formatted() {
        let codec = AddressCodec::vara();
        let formatted = codec.convert(ALICE_GENERIC);
        assert_eq!(codec.inspect(&formatted).is_formatted, Some(true));
    }

    proptest! {
        #[test]
        fn property_convert_output_is_formatted(
            key in proptest::collection::vec(any::<u8>(), 32),
            source in 0_u16..=63,
        ) {
            prop_assume!(source != 46 && source != 47);
            let key = PublicKey::from_bytes(&key).unwrap();
            let address = Ss58Codec.encode(&key, Ss58Prefix::new(source).unwrap()).unwrap();

            let codec = AddressCodec::vara();
            let converted = codec.convert(&address);
            prop_assert!(codec.is_formatted(&converted));
            prop_assert_eq!(codec.inspect(&converted).public_key_hex, Some(key.to_hex()));
        }
    }
}
