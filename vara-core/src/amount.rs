//! Token amount parsing, conversion to base units, and display formatting.
//!
//! Everything here works on decimal digit strings and `u128`; no floating
//! point is involved at any step.

use std::fmt::{self, Display};
use std::iter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;

/// Largest amount, in whole tokens, accepted by [`AmountConverter::validate`].
pub const MAX_VALIDATED_TOKENS: u128 = 1_000_000;

/// Quick-pick values offered by [`AmountConverter::suggested_amounts`].
const SUGGESTED_VALUES: [&str; 6] = ["0.1", "1", "5", "10", "50", "100"];

const MILLION_SHIFT: usize = 6;
const THOUSAND_SHIFT: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a valid decimal number")]
    InvalidFormat,
    #[error("amount must not be negative")]
    NegativeNotAllowed,
    #[error("amount must be greater than 0")]
    Zero,
    #[error("amount has {decimals} decimal places (max: {max})")]
    TooManyDecimals { decimals: usize, max: u32 },
    #[error("amount arithmetic overflow")]
    Overflow,
}

/// Integer amount in the token's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUnits(u128);

impl BaseUnits {
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(&self) -> u128 {
        self.0
    }
}

impl Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BaseUnits {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() || !all_digits(&value) {
            return Err(AmountError::InvalidFormat);
        }
        value
            .parse::<u128>()
            .map(Self)
            .map_err(|_| AmountError::Overflow)
    }
}

impl From<BaseUnits> for String {
    fn from(value: BaseUnits) -> Self {
        value.0.to_string()
    }
}

/// Structured outcome of [`AmountConverter::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Parsed token amount in canonical decimal form, e.g. `1.5`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_units: Option<BaseUnits>,
}

impl AmountValidation {
    fn valid(amount: String, base_units: BaseUnits) -> Self {
        Self {
            is_valid: true,
            error: None,
            amount: Some(amount),
            base_units: Some(base_units),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
            amount: None,
            base_units: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAmount {
    pub label: String,
    pub value: String,
}

/// Lexically validated decimal: optional sign, ASCII digits, at most one point.
#[derive(Debug, Clone, Copy)]
struct DecimalStr<'a> {
    negative: bool,
    whole: &'a str,
    frac: &'a str,
}

impl<'a> DecimalStr<'a> {
    fn parse(input: &'a str) -> Result<Self, AmountError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::InvalidFormat);
        }
        if !all_digits(whole) || !all_digits(frac) {
            return Err(AmountError::InvalidFormat);
        }

        Ok(Self {
            negative,
            whole: whole.trim_start_matches('0'),
            frac,
        })
    }

    fn is_zero(&self) -> bool {
        self.whole.is_empty() && self.frac.bytes().all(|byte| byte == b'0')
    }

    /// Whole-token part, or `None` when it does not fit in `u128`.
    fn whole_value(&self) -> Option<u128> {
        if self.whole.is_empty() {
            return Some(0);
        }
        self.whole.parse::<u128>().ok()
    }

    /// Canonical unsigned rendering: no redundant zeros, no sign.
    fn normalized(&self) -> String {
        let whole = if self.whole.is_empty() { "0" } else { self.whole };
        match self.frac.trim_end_matches('0') {
            "" => whole.to_string(),
            frac => format!("{whole}.{frac}"),
        }
    }

    fn has_fraction(&self) -> bool {
        self.frac.bytes().any(|byte| byte != b'0')
    }

    /// Exact value scaled by `10^decimals`.
    fn scaled(&self, decimals: u32) -> Result<u128, AmountError> {
        if self.frac.len() > decimals as usize {
            return Err(AmountError::TooManyDecimals {
                decimals: self.frac.len(),
                max: decimals,
            });
        }

        let unit = 10_u128
            .checked_pow(decimals)
            .ok_or(AmountError::Overflow)?;
        let whole = self
            .whole_value()
            .ok_or(AmountError::Overflow)?
            .checked_mul(unit)
            .ok_or(AmountError::Overflow)?;

        let mut padded = self.frac.to_string();
        while padded.len() < decimals as usize {
            padded.push('0');
        }
        let frac = if padded.is_empty() {
            0
        } else {
            padded.parse::<u128>().map_err(|_| AmountError::Overflow)?
        };

        whole.checked_add(frac).ok_or(AmountError::Overflow)
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|byte| byte.is_ascii_digit())
}

/// Divide a digit string by `10^places`, returning the new whole and fraction digits.
fn shift_left(whole: &str, frac: &str, places: usize) -> (String, String) {
    if whole.len() > places {
        let split = whole.len() - places;
        (whole[..split].to_string(), format!("{}{frac}", &whole[split..]))
    } else {
        let zeros = "0".repeat(places - whole.len());
        (String::new(), format!("{zeros}{whole}{frac}"))
    }
}

/// Render `whole.frac` with exactly `places` fraction digits, rounding half away from zero.
fn to_fixed(whole: &str, frac: &str, places: usize) -> String {
    let whole = whole.trim_start_matches('0');
    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(frac.bytes().chain(iter::repeat(b'0')).take(places))
        .map(|byte| byte - b'0')
        .collect();
    let mut int_len = whole.len();

    let round_up = frac
        .as_bytes()
        .get(places)
        .is_some_and(|&byte| byte >= b'5');
    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
            int_len += 1;
        }
    }

    let render = |slice: &[u8]| -> String { slice.iter().map(|d| char::from(b'0' + d)).collect() };
    let int_part = if int_len == 0 {
        "0".to_string()
    } else {
        render(&digits[..int_len])
    };

    if places == 0 {
        int_part
    } else {
        format!("{int_part}.{}", render(&digits[int_len..]))
    }
}

/// Converts between human token amounts and base units for one token.
#[derive(Debug, Clone)]
pub struct AmountConverter {
    token: TokenConfig,
}

impl Default for AmountConverter {
    fn default() -> Self {
        Self::new(TokenConfig::vara())
    }
}

impl AmountConverter {
    pub fn new(token: TokenConfig) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &TokenConfig {
        &self.token
    }

    /// Exact `amount × 10^decimals`. Rejects zero, negatives and excess precision.
    ///
    /// Accepts anything with a decimal `Display`, so both `"1.5"` and `1.5_f64`
    /// go through the same string parser.
    pub fn to_base_units(&self, amount: impl Display) -> Result<BaseUnits, AmountError> {
        let text = amount.to_string();
        let value = DecimalStr::parse(&text)?;
        if value.is_zero() {
            return Err(AmountError::Zero);
        }
        if value.negative {
            return Err(AmountError::NegativeNotAllowed);
        }
        value.scaled(self.token.decimals()).map(BaseUnits)
    }

    /// Whole-token amount with exactly six fraction digits.
    pub fn from_base_units(&self, units: BaseUnits) -> String {
        let digits = units.0.to_string();
        let (whole, frac) = shift_left(&digits, "", self.token.decimals() as usize);
        to_fixed(&whole, &frac, 6)
    }

    /// Compact display string, e.g. `1.50M VARA`. Non-numeric input renders as `0`.
    pub fn format(&self, amount: impl Display) -> String {
        let text = amount.to_string();
        let Ok(value) = DecimalStr::parse(&text) else {
            return "0".to_string();
        };
        let symbol = self.token.symbol();

        if value.negative && !value.is_zero() {
            let magnitude = to_fixed(value.whole, value.frac, 6);
            if magnitude.bytes().all(|byte| byte == b'0' || byte == b'.') {
                return format!("{magnitude} {symbol}");
            }
            return format!("-{magnitude} {symbol}");
        }

        match value.whole_value() {
            Some(whole) if whole < 1 => {
                format!("{} {symbol}", to_fixed(value.whole, value.frac, 6))
            }
            Some(whole) if whole < 1_000 => {
                format!("{} {symbol}", to_fixed(value.whole, value.frac, 4))
            }
            Some(whole) if whole < 1_000_000 => {
                let (whole, frac) = shift_left(value.whole, value.frac, THOUSAND_SHIFT);
                format!("{}K {symbol}", to_fixed(&whole, &frac, 2))
            }
            _ => {
                let (whole, frac) = shift_left(value.whole, value.frac, MILLION_SHIFT);
                format!("{}M {symbol}", to_fixed(&whole, &frac, 2))
            }
        }
    }

    /// Policy check for user-entered amounts; never returns an error.
    pub fn validate(&self, amount: impl Display) -> AmountValidation {
        let text = amount.to_string();
        if text.trim().is_empty() {
            return AmountValidation::invalid("Amount is required");
        }

        let Ok(value) = DecimalStr::parse(&text) else {
            return AmountValidation::invalid("Invalid number format");
        };

        if value.negative || value.is_zero() {
            return AmountValidation::invalid("Amount must be greater than 0");
        }

        let too_large = match value.whole_value() {
            Some(whole) => {
                whole > MAX_VALIDATED_TOKENS
                    || (whole == MAX_VALIDATED_TOKENS && value.has_fraction())
            }
            None => true,
        };
        if too_large {
            return AmountValidation::invalid(format!(
                "Amount too large (max: 1M {})",
                self.token.symbol()
            ));
        }

        let decimals = self.token.decimals();
        if value.frac.len() > decimals as usize {
            return AmountValidation::invalid(format!(
                "Too many decimal places (max: {decimals})"
            ));
        }

        match value.scaled(decimals) {
            Ok(units) => AmountValidation::valid(value.normalized(), BaseUnits(units)),
            Err(err) => AmountValidation::invalid(err.to_string()),
        }
    }

    pub fn suggested_amounts(&self) -> Vec<SuggestedAmount> {
        SUGGESTED_VALUES
            .iter()
            .map(|value| SuggestedAmount {
                label: format!("{value} {}", self.token.symbol()),
                value: (*value).to_string(),
            })
            .collect()
    }
}
