//! Resource quantities such as `500m`, `1.5`, `8Gi` or `1e3`.
//!
//! Values are held as exact nano-units so quantities with different
//! suffixes compare by magnitude. The original text is kept for display;
//! [`Quantity::canonical`] gives the shortest spelling in the same notation.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const NANOS_PER_UNIT: i128 = 1_000_000_000;

const BINARY_SUFFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Notation a quantity was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    BinarySi,
    DecimalSi,
    DecimalExponent,
}

#[derive(Debug, Clone)]
pub struct Quantity {
    raw: String,
    nanos: i128,
}

impl Quantity {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(CoreError::invalid_quantity(raw, "empty quantity"));
        }

        let (negative, body) = match raw.as_bytes()[0] {
            b'-' => (true, &raw[1..]),
            b'+' => (false, &raw[1..]),
            _ => (false, raw),
        };

        let number_len = body
            .char_indices()
            .scan(false, |seen_dot, (idx, c)| match c {
                '0'..='9' => Some(idx + 1),
                '.' if !*seen_dot => {
                    *seen_dot = true;
                    Some(idx + 1)
                }
                _ => None,
            })
            .last()
            .unwrap_or(0);
        let (number, suffix) = body.split_at(number_len);
        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CoreError::invalid_quantity(raw, "missing digits"));
        }

        let mantissa = int_part
            .bytes()
            .chain(frac_part.bytes())
            .try_fold(0i128, |acc, digit| {
                acc.checked_mul(10)?.checked_add(i128::from(digit - b'0'))
            })
            .ok_or_else(|| CoreError::invalid_quantity(raw, "value out of range"))?;

        let (multiplier, extra_scale) = suffix_multiplier(suffix)
            .ok_or_else(|| CoreError::invalid_quantity(raw, format!("unknown suffix '{suffix}'")))?;

        let scale = u32::try_from(frac_part.len())
            .ok()
            .and_then(|len| len.checked_add(extra_scale))
            .ok_or_else(|| CoreError::invalid_quantity(raw, "value out of range"))?;
        let scaled = mantissa
            .checked_mul(multiplier)
            .ok_or_else(|| CoreError::invalid_quantity(raw, "value out of range"))?;
        let magnitude = match 10i128.checked_pow(scale) {
            Some(divisor) => {
                let whole = scaled / divisor;
                // Sub-nano remainders round up.
                if scaled % divisor != 0 { whole + 1 } else { whole }
            }
            None if scaled == 0 => 0,
            None => 1,
        };

        Ok(Self {
            raw: raw.to_string(),
            nanos: if negative { -magnitude } else { magnitude },
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Value in nano-units (`1` == 1_000_000_000).
    pub fn as_nanos(&self) -> i128 {
        self.nanos
    }

    fn notation(&self) -> Notation {
        let suffix = self
            .raw
            .trim_start_matches(['+', '-'])
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
        if suffix.ends_with('i') {
            Notation::BinarySi
        } else if suffix.len() > 1 && suffix.starts_with(['e', 'E']) {
            Notation::DecimalExponent
        } else {
            Notation::DecimalSi
        }
    }

    /// Shortest integral spelling in the notation the value was written in,
    /// so `1024Mi` becomes `1Gi` and `1000m` becomes `1`.
    ///
    /// Binary values below `1Ki` or with a fractional byte count fall back
    /// to decimal suffixes.
    pub fn canonical(&self) -> String {
        if self.nanos == 0 {
            return "0".to_string();
        }
        let sign = if self.nanos < 0 { "-" } else { "" };
        let magnitude = self.nanos.unsigned_abs();
        let unit = NANOS_PER_UNIT.unsigned_abs();
        let notation = self.notation();

        if notation == Notation::BinarySi && magnitude % unit == 0 && magnitude / unit >= 1024 {
            let mut value = magnitude / unit;
            let mut power = 0;
            while value % 1024 == 0 && power < BINARY_SUFFIXES.len() - 1 {
                value /= 1024;
                power += 1;
            }
            return format!("{sign}{value}{}", BINARY_SUFFIXES[power]);
        }

        let mut value = magnitude;
        let mut exponent: i32 = -9;
        while value % 1000 == 0 && exponent < 18 {
            value /= 1000;
            exponent += 3;
        }
        match notation {
            Notation::DecimalExponent if exponent != 0 => format!("{sign}{value}e{exponent}"),
            Notation::DecimalExponent => format!("{sign}{value}"),
            _ => format!("{sign}{value}{}", decimal_suffix(exponent)),
        }
    }
}

fn decimal_suffix(exponent: i32) -> &'static str {
    match exponent {
        -9 => "n",
        -6 => "u",
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        18 => "E",
        _ => "",
    }
}

/// Multiplier in nano-units plus any extra decimal scale for tiny exponents.
fn suffix_multiplier(suffix: &str) -> Option<(i128, u32)> {
    let decimal = |exp: u32| 10i128.checked_pow(exp);
    let binary = |power: u32| 1024i128.checked_pow(power)?.checked_mul(NANOS_PER_UNIT);

    let multiplier = match suffix {
        "n" => 1,
        "u" => decimal(3)?,
        "m" => decimal(6)?,
        "" => NANOS_PER_UNIT,
        "k" => decimal(12)?,
        "M" => decimal(15)?,
        "G" => decimal(18)?,
        "T" => decimal(21)?,
        "P" => decimal(24)?,
        "E" => decimal(27)?,
        "Ki" => binary(1)?,
        "Mi" => binary(2)?,
        "Gi" => binary(3)?,
        "Ti" => binary(4)?,
        "Pi" => binary(5)?,
        "Ei" => binary(6)?,
        _ => return exponent_multiplier(suffix),
    };
    Some((multiplier, 0))
}

fn exponent_multiplier(suffix: &str) -> Option<(i128, u32)> {
    let exponent = suffix.strip_prefix(['e', 'E'])?;
    if exponent.is_empty() {
        return None;
    }
    let exponent: i32 = exponent.parse().ok()?;
    let shifted = exponent.checked_add(9)?;
    if shifted >= 0 {
        Some((10i128.checked_pow(u32::try_from(shifted).ok()?)?, 0))
    } else {
        Some((1, shifted.unsigned_abs()))
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Quantity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Quantity::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_milli() {
        assert_eq!(q("1").as_nanos(), 1_000_000_000);
        assert_eq!(q("500m").as_nanos(), 500_000_000);
        assert_eq!(q("1.5").as_nanos(), 1_500_000_000);
        assert_eq!(q("0").as_nanos(), 0);
        assert!(q("0").is_zero());
        assert!(q("0Gi").is_zero());
    }

    #[test]
    fn test_binary_and_decimal_suffixes_compare_by_value() {
        assert_eq!(q("1Gi"), q("1024Mi"));
        assert!(q("1G") < q("1Gi"));
        assert!(q("8Gi") < q("10Gi"));
        assert!(q("999Mi") < q("1Gi"));
        assert_eq!(q("1k"), q("1000"));
        assert_eq!(q("2000m"), q("2"));
    }

    #[test]
    fn test_exponent_notation() {
        assert_eq!(q("1e3"), q("1k"));
        assert_eq!(q("1E3"), q("1000"));
        assert_eq!(q("5e-3"), q("5m"));
        assert_eq!(q("1e-12").as_nanos(), 1);
    }

    #[test]
    fn test_exa_suffix_is_not_exponent() {
        assert_eq!(q("1E").as_nanos(), 1_000_000_000_000_000_000_000_000_000);
    }

    #[test]
    fn test_display_preserves_original_text() {
        assert_eq!(q("1024Mi").to_string(), "1024Mi");
        assert_eq!(q("0.5").as_str(), "0.5");
    }

    #[test]
    fn test_canonical_spelling() {
        let cases = [
            ("1024Mi", "1Gi"),
            ("8Gi", "8Gi"),
            ("1536Mi", "1536Mi"),
            ("1.5Gi", "1536Mi"),
            ("0.5Gi", "512Mi"),
            ("512", "512"),
            ("1000m", "1"),
            ("1500m", "1500m"),
            ("0.5", "500m"),
            ("2000", "2k"),
            ("1e3", "1e3"),
            ("1000e-3", "1"),
            ("0Gi", "0"),
            ("-1024Mi", "-1Gi"),
        ];
        for (raw, canonical) in cases {
            assert_eq!(q(raw).canonical(), canonical, "canonical form of {raw:?}");
        }
    }

    #[test]
    fn test_signed_values() {
        assert!(q("-1") < q("0"));
        assert_eq!(q("+2"), q("2"));
    }

    #[test]
    fn test_invalid_quantities() {
        for raw in ["", "abc", "1Xi", "--1", "1.2.3", ".", "Gi", "1e", "1 Gi"] {
            let err = Quantity::parse(raw).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidQuantity { .. }),
                "expected failure for {raw:?}"
            );
        }
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert!(Quantity::parse("999999999999999999999999999999999Ei").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let quantity = q("8Gi");
        assert_eq!(serde_json::to_string(&quantity).unwrap(), "\"8Gi\"");
        let parsed: Quantity = serde_json::from_str("\"500m\"").unwrap();
        assert_eq!(parsed, q("0.5"));
        assert!(serde_json::from_str::<Quantity>("\"bogus\"").is_err());
    }
}
