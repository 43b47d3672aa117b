use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Short numeric handle to a live object.
///
/// Codes are five decimal digits drawn uniformly from `[10000, 99999]`,
/// which leaves a space of only 90,000 values. Uniqueness among live
/// objects is enforced by the registry, not by this type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessCode(u32);

impl AccessCode {
    /// Smallest valid code.
    pub const MIN: u32 = 10_000;
    /// Largest valid code.
    pub const MAX: u32 = 99_999;
    /// Number of distinct codes.
    pub const SPACE: usize = (Self::MAX - Self::MIN + 1) as usize;

    /// The full range of valid code values.
    pub const fn range() -> RangeInclusive<u32> {
        Self::MIN..=Self::MAX
    }

    /// Draw a code uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::range()))
    }

    /// Build a code from its numeric value.
    pub fn from_u32(value: u32) -> Result<Self, TypeError> {
        if Self::range().contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeError::InvalidAccessCode(value.to_string()))
        }
    }

    /// Parse user input. Exactly five ASCII digits are accepted.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() != 5 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidAccessCode(s.to_string()));
        }
        let value: u32 = s
            .parse()
            .map_err(|_| TypeError::InvalidAccessCode(s.to_string()))?;
        Self::from_u32(value)
    }

    /// The numeric value of this code.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessCode({})", self.0)
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl TryFrom<String> for AccessCode {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccessCode> for String {
    fn from(code: AccessCode) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn space_size() {
        assert_eq!(AccessCode::SPACE, 90_000);
    }

    #[test]
    fn parse_valid() {
        let code = AccessCode::parse("12345").unwrap();
        assert_eq!(code.value(), 12_345);
        assert_eq!(code.to_string(), "12345");
    }

    #[test]
    fn parse_rejects_out_of_range_and_junk() {
        for bad in ["", "1234", "123456", "09999", "abcde", "1234a", " 12345", "+1234"] {
            assert!(AccessCode::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn boundaries() {
        assert!(AccessCode::parse("10000").is_ok());
        assert!(AccessCode::parse("99999").is_ok());
        assert!(AccessCode::from_u32(9_999).is_err());
        assert!(AccessCode::from_u32(100_000).is_err());
    }

    #[test]
    fn serde_as_string() {
        let code = AccessCode::from_u32(54_321).unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"54321\"");
        let back: AccessCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    proptest! {
        #[test]
        fn random_codes_are_five_digits(seed in any::<u64>()) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let code = AccessCode::random(&mut rng);
            let text = code.to_string();
            prop_assert_eq!(text.len(), 5);
            prop_assert_eq!(AccessCode::parse(&text).unwrap(), code);
        }
    }
}
