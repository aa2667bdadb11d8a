//! Numeric one-time code value object.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a code.
const CODE_LEN: usize = 6;

/// Six-digit, zero-padded numeric verification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OtpCode(String);

impl OtpCode {
    /// Generates a fresh code from the OS CSPRNG.
    ///
    /// The full `000000..=999999` range is used, zero-padded to six digits.
    pub fn generate() -> Self {
        let n: u32 = OsRng.gen_range(0..1_000_000);
        Self(format!("{:06}", n))
    }

    /// Validates an externally supplied code string.
    pub fn new(code: impl Into<String>) -> Result<Self, InvalidOtpCode> {
        let code = code.into();
        if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidOtpCode);
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for OtpCode {
    type Error = InvalidOtpCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OtpCode> for String {
    fn from(code: OtpCode) -> Self {
        code.0
    }
}

/// Error for malformed code strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOtpCode;

impl fmt::Display for InvalidOtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code must be exactly six ASCII digits")
    }
}

impl std::error::Error for InvalidOtpCode {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..256 {
            let code = OtpCode::generate();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn leading_zeros_are_preserved() {
        let code = OtpCode::new("000042").unwrap();
        assert_eq!(code.as_str(), "000042");
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        assert!(OtpCode::new("12345").is_err());
        assert!(OtpCode::new("1234567").is_err());
        assert!(OtpCode::new("12345a").is_err());
        assert!(OtpCode::new("").is_err());
    }

    proptest! {
        #[test]
        fn any_value_in_range_formats_to_a_valid_code(n in 0u32..1_000_000) {
            let code = OtpCode::new(format!("{:06}", n)).unwrap();
            prop_assert_eq!(code.as_str().len(), 6);
        }

        #[test]
        fn arbitrary_strings_never_panic(s in ".*") {
            // Validation either accepts a six-digit string or errors cleanly.
            let ok = OtpCode::new(s.clone()).is_ok();
            prop_assert_eq!(ok, s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
