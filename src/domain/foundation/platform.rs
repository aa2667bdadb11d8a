//! Client platform value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client category a request or connection originates from.
///
/// Selects notification transport and email templates, and filters
/// real-time delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Mobile,
}

impl Platform {
    /// Returns the wire representation (`"web"` / `"mobile"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Mobile => "mobile",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Web
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "mobile" => Ok(Platform::Mobile),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Error for unrecognized platform strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform '{}', expected 'web' or 'mobile'", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("web".parse::<Platform>().unwrap(), Platform::Web);
        assert_eq!("Mobile".parse::<Platform>().unwrap(), Platform::Mobile);
        assert!("desktop".parse::<Platform>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::Mobile).unwrap(), "\"mobile\"");
        assert_eq!(serde_json::to_string(&Platform::Web).unwrap(), "\"web\"");
    }

    #[test]
    fn defaults_to_web() {
        assert_eq!(Platform::default(), Platform::Web);
    }
}
