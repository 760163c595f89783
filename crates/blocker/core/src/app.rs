//! Application identifiers.

use std::borrow::Borrow;
use std::fmt;

use base64::Engine as _;
use serde::{Deserialize, Serialize, Serializer};

/// Opaque application identifier (Android package name, macOS bundle ID).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Create an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AppId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AppId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An application installed on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    #[serde(rename = "packageName")]
    pub id: AppId,
    #[serde(rename = "appName")]
    pub display_name: String,
    pub is_system_app: bool,
    /// PNG-encoded icon, sent as base64 (empty string when absent).
    #[serde(serialize_with = "serialize_icon")]
    pub icon: Option<Vec<u8>>,
}

fn serialize_icon<S: Serializer>(icon: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match icon {
        Some(png) => serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(png)),
        None => serializer.serialize_str(""),
    }
}
