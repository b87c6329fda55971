//! Issuer configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two-part secret used by the double HMAC.
///
/// The first value keys the inner pass over the canonical content, the second
/// keys the outer pass over the inner digest. In YAML or JSON it is written as
/// a two-element list.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salts(String, String);

impl Salts {
    /// Create a salt pair from its inner and outer keys.
    pub fn new(inner: impl Into<String>, outer: impl Into<String>) -> Self {
        Self(inner.into(), outer.into())
    }

    /// Key for the inner HMAC pass.
    pub fn inner(&self) -> &str {
        &self.0
    }

    /// Key for the outer HMAC pass.
    pub fn outer(&self) -> &str {
        &self.1
    }

    /// Both keys present and non-empty.
    pub fn is_defined(&self) -> bool {
        !self.0.is_empty() && !self.1.is_empty()
    }
}

impl fmt::Debug for Salts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salts([REDACTED], [REDACTED])")
    }
}

/// Configuration for an SWT issuer.
///
/// Every field is optional on the wire so a partially filled config can be
/// deserialized; the issuer rejects missing `issuer` or `salts` when it is
/// constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Identity written into every issued token.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Signing secret pair.
    #[serde(default)]
    pub salts: Option<Salts>,

    /// Audiences accepted during validation. Empty means none.
    #[serde(default)]
    pub audience: Vec<String>,
}

impl IssuerConfig {
    /// Set the issuer identity.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the signing secret pair.
    pub fn with_salts(mut self, salts: Salts) -> Self {
        self.salts = Some(salts);
        self
    }

    /// Replace the accepted audience list.
    pub fn with_audience<I, S>(mut self, audience: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.audience = audience.into_iter().map(Into::into).collect();
        self
    }
}
