//! Token content, issue requests and validation bypass flags.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifetime applied when an issue request carries no expiry.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 15;

/// Content field names that extras may not use.
pub const RESERVED_FIELDS: [&str; 4] = ["sti", "issuer", "audience", "expiresOn"];

/// 2^63 milliseconds; relative offsets must stay below this.
const MILLIS_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Unit of a relative expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScale {
    Seconds,
    Minutes,
}

/// Expiry relative to the moment of issuance.
///
/// `time` may be fractional; the offset is truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeExpiry {
    pub scale: TimeScale,
    pub time: f64,
}

impl RelativeExpiry {
    pub fn seconds(time: impl Into<f64>) -> Self {
        Self {
            scale: TimeScale::Seconds,
            time: time.into(),
        }
    }

    pub fn minutes(time: impl Into<f64>) -> Self {
        Self {
            scale: TimeScale::Minutes,
            time: time.into(),
        }
    }

    /// The offset as a duration, or `None` if it is not finite or does not fit.
    pub fn duration(&self) -> Option<TimeDelta> {
        let unit_millis = match self.scale {
            TimeScale::Seconds => 1_000.0,
            TimeScale::Minutes => 60_000.0,
        };
        let millis = (self.time * unit_millis).trunc();
        if !millis.is_finite() || millis.abs() >= MILLIS_LIMIT {
            return None;
        }
        TimeDelta::try_milliseconds(millis as i64)
    }
}

/// What a caller asks an issuer to put in a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueContent {
    /// Intended recipient of the token.
    pub audience: String,

    /// Lifetime; defaults to [`DEFAULT_EXPIRY_MINUTES`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<RelativeExpiry>,

    /// Additional fields flattened into the signed content.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,
}

impl IssueContent {
    /// Request a token for `audience` with the default lifetime.
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            expires_on: None,
            extras: Map::new(),
        }
    }

    /// Set the token lifetime.
    pub fn expires_in(mut self, expiry: RelativeExpiry) -> Self {
        self.expires_on = Some(expiry);
        self
    }

    /// Add an extra field. Fields keep insertion order in the signed content.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// The signed part of a token.
///
/// Field order here is the canonical order fed to the signature:
/// `sti`, `issuer`, `audience`, `expiresOn`, then extras as inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwtContent {
    /// Unique token id.
    pub sti: String,

    /// Issuer identity at issuance time.
    pub issuer: String,

    /// Intended recipient.
    pub audience: String,

    /// Expiry instant in milliseconds since the Unix epoch.
    pub expires_on: i64,

    /// Caller-supplied fields, flattened on the wire.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl SwtContent {
    /// Expiry as a timestamp, if it is within chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_on)
    }

    /// Whether the token is expired at `now`. Reaching the expiry instant
    /// counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires_on
    }
}

/// A Simple Web Token: content plus its base64 signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swt {
    pub content: SwtContent,
    pub signature: String,
}

impl Swt {
    /// Serialize to the compact wire form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the wire form. No verification is performed.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A validation check the caller chooses to skip.
///
/// The signature check cannot be bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bypass {
    Audience,
    ExpiresOn,
}
