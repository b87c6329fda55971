//! Error types for SWT issuance and validation.

use thiserror::Error;

/// Errors that can occur while issuing or validating a token.
///
/// Every variant carries a stable code (see [`SwtError::code`]) that hosts can
/// forward to clients without exposing the message text.
#[derive(Debug, Error)]
pub enum SwtError {
    /// Recomputed signature does not match the presented one.
    #[error("Invalid Signature!")]
    InvalidSignature,

    /// Token audience is not in the allow-list.
    #[error("Invalid Audience!")]
    InvalidAudience,

    /// Current time is at or past the token expiry.
    #[error("SWT Expired!")]
    TokenExpired,

    /// No issuer identity configured.
    #[error("Issuer must be set before issuing a token.")]
    IssuerNotDefined,

    /// No usable salt pair configured.
    #[error("Salts must be define before issuing a token.")]
    SaltsNotDefined,

    /// An extras key shadows one of the fixed content fields.
    #[error("extras field '{claim}' collides with a reserved content field")]
    ReservedClaim { claim: String },

    /// Token JSON could not be parsed or serialized.
    #[error("malformed token: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Requested lifetime does not fit in the supported time range.
    #[error("expiry is outside the representable time range")]
    ExpiryOutOfRange,
}

impl SwtError {
    /// Stable identifier for this failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "SWT001",
            Self::InvalidAudience => "SWT002",
            Self::TokenExpired => "SWT003",
            Self::IssuerNotDefined => "SWT004",
            Self::SaltsNotDefined => "SWT005",
            Self::ReservedClaim { .. } => "SWT006",
            Self::Malformed(_) => "SWT007",
            Self::ExpiryOutOfRange => "SWT008",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let errors = [
            SwtError::InvalidSignature,
            SwtError::InvalidAudience,
            SwtError::TokenExpired,
            SwtError::IssuerNotDefined,
            SwtError::SaltsNotDefined,
            SwtError::ReservedClaim {
                claim: "sti".into(),
            },
            SwtError::Malformed(malformed),
            SwtError::ExpiryOutOfRange,
        ];
        let mut codes: Vec<_> = errors.iter().map(SwtError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_messages() {
        assert_eq!(SwtError::TokenExpired.to_string(), "SWT Expired!");
        assert_eq!(SwtError::InvalidSignature.code(), "SWT001");
        assert_eq!(
            SwtError::ReservedClaim {
                claim: "issuer".into()
            }
            .to_string(),
            "extras field 'issuer' collides with a reserved content field"
        );
    }
}
