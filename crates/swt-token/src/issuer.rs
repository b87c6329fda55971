//! Token issuance and validation.

use crate::clock::{Clock, SystemClock};
use crate::error::SwtError;
use crate::signature;
use chrono::TimeDelta;
use std::fmt;
use std::sync::Arc;
use swt_core::{
    Bypass, DEFAULT_EXPIRY_MINUTES, IssueContent, IssuerConfig, RESERVED_FIELDS, Salts, Swt,
    SwtContent,
};
use uuid::Uuid;

/// Issues and validates Simple Web Tokens.
///
/// Configuration is fixed at construction. Share one issuer behind an `Arc`
/// and build a new one to change issuer, salts or audience.
pub struct Issuer {
    issuer: String,
    salts: Salts,
    audience: Vec<String>,
    clock: Arc<dyn Clock>,
}

impl Issuer {
    /// Create an issuer, failing if the identity or salts are missing.
    pub fn new(
        issuer: impl Into<String>,
        salts: Salts,
        audience: Vec<String>,
    ) -> Result<Self, SwtError> {
        let issuer = issuer.into();
        if issuer.is_empty() {
            return Err(SwtError::IssuerNotDefined);
        }
        if !salts.is_defined() {
            return Err(SwtError::SaltsNotDefined);
        }

        Ok(Self {
            issuer,
            salts,
            audience,
            clock: Arc::new(SystemClock),
        })
    }

    /// Create an issuer from deserialized configuration.
    pub fn from_config(config: IssuerConfig) -> Result<Self, SwtError> {
        let issuer = config.issuer.ok_or(SwtError::IssuerNotDefined)?;
        let salts = config.salts.ok_or(SwtError::SaltsNotDefined)?;
        Self::new(issuer, salts, config.audience)
    }

    /// Use `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    /// Issue a new signed token.
    ///
    /// Every call gets a fresh `sti`, so identical requests never yield equal
    /// tokens.
    pub fn issue(&self, content: &IssueContent) -> Result<Swt, SwtError> {
        if let Some(claim) = content
            .extras
            .keys()
            .find(|key| RESERVED_FIELDS.contains(&key.as_str()))
        {
            return Err(SwtError::ReservedClaim {
                claim: claim.clone(),
            });
        }

        let now = self.clock.now();
        let lifetime = match &content.expires_on {
            Some(expiry) => expiry.duration().ok_or(SwtError::ExpiryOutOfRange)?,
            None => TimeDelta::minutes(DEFAULT_EXPIRY_MINUTES),
        };
        let expires_on = now
            .checked_add_signed(lifetime)
            .ok_or(SwtError::ExpiryOutOfRange)?
            .timestamp_millis();

        let content = SwtContent {
            sti: Uuid::new_v4().to_string(),
            issuer: self.issuer.clone(),
            audience: content.audience.clone(),
            expires_on,
            extras: content.extras.clone(),
        };
        let signature = self.sign(&content)?;

        tracing::debug!(
            sti = %content.sti,
            audience = %content.audience,
            expires_on,
            "Issued token"
        );

        Ok(Swt { content, signature })
    }

    /// Compute the signature this issuer would give `content`.
    pub fn sign(&self, content: &SwtContent) -> Result<String, SwtError> {
        signature::sign(content, &self.salts)
    }

    /// Validate a token.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// 1. signature (never bypassed)
    /// 2. audience membership, unless [`Bypass::Audience`] is given
    /// 3. expiry (`now < expiresOn`), unless [`Bypass::ExpiresOn`] is given
    pub fn validate(&self, token: &Swt, bypass: &[Bypass]) -> Result<(), SwtError> {
        let result = self.check(token, bypass);
        match &result {
            Ok(()) => tracing::debug!(sti = %token.content.sti, "Token validated"),
            Err(e) => tracing::warn!(
                sti = %token.content.sti,
                code = e.code(),
                "Token rejected: {}",
                e
            ),
        }
        result
    }

    fn check(&self, token: &Swt, bypass: &[Bypass]) -> Result<(), SwtError> {
        signature::verify(&token.content, &self.salts, &token.signature)?;

        if !bypass.contains(&Bypass::Audience) && !self.audience.contains(&token.content.audience)
        {
            return Err(SwtError::InvalidAudience);
        }

        if !bypass.contains(&Bypass::ExpiresOn) && token.content.is_expired_at(self.clock.now()) {
            return Err(SwtError::TokenExpired);
        }

        Ok(())
    }
}

/// Parse a token from its wire form without verifying it.
pub fn parse_token_unverified(wire: &str) -> Result<Swt, SwtError> {
    Ok(Swt::from_json(wire)?)
}

impl fmt::Debug for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Issuer")
            .field("issuer", &self.issuer)
            .field("salts", &self.salts)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use swt_core::RelativeExpiry;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_735_689_600_000).unwrap()
    }

    fn issuer_with_clock() -> (Issuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let issuer = Issuer::new(
            "issuer.com.br",
            Salts::new("salt1", "salt2"),
            vec!["teste.com.br".into()],
        )
        .unwrap()
        .with_clock(clock.clone());
        (issuer, clock)
    }

    #[test]
    fn test_missing_issuer() {
        let err = Issuer::from_config(IssuerConfig::default()).unwrap_err();
        assert!(matches!(err, SwtError::IssuerNotDefined));

        let err = Issuer::new("", Salts::new("a", "b"), vec![]).unwrap_err();
        assert!(matches!(err, SwtError::IssuerNotDefined));
    }

    #[test]
    fn test_missing_salts() {
        let config = IssuerConfig::default().with_issuer("issuer.com.br");
        let err = Issuer::from_config(config).unwrap_err();
        assert!(matches!(err, SwtError::SaltsNotDefined));

        let err = Issuer::new("issuer.com.br", Salts::new("salt1", ""), vec![]).unwrap_err();
        assert!(matches!(err, SwtError::SaltsNotDefined));
    }

    #[test]
    fn test_accessors() {
        let config = IssuerConfig::default()
            .with_issuer("exemple.com.br")
            .with_salts(Salts::new("teste1", "teste2"))
            .with_audience(["maykon.com.br", "teste.com.br"]);
        let issuer = Issuer::from_config(config).unwrap();
        assert_eq!(issuer.issuer(), "exemple.com.br");
        assert_eq!(issuer.audience(), ["maykon.com.br", "teste.com.br"]);
    }

    #[test]
    fn test_issue_fills_content() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer
            .issue(&IssueContent::new("teste.com.br").with_extra("role", "reader"))
            .unwrap();

        assert!(Uuid::parse_str(&token.content.sti).is_ok());
        assert_eq!(token.content.issuer, "issuer.com.br");
        assert_eq!(token.content.audience, "teste.com.br");
        assert_eq!(
            token.content.expires_on,
            (start() + TimeDelta::minutes(15)).timestamp_millis()
        );
        assert_eq!(token.content.extras.get("role"), Some(&json!("reader")));
        assert_eq!(token.signature, issuer.sign(&token.content).unwrap());
    }

    #[test]
    fn test_issue_relative_expiry() {
        let (issuer, _) = issuer_with_clock();

        let token = issuer
            .issue(&IssueContent::new("teste.com.br").expires_in(RelativeExpiry::seconds(45)))
            .unwrap();
        assert_eq!(
            token.content.expires_on,
            start().timestamp_millis() + 45_000
        );

        let token = issuer
            .issue(&IssueContent::new("teste.com.br").expires_in(RelativeExpiry::minutes(90)))
            .unwrap();
        assert_eq!(
            token.content.expires_on,
            start().timestamp_millis() + 90 * 60_000
        );
    }

    #[test]
    fn test_issue_expiry_overflow() {
        let (issuer, _) = issuer_with_clock();
        for expiry in [
            RelativeExpiry::seconds(1e15),
            RelativeExpiry::minutes(f64::MAX),
            RelativeExpiry::seconds(f64::NAN),
        ] {
            let err = issuer
                .issue(&IssueContent::new("teste.com.br").expires_in(expiry))
                .unwrap_err();
            assert!(matches!(err, SwtError::ExpiryOutOfRange));
        }
    }

    #[test]
    fn test_issue_fractional_expiry() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer
            .issue(&IssueContent::new("teste.com.br").expires_in(RelativeExpiry::minutes(1.5)))
            .unwrap();
        assert_eq!(
            token.content.expires_on,
            start().timestamp_millis() + 90_000
        );
    }

    #[test]
    fn test_tokens_are_not_equal() {
        let (issuer, _) = issuer_with_clock();
        let content = IssueContent::new("teste.com.br");
        let first = issuer.issue(&content).unwrap();
        let second = issuer.issue(&content).unwrap();

        assert_ne!(first.content.sti, second.content.sti);
        assert_ne!(first.signature, second.signature);
        assert_ne!(first, second);
    }

    #[test]
    fn test_reserved_extras_rejected() {
        let (issuer, _) = issuer_with_clock();
        for key in RESERVED_FIELDS {
            let err = issuer
                .issue(&IssueContent::new("teste.com.br").with_extra(key, "x"))
                .unwrap_err();
            match err {
                SwtError::ReservedClaim { claim } => assert_eq!(claim, key),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_validate_ok() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer.issue(&IssueContent::new("teste.com.br")).unwrap();
        assert!(issuer.validate(&token, &[]).is_ok());
    }

    #[test]
    fn test_validate_invalid_audience() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer.issue(&IssueContent::new("outro.com.br")).unwrap();

        assert!(matches!(
            issuer.validate(&token, &[]),
            Err(SwtError::InvalidAudience)
        ));
        assert!(issuer.validate(&token, &[Bypass::Audience]).is_ok());
    }

    #[test]
    fn test_validate_expiry_boundary() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer.issue(&IssueContent::new("teste.com.br")).unwrap();

        clock.advance(TimeDelta::minutes(15) - TimeDelta::milliseconds(1));
        assert!(issuer.validate(&token, &[]).is_ok());

        clock.advance(TimeDelta::milliseconds(1));
        assert!(matches!(
            issuer.validate(&token, &[]),
            Err(SwtError::TokenExpired)
        ));
        assert!(issuer.validate(&token, &[Bypass::ExpiresOn]).is_ok());
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let (issuer, clock) = issuer_with_clock();
        let mut token = issuer.issue(&IssueContent::new("outro.com.br")).unwrap();
        token.content.extras.insert("role".into(), json!("admin"));
        clock.advance(TimeDelta::hours(2));

        assert!(matches!(
            issuer.validate(&token, &[]),
            Err(SwtError::InvalidSignature)
        ));
        assert!(matches!(
            issuer.validate(&token, &[Bypass::Audience, Bypass::ExpiresOn]),
            Err(SwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_debug_hides_salts() {
        let (issuer, _) = issuer_with_clock();
        let printed = format!("{:?}", issuer);
        assert!(printed.contains("issuer.com.br"));
        assert!(!printed.contains("salt1"));
    }
}
