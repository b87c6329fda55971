//! # swt-token
//!
//! Issuance and validation of Simple Web Tokens.
//!
//! An [`Issuer`] holds an identity, a pair of signing salts and an audience
//! allow-list. It mints tokens with a fresh id and an expiry, and validates
//! presented tokens in three steps:
//!
//! | Check | Failure | Bypass |
//! |-------|---------|--------|
//! | Signature (double HMAC-SHA256) | [`SwtError::InvalidSignature`] | never |
//! | Audience in allow-list | [`SwtError::InvalidAudience`] | [`Bypass::Audience`] |
//! | `now < expiresOn` | [`SwtError::TokenExpired`] | [`Bypass::ExpiresOn`] |
//!
//! ```no_run
//! use swt_token::{IssueContent, Issuer, RelativeExpiry, Salts};
//!
//! let issuer = Issuer::new(
//!     "issuer.com.br",
//!     Salts::new("salt1", "salt2"),
//!     vec!["teste.com.br".into()],
//! )?;
//!
//! let token = issuer.issue(
//!     &IssueContent::new("teste.com.br").expires_in(RelativeExpiry::minutes(90)),
//! )?;
//! issuer.validate(&token, &[])?;
//! # Ok::<(), swt_token::SwtError>(())
//! ```

pub mod clock;
pub mod error;
pub mod issuer;
pub mod signature;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SwtError;
pub use issuer::{Issuer, parse_token_unverified};
pub use swt_core::{
    Bypass, IssueContent, IssuerConfig, RelativeExpiry, Salts, Swt, SwtContent, TimeScale,
};
