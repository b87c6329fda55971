//! # swt-core
//!
//! Configuration and wire types for Simple Web Tokens (SWT).
//!
//! An SWT is a JSON object with two members:
//!
//! ```json
//! {
//!   "content": {
//!     "sti": "5b1f2f0e-5d8c-4c5e-9a8e-3f1f6c7d2a10",
//!     "issuer": "issuer.com.br",
//!     "audience": "teste.com.br",
//!     "expiresOn": 1735690500000,
//!     "role": "reader"
//!   },
//!   "signature": "base64..."
//! }
//! ```
//!
//! Extra caller fields (like `role` above) are flattened into `content` after
//! the fixed fields and are covered by the signature. Signing and verification
//! live in `swt-token`; this crate has no crypto.

pub mod config;
pub mod content;

pub use config::{IssuerConfig, Salts};
pub use content::{
    Bypass, DEFAULT_EXPIRY_MINUTES, IssueContent, RESERVED_FIELDS, RelativeExpiry, Swt,
    SwtContent, TimeScale,
};
