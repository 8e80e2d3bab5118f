//! tokenmint: RS256 identity tokens for already-authenticated principals.
//!
//! Keys are loaded once at startup ([`state::build_engine`]); the resulting
//! [`TokenEngine`] issues compact `header.claims.signature` tokens and
//! verifies them against an explicitly named issuer.

pub mod config;
pub mod console;
pub mod error;
pub mod keys;
pub mod state;
pub mod telemetry;
pub mod token;

pub use error::{Error, KeyLoadError, Result, SigningError, VerifyError};
pub use keys::KeyPair;
pub use state::SharedEngine;
pub use token::{ClaimSet, Policy, Profile, TokenEngine};
