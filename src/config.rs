//! Runtime configuration from environment variables.
//! Used by: state, main.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::token::engine::{Policy, DEFAULT_ISSUER, DEFAULT_LIFETIME_SECS};

pub const PRIVATE_KEY_VAR: &str = "TOKENMINT_PRIVATE_KEY";
pub const PUBLIC_KEY_VAR: &str = "TOKENMINT_PUBLIC_KEY";
pub const ISSUER_VAR: &str = "TOKENMINT_ISSUER";
pub const LIFETIME_VAR: &str = "TOKENMINT_LIFETIME_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PKCS#8 PEM private key
    pub private_key_path: PathBuf,

    /// X.509 SubjectPublicKeyInfo PEM public key
    pub public_key_path: PathBuf,

    /// Issuer stamped on tokens and accepted by `is_valid`
    pub issuer: String,

    /// Default token lifetime in seconds
    pub lifetime_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            private_key_path: PathBuf::from("private.pkcs8.pem"),
            public_key_path: PathBuf::from("public.pem"),
            issuer: DEFAULT_ISSUER.to_owned(),
            lifetime_seconds: DEFAULT_LIFETIME_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from any variable source; unset or empty variables
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).filter(|v: &String| !v.trim().is_empty());

        if let Some(path) = get(PRIVATE_KEY_VAR) {
            config.private_key_path = PathBuf::from(path);
        }

        if let Some(path) = get(PUBLIC_KEY_VAR) {
            config.public_key_path = PathBuf::from(path);
        }

        if let Some(issuer) = get(ISSUER_VAR) {
            config.issuer = issuer;
        }

        if let Some(lifetime) = get(LIFETIME_VAR) {
            config.lifetime_seconds = parse_lifetime(LIFETIME_VAR, &lifetime)?;
        }

        Ok(config)
    }

    pub fn policy(&self) -> Policy {
        Policy {
            issuer: self.issuer.clone(),
            lifetime_seconds: self.lifetime_seconds,
        }
    }
}

pub fn parse_lifetime(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Lifetime {
            var,
            value: value.to_owned(),
            max: u32::MAX,
        }),
    }
}
