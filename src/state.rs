//! Startup: load keys once and hand out a ready engine.
//! Used by: main.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::keys::{public_key_from_file, KeyPair};
use crate::token::engine::TokenEngine;

pub type SharedEngine = Arc<TokenEngine>;

/// Reads both keys and builds a signing engine. Blocks on file I/O; the
/// returned engine is fully initialized and never loads anything again.
pub fn build_engine(config: &Config) -> Result<SharedEngine> {
    let keys = KeyPair::from_files(&config.private_key_path, &config.public_key_path)?;
    let engine = TokenEngine::new(keys, config.policy());
    tracing::info!(
        issuer = %config.issuer,
        lifetime_seconds = config.lifetime_seconds,
        "token engine ready"
    );
    Ok(Arc::new(engine))
}

/// Builds an engine from the public key alone, for verification-only use.
pub fn build_verifier(config: &Config) -> Result<SharedEngine> {
    let public = public_key_from_file(&config.public_key_path)?;
    let engine = TokenEngine::verify_only(public, config.policy());
    tracing::info!(issuer = %config.issuer, "token verifier ready");
    Ok(Arc::new(engine))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rsa::pkcs1v15::{SigningKey, VerifyingKey};
    use rsa::sha2::Sha256;
    use rsa::RsaPublicKey;

    use crate::keys::{load_private_key, load_public_key, KeyPair};
    use crate::token::engine::{Policy, TokenEngine};

    pub const PRIVATE_PEM: &str = include_str!("../testdata/private.pkcs8.pem");
    pub const PUBLIC_PEM: &str = include_str!("../testdata/public.pem");
    pub const OTHER_PRIVATE_PEM: &str = include_str!("../testdata/other_private.pkcs8.pem");
    pub const OTHER_PUBLIC_PEM: &str = include_str!("../testdata/other_public.pem");
    pub const PKCS1_PRIVATE_PEM: &str = include_str!("../testdata/rsa_private.pem");
    pub const EC_PRIVATE_PEM: &str = include_str!("../testdata/ec_private.pkcs8.pem");
    pub const EC_PUBLIC_PEM: &str = include_str!("../testdata/ec_public.pem");

    pub fn key_pair() -> KeyPair {
        KeyPair::from_pem(PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes()).unwrap()
    }

    pub fn public_key() -> RsaPublicKey {
        load_public_key(PUBLIC_PEM.as_bytes()).unwrap()
    }

    pub fn signing_key() -> SigningKey<Sha256> {
        SigningKey::new(load_private_key(PRIVATE_PEM.as_bytes()).unwrap())
    }

    pub fn verifying_key() -> VerifyingKey<Sha256> {
        VerifyingKey::new(public_key())
    }

    pub fn other_verifying_key() -> VerifyingKey<Sha256> {
        VerifyingKey::new(load_public_key(OTHER_PUBLIC_PEM.as_bytes()).unwrap())
    }

    pub fn engine() -> TokenEngine {
        TokenEngine::new(key_pair(), Policy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::error::{Error, KeyLoadError};

    fn testdata_config() -> Config {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
        Config {
            private_key_path: dir.join("private.pkcs8.pem"),
            public_key_path: dir.join("public.pem"),
            issuer: "https://a.example/".into(),
            lifetime_seconds: 120,
        }
    }

    #[test]
    fn engine_builds_from_files() -> Result<()> {
        let engine = build_engine(&testdata_config())?;
        assert!(engine.can_sign());
        let token = engine.issue_default("user-1")?;
        let claims = engine.verify(token.as_str(), "https://a.example/")?;
        assert_eq!(claims.lifetime().num_seconds(), 120);
        Ok(())
    }

    #[test]
    fn verifier_builds_without_private_key() -> Result<()> {
        let mut config = testdata_config();
        config.private_key_path = "absent.pem".into();
        let verifier = build_verifier(&config)?;
        assert!(!verifier.can_sign());
        Ok(())
    }

    #[test]
    fn missing_private_key_aborts_startup() {
        let mut config = testdata_config();
        config.private_key_path = "absent.pem".into();
        let result = build_engine(&config);
        assert!(matches!(
            result,
            Err(Error::KeyLoad(KeyLoadError::Missing { .. }))
        ));
    }

    #[test]
    fn swapped_key_files_abort_startup() {
        let mut config = testdata_config();
        std::mem::swap(&mut config.private_key_path, &mut config.public_key_path);
        let result = build_engine(&config);
        assert!(matches!(
            result,
            Err(Error::KeyLoad(KeyLoadError::Label { .. }))
        ));
    }

    #[test]
    fn other_fixture_pair_is_self_consistent() {
        let pair = KeyPair::from_pem(
            fixtures::OTHER_PRIVATE_PEM.as_bytes(),
            fixtures::OTHER_PUBLIC_PEM.as_bytes(),
        );
        assert!(pair.is_ok());
    }
}
