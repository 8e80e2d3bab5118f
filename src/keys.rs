//! RSA key pair loading from PEM material.
//! Used by: state, token::engine.
//!
//! The private key is expected as an unencrypted PKCS#8 `PRIVATE KEY` block
//! and the public key as an X.509 `PUBLIC KEY` (SubjectPublicKeyInfo) block.
//! A suitable pair can be produced with:
//!
//! ```text
//! openssl genrsa -out private.rsa.pem 2048
//! openssl pkcs8 -topk8 -inform PEM -in private.rsa.pem -out private.pkcs8.pem -nocrypt
//! openssl pkey -in private.rsa.pem -pubout -out public.pem
//! ```

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::KeyLoadError;

const PRIVATE_LABEL: &str = "PRIVATE KEY";
const PUBLIC_LABEL: &str = "PUBLIC KEY";

/// Parses a PKCS#8 PEM blob into an RSA private key.
pub fn load_private_key(pem: &[u8]) -> Result<RsaPrivateKey, KeyLoadError> {
    let der = pem_body(pem, PRIVATE_LABEL)?;
    Ok(RsaPrivateKey::from_pkcs8_der(&der)?)
}

/// Parses an X.509 SubjectPublicKeyInfo PEM blob into an RSA public key.
pub fn load_public_key(pem: &[u8]) -> Result<RsaPublicKey, KeyLoadError> {
    let der = pem_body(pem, PUBLIC_LABEL)?;
    Ok(RsaPublicKey::from_public_key_der(&der)?)
}

/// Strips the BEGIN/END marker lines and all line breaks, then base64-decodes
/// what is left.
fn pem_body(pem: &[u8], label: &'static str) -> Result<Vec<u8>, KeyLoadError> {
    let text = std::str::from_utf8(pem).map_err(|_| KeyLoadError::NotText)?;
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let start = text
        .find(&begin)
        .map(|i| i + begin.len())
        .ok_or(KeyLoadError::Label { expected: label })?;
    let stop = text[start..]
        .find(&end)
        .map(|i| i + start)
        .ok_or(KeyLoadError::Label { expected: label })?;

    let body: String = text[start..stop]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if body.is_empty() {
        return Err(KeyLoadError::EmptyBody);
    }
    Ok(STANDARD.decode(body)?)
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, KeyLoadError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => KeyLoadError::Missing {
            path: path.to_path_buf(),
        },
        _ => KeyLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Signing and verification halves of one RSA key.
///
/// Immutable once built. Loading again and building a new engine is how a
/// caller would swap keys.
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Pairs two already-parsed keys, refusing a public key that belongs to
    /// some other private key.
    pub fn new(private: RsaPrivateKey, public: RsaPublicKey) -> Result<Self, KeyLoadError> {
        if private.to_public_key() != public {
            return Err(KeyLoadError::Mismatch);
        }
        Ok(Self { private, public })
    }

    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, KeyLoadError> {
        Self::new(load_private_key(private_pem)?, load_public_key(public_pem)?)
    }

    /// Reads both PEM files. Blocking; meant for the startup phase only.
    pub fn from_files(
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, KeyLoadError> {
        let private_path = private_path.as_ref();
        let public_path = public_path.as_ref();
        let pair = Self::from_pem(
            &read_key_file(private_path)?,
            &read_key_file(public_path)?,
        )
        .inspect_err(|e| tracing::error!(error = %e, "key pair rejected"))?;
        tracing::info!(
            private = %private_path.display(),
            public = %public_path.display(),
            bits = pair.modulus_bits(),
            "loaded RSA key pair"
        );
        Ok(pair)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn modulus_bits(&self) -> usize {
        self.public.size() * 8
    }

    pub(crate) fn into_parts(self) -> (RsaPrivateKey, RsaPublicKey) {
        (self.private, self.public)
    }
}

/// Reads a public key on its own, for deployments that only verify.
pub fn public_key_from_file(path: impl AsRef<Path>) -> Result<RsaPublicKey, KeyLoadError> {
    let path = path.as_ref();
    let key = load_public_key(&read_key_file(path)?).inspect_err(
        |e| tracing::error!(error = %e, path = %path.display(), "public key rejected"),
    )?;
    tracing::info!(path = %path.display(), bits = key.size() * 8, "loaded RSA public key");
    Ok(key)
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}
