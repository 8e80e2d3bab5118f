//! Error taxonomy for key loading, issuance, and verification.
//! Used by: keys, token, config, state, main.

use std::path::PathBuf;

/// Key material could not be turned into a usable RSA key.
///
/// Fatal at startup: the engine cannot be built without its keys and
/// nothing retries a failed load.
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    #[error("key file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read key file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key material is not valid UTF-8 PEM text")]
    NotText,

    #[error("expected a PEM block labelled \"{expected}\"")]
    Label { expected: &'static str },

    #[error("PEM block has an empty body")]
    EmptyBody,

    #[error("PEM body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("not a PKCS#8 RSA private key: {0}")]
    PrivateKey(#[from] rsa::pkcs8::Error),

    #[error("not an X.509 RSA public key: {0}")]
    PublicKey(#[from] rsa::pkcs8::spki::Error),

    #[error("public key does not belong to the private key")]
    Mismatch,
}

/// A token could not be produced. No partial token is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("no signing key is loaded")]
    KeyUnavailable,

    #[error("claim {0} must not be empty")]
    EmptyClaim(&'static str),

    #[error("token lifetime must be at least one second")]
    InvalidLifetime,

    #[error("claim serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("RSA signing failed: {0}")]
    Rsa(#[from] rsa::signature::Error),
}

/// Why a presented token was refused.
///
/// A token that fails once fails the same way every time, so callers
/// should surface these rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("no token supplied")]
    InvalidInput,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid signature")]
    SignatureInvalid,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("issuer mismatch: expected {expected}, found {found}")]
    IssuerMismatch { expected: String, found: String },
}

impl VerifyError {
    /// Stable machine-readable reason, suitable for logs and transport mapping.
    pub fn reason(&self) -> &'static str {
        match self {
            VerifyError::InvalidInput => "invalid_input",
            VerifyError::MalformedToken(_) => "malformed_token",
            VerifyError::SignatureInvalid => "signature_invalid",
            VerifyError::Expired => "expired",
            VerifyError::NotYetValid => "not_yet_valid",
            VerifyError::IssuerMismatch { .. } => "issuer_mismatch",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds between 1 and {max}, got {value:?}")]
    Lifetime {
        var: &'static str,
        value: String,
        max: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    KeyLoad(#[from] KeyLoadError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read token from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("failed to render claims: {0}")]
    Output(#[source] serde_json::Error),
}

impl Error {
    /// Process exit status for the `tokenmint` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Verify(_) => 1,
            Error::Signing(_) => 2,
            Error::KeyLoad(_) | Error::Config(_) | Error::Stdin(_) | Error::Output(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failures_exit_1() {
        let err: Error = VerifyError::Expired.into();
        assert_eq!(err.exit_code(), 1);
        let err: Error = VerifyError::InvalidInput.into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn signing_failures_exit_2() {
        let err: Error = SigningError::KeyUnavailable.into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn key_failures_exit_3() {
        let err: Error = KeyLoadError::Missing {
            path: PathBuf::from("private.pkcs8.pem"),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn reasons_are_distinct() {
        let all = [
            VerifyError::InvalidInput,
            VerifyError::MalformedToken("x".into()),
            VerifyError::SignatureInvalid,
            VerifyError::Expired,
            VerifyError::NotYetValid,
            VerifyError::IssuerMismatch {
                expected: "a".into(),
                found: "b".into(),
            },
        ];
        let mut reasons: Vec<_> = all.iter().map(VerifyError::reason).collect();
        reasons.sort_unstable();
        reasons.dedup();
        assert_eq!(reasons.len(), all.len());
    }

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(VerifyError::Expired.to_string(), "token expired");
        assert_eq!(VerifyError::SignatureInvalid.to_string(), "invalid signature");
        assert_eq!(
            VerifyError::IssuerMismatch {
                expected: "https://b.example/".into(),
                found: "https://a.example/".into(),
            }
            .to_string(),
            "issuer mismatch: expected https://b.example/, found https://a.example/"
        );
        assert_eq!(
            KeyLoadError::Missing {
                path: PathBuf::from("keys/public.pem")
            }
            .to_string(),
            "key file not found: keys/public.pem"
        );
    }
}
