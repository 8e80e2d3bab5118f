//! The token engine: issue and verify against one loaded key pair.
//! Used by: state, main.

use std::fmt;

use chrono::Utc;
use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::RsaPublicKey;

use crate::error::{SigningError, VerifyError};
use crate::keys::KeyPair;
use crate::telemetry::Metrics;
use crate::token::claims::{ClaimSet, Profile};
use crate::token::sign::sign_token;
use crate::token::verify::verify_token;

pub const DEFAULT_LIFETIME_SECS: u32 = 3600;
pub const DEFAULT_ISSUER: &str = "https://localhost/";

/// Issuer and lifetime used by [`TokenEngine::issue_default`] and
/// [`TokenEngine::is_valid`]. Fixed for the life of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub issuer: String,
    pub lifetime_seconds: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_owned(),
            lifetime_seconds: DEFAULT_LIFETIME_SECS,
        }
    }
}

/// Issues and verifies RS256 tokens.
///
/// Holds no mutable state besides atomic counters, so one instance can be
/// shared across threads behind an `Arc` without further locking. Every
/// verification names the issuer it accepts; nothing written by `issue` is
/// ever read by `verify`.
pub struct TokenEngine {
    signing_key: Option<SigningKey<Sha256>>,
    verifying_key: VerifyingKey<Sha256>,
    policy: Policy,
    metrics: Metrics,
}

impl TokenEngine {
    pub fn new(keys: KeyPair, policy: Policy) -> Self {
        let (private, public) = keys.into_parts();
        Self {
            signing_key: Some(SigningKey::<Sha256>::new(private)),
            verifying_key: VerifyingKey::<Sha256>::new(public),
            policy,
            metrics: Metrics::new(),
        }
    }

    /// An engine that can verify but not issue. `issue` on it fails with
    /// [`SigningError::KeyUnavailable`].
    pub fn verify_only(public: RsaPublicKey, policy: Policy) -> Self {
        Self {
            signing_key: None,
            verifying_key: VerifyingKey::<Sha256>::new(public),
            policy,
            metrics: Metrics::new(),
        }
    }

    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Mints a token for `subject`, valid from now for `lifetime_seconds`.
    ///
    /// The caller is responsible for having authenticated the subject.
    ///
    /// # Errors
    ///
    /// [`SigningError::KeyUnavailable`] on a verify-only engine,
    /// [`SigningError::EmptyClaim`] for an empty subject or issuer,
    /// [`SigningError::InvalidLifetime`] for a zero lifetime, and the
    /// serialization/RSA variants if encoding or signing fails.
    pub fn issue(
        &self,
        subject: &str,
        issuer: &str,
        lifetime_seconds: u32,
        profile: Profile,
    ) -> Result<String, SigningError> {
        let result = self.try_issue(subject, issuer, lifetime_seconds, profile);
        match &result {
            Ok(_) => self.metrics.record_issue(),
            Err(e) => {
                self.metrics.record_signing_failure();
                tracing::error!(sub = %subject, iss = %issuer, error = %e, "unable to create token");
            }
        }
        result
    }

    fn try_issue(
        &self,
        subject: &str,
        issuer: &str,
        lifetime_seconds: u32,
        profile: Profile,
    ) -> Result<String, SigningError> {
        let key = self.signing_key.as_ref().ok_or(SigningError::KeyUnavailable)?;
        if subject.is_empty() {
            return Err(SigningError::EmptyClaim("sub"));
        }
        if issuer.is_empty() {
            return Err(SigningError::EmptyClaim("iss"));
        }
        if lifetime_seconds == 0 {
            return Err(SigningError::InvalidLifetime);
        }

        let claims = ClaimSet::new(issuer, subject, lifetime_seconds, profile);
        let token = sign_token(&claims, key)?;
        tracing::info!(
            sub = %claims.sub,
            iss = %claims.iss,
            jti = %claims.jti,
            exp = claims.exp.timestamp(),
            "token minted"
        );
        Ok(token)
    }

    /// [`issue`](Self::issue) with the engine's policy issuer and lifetime
    /// and no profile claims.
    pub fn issue_default(&self, subject: &str) -> Result<String, SigningError> {
        self.issue(
            subject,
            &self.policy.issuer,
            self.policy.lifetime_seconds,
            Profile::default(),
        )
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Accepts `&str` or `Option<&str>`; `None`, empty and blank tokens are
    /// [`VerifyError::InvalidInput`].
    pub fn verify<'a>(
        &self,
        token: impl Into<Option<&'a str>>,
        expected_issuer: &str,
    ) -> Result<ClaimSet, VerifyError> {
        let result = match token.into() {
            None => Err(VerifyError::InvalidInput),
            Some(token) => verify_token(token, &self.verifying_key, expected_issuer, Utc::now()),
        };
        match &result {
            Ok(claims) => {
                self.metrics.record_verify();
                tracing::debug!(sub = %claims.sub, jti = %claims.jti, "token verified");
            }
            Err(_) => self.metrics.record_reject(),
        }
        result
    }

    /// `true` when `token` verifies against the policy issuer. The reason
    /// for a rejection is logged and otherwise discarded; use
    /// [`verify`](Self::verify) when it matters.
    pub fn is_valid<'a>(&self, token: impl Into<Option<&'a str>>) -> bool {
        match self.verify(token, &self.policy.issuer) {
            Ok(_) => true,
            Err(e) => {
                tracing::info!(reason = e.reason(), detail = %e, "token is not valid");
                false
            }
        }
    }
}

impl fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEngine")
            .field("can_sign", &self.can_sign())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
