//! RS256 token verification.
//! Used by: token::engine.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Header};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::Verifier;
use serde::de::DeserializeOwned;

use crate::error::VerifyError;
use crate::token::claims::ClaimSet;

/// Checks structure, signature, validity window and issuer, in that order.
/// The first failing check decides the error.
pub fn verify_token(
    token: &str,
    key: &VerifyingKey<Sha256>,
    expected_issuer: &str,
    now: DateTime<Utc>,
) -> Result<ClaimSet, VerifyError> {
    if token.trim().is_empty() {
        return Err(VerifyError::InvalidInput);
    }

    let mut segments = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(VerifyError::MalformedToken("expected three segments".into()));
    };

    let header: Header = decode_segment(header_b64, "header")?;
    let claims: ClaimSet = decode_segment(claims_b64, "claims")?;

    if header.alg != Algorithm::RS256 {
        return Err(VerifyError::SignatureInvalid);
    }
    let sig_bytes = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| VerifyError::SignatureInvalid)?;
    let signature =
        Signature::try_from(sig_bytes.as_slice()).map_err(|_| VerifyError::SignatureInvalid)?;
    let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| VerifyError::SignatureInvalid)?;

    if claims.is_premature_at(now) {
        return Err(VerifyError::NotYetValid);
    }
    if claims.is_expired_at(now) {
        return Err(VerifyError::Expired);
    }

    if claims.iss != expected_issuer {
        return Err(VerifyError::IssuerMismatch {
            expected: expected_issuer.to_owned(),
            found: claims.iss,
        });
    }

    Ok(claims)
}

fn decode_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T, VerifyError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| VerifyError::MalformedToken(format!("{name} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| VerifyError::MalformedToken(format!("{name} is not valid: {e}")))
}
