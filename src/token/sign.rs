//! RS256 token signing.
//! Used by: token::engine.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, Header};
use rsa::pkcs1v15::SigningKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};

use crate::error::SigningError;
use crate::token::claims::ClaimSet;

/// Produces `header.claims.signature`, each segment base64url without padding.
pub fn sign_token(claims: &ClaimSet, key: &SigningKey<Sha256>) -> Result<String, SigningError> {
    let header = serde_json::to_vec(&Header::new(Algorithm::RS256))?;
    let payload = serde_json::to_vec(claims)?;
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = key.try_sign(signing_input.as_bytes())?;
    let encoded_signature = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    Ok(format!("{}.{}", signing_input, encoded_signature))
}
