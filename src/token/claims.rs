//! Claim set carried inside every token.
//! Used by: token::sign, token::verify, token::engine.

use chrono::serde::ts_seconds;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Optional profile claims about the subject.
///
/// Each field is emitted only when it holds a non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl Profile {
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_given_name(mut self, given_name: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self
    }

    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The decoded body of a token. Timestamps travel as whole seconds since
/// the epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimSet {
    pub iss: String,
    pub sub: String,
    pub jti: String,
    #[serde(with = "ts_seconds")]
    pub iat: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    pub nbf: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    pub exp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

impl ClaimSet {
    /// Fresh claims starting now, with a new random `jti`.
    pub fn new(issuer: &str, subject: &str, lifetime_seconds: u32, profile: Profile) -> Self {
        Self::starting_at(Utc::now(), issuer, subject, lifetime_seconds, profile)
    }

    pub(crate) fn starting_at(
        now: DateTime<Utc>,
        issuer: &str,
        subject: &str,
        lifetime_seconds: u32,
        profile: Profile,
    ) -> Self {
        let now = now.trunc_subsecs(0);
        Self {
            iss: issuer.to_owned(),
            sub: subject.to_owned(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            nbf: now,
            exp: now + Duration::seconds(i64::from(lifetime_seconds)),
            email: non_empty(profile.email),
            given_name: non_empty(profile.given_name),
            family_name: non_empty(profile.family_name),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.exp
    }

    pub fn is_premature_at(&self, now: DateTime<Utc>) -> bool {
        now < self.nbf
    }

    pub fn lifetime(&self) -> Duration {
        self.exp - self.iat
    }

    pub fn profile(&self) -> Profile {
        Profile {
            email: self.email.clone(),
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
        }
    }
}
