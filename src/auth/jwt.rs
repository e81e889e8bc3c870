use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::{JwtConfig, MAX_TTL_MINUTES};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// JWT payload. `sub` carries the numeric user id as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub jti: Uuid,
}

/// What a valid token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: u64,
    pub email: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: TimeDuration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: TimeDuration::minutes(cfg.ttl_minutes.clamp(0, MAX_TTL_MINUTES)),
        }
    }

    pub fn issue(&self, user_id: u64, email: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: u64,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };
        let token =
            encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?
            .claims;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        let user_id = claims
            .sub
            .parse::<u64>()
            .map_err(|_| TokenError::Invalid("subject is not a user id".into()))?;
        let issued_at = OffsetDateTime::from_unix_timestamp(claims.iat)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        debug!(user_id, "jwt verified");
        Ok(Identity {
            user_id,
            email: claims.email,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60 * 24,
        })
    }

    #[test]
    fn issue_and_validate() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.issue(7, "a@x.com").expect("issue");
        let identity = keys.validate(&token).expect("validate");
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(
            identity.expires_at - identity.issued_at,
            TimeDuration::hours(24)
        );
    }

    #[test]
    fn tokens_for_same_subject_differ_and_both_validate() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc();
        let first = keys.issue_at(1, "a@x.com", now - TimeDuration::minutes(5)).unwrap();
        let second = keys.issue_at(1, "a@x.com", now).unwrap();
        let third = keys.issue_at(1, "a@x.com", now).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);

        let a = keys.validate(&first).unwrap();
        let b = keys.validate(&second).unwrap();
        assert!(a.expires_at < b.expires_at);
        keys.validate(&third).unwrap();
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let long_ago = OffsetDateTime::now_utc() - TimeDuration::hours(25);
        let token = keys.issue_at(1, "a@x.com", long_ago).unwrap();
        assert!(matches!(keys.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_expiring_right_now_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys
            .issue_at(1, "a@x.com", OffsetDateTime::now_utc() - TimeDuration::hours(24))
            .unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn any_tampered_byte_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(42, "tamper@x.com").unwrap();
        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                keys.validate(&tampered).is_err(),
                "tampering byte {i} should invalidate the token"
            );
        }
    }

    #[test]
    fn wrong_secret_issuer_or_audience_is_rejected() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let token = good.issue(1, "a@x.com").unwrap();

        for bad in [
            make_keys("other-secret", "good-iss", "good-aud"),
            make_keys("same-secret", "bad-iss", "good-aud"),
            make_keys("same-secret", "good-iss", "bad-aud"),
        ] {
            assert!(matches!(bad.validate(&token), Err(TokenError::Invalid(_))));
        }
    }

    #[test]
    fn oversized_lifetime_is_capped() {
        let keys = JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: i64::MAX,
        });
        let identity = keys.validate(&keys.issue(1, "a@x.com").unwrap()).unwrap();
        assert_eq!(
            identity.expires_at - identity.issued_at,
            TimeDuration::minutes(MAX_TTL_MINUTES)
        );
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert!(matches!(keys.validate(token), Err(TokenError::Invalid(_))));
        }
    }
}
