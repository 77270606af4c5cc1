use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a presented token was not accepted.
///
/// `Invalid` and `Expired` collapse to the same HTTP response; they are kept apart so the
/// cause is visible in logs and tests.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, or not a well-formed token.
    #[error("token invalid: {0}")]
    Invalid(String),
    /// Signature is good but `now >= exp`.
    #[error("token expired")]
    Expired,
    #[error("token signing failed")]
    Signing,
}

/// Identity carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectClaims {
    pub subject_id: Uuid,
    pub username: String,
    pub email: String,
}

/// Claims after signature and expiry checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: SubjectClaims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionTokenClaims {
    sub: String,
    username: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// HS256 session-token codec.
///
/// Expiry is checked here against an explicit clock instead of inside `jsonwebtoken`, so a
/// stale token is reported as `Expired` only after its signature verified.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject` that expires after the configured TTL.
    pub fn issue(&self, subject: &SubjectClaims) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, self.ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &SubjectClaims,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let exp = iat + ttl.num_seconds();

        let claims = SessionTokenClaims {
            sub: subject.subject_id.to_string(),
            username: subject.username.clone(),
            email: subject.email.clone(),
            iat,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
            TokenError::Signing
        })?;

        Ok(IssuedToken {
            token,
            expires_at: timestamp(exp)?,
        })
    }

    pub fn validate(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Signature first, then expiry. A token is live only while `now < exp`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let data = jsonwebtoken::decode::<SessionTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let subject_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| TokenError::Invalid("'sub' is not a UUID".to_string()))?;

        Ok(VerifiedToken {
            subject: SubjectClaims {
                subject_id,
                username: claims.username,
                email: claims.email,
            },
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TokenError::Invalid(format!("timestamp out of range: {secs}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, Duration::seconds(900))
    }

    fn subject() -> SubjectClaims {
        SubjectClaims {
            subject_id: Uuid::new_v4(),
            username: "rain".to_string(),
            email: "rain@example.com".to_string(),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn round_trip_before_expiry_returns_input_claims() {
        let c = codec();
        let s = subject();
        let issued = c.issue_at(&s, Duration::seconds(60), at(1_700_000_000)).unwrap();

        let v = c.validate_at(&issued.token, at(1_700_000_059)).unwrap();
        assert_eq!(v.subject, s);
        assert_eq!(v.issued_at, at(1_700_000_000));
        assert_eq!(v.expires_at, at(1_700_000_060));
        assert_eq!(issued.expires_at, v.expires_at);
    }

    #[test]
    fn expired_at_and_after_exp() {
        let c = codec();
        let issued = c
            .issue_at(&subject(), Duration::seconds(60), at(1_700_000_000))
            .unwrap();

        assert!(matches!(
            c.validate_at(&issued.token, at(1_700_000_060)),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            c.validate_at(&issued.token, at(1_800_000_000)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn validation_is_repeatable() {
        let c = codec();
        let s = subject();
        let issued = c.issue_at(&s, Duration::seconds(60), at(1_700_000_000)).unwrap();

        let a = c.validate_at(&issued.token, at(1_700_000_010)).unwrap();
        let b = c.validate_at(&issued.token, at(1_700_000_010)).unwrap();
        assert_eq!(a, b);

        for _ in 0..2 {
            assert!(matches!(
                c.validate_at(&issued.token, at(1_700_000_100)),
                Err(TokenError::Expired)
            ));
        }
    }

    #[test]
    fn tampered_signature_is_invalid_even_when_stale() {
        let c = codec();
        let issued = c
            .issue_at(&subject(), Duration::seconds(60), at(1_700_000_000))
            .unwrap();

        let (head, sig) = issued.token.rsplit_once('.').unwrap();
        let mut sig_bytes = URL_SAFE_NO_PAD.decode(sig).unwrap();
        sig_bytes[0] ^= 0x01;
        let tampered = format!("{head}.{}", URL_SAFE_NO_PAD.encode(sig_bytes));

        // before expiry
        assert!(matches!(
            c.validate_at(&tampered, at(1_700_000_001)),
            Err(TokenError::Invalid(_))
        ));
        // after expiry: still Invalid, never Expired
        assert!(matches!(
            c.validate_at(&tampered, at(1_900_000_000)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let c = codec();
        let issued = c
            .issue_at(&subject(), Duration::seconds(60), at(1_700_000_000))
            .unwrap();

        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            br#"{"sub":"00000000-0000-0000-0000-000000000000","username":"x","email":"x","iat":0,"exp":9999999999}"#,
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            c.validate_at(&forged, at(1_700_000_001)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn other_key_is_invalid() {
        let issued = codec()
            .issue_at(&subject(), Duration::seconds(60), at(1_700_000_000))
            .unwrap();
        let rotated = TokenCodec::new(b"another-secret-another-secret-0000", Duration::seconds(60));

        assert!(matches!(
            rotated.validate_at(&issued.token, at(1_700_000_001)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        let c = codec();
        for token in ["", "not-a-token", "a.b.c", "a.b"] {
            assert!(matches!(
                c.validate_at(token, at(1_700_000_000)),
                Err(TokenError::Invalid(_))
            ));
        }
    }

    #[test]
    fn default_entry_points_use_configured_ttl() {
        let c = codec();
        let s = subject();
        let issued = c.issue(&s).unwrap();
        let v = c.validate(&issued.token).unwrap();
        assert_eq!(v.subject, s);
        assert_eq!((v.expires_at - v.issued_at).num_seconds(), 900);
    }
}
