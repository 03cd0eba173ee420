use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// `iss` claim stamped on every token and required on validation.
pub const ISSUER: &str = "cloudmarket";

/// Tokens expire 24 hours after issuance.
pub const TOKEN_TTL: Duration = Duration::hours(24);

/// Tokens are issued with HS256; any HMAC variant validates.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub iss: String,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues HS256 tokens and validates HMAC-signed ones.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    pub fn issue(&self, id: Uuid, email: &str, role: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(id, email, role, TOKEN_TTL)
    }

    pub fn issue_with_ttl(
        &self,
        id: Uuid,
        email: &str,
        role: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = JwtClaims {
            id,
            email: email.to_string(),
            role: role.to_string(),
            iss: ISSUER.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies the signature, an HMAC algorithm and the issuer, then rejects
    /// tokens whose `exp` lies in the past even if the decoder's own check let
    /// them through.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        let data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        if data.claims.exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(secret: &str) -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(secret).unwrap())
    }

    const SECRET: &str = "unit-test-secret-that-is-long-enough-123";

    #[test]
    fn test_issue_then_validate_round_trips_claims() {
        let auth = auth(SECRET);
        let id = Uuid::now_v7();
        let token = auth.issue(id, "ada@example.com", "admin").unwrap();

        let claims = auth.validate(&token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iss, ISSUER);

        let expected_exp = (Utc::now() + TOKEN_TTL).timestamp();
        assert!((claims.exp - expected_exp).abs() <= 5);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth(SECRET);
        let token = auth
            .issue_with_ttl(Uuid::now_v7(), "ada@example.com", "user", Duration::hours(-1))
            .unwrap();

        let err = auth.validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
        assert_eq!(err.to_string(), "token has expired");
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let token = auth(SECRET)
            .issue(Uuid::now_v7(), "ada@example.com", "user")
            .unwrap();

        let err = auth("a-completely-different-secret-of-32+chars")
            .validate(&token)
            .unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let claims = JwtClaims {
            id: Uuid::now_v7(),
            email: "ada@example.com".into(),
            role: "user".into(),
            iss: "someone-else".into(),
            exp: (Utc::now() + TOKEN_TTL).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            auth(SECRET).validate(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    fn claims() -> JwtClaims {
        JwtClaims {
            id: Uuid::now_v7(),
            email: "ada@example.com".into(),
            role: "user".into(),
            iss: ISSUER.into(),
            exp: (Utc::now() + TOKEN_TTL).timestamp(),
        }
    }

    #[test]
    fn test_other_hmac_algorithms_are_accepted() {
        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let expected = claims();
            let token = encode(
                &Header::new(alg),
                &expected,
                &EncodingKey::from_secret(SECRET.as_bytes()),
            )
            .unwrap();

            assert_eq!(auth(SECRET).validate(&token).unwrap(), expected, "{alg:?}");
        }
    }

    #[test]
    fn test_non_hmac_algorithm_header_is_rejected() {
        let token = auth(SECRET)
            .issue(Uuid::now_v7(), "ada@example.com", "user")
            .unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        // {"alg":"RS256","typ":"JWT"}
        let rs256 = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{rest}");

        assert!(matches!(
            auth(SECRET).validate(&rs256),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert!(matches!(
            auth(SECRET).validate("not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }
}
