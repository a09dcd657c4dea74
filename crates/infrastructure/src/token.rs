//! HS256 JWT 令牌服务

use application::token::{TokenClaims, TokenError, TokenKind, TokenPair, TokenService};
use domain::{Timestamp, UserId};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// JWT 载荷
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    token_type: TokenKind,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    fn issue(&self, user_id: UserId, kind: TokenKind) -> Result<String, TokenError> {
        let now = Timestamp::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Encode(err.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenKind::Access)?,
            refresh: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    fn issue_access(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Access)
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(err.to_string()),
            }
        })?;
        let claims = data.claims;

        if claims.token_type != expected {
            return Err(TokenError::Invalid(format!(
                "expected {} token, got {}",
                expected.as_str(),
                claims.token_type.as_str()
            )));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| TokenError::Invalid("malformed subject".to_owned()))?;
        let jti = Uuid::parse_str(&claims.jti)
            .map_err(|_| TokenError::Invalid("malformed token id".to_owned()))?;
        let issued_at = Timestamp::from_unix_timestamp(claims.iat)
            .map_err(|_| TokenError::Invalid("malformed issue time".to_owned()))?;
        let expires_at = Timestamp::from_unix_timestamp(claims.exp)
            .map_err(|_| TokenError::Invalid("malformed expiry".to_owned()))?;

        Ok(TokenClaims {
            user_id: UserId::from(user_id),
            jti,
            kind: claims.token_type,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(access_ttl: Duration) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_owned(),
            access_ttl,
            refresh_ttl: Duration::days(1),
        })
    }

    #[test]
    fn pair_round_trips_with_distinct_ids() {
        let service = service(Duration::minutes(5));
        let user_id = UserId::generate();
        let pair = service.issue_pair(user_id).unwrap();

        let access = service.decode(&pair.access, TokenKind::Access).unwrap();
        let refresh = service.decode(&pair.refresh, TokenKind::Refresh).unwrap();

        assert_eq!(access.user_id, user_id);
        assert_eq!(refresh.user_id, user_id);
        assert_ne!(access.jti, refresh.jti);
        assert!(refresh.expires_at > access.expires_at);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let service = service(Duration::minutes(5));
        let pair = service.issue_pair(UserId::generate()).unwrap();

        assert!(matches!(
            service.decode(&pair.refresh, TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            service.decode(&pair.access, TokenKind::Refresh),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let expired = service(Duration::seconds(-10))
            .issue_access(UserId::generate())
            .unwrap();
        assert!(matches!(
            service(Duration::minutes(5)).decode(&expired, TokenKind::Access),
            Err(TokenError::Expired)
        ));

        let foreign = JwtTokenService::new(JwtConfig {
            secret: "another-secret-another-secret-xx".to_owned(),
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::days(1),
        })
        .issue_access(UserId::generate())
        .unwrap();
        assert!(matches!(
            service(Duration::minutes(5)).decode(&foreign, TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
        assert!(service(Duration::minutes(5)).decode("not.a.jwt", TokenKind::Access).is_err());
    }
}
