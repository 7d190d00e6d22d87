use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use sha2::Sha256;
use uuid::Uuid;

use database_layer::UserRole;

use crate::config::{IdentityConfig, ISSUER};
use crate::error::{IdentityError, Result};
use crate::models::{Claims, TokenKind, TokenPair};

type HmacSha256 = Hmac<Sha256>;

/// Issues and validates the access/refresh token pair (§4.6). Each kind is
/// signed with its own secret, so a leaked refresh secret cannot be used to
/// forge an access token and vice versa.
pub struct TokenIssuer {
    access_key: HmacSha256,
    refresh_key: HmacSha256,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let access_key = HmacSha256::new_from_slice(config.access_secret.as_bytes())
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        let refresh_key = HmacSha256::new_from_slice(config.refresh_secret.as_bytes())
            .map_err(|e| IdentityError::Signing(e.to_string()))?;

        Ok(Self {
            access_key,
            refresh_key,
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        hospital_id: Option<Uuid>,
        tenant_id: Uuid,
        is_super_admin: bool,
    ) -> Result<TokenPair> {
        let now = Utc::now();

        let access_claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            hospital_id,
            tenant_id,
            is_super_admin,
            kind: TokenKind::Access,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        let refresh_claims = Claims {
            kind: TokenKind::Refresh,
            exp: (now + self.refresh_ttl).timestamp(),
            ..access_claims.clone()
        };

        let access = access_claims
            .sign_with_key(&self.access_key)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        let refresh = refresh_claims
            .sign_with_key(&self.refresh_key)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;

        Ok(TokenPair {
            access,
            refresh,
            access_expires_at: now + self.access_ttl,
            refresh_expires_at: now + self.refresh_ttl,
        })
    }

    pub fn validate(&self, token: &str, expected_kind: TokenKind) -> Result<Claims> {
        let key = match expected_kind {
            TokenKind::Access => &self.access_key,
            TokenKind::Refresh => &self.refresh_key,
        };

        let claims: Claims = token
            .verify_with_key(key)
            .map_err(|_| IdentityError::InvalidToken)?;

        if claims.iss != ISSUER {
            return Err(IdentityError::InvalidToken);
        }
        if claims.kind != expected_kind {
            return Err(IdentityError::TokenKindMismatch {
                expected: expected_kind.as_str(),
                actual: claims.kind.as_str().to_string(),
            });
        }

        let now = Utc::now().timestamp();
        if claims.exp < now {
            return Err(IdentityError::TokenExpired);
        }
        if claims.nbf > now {
            return Err(IdentityError::InvalidToken);
        }

        Ok(claims)
    }
}
