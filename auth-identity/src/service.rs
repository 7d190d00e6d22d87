use std::sync::Arc;

use uuid::Uuid;

use database_layer::{TenantRepository, UserRepository};

use crate::config::IdentityConfig;
use crate::error::{IdentityError, Result};
use crate::models::{Claims, EffectiveTenant, LoginResponse, TokenKind, TokenPair};
use crate::password::PasswordHasher;
use crate::rate_limit::RateLimit;
use crate::token::TokenIssuer;

/// Orchestrates login, refresh, logout, and token validation (§4.6).
/// Collaborators are injected explicitly — no global singleton holds the
/// signing keys or the user repository (§9).
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    tenant_repo: Arc<dyn TenantRepository>,
    tokens: TokenIssuer,
    rate_limiter: Arc<dyn RateLimit>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        tenant_repo: Arc<dyn TenantRepository>,
        config: &IdentityConfig,
        rate_limiter: Arc<dyn RateLimit>,
    ) -> Result<Self> {
        Ok(Self {
            user_repo,
            tenant_repo,
            tokens: TokenIssuer::new(config)?,
            rate_limiter,
        })
    }

    /// Authenticates `email`/`password` from `client_ip`, applying the
    /// fixed-window login rate limit before ever touching the password hash
    /// so a flood of attempts can't be used to time-oracle a valid account.
    pub async fn login(&self, client_ip: &str, email: &str, password: &str) -> Result<LoginResponse> {
        self.rate_limiter.check(client_ip).await?;

        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(IdentityError::Database)?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !user.is_active {
            return Err(IdentityError::AccountDisabled);
        }

        if !PasswordHasher::verify(password, &user.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_pair(
            user.id,
            &user.email,
            user.role,
            None,
            user.tenant_id,
            user.is_super_admin,
        )?;

        Ok(LoginResponse {
            tokens,
            user_id: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
            is_super_admin: user.is_super_admin,
        })
    }

    /// Exchanges a refresh token for a new pair. The refresh token's claims
    /// are re-derived from the current user row (not copied verbatim) so a
    /// role change or deactivation takes effect immediately on the next
    /// refresh instead of waiting for the old token to expire.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.tokens.validate(refresh_token, TokenKind::Refresh)?;

        let ctx = database_layer::TenantContext::new(claims.tenant_id, claims.sub, claims.role, claims.is_super_admin);
        let user = self
            .user_repo
            .find_by_id(&ctx, claims.sub)
            .await
            .map_err(IdentityError::Database)?;

        if !user.is_active {
            return Err(IdentityError::AccountDisabled);
        }

        self.tokens.issue_pair(
            user.id,
            &user.email,
            user.role,
            claims.hospital_id,
            user.tenant_id,
            user.is_super_admin,
        )
    }

    /// Logout is stateless on this side: access tokens are short-lived and
    /// carry no server-side session row to delete. Kept as an explicit
    /// method so the HTTP boundary has a single place to clear any client
    /// cookie and to extend later if a deny-list is added.
    pub fn logout(&self) -> Result<()> {
        Ok(())
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        self.tokens.validate(token, TokenKind::Access)
    }

    /// Resolves the request's effective tenant per §4.6: a super-admin may
    /// override via `x_tenant_context_header`; anyone else presenting that
    /// header is rejected with `TENANT_CONTEXT_DENIED`.
    pub async fn resolve_tenant_context(
        &self,
        claims: &Claims,
        x_tenant_context_header: Option<&str>,
    ) -> Result<EffectiveTenant> {
        let Some(requested) = x_tenant_context_header else {
            return Ok(EffectiveTenant {
                tenant_id: claims.tenant_id,
                is_override: false,
            });
        };

        if !claims.is_super_admin {
            return Err(IdentityError::TenantContextDenied);
        }

        let requested_id: Uuid = requested
            .parse()
            .map_err(|_| IdentityError::UnknownTenant(requested.to_string()))?;

        self.tenant_repo
            .find_by_id(requested_id)
            .await
            .map_err(|_| IdentityError::UnknownTenant(requested.to_string()))?;

        Ok(EffectiveTenant {
            tenant_id: requested_id,
            is_override: true,
        })
    }
}
