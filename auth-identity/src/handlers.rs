//! Thin, framework-agnostic adapters over `AuthService`. The axum routes
//! themselves (`/auth/login`, `/auth/refresh`, `/auth/logout`, `/auth/me`)
//! are wired in `vitalconnect-server`; this module is what they call into,
//! kept here so the request/response shape travels with the service that
//! defines it.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{LoginRequest, LoginResponse, RefreshRequest, TokenPair};
use crate::service::AuthService;

pub struct IdentityHandlers {
    service: Arc<AuthService>,
}

impl IdentityHandlers {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }

    pub async fn login(&self, client_ip: &str, request: LoginRequest) -> Result<LoginResponse> {
        self.service.login(client_ip, &request.email, &request.password).await
    }

    pub async fn refresh(&self, request: RefreshRequest) -> Result<TokenPair> {
        self.service.refresh(&request.refresh_token).await
    }

    pub fn logout(&self) -> Result<()> {
        self.service.logout()
    }
}
