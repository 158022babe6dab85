//! In-memory authorization codes and bearer tokens.
//!
//! Codes are single-use and bound to the client and redirect URI they were
//! minted for. Nothing survives a restart.

use gatehouse_core::config::GrantConfig;
use gatehouse_core::{AuthorizationRequest, Identity};
use rand::RngCore;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    #[error("authorization code is unknown or already used")]
    UnknownCode,
    #[error("authorization code expired")]
    Expired,
    #[error("authorization code was issued to a different client")]
    ClientMismatch,
    #[error("redirect_uri does not match the authorization request")]
    RedirectMismatch,
}

/// A bearer token handed to a relying party.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
    pub scope: String,
}

struct PendingCode {
    request: AuthorizationRequest,
    identity: Identity,
    expires_at: Instant,
}

struct Session {
    identity: Identity,
    expires_at: Instant,
}

pub struct GrantStore {
    code_ttl: Duration,
    token_ttl: Duration,
    codes: RwLock<HashMap<String, PendingCode>>,
    tokens: RwLock<HashMap<String, Session>>,
}

impl GrantStore {
    pub fn new(config: &GrantConfig) -> Self {
        Self {
            code_ttl: Duration::from_secs(config.code_ttl_secs),
            token_ttl: Duration::from_secs(config.token_ttl_secs),
            codes: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Mint a code for a completed upstream login.
    pub async fn issue_code(&self, request: AuthorizationRequest, identity: Identity) -> String {
        let code = random_token();
        let now = Instant::now();
        let mut codes = self.codes.write().await;
        codes.retain(|_, pending| pending.expires_at > now);
        codes.insert(
            code.clone(),
            PendingCode {
                request,
                identity,
                expires_at: now + self.code_ttl,
            },
        );
        code
    }

    /// Redeem a code for a bearer token. The code is consumed even on mismatch.
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: &str,
    ) -> Result<IssuedToken, GrantError> {
        let pending = self
            .codes
            .write()
            .await
            .remove(code)
            .ok_or(GrantError::UnknownCode)?;

        let now = Instant::now();
        if pending.expires_at <= now {
            return Err(GrantError::Expired);
        }
        if pending.request.client_id != client_id {
            return Err(GrantError::ClientMismatch);
        }
        if pending.request.redirect_uri != redirect_uri {
            return Err(GrantError::RedirectMismatch);
        }

        let access_token = random_token();
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, session| session.expires_at > now);
        tokens.insert(
            access_token.clone(),
            Session {
                identity: pending.identity,
                expires_at: now + self.token_ttl,
            },
        );

        Ok(IssuedToken {
            access_token,
            expires_in: self.token_ttl.as_secs(),
            scope: pending.request.scope_string(),
        })
    }

    /// Identity behind a live bearer token.
    pub async fn resolve_token(&self, token: &str) -> Option<Identity> {
        let tokens = self.tokens.read().await;
        tokens
            .get(token)
            .filter(|session| session.expires_at > Instant::now())
            .map(|session| session.identity.clone())
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
