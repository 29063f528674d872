use crate::db::sqlite::MarketStorage;
use crate::error::MarketError;
use crate::types::marketplace::Marketplace;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

/// Who a bearer token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthScope {
    pub credential_id: i64,
    pub user_id: i64,
    pub username: String,
    pub marketplace: Marketplace,
}

impl AuthScope {
    pub fn require(&self, marketplace: Marketplace) -> Result<(), MarketError> {
        if self.marketplace == marketplace {
            Ok(())
        } else {
            Err(MarketError::MarketplaceMismatch {
                expected: marketplace,
                actual: self.marketplace,
            })
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub marketplace: Marketplace,
}

/// Random URL-safe string carrying `bytes` bytes of entropy.
pub fn random_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

pub fn generate_client_id(marketplace: Marketplace) -> String {
    format!("{}_{}", marketplace.client_id_prefix(), random_token(16))
}

pub fn generate_client_secret() -> String {
    random_token(32)
}

/// Validates bearer tokens and mints new ones from client credentials.
#[derive(Clone)]
pub struct TokenAuthenticator {
    storage: MarketStorage,
    token_ttl: Duration,
}

impl TokenAuthenticator {
    pub fn new(storage: MarketStorage, token_ttl_secs: i64) -> Self {
        Self {
            storage,
            token_ttl: Duration::seconds(token_ttl_secs.max(1)),
        }
    }

    /// Read-only check of a bearer token at instant `now`.
    pub async fn authenticate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthScope, MarketError> {
        let cred = self
            .storage
            .find_by_access_token(token)
            .await?
            .filter(|c| c.is_active)
            .ok_or(MarketError::InvalidToken)?;

        if cred.token_expires_at.is_some_and(|exp| exp < now) {
            debug!(credential_id = cred.id, "rejecting expired token");
            return Err(MarketError::TokenExpired);
        }

        Ok(AuthScope {
            credential_id: cred.id,
            user_id: cred.user_id,
            username: cred.username,
            marketplace: cred.marketplace,
        })
    }

    /// Exchange client id + secret for a fresh bearer token, replacing the
    /// previous one.
    pub async fn issue_token(
        &self,
        client_id: &str,
        client_secret: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, MarketError> {
        let cred = self
            .storage
            .find_by_client_id(client_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or(MarketError::InvalidCredentials)?;

        if !bool::from(client_secret.as_bytes().ct_eq(cred.client_secret.as_bytes())) {
            return Err(MarketError::InvalidCredentials);
        }

        let token = random_token(48);
        self.storage
            .store_access_token(cred.id, &token, Some(now + self.token_ttl))
            .await?;
        info!(
            credential_id = cred.id,
            marketplace = %cred.marketplace,
            "issued access token"
        );

        Ok(IssuedToken {
            access_token: token,
            token_type: "Bearer",
            expires_in: self.token_ttl.num_seconds(),
            marketplace: cred.marketplace,
        })
    }
}
