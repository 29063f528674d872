use crate::db::models::{DbCredential, to_db_time};
use crate::db::schema::SQLITE_INIT;
use crate::error::MarketError;
use crate::types::marketplace::Marketplace;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const CREDENTIAL_SELECT: &str = r#"
    SELECT c.id, c.user_id, u.username, c.marketplace, c.client_id, c.client_secret,
           c.access_token, c.token_expires_at, c.is_active
    FROM credentials c
    JOIN users u ON u.id = c.user_id
"#;

/// Thin wrapper over the SQLite pool. Reads live here and in `listing`,
/// keyed writes in `upsert`.
#[derive(Clone)]
pub struct MarketStorage {
    pool: SqlitePool,
}

impl MarketStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url` and initialize the schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, MarketError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let mut pool_opts = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if database_url.contains(":memory:") {
            // an in-memory database lives exactly as long as its single connection
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), MarketError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), MarketError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert the user if missing. Returns the user id either way.
    pub async fn ensure_user(&self, username: &str) -> Result<i64, MarketError> {
        sqlx::query(
            "INSERT INTO users (username, created_at) VALUES (?, ?) ON CONFLICT(username) DO NOTHING",
        )
        .bind(username)
        .bind(to_db_time(&Utc::now()))
        .execute(&self.pool)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn find_by_access_token(
        &self,
        token: &str,
    ) -> Result<Option<DbCredential>, MarketError> {
        let sql = format!("{CREDENTIAL_SELECT} WHERE c.access_token = ?");
        let cred = sqlx::query_as::<_, DbCredential>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cred)
    }

    pub async fn find_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<DbCredential>, MarketError> {
        let sql = format!("{CREDENTIAL_SELECT} WHERE c.client_id = ?");
        let cred = sqlx::query_as::<_, DbCredential>(&sql)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cred)
    }

    pub async fn find_credential(
        &self,
        user_id: i64,
        marketplace: Marketplace,
    ) -> Result<Option<DbCredential>, MarketError> {
        let sql = format!("{CREDENTIAL_SELECT} WHERE c.user_id = ? AND c.marketplace = ?");
        let cred = sqlx::query_as::<_, DbCredential>(&sql)
            .bind(user_id)
            .bind(marketplace)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cred)
    }

    /// Insert a credential for (user, marketplace). Fails on the unique
    /// constraint if one already exists.
    pub async fn insert_credential(
        &self,
        user_id: i64,
        marketplace: Marketplace,
        client_id: &str,
        client_secret: &str,
    ) -> Result<i64, MarketError> {
        let now = to_db_time(&Utc::now());
        let res = sqlx::query(
            r#"
            INSERT INTO credentials (
                user_id, marketplace, client_id, client_secret, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(marketplace)
        .bind(client_id)
        .bind(client_secret)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        debug!(user_id, %marketplace, "credential inserted");
        Ok(res.last_insert_rowid())
    }

    /// Overwrite the client id/secret pair of an existing credential.
    pub async fn update_client_keys(
        &self,
        id: i64,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(), MarketError> {
        sqlx::query(
            "UPDATE credentials SET client_id = ?, client_secret = ?, updated_at = ? WHERE id = ?",
        )
        .bind(client_id)
        .bind(client_secret)
        .bind(to_db_time(&Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn store_access_token(
        &self,
        id: i64,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), MarketError> {
        sqlx::query(
            "UPDATE credentials SET access_token = ?, token_expires_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(token)
        .bind(expires_at.as_ref().map(to_db_time))
        .bind(to_db_time(&Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn set_active(&self, id: i64, active: bool) -> Result<(), MarketError> {
        sqlx::query("UPDATE credentials SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(to_db_time(&Utc::now()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_user_is_idempotent() {
        let storage = MarketStorage::connect("sqlite::memory:", 1).await.unwrap();
        let first = storage.ensure_user("testuser").await.unwrap();
        let second = storage.ensure_user("testuser").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn one_credential_per_user_and_marketplace() {
        let storage = MarketStorage::connect("sqlite::memory:", 1).await.unwrap();
        let user = storage.ensure_user("testuser").await.unwrap();
        storage
            .insert_credential(user, Marketplace::AmazonAe, "amazon_ae_a", "s1")
            .await
            .unwrap();
        let dup = storage
            .insert_credential(user, Marketplace::AmazonAe, "amazon_ae_b", "s2")
            .await;
        assert!(matches!(dup, Err(MarketError::DatabaseError(_))));

        storage
            .insert_credential(user, Marketplace::NoonAe, "noon_ae_a", "s3")
            .await
            .unwrap();
        let noon = storage
            .find_credential(user, Marketplace::NoonAe)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(noon.client_id, "noon_ae_a");
        assert_eq!(noon.username, "testuser");
        assert!(noon.is_active);
        assert!(noon.access_token.is_none());
    }
}
