use crate::config::SeedCredential;
use crate::db::sqlite::MarketStorage;
use crate::error::MarketError;
use crate::service::authenticator::{generate_client_id, generate_client_secret};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Apply configured users/credentials. Safe to run on every boot: existing
/// rows are kept, only explicitly configured values are written over them.
pub async fn apply_seed(
    storage: &MarketStorage,
    seeds: &[SeedCredential],
    token_ttl_secs: i64,
    now: DateTime<Utc>,
) -> Result<usize, MarketError> {
    for seed in seeds {
        let user_id = storage.ensure_user(&seed.username).await?;
        let cred_id = match storage.find_credential(user_id, seed.marketplace).await? {
            Some(existing) => {
                let client_id = seed.client_id.as_deref().unwrap_or(&existing.client_id);
                let secret = seed
                    .client_secret
                    .as_deref()
                    .unwrap_or(&existing.client_secret);
                if client_id != existing.client_id || secret != existing.client_secret {
                    storage
                        .update_client_keys(existing.id, client_id, secret)
                        .await?;
                }
                existing.id
            }
            None => {
                let client_id = seed
                    .client_id
                    .clone()
                    .unwrap_or_else(|| generate_client_id(seed.marketplace));
                let secret = seed
                    .client_secret
                    .clone()
                    .unwrap_or_else(generate_client_secret);
                let id = storage
                    .insert_credential(user_id, seed.marketplace, &client_id, &secret)
                    .await?;
                info!(
                    username = %seed.username,
                    marketplace = %seed.marketplace,
                    client_id = %client_id,
                    "seeded credential"
                );
                id
            }
        };

        if let Some(token) = seed.access_token.as_deref() {
            storage
                .store_access_token(cred_id, token, Some(now + Duration::seconds(token_ttl_secs)))
                .await?;
        }
    }
    Ok(seeds.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::marketplace::Marketplace;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn seed(marketplace: Marketplace, token: Option<&str>) -> SeedCredential {
        SeedCredential {
            username: "testuser".to_string(),
            marketplace,
            client_id: None,
            client_secret: None,
            access_token: token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn seeding_twice_keeps_generated_keys() {
        let storage = MarketStorage::connect("sqlite::memory:", 1).await.unwrap();
        let seeds = [
            seed(Marketplace::AmazonAe, Some("amazon-dev")),
            seed(Marketplace::NoonAe, None),
        ];

        apply_seed(&storage, &seeds, 60, Utc::now()).await.unwrap();
        let user = storage.ensure_user("testuser").await.unwrap();
        let noon_before = storage
            .find_credential(user, Marketplace::NoonAe)
            .await
            .unwrap()
            .unwrap();

        apply_seed(&storage, &seeds, 60, Utc::now()).await.unwrap();
        let noon_after = storage
            .find_credential(user, Marketplace::NoonAe)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(noon_before.client_id, noon_after.client_id);
        assert_eq!(noon_before.client_secret, noon_after.client_secret);
        assert!(noon_after.client_id.starts_with("noon_ae_"));

        let amazon = storage
            .find_by_access_token("amazon-dev")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(amazon.marketplace, Marketplace::AmazonAe);
        assert!(amazon.token_expires_at.is_some());
    }

    #[tokio::test]
    async fn seeded_secret_stays_out_of_logs() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let storage = MarketStorage::connect("sqlite::memory:", 1).await.unwrap();
        let mut cred = seed(Marketplace::NoonAe, None);
        cred.client_id = Some("noon_ae_fixed".to_string());
        cred.client_secret = Some("do-not-print-me".to_string());
        apply_seed(&storage, &[cred], 60, Utc::now()).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("noon_ae_fixed"));
        assert!(!output.contains("do-not-print-me"));
    }
}
