/*!
 * MongoDB record store.
 *
 * Records go to `<database>.<collection>` on the configured server, one
 * document per record with the record fields at the top level.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Collection, IndexModel};

use super::models::StoredRecord;
use super::repository::RecordStore;
use crate::app_config::StoreConfig;
use crate::record::Record;

/// Application name reported to the server
const APP_NAME: &str = "config-spider";

/// MongoDB-backed record store
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<StoredRecord>,
}

impl MongoStore {
    /// Connect, check the server answers and make sure the url index exists
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let address = format!("{}:{}", config.host, config.port);
        let client = Client::with_options(client_options(config))
            .with_context(|| format!("Invalid store options for {}", address))?;
        let database = client.database(&config.database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .with_context(|| format!("Store unavailable at {}", address))?;

        let collection = database.collection::<StoredRecord>(&config.collection);
        collection
            .create_index(IndexModel::builder().keys(doc! { "url": 1 }).build())
            .await
            .with_context(|| format!("Failed to index collection '{}'", config.collection))?;

        info!(
            "Connected to {} ({}.{})",
            address, config.database, config.collection
        );
        Ok(Self { collection })
    }

    /// Name of the collection records are written to
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

/// Client options for the configured server
///
/// Credentials are only attached when a user name is set.
pub fn client_options(config: &StoreConfig) -> ClientOptions {
    let mut options = ClientOptions::builder()
        .hosts(vec![ServerAddress::Tcp {
            host: config.host.clone(),
            port: Some(config.port),
        }])
        .build();
    options.app_name = Some(APP_NAME.to_string());

    if !config.username.is_empty() {
        options.credential = Some(
            Credential::builder()
                .username(config.username.clone())
                .password(config.password.clone())
                .source(config.auth_source.clone())
                .build(),
        );
    }

    options
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn save(&self, record: &Record) -> Result<StoredRecord> {
        let stored = StoredRecord::new(record.clone());
        self.collection
            .insert_one(&stored)
            .await
            .with_context(|| format!("Failed to insert record ({})", stored.url()))?;

        debug!("Saved record {} ({})", stored.id, stored.url());
        Ok(stored)
    }

    async fn find_one_by_url(&self, url: &str) -> Result<Option<StoredRecord>> {
        self.collection
            .find_one(doc! { "url": url })
            .await
            .with_context(|| format!("Failed to look up url {}", url))
    }

    async fn count(&self) -> Result<u64> {
        self.collection
            .count_documents(doc! {})
            .await
            .context("Failed to count records")
    }
}
