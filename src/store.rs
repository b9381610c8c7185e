//! Document store seam.
//!
//! The store only has to offer an insert-or-replace keyed by `id`; `id`
//! uniqueness is enforced by the store's index, not by the workers.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions, ReplaceOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::info;

use crate::data_model::ArticleRecord;
use crate::error::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert-or-replace keyed by `id`. Re-processing the same id overwrites
    /// the existing document instead of creating a second one.
    async fn upsert(&self, article: &ArticleRecord) -> Result<()>;
}

pub struct MongoStore {
    collection: Collection<ArticleRecord>,
}

impl MongoStore {
    /// Connects and ensures the unique index on `id` exists.
    pub async fn connect(url: &str, database: &str, collection: &str) -> Result<Self> {
        let options = ClientOptions::parse(url).await?;
        let client = Client::with_options(options)?;
        let collection = client
            .database(database)
            .collection::<ArticleRecord>(collection);

        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index, None).await?;

        info!(%database, "Connected to MongoDB");
        Ok(MongoStore { collection })
    }
}

#[async_trait]
impl ArticleStore for MongoStore {
    async fn upsert(&self, article: &ArticleRecord) -> Result<()> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { "id": &article.id }, article, options)
            .await?;
        Ok(())
    }
}
