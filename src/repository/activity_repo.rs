use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, Collection};

use crate::model::activity::Activity;
use crate::repository::mongo_store::{MongoStore, ACTIVITIES};
use crate::repository::repository_error::RepositoryResult;

/// Read side of the activity log. Activities are only ever written together
/// with the quote change that produced them.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn list_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Vec<Activity>>;
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<Activity>>;
}

pub struct MongoActivityRepository {
    collection: Collection<Activity>,
}

impl MongoActivityRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoActivityRepository {
            collection: store.collection(ACTIVITIES),
        }
    }
}

#[async_trait]
impl ActivityRepository for MongoActivityRepository {
    #[tracing::instrument(skip(self), fields(quote_id = %quote_id))]
    async fn list_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Vec<Activity>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(doc! { "quoteId": quote_id }, options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<Activity>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .build();
        let cursor = self.collection.find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }
}
