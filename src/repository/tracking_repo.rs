use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, ClientSession, Collection};
use tracing::{error, info};

use crate::model::activity::Activity;
use crate::model::quote::Quote;
use crate::model::tracking::{Tracking, TrackingStatus};
use crate::repository::mongo_store::{MongoStore, ACTIVITIES, QUOTES, TRACKINGS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Default)]
pub struct TrackingFilter {
    pub status: Option<TrackingStatus>,
    pub excluded_status: Option<TrackingStatus>,
    pub client_id: Option<ObjectId>,
    pub created: Option<(String, String)>,
}

impl TrackingFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        } else if let Some(status) = self.excluded_status {
            filter.insert("status", doc! { "$ne": status.as_str() });
        }
        if let Some(client_id) = self.client_id {
            filter.insert("clientId", client_id);
        }
        if let Some((start, end)) = &self.created {
            filter.insert("createdAt", doc! { "$gte": start.as_str(), "$lt": end.as_str() });
        }
        filter
    }
}

fn duplicate_number(tracking: &Tracking) -> String {
    format!("Tracking number {} already exists", tracking.tracking_number)
}

#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Inserts the tracking and links the given quotes to it.
    async fn create(&self, tracking: Tracking, quote_ids: &[ObjectId]) -> RepositoryResult<Tracking>;
    /// Inserts the tracking, replaces the already-updated quotes and appends
    /// their activities, all or nothing.
    async fn create_shipment(
        &self,
        tracking: Tracking,
        quotes: Vec<Quote>,
        activities: Vec<Activity>,
    ) -> RepositoryResult<Tracking>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Tracking>;
    /// Replaces the tracking and makes `quote_ids` its exact quote set.
    async fn update(&self, id: ObjectId, tracking: Tracking, quote_ids: &[ObjectId]) -> RepositoryResult<Tracking>;
    /// Replaces the tracking document only.
    async fn save(&self, tracking: Tracking) -> RepositoryResult<Tracking>;
    /// Detaches the tracking's quotes and removes it.
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, filter: &TrackingFilter) -> RepositoryResult<Vec<Tracking>>;
}

pub struct MongoTrackingRepository {
    store: MongoStore,
    collection: Collection<Tracking>,
    quotes: Collection<Quote>,
    activities: Collection<Activity>,
}

impl MongoTrackingRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoTrackingRepository {
            store: store.clone(),
            collection: store.collection(TRACKINGS),
            quotes: store.collection(QUOTES),
            activities: store.collection(ACTIVITIES),
        }
    }

    async fn link_quotes(
        &self,
        session: &mut ClientSession,
        tracking: &Tracking,
        quote_ids: &[ObjectId],
    ) -> RepositoryResult<()> {
        if quote_ids.is_empty() {
            return Ok(());
        }
        let update = doc! { "$set": {
            "trackingId": tracking.id,
            "updatedAt": tracking.updated_at.as_deref(),
        } };
        self.quotes
            .update_many_with_session(doc! { "_id": { "$in": quote_ids.to_vec() } }, update, None, session)
            .await?;
        Ok(())
    }

    async fn detach_quotes(
        &self,
        session: &mut ClientSession,
        id: ObjectId,
        keep: &[ObjectId],
        now: Option<&str>,
    ) -> RepositoryResult<()> {
        let filter = doc! { "trackingId": id, "_id": { "$nin": keep.to_vec() } };
        let update = doc! { "$set": { "trackingId": Bson::Null, "updatedAt": now } };
        self.quotes.update_many_with_session(filter, update, None, session).await?;
        Ok(())
    }

    async fn insert_linked(
        &self,
        session: &mut ClientSession,
        tracking: &Tracking,
        quote_ids: &[ObjectId],
    ) -> RepositoryResult<()> {
        self.collection.insert_one_with_session(tracking, None, session).await?;
        self.link_quotes(session, tracking, quote_ids).await
    }

    async fn insert_shipment(
        &self,
        session: &mut ClientSession,
        tracking: &Tracking,
        quotes: &[Quote],
        activities: &[Activity],
    ) -> RepositoryResult<()> {
        self.collection.insert_one_with_session(tracking, None, session).await?;
        for quote in quotes {
            let id = quote
                .id
                .ok_or_else(|| RepositoryError::validation("Quote without an ID cannot be shipped"))?;
            let result = self
                .quotes
                .replace_one_with_session(doc! { "_id": id }, quote, None, session)
                .await?;
            if result.matched_count == 0 {
                return Err(RepositoryError::not_found(format!("Quote not found for ID: {}", id)));
            }
        }
        if !activities.is_empty() {
            self.activities.insert_many_with_session(activities, None, session).await?;
        }
        Ok(())
    }

    async fn replace_linked(
        &self,
        session: &mut ClientSession,
        id: ObjectId,
        tracking: &Tracking,
        quote_ids: &[ObjectId],
    ) -> RepositoryResult<()> {
        let result = self
            .collection
            .replace_one_with_session(doc! { "_id": id }, tracking, None, session)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No tracking found to update for ID: {}", id)));
        }
        self.detach_quotes(session, id, quote_ids, tracking.updated_at.as_deref()).await?;
        self.link_quotes(session, tracking, quote_ids).await
    }

    async fn delete_detached(&self, session: &mut ClientSession, id: ObjectId) -> RepositoryResult<()> {
        let now = crate::util::period::now_timestamp();
        self.detach_quotes(session, id, &[], Some(&now)).await?;
        let result = self
            .collection
            .delete_one_with_session(doc! { "_id": id }, None, session)
            .await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Tracking not found for ID: {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackingRepository for MongoTrackingRepository {
    #[tracing::instrument(skip(self, tracking, quote_ids), fields(number = %tracking.tracking_number))]
    async fn create(&self, mut tracking: Tracking, quote_ids: &[ObjectId]) -> RepositoryResult<Tracking> {
        tracking.id = Some(ObjectId::new());
        let mut session = self.store.start_transaction().await?;
        let outcome = self.insert_linked(&mut session, &tracking, quote_ids).await;
        self.store
            .finish_transaction(session, outcome)
            .await
            .map_err(|e| {
                error!("Failed to create tracking: {}", e);
                e.on_duplicate(duplicate_number(&tracking))
            })?;
        info!("Tracking created with {} quotes", quote_ids.len());
        Ok(tracking)
    }

    #[tracing::instrument(skip(self, tracking, quotes, activities), fields(number = %tracking.tracking_number))]
    async fn create_shipment(
        &self,
        mut tracking: Tracking,
        mut quotes: Vec<Quote>,
        activities: Vec<Activity>,
    ) -> RepositoryResult<Tracking> {
        let id = tracking.id.unwrap_or_else(ObjectId::new);
        tracking.id = Some(id);
        for quote in quotes.iter_mut() {
            quote.tracking_id = Some(id);
        }

        let mut session = self.store.start_transaction().await?;
        let outcome = self
            .insert_shipment(&mut session, &tracking, &quotes, &activities)
            .await;
        self.store
            .finish_transaction(session, outcome)
            .await
            .map_err(|e| {
                error!("Batch shipment rolled back: {}", e);
                e.on_duplicate(duplicate_number(&tracking))
            })?;
        info!("Shipment created for {} quotes", quotes.len());
        Ok(tracking)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Tracking> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Tracking not found for ID: {}", id)))
    }

    #[tracing::instrument(skip(self, tracking, quote_ids), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut tracking: Tracking, quote_ids: &[ObjectId]) -> RepositoryResult<Tracking> {
        tracking.id = Some(id);
        let mut session = self.store.start_transaction().await?;
        let outcome = self.replace_linked(&mut session, id, &tracking, quote_ids).await;
        self.store
            .finish_transaction(session, outcome)
            .await
            .map_err(|e| {
                error!("Failed to update tracking: {}", e);
                e.on_duplicate(duplicate_number(&tracking))
            })?;
        info!("Tracking updated successfully");
        Ok(tracking)
    }

    #[tracing::instrument(skip(self, tracking), fields(id = ?tracking.id))]
    async fn save(&self, tracking: Tracking) -> RepositoryResult<Tracking> {
        let id = tracking
            .id
            .ok_or_else(|| RepositoryError::validation("Tracking without an ID cannot be saved"))?;
        let result = self.collection.replace_one(doc! { "_id": id }, &tracking, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No tracking found to update for ID: {}", id)));
        }
        Ok(tracking)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut session = self.store.start_transaction().await?;
        let outcome = self.delete_detached(&mut session, id).await;
        self.store.finish_transaction(session, outcome).await?;
        info!("Tracking deleted and quotes detached");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: &TrackingFilter) -> RepositoryResult<Vec<Tracking>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(filter.to_document(), options).await?;
        Ok(cursor.try_collect().await?)
    }
}
