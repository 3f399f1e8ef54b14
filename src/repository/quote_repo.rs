use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, ClientSession, Collection};
use tracing::{debug, error, info};

use crate::model::activity::Activity;
use crate::model::quote::{Quote, QuoteStatus};
use crate::repository::mongo_store::{MongoStore, ACTIVITIES, QUOTES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Conjunction of optional criteria. Ranges are half-open `[start, end)` over
/// fixed-width timestamps.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub client_id: Option<ObjectId>,
    pub tracking_id: Option<ObjectId>,
    pub statuses: Vec<QuoteStatus>,
    pub excluded_statuses: Vec<QuoteStatus>,
    pub created: Option<(String, String)>,
    pub paid: Option<(String, String)>,
    pub untracked: bool,
    pub search: Option<String>,
}

impl QuoteFilter {
    pub fn for_client(client_id: ObjectId) -> Self {
        QuoteFilter { client_id: Some(client_id), ..Default::default() }
    }

    pub fn for_tracking(tracking_id: ObjectId) -> Self {
        QuoteFilter { tracking_id: Some(tracking_id), ..Default::default() }
    }

    pub fn with_statuses(mut self, statuses: &[QuoteStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn created_between(mut self, bounds: (String, String)) -> Self {
        self.created = Some(bounds);
        self
    }

    pub fn paid_between(mut self, bounds: (String, String)) -> Self {
        self.paid = Some(bounds);
        self
    }

    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(client_id) = self.client_id {
            filter.insert("clientId", client_id);
        }
        if let Some(tracking_id) = self.tracking_id {
            filter.insert("trackingId", tracking_id);
        } else if self.untracked {
            filter.insert("trackingId", Bson::Null);
        }

        let mut status = doc! {};
        if !self.statuses.is_empty() {
            status.insert("$in", status_list(&self.statuses));
        }
        if !self.excluded_statuses.is_empty() {
            status.insert("$nin", status_list(&self.excluded_statuses));
        }
        if !status.is_empty() {
            filter.insert("status", status);
        }

        if let Some((start, end)) = &self.created {
            filter.insert("createdAt", doc! { "$gte": start.as_str(), "$lt": end.as_str() });
        }
        if let Some((start, end)) = &self.paid {
            filter.insert("paidAt", doc! { "$gte": start.as_str(), "$lt": end.as_str() });
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = doc! { "$regex": regex::escape(search), "$options": "i" };
            filter.insert(
                "$or",
                vec![doc! { "product": pattern.clone() }, doc! { "notes": pattern }],
            );
        }
        filter
    }
}

fn status_list(statuses: &[QuoteStatus]) -> Vec<&'static str> {
    statuses.iter().map(QuoteStatus::as_str).collect()
}

fn bson_to_u64(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => (*n).max(0) as u64,
        Some(Bson::Int64(n)) => (*n).max(0) as u64,
        Some(Bson::Double(n)) => n.max(0.0) as u64,
        _ => 0,
    }
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Persists the quote and its creation activity atomically.
    async fn create(&self, quote: Quote, activity: Activity) -> RepositoryResult<Quote>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Quote>>;
    /// Replaces the quote, writing the status-change activity in the same transaction.
    async fn update(&self, id: ObjectId, quote: Quote, activity: Option<Activity>) -> RepositoryResult<Quote>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>>;
    async fn count(&self, filter: &QuoteFilter) -> RepositoryResult<u64>;
    async fn sum_charged_amount(&self, filter: &QuoteFilter) -> RepositoryResult<f64>;
    async fn count_by_status(&self, filter: &QuoteFilter) -> RepositoryResult<HashMap<QuoteStatus, u64>>;
}

pub struct MongoQuoteRepository {
    store: MongoStore,
    collection: Collection<Quote>,
    activities: Collection<Activity>,
}

impl MongoQuoteRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoQuoteRepository {
            store: store.clone(),
            collection: store.collection(QUOTES),
            activities: store.collection(ACTIVITIES),
        }
    }

    async fn insert_with_activity(
        &self,
        session: &mut ClientSession,
        quote: &Quote,
        activity: &Activity,
    ) -> RepositoryResult<()> {
        self.collection.insert_one_with_session(quote, None, session).await?;
        self.activities.insert_one_with_session(activity, None, session).await?;
        Ok(())
    }

    async fn replace_with_activity(
        &self,
        session: &mut ClientSession,
        id: ObjectId,
        quote: &Quote,
        activity: Option<&Activity>,
    ) -> RepositoryResult<()> {
        let result = self
            .collection
            .replace_one_with_session(doc! { "_id": id }, quote, None, session)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No quote found to update for ID: {}", id)));
        }
        if let Some(activity) = activity {
            self.activities.insert_one_with_session(activity, None, session).await?;
        }
        Ok(())
    }

    async fn delete_with_activities(&self, session: &mut ClientSession, id: ObjectId) -> RepositoryResult<()> {
        self.activities
            .delete_many_with_session(doc! { "quoteId": id }, None, session)
            .await?;
        let result = self
            .collection
            .delete_one_with_session(doc! { "_id": id }, None, session)
            .await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Quote not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<Document>> {
        let cursor = self.collection.aggregate(pipeline, None).await.map_err(|e| {
            error!("Quote aggregation failed: {}", e);
            RepositoryError::from(e)
        })?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    #[tracing::instrument(skip(self, quote, activity), fields(client_id = %quote.client_id))]
    async fn create(&self, mut quote: Quote, mut activity: Activity) -> RepositoryResult<Quote> {
        let id = quote.id.unwrap_or_else(ObjectId::new);
        quote.id = Some(id);
        activity.quote_id = id;

        let mut session = self.store.start_transaction().await?;
        let outcome = self.insert_with_activity(&mut session, &quote, &activity).await;
        self.store.finish_transaction(session, outcome).await.map_err(|e| {
            error!("Failed to create quote: {}", e);
            e
        })?;
        info!(id = %id, "Quote created successfully");
        Ok(quote)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Quote>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids.to_vec() } }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self, quote, activity), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut quote: Quote, activity: Option<Activity>) -> RepositoryResult<Quote> {
        quote.id = Some(id);
        let mut session = self.store.start_transaction().await?;
        let outcome = self
            .replace_with_activity(&mut session, id, &quote, activity.as_ref())
            .await;
        self.store.finish_transaction(session, outcome).await?;
        info!("Quote updated successfully");
        Ok(quote)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut session = self.store.start_transaction().await?;
        let outcome = self.delete_with_activities(&mut session, id).await;
        self.store.finish_transaction(session, outcome).await?;
        info!("Quote deleted successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(filter.to_document(), options).await?;
        let quotes: Vec<Quote> = cursor.try_collect().await?;
        debug!("Fetched {} quotes", quotes.len());
        Ok(quotes)
    }

    async fn count(&self, filter: &QuoteFilter) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(filter.to_document(), None).await?)
    }

    async fn sum_charged_amount(&self, filter: &QuoteFilter) -> RepositoryResult<f64> {
        let pipeline = vec![
            doc! { "$match": filter.to_document() },
            doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$chargedAmount" } } },
        ];
        let rows = self.aggregate(pipeline).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("total"))
            .and_then(|total| match total {
                Bson::Double(n) => Some(*n),
                Bson::Int32(n) => Some(f64::from(*n)),
                Bson::Int64(n) => Some(*n as f64),
                _ => None,
            })
            .unwrap_or(0.0))
    }

    async fn count_by_status(&self, filter: &QuoteFilter) -> RepositoryResult<HashMap<QuoteStatus, u64>> {
        let pipeline = vec![
            doc! { "$match": filter.to_document() },
            doc! { "$group": { "_id": "$status", "count": { "$sum": 1 } } },
        ];
        let mut counts = HashMap::new();
        for row in self.aggregate(pipeline).await? {
            let status = match row.get_str("_id").ok().map(str::parse::<QuoteStatus>) {
                Some(Ok(status)) => status,
                _ => continue,
            };
            counts.insert(status, bson_to_u64(row.get("count")));
        }
        Ok(counts)
    }
}
