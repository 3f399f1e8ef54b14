use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, ClientSession, Collection};
use tracing::{error, info};

use crate::model::activity::Activity;
use crate::model::client::{Client, ClientStatus};
use crate::model::quote::Quote;
use crate::model::tracking::Tracking;
use crate::repository::mongo_store::{MongoStore, ACTIVITIES, CLIENTS, QUOTES, TRACKINGS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub status: Option<ClientStatus>,
    /// Case-insensitive match on name, email or company
    pub search: Option<String>,
}

impl ClientFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = doc! { "$regex": regex::escape(search), "$options": "i" };
            filter.insert(
                "$or",
                vec![
                    doc! { "name": pattern.clone() },
                    doc! { "email": pattern.clone() },
                    doc! { "company": pattern },
                ],
            );
        }
        filter
    }
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: Client) -> RepositoryResult<Client>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Client>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Client>>;
    async fn update(&self, id: ObjectId, client: Client) -> RepositoryResult<Client>;
    /// Removes the client together with its quotes, their activities and its trackings.
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, filter: &ClientFilter) -> RepositoryResult<Vec<Client>>;
}

pub struct MongoClientRepository {
    store: MongoStore,
    collection: Collection<Client>,
}

impl MongoClientRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoClientRepository {
            store: store.clone(),
            collection: store.collection(CLIENTS),
        }
    }

    async fn delete_cascade(&self, session: &mut ClientSession, id: ObjectId) -> RepositoryResult<()> {
        let quotes = self.store.collection::<Quote>(QUOTES);
        let mut cursor = quotes
            .find_with_session(doc! { "clientId": id }, None, session)
            .await?;
        let mut quote_ids = Vec::new();
        while let Some(quote) = cursor.next(session).await.transpose()? {
            if let Some(quote_id) = quote.id {
                quote_ids.push(quote_id);
            }
        }

        self.store
            .collection::<Activity>(ACTIVITIES)
            .delete_many_with_session(doc! { "quoteId": { "$in": quote_ids } }, None, session)
            .await?;
        quotes
            .delete_many_with_session(doc! { "clientId": id }, None, session)
            .await?;
        self.store
            .collection::<Tracking>(TRACKINGS)
            .delete_many_with_session(doc! { "clientId": id }, None, session)
            .await?;

        let result = self
            .collection
            .delete_one_with_session(doc! { "_id": id }, None, session)
            .await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Client not found for ID: {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ClientRepository for MongoClientRepository {
    #[tracing::instrument(skip(self, client), fields(email = %client.email))]
    async fn create(&self, mut client: Client) -> RepositoryResult<Client> {
        client.id = Some(ObjectId::new());
        self.collection.insert_one(&client, None).await.map_err(|e| {
            error!("Failed to create client: {}", e);
            RepositoryError::from(e).on_duplicate(format!("A client with email {} already exists", client.email))
        })?;
        info!("Client created successfully");
        Ok(client)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Client> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Client not found for ID: {}", id)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Client>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids.to_vec() } }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self, client), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut client: Client) -> RepositoryResult<Client> {
        client.id = Some(id);
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &client, None)
            .await
            .map_err(|e| {
                error!("Failed to update client: {}", e);
                RepositoryError::from(e).on_duplicate(format!("A client with email {} already exists", client.email))
            })?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No client found to update for ID: {}", id)));
        }
        info!("Client updated successfully");
        Ok(client)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut session = self.store.start_transaction().await?;
        let outcome = self.delete_cascade(&mut session, id).await;
        self.store.finish_transaction(session, outcome).await?;
        info!("Client and dependent records deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: &ClientFilter) -> RepositoryResult<Vec<Client>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let cursor = self.collection.find(filter.to_document(), options).await?;
        let clients: Vec<Client> = cursor.try_collect().await?;
        info!("Fetched {} clients", clients.len());
        Ok(clients)
    }
}
