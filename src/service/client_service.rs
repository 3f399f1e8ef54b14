use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument};

use crate::dto::client_dto::{ClientDetail, ClientListQuery, ClientRequest};
use crate::model::client::{Client, ClientStatus};
use crate::repository::client_repo::{ClientFilter, ClientRepository};
use crate::repository::quote_repo::{QuoteFilter, QuoteRepository};
use crate::repository::tracking_repo::{TrackingFilter, TrackingRepository};
use crate::service::{non_empty, parse_status};
use crate::util::error::ServiceError;
use crate::util::period::now_timestamp;

#[async_trait]
pub trait ClientService: Send + Sync {
    async fn create_client(&self, request: ClientRequest) -> Result<Client, ServiceError>;
    async fn get_client(&self, id: ObjectId) -> Result<ClientDetail, ServiceError>;
    async fn update_client(&self, id: ObjectId, request: ClientRequest) -> Result<Client, ServiceError>;
    async fn delete_client(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn list_clients(&self, query: ClientListQuery) -> Result<Vec<Client>, ServiceError>;
    async fn toggle_status(&self, id: ObjectId) -> Result<Client, ServiceError>;
}

pub struct ClientServiceImpl {
    pub client_repo: Arc<dyn ClientRepository>,
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub tracking_repo: Arc<dyn TrackingRepository>,
}

impl ClientServiceImpl {
    pub fn new(
        client_repo: Arc<dyn ClientRepository>,
        quote_repo: Arc<dyn QuoteRepository>,
        tracking_repo: Arc<dyn TrackingRepository>,
    ) -> Self {
        Self { client_repo, quote_repo, tracking_repo }
    }

    fn apply_request(client: &mut Client, request: ClientRequest) -> Result<(), ServiceError> {
        if let Some(status) = non_empty(request.status) {
            client.status = parse_status(&status)?;
        }
        client.name = request.name.trim().to_string();
        client.email = request.email.trim().to_lowercase();
        client.phone = non_empty(request.phone);
        client.company = non_empty(request.company);
        client.address = non_empty(request.address);
        client.city = non_empty(request.city);
        client.state = non_empty(request.state);
        client.postal_code = non_empty(request.postal_code);
        client.country = non_empty(request.country);
        client.tax_id = non_empty(request.tax_id);
        client.id_number = non_empty(request.id_number);
        client.notes = non_empty(request.notes);
        if client.name.is_empty() {
            return Err(ServiceError::InvalidInput("Client name is required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClientService for ClientServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn create_client(&self, request: ClientRequest) -> Result<Client, ServiceError> {
        info!("Creating client");
        let now = now_timestamp();
        let mut client = Client {
            id: None,
            name: String::new(),
            email: String::new(),
            phone: None,
            company: None,
            address: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            tax_id: None,
            id_number: None,
            notes: None,
            status: ClientStatus::Active,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        Self::apply_request(&mut client, request)?;
        let created = self.client_repo.create(client).await.map_err(|e| {
            error!("Failed to create client: {}", e);
            ServiceError::from(e)
        })?;
        info!(id = ?created.id, "Client created");
        Ok(created)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_client(&self, id: ObjectId) -> Result<ClientDetail, ServiceError> {
        let client = self.client_repo.get_by_id(id).await?;
        let quote_filter = QuoteFilter::for_client(id);
        let tracking_filter = TrackingFilter { client_id: Some(id), ..Default::default() };
        let (quotes, trackings) = tokio::try_join!(
            self.quote_repo.list(&quote_filter),
            self.tracking_repo.list(&tracking_filter),
        )?;
        Ok(ClientDetail { client, quotes, trackings })
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_client(&self, id: ObjectId, request: ClientRequest) -> Result<Client, ServiceError> {
        info!("Updating client");
        let mut client = self.client_repo.get_by_id(id).await?;
        Self::apply_request(&mut client, request)?;
        client.updated_at = Some(now_timestamp());
        Ok(self.client_repo.update(id, client).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_client(&self, id: ObjectId) -> Result<(), ServiceError> {
        info!("Deleting client with its quotes and trackings");
        self.client_repo.delete(id).await.map_err(|e| {
            error!("Failed to delete client: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self))]
    async fn list_clients(&self, query: ClientListQuery) -> Result<Vec<Client>, ServiceError> {
        let status = match non_empty(query.status) {
            Some(raw) => Some(parse_status::<ClientStatus>(&raw)?),
            None => None,
        };
        let filter = ClientFilter { status, search: non_empty(query.search) };
        Ok(self.client_repo.list(&filter).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn toggle_status(&self, id: ObjectId) -> Result<Client, ServiceError> {
        let mut client = self.client_repo.get_by_id(id).await?;
        client.status = client.status.toggled();
        client.updated_at = Some(now_timestamp());
        let updated = self.client_repo.update(id, client).await?;
        info!(status = %updated.status, "Client status toggled");
        Ok(updated)
    }
}
