use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::future::try_join_all;
use tracing::{error, info, instrument, warn};

use crate::dto::tracking_dto::{
    BatchShipmentRequest, EligibleQuotesQuery, TrackingDetail, TrackingListQuery, TrackingPaymentRequest,
    TrackingRequest, TrackingStatusRequest,
};
use crate::model::activity::Activity;
use crate::model::quote::{Quote, QuoteStatus};
use crate::model::tracking::{Tracking, TrackingStatus};
use crate::repository::client_repo::ClientRepository;
use crate::repository::quote_repo::{QuoteFilter, QuoteRepository};
use crate::repository::repository_error::RepositoryError;
use crate::repository::tracking_repo::{TrackingFilter, TrackingRepository};
use crate::service::{non_empty, parse_id, parse_status};
use crate::util::error::ServiceError;
use crate::util::period::now_timestamp;
use crate::util::pricing::round2;

#[async_trait]
pub trait TrackingService: Send + Sync {
    async fn create_tracking(&self, request: TrackingRequest) -> Result<TrackingDetail, ServiceError>;
    async fn create_batch_shipment(&self, request: BatchShipmentRequest) -> Result<TrackingDetail, ServiceError>;
    async fn get_tracking(&self, id: ObjectId) -> Result<TrackingDetail, ServiceError>;
    async fn update_tracking(&self, id: ObjectId, request: TrackingRequest) -> Result<TrackingDetail, ServiceError>;
    async fn update_status(&self, id: ObjectId, request: TrackingStatusRequest) -> Result<Tracking, ServiceError>;
    async fn update_payment(&self, id: ObjectId, request: TrackingPaymentRequest) -> Result<Tracking, ServiceError>;
    async fn delete_tracking(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn list_trackings(&self, query: TrackingListQuery) -> Result<Vec<TrackingDetail>, ServiceError>;
    async fn eligible_quotes(&self, query: EligibleQuotesQuery) -> Result<Vec<Quote>, ServiceError>;
}

pub struct TrackingServiceImpl {
    pub tracking_repo: Arc<dyn TrackingRepository>,
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub client_repo: Arc<dyn ClientRepository>,
}

fn tracking_number(raw: &str) -> Result<String, ServiceError> {
    let number = raw.trim();
    if number.is_empty() {
        return Err(ServiceError::InvalidInput("Tracking number is required".to_string()));
    }
    Ok(number.to_string())
}

fn optional_status(raw: Option<String>) -> Result<Option<TrackingStatus>, ServiceError> {
    non_empty(raw).map(|s| parse_status::<TrackingStatus>(&s)).transpose()
}

impl TrackingServiceImpl {
    pub fn new(
        tracking_repo: Arc<dyn TrackingRepository>,
        quote_repo: Arc<dyn QuoteRepository>,
        client_repo: Arc<dyn ClientRepository>,
    ) -> Self {
        Self { tracking_repo, quote_repo, client_repo }
    }

    /// Resolves the requested quotes and checks they can travel in this
    /// shipment: same client, not in another shipment, eligible status.
    /// Quotes already linked to `tracking_id` skip the status check.
    async fn load_shippable_quotes(
        &self,
        client_id: ObjectId,
        raw_ids: &[String],
        tracking_id: Option<ObjectId>,
    ) -> Result<Vec<Quote>, ServiceError> {
        let mut ids = Vec::with_capacity(raw_ids.len());
        for raw in raw_ids {
            let id = parse_id(raw, "quote")?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Err(ServiceError::InvalidInput("At least one quote is required".to_string()));
        }

        match self.client_repo.get_by_id(client_id).await {
            Ok(_) => {}
            Err(RepositoryError::NotFound(_)) => {
                return Err(ServiceError::InvalidInput(format!("Client {} does not exist", client_id)));
            }
            Err(e) => return Err(e.into()),
        }

        let quotes = self.quote_repo.find_by_ids(&ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !quotes.iter().any(|q| q.id.as_ref() == Some(*id)))
            .map(|id| id.to_hex())
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::InvalidInput(format!("Quotes not found: {}", missing.join(", "))));
        }

        for quote in &quotes {
            let quote_id = quote.id.map(|id| id.to_hex()).unwrap_or_default();
            if quote.client_id != client_id {
                warn!(quote_id = %quote_id, "Quote belongs to another client");
                return Err(ServiceError::InvalidInput(format!(
                    "Quote {} does not belong to client {}",
                    quote_id, client_id
                )));
            }
            let linked_here = tracking_id.is_some() && quote.tracking_id == tracking_id;
            if quote.tracking_id.is_some() && !linked_here {
                return Err(ServiceError::InvalidInput(format!(
                    "Quote {} is already assigned to another shipment",
                    quote_id
                )));
            }
            if !linked_here && !quote.status.is_shipment_eligible() {
                return Err(ServiceError::InvalidInput(format!(
                    "Quote {} has status {} and cannot be shipped",
                    quote_id, quote.status
                )));
            }
        }
        Ok(quotes)
    }

    async fn detail(&self, tracking: Tracking) -> Result<TrackingDetail, ServiceError> {
        let id = tracking
            .id
            .ok_or_else(|| ServiceError::InternalError("Tracking without an ID".to_string()))?;
        let client_ids = [tracking.client_id];
        let quote_filter = QuoteFilter::for_tracking(id);
        let (clients, quotes) = tokio::try_join!(
            self.client_repo.find_by_ids(&client_ids),
            self.quote_repo.list(&quote_filter),
        )?;
        Ok(TrackingDetail {
            client: clients.into_iter().next(),
            tracking,
            quotes,
        })
    }
}

#[async_trait]
impl TrackingService for TrackingServiceImpl {
    #[instrument(skip(self, request), fields(number = %request.tracking_number))]
    async fn create_tracking(&self, request: TrackingRequest) -> Result<TrackingDetail, ServiceError> {
        info!("Creating tracking");
        let number = tracking_number(&request.tracking_number)?;
        let client_id = parse_id(&request.client_id, "client")?;
        let status = optional_status(request.status)?.unwrap_or_default();
        let quotes = self.load_shippable_quotes(client_id, &request.quote_ids, None).await?;
        let quote_ids: Vec<ObjectId> = quotes.iter().filter_map(|q| q.id).collect();

        let now = now_timestamp();
        let mut tracking = Tracking {
            id: None,
            tracking_number: number,
            client_id,
            declared_value: 0.0,
            shipping_cost: 0.0,
            total_value: 0.0,
            amount_paid: 0.0,
            status: TrackingStatus::Pending,
            notes: non_empty(request.notes),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        tracking.set_values(request.declared_value, request.shipping_cost);
        tracking.apply_status(status);

        let created = self.tracking_repo.create(tracking, &quote_ids).await.map_err(|e| {
            error!("Failed to create tracking: {}", e);
            ServiceError::from(e)
        })?;
        info!(id = ?created.id, total_value = created.total_value, "Tracking created");
        self.detail(created).await
    }

    #[instrument(skip(self, request), fields(number = %request.tracking_number))]
    async fn create_batch_shipment(&self, request: BatchShipmentRequest) -> Result<TrackingDetail, ServiceError> {
        info!(quotes = request.quote_ids.len(), "Creating batch shipment");
        let number = tracking_number(&request.tracking_number)?;
        let client_id = parse_id(&request.client_id, "client")?;
        let status = optional_status(request.status)?.unwrap_or_default();
        let mut quotes = self.load_shippable_quotes(client_id, &request.quote_ids, None).await?;

        let declared_value = request
            .declared_value
            .unwrap_or_else(|| round2(quotes.iter().map(|q| q.charged_amount).sum()));
        let now = now_timestamp();
        let mut tracking = Tracking {
            id: Some(ObjectId::new()),
            tracking_number: number,
            client_id,
            declared_value: 0.0,
            shipping_cost: 0.0,
            total_value: 0.0,
            amount_paid: 0.0,
            status: TrackingStatus::Pending,
            notes: non_empty(request.notes),
            created_at: Some(now.clone()),
            updated_at: Some(now.clone()),
        };
        tracking.set_values(declared_value, request.shipping_cost);
        tracking.apply_status(status);

        let mut activities = Vec::with_capacity(quotes.len());
        for quote in quotes.iter_mut() {
            quote.apply_status(QuoteStatus::Shipped, &now);
            quote.tracking_id = tracking.id;
            quote.updated_at = Some(now.clone());
            if let Some(quote_id) = quote.id {
                activities.push(Activity::status_changed(quote, quote_id, &now));
            }
        }

        let created = self
            .tracking_repo
            .create_shipment(tracking, quotes, activities)
            .await
            .map_err(|e| {
                error!("Batch shipment failed: {}", e);
                ServiceError::from(e)
            })?;
        info!(id = ?created.id, "Batch shipment created");
        self.detail(created).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_tracking(&self, id: ObjectId) -> Result<TrackingDetail, ServiceError> {
        let tracking = self.tracking_repo.get_by_id(id).await?;
        self.detail(tracking).await
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_tracking(&self, id: ObjectId, request: TrackingRequest) -> Result<TrackingDetail, ServiceError> {
        info!("Updating tracking");
        let mut tracking = self.tracking_repo.get_by_id(id).await?;
        let number = tracking_number(&request.tracking_number)?;
        let client_id = parse_id(&request.client_id, "client")?;
        let status = optional_status(request.status)?.unwrap_or(tracking.status);
        let quotes = self.load_shippable_quotes(client_id, &request.quote_ids, Some(id)).await?;
        let quote_ids: Vec<ObjectId> = quotes.iter().filter_map(|q| q.id).collect();

        tracking.tracking_number = number;
        tracking.client_id = client_id;
        if request.notes.is_some() {
            tracking.notes = non_empty(request.notes);
        }
        tracking.set_values(request.declared_value, request.shipping_cost);
        tracking.apply_status(status);
        tracking.updated_at = Some(now_timestamp());

        let updated = self.tracking_repo.update(id, tracking, &quote_ids).await.map_err(|e| {
            error!("Failed to update tracking: {}", e);
            ServiceError::from(e)
        })?;
        self.detail(updated).await
    }

    #[instrument(skip(self, request), fields(id = %id, status = %request.status))]
    async fn update_status(&self, id: ObjectId, request: TrackingStatusRequest) -> Result<Tracking, ServiceError> {
        let status = parse_status::<TrackingStatus>(&request.status)?;
        let mut tracking = self.tracking_repo.get_by_id(id).await?;
        tracking.apply_status(status);
        tracking.updated_at = Some(now_timestamp());
        let saved = self.tracking_repo.save(tracking).await?;
        info!("Tracking status updated");
        Ok(saved)
    }

    #[instrument(skip(self, request), fields(id = %id, amount_paid = request.amount_paid))]
    async fn update_payment(&self, id: ObjectId, request: TrackingPaymentRequest) -> Result<Tracking, ServiceError> {
        if request.amount_paid < 0.0 {
            return Err(ServiceError::InvalidInput("Amount paid cannot be negative".to_string()));
        }
        let status = optional_status(request.status)?;
        let mut tracking = self.tracking_repo.get_by_id(id).await?;
        tracking.apply_payment(request.amount_paid, status);
        tracking.updated_at = Some(now_timestamp());
        let saved = self.tracking_repo.save(tracking).await?;
        info!(status = %saved.status, amount_paid = saved.amount_paid, "Tracking payment recorded");
        Ok(saved)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_tracking(&self, id: ObjectId) -> Result<(), ServiceError> {
        info!("Deleting tracking");
        Ok(self.tracking_repo.delete(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_trackings(&self, query: TrackingListQuery) -> Result<Vec<TrackingDetail>, ServiceError> {
        let filter = TrackingFilter {
            status: optional_status(query.status)?,
            client_id: non_empty(query.client_id).map(|raw| parse_id(&raw, "client")).transpose()?,
            ..Default::default()
        };
        let trackings = self.tracking_repo.list(&filter).await?;
        try_join_all(trackings.into_iter().map(|tracking| self.detail(tracking))).await
    }

    #[instrument(skip(self), fields(client_id = %query.client_id))]
    async fn eligible_quotes(&self, query: EligibleQuotesQuery) -> Result<Vec<Quote>, ServiceError> {
        let client_id = parse_id(&query.client_id, "client")?;
        let filter = QuoteFilter {
            untracked: true,
            ..QuoteFilter::for_client(client_id).with_statuses(&QuoteStatus::SHIPMENT_ELIGIBLE)
        };
        Ok(self.quote_repo.list(&filter).await?)
    }
}
