use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::dto::quote_dto::{
    CreateQuoteRequest, MissingQuotesQuery, QuoteDetail, QuoteListQuery, QuoteView, UpdateQuoteRequest,
};
use crate::dto::sales_dto::UpdateSaleRequest;
use crate::model::activity::Activity;
use crate::model::quote::{Quote, QuoteStatus};
use crate::repository::activity_repo::ActivityRepository;
use crate::repository::client_repo::ClientRepository;
use crate::repository::quote_repo::{QuoteFilter, QuoteRepository};
use crate::repository::repository_error::RepositoryError;
use crate::service::{client_names, non_empty, parse_id, parse_status};
use crate::util::error::ServiceError;
use crate::util::period::now_timestamp;
use crate::util::pricing::calculate_charged_amount;

#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn create_quote(&self, request: CreateQuoteRequest) -> Result<Quote, ServiceError>;
    async fn get_quote(&self, id: ObjectId) -> Result<QuoteDetail, ServiceError>;
    async fn update_quote(&self, id: ObjectId, request: UpdateQuoteRequest) -> Result<Quote, ServiceError>;
    async fn delete_quote(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn list_quotes(&self, query: QuoteListQuery) -> Result<Vec<QuoteView>, ServiceError>;
    async fn list_missing(&self, query: MissingQuotesQuery) -> Result<Vec<QuoteView>, ServiceError>;
    async fn record_payment(&self, id: ObjectId, request: UpdateSaleRequest) -> Result<Quote, ServiceError>;
}

pub struct QuoteServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub client_repo: Arc<dyn ClientRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
}

impl QuoteServiceImpl {
    pub fn new(
        quote_repo: Arc<dyn QuoteRepository>,
        client_repo: Arc<dyn ClientRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self { quote_repo, client_repo, activity_repo }
    }

    async fn ensure_client_exists(&self, client_id: ObjectId) -> Result<(), ServiceError> {
        match self.client_repo.get_by_id(client_id).await {
            Ok(_) => Ok(()),
            Err(RepositoryError::NotFound(_)) => {
                warn!(client_id = %client_id, "Quote references an unknown client");
                Err(ServiceError::InvalidInput(format!("Client {} does not exist", client_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn with_client_names(&self, quotes: Vec<Quote>) -> Result<Vec<QuoteView>, ServiceError> {
        let mut client_ids: Vec<ObjectId> = quotes.iter().map(|q| q.client_id).collect();
        client_ids.sort();
        client_ids.dedup();
        let names = client_names(self.client_repo.find_by_ids(&client_ids).await?);
        Ok(quotes
            .into_iter()
            .map(|quote| QuoteView {
                client_name: names.get(&quote.client_id).cloned(),
                quote,
            })
            .collect())
    }

    /// Applies the status rules and persists, with an activity when the status moved.
    async fn save_with_status(
        &self,
        id: ObjectId,
        mut quote: Quote,
        status: Option<QuoteStatus>,
        now: String,
    ) -> Result<Quote, ServiceError> {
        let changed = match status {
            Some(status) => quote.apply_status(status, &now),
            None => false,
        };
        if quote.status == QuoteStatus::Paid {
            quote.amount_paid = quote.charged_amount;
        }
        check_amounts(&quote)?;
        quote.updated_at = Some(now.clone());

        let activity = changed.then(|| Activity::status_changed(&quote, id, &now));
        let updated = self.quote_repo.update(id, quote, activity).await.map_err(|e| {
            error!("Failed to update quote: {}", e);
            ServiceError::from(e)
        })?;
        if changed {
            info!(status = %updated.status, "Quote status changed");
        }
        Ok(updated)
    }
}

fn check_amounts(quote: &Quote) -> Result<(), ServiceError> {
    if quote.cost < 0.0 || quote.charged_amount < 0.0 || quote.amount_paid < 0.0 {
        return Err(ServiceError::InvalidInput("Amounts cannot be negative".to_string()));
    }
    if quote.amount_paid > quote.charged_amount {
        return Err(ServiceError::InvalidInput(format!(
            "Amount paid ({}) cannot exceed the charged amount ({})",
            quote.amount_paid, quote.charged_amount
        )));
    }
    Ok(())
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    async fn create_quote(&self, request: CreateQuoteRequest) -> Result<Quote, ServiceError> {
        info!("Creating quote");
        let client_id = parse_id(&request.client_id, "client")?;
        let status = match non_empty(request.status) {
            Some(raw) => parse_status::<QuoteStatus>(&raw)?,
            None => QuoteStatus::Quote,
        };
        self.ensure_client_exists(client_id).await?;

        let charged_amount = match (request.charged_amount, request.markup_percent) {
            (Some(charged), _) => charged,
            (None, Some(markup)) => calculate_charged_amount(request.cost, markup),
            (None, None) => request.cost,
        };
        let now = now_timestamp();
        let id = ObjectId::new();
        let mut quote = Quote {
            id: Some(id),
            client_id,
            product: request.product.trim().to_string(),
            platform: non_empty(request.platform),
            status: QuoteStatus::Quote,
            cost: request.cost,
            charged_amount,
            amount_paid: request.amount_paid.unwrap_or(0.0),
            payment_method: non_empty(request.payment_method),
            notes: non_empty(request.notes),
            tracking_id: None,
            paid_at: None,
            created_at: Some(now.clone()),
            updated_at: Some(now.clone()),
        };
        quote.apply_status(status, &now);
        check_amounts(&quote)?;

        let activity = Activity::quote_created(&quote, id, &now);
        let created = self.quote_repo.create(quote, activity).await.map_err(|e| {
            error!("Failed to create quote: {}", e);
            ServiceError::from(e)
        })?;
        info!(id = %id, status = %created.status, "Quote created");
        Ok(created)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_quote(&self, id: ObjectId) -> Result<QuoteDetail, ServiceError> {
        let quote = self.quote_repo.get_by_id(id).await?;
        let client_ids = [quote.client_id];
        let (client, activities) = tokio::try_join!(
            self.client_repo.find_by_ids(&client_ids),
            self.activity_repo.list_by_quote(id),
        )?;
        Ok(QuoteDetail {
            client: client.into_iter().next(),
            quote,
            activities,
        })
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_quote(&self, id: ObjectId, request: UpdateQuoteRequest) -> Result<Quote, ServiceError> {
        info!("Updating quote");
        let mut quote = self.quote_repo.get_by_id(id).await?;
        let status = match non_empty(request.status) {
            Some(raw) => Some(parse_status::<QuoteStatus>(&raw)?),
            None => None,
        };
        if let Some(raw) = request.client_id {
            let client_id = parse_id(&raw, "client")?;
            if client_id != quote.client_id {
                if quote.tracking_id.is_some() {
                    return Err(ServiceError::InvalidInput(
                        "Quote is part of a shipment and cannot change client".to_string(),
                    ));
                }
                self.ensure_client_exists(client_id).await?;
                quote.client_id = client_id;
            }
        }
        if let Some(product) = request.product {
            quote.product = product.trim().to_string();
        }
        if request.platform.is_some() {
            quote.platform = non_empty(request.platform);
        }
        if let Some(cost) = request.cost {
            quote.cost = cost;
        }
        match (request.charged_amount, request.markup_percent) {
            (Some(charged), _) => quote.charged_amount = charged,
            (None, Some(markup)) => quote.charged_amount = calculate_charged_amount(quote.cost, markup),
            (None, None) => {}
        }
        if let Some(amount_paid) = request.amount_paid {
            quote.amount_paid = amount_paid;
        }
        if request.payment_method.is_some() {
            quote.payment_method = non_empty(request.payment_method);
        }
        if request.notes.is_some() {
            quote.notes = non_empty(request.notes);
        }
        self.save_with_status(id, quote, status, now_timestamp()).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_quote(&self, id: ObjectId) -> Result<(), ServiceError> {
        info!("Deleting quote and its activities");
        Ok(self.quote_repo.delete(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_quotes(&self, query: QuoteListQuery) -> Result<Vec<QuoteView>, ServiceError> {
        let mut filter = QuoteFilter { search: non_empty(query.search), ..Default::default() };
        if let Some(raw) = non_empty(query.status) {
            filter.statuses = vec![parse_status::<QuoteStatus>(&raw)?];
        }
        if let Some(raw) = non_empty(query.client_id) {
            filter.client_id = Some(parse_id(&raw, "client")?);
        }
        let quotes = self.quote_repo.list(&filter).await?;
        self.with_client_names(quotes).await
    }

    #[instrument(skip(self))]
    async fn list_missing(&self, query: MissingQuotesQuery) -> Result<Vec<QuoteView>, ServiceError> {
        let statuses = match non_empty(query.status) {
            Some(raw) => {
                let status = parse_status::<QuoteStatus>(&raw)?;
                if !status.is_missing_quote() {
                    return Err(ServiceError::InvalidInput(format!(
                        "Status {} is not a missing-quote status",
                        status
                    )));
                }
                vec![status]
            }
            None => QuoteStatus::MISSING_QUOTE.to_vec(),
        };
        let quotes = self.quote_repo.list(&QuoteFilter::default().with_statuses(&statuses)).await?;
        self.with_client_names(quotes).await
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn record_payment(&self, id: ObjectId, request: UpdateSaleRequest) -> Result<Quote, ServiceError> {
        info!(amount_paid = request.amount_paid, "Recording quote payment");
        let mut quote = self.quote_repo.get_by_id(id).await?;
        let status = match non_empty(request.status) {
            Some(raw) => Some(parse_status::<QuoteStatus>(&raw)?),
            None => None,
        };
        quote.amount_paid = request.amount_paid;
        if request.payment_method.is_some() {
            quote.payment_method = non_empty(request.payment_method);
        }
        self.save_with_status(id, quote, status, now_timestamp()).await
    }
}
