use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::dto::sales_dto::{
    SaleKind, SalesQuery, SalesRecord, SalesSummary, UnpaidOrder, UnpaidQuery, UpdateSaleRequest, UpdatedSale,
};
use crate::dto::tracking_dto::TrackingPaymentRequest;
use crate::model::quote::{Quote, QuoteStatus};
use crate::model::tracking::{Tracking, TrackingStatus};
use crate::repository::client_repo::ClientRepository;
use crate::repository::quote_repo::{QuoteFilter, QuoteRepository};
use crate::repository::repository_error::RepositoryError;
use crate::repository::tracking_repo::{TrackingFilter, TrackingRepository};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::service::tracking_service::{TrackingService, TrackingServiceImpl};
use crate::service::{client_names, non_empty};
use crate::util::error::ServiceError;
use crate::util::period::{days_overdue, MonthWindow};
use crate::util::pricing::round2;

#[async_trait]
pub trait SalesService: Send + Sync {
    async fn list_sales(&self, query: SalesQuery) -> Result<Vec<SalesRecord>, ServiceError>;
    async fn summary(&self, query: SalesQuery) -> Result<SalesSummary, ServiceError>;
    async fn unpaid_orders(&self, query: UnpaidQuery) -> Result<Vec<UnpaidOrder>, ServiceError>;
    async fn update_sale(&self, id: ObjectId, request: UpdateSaleRequest) -> Result<UpdatedSale, ServiceError>;
}

pub struct SalesServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub tracking_repo: Arc<dyn TrackingRepository>,
    pub client_repo: Arc<dyn ClientRepository>,
    pub quote_service: Arc<QuoteServiceImpl>,
    pub tracking_service: Arc<TrackingServiceImpl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnpaidSort {
    DaysOverdue,
    Amount,
}

fn month_window(raw: Option<String>) -> Result<MonthWindow, ServiceError> {
    match non_empty(raw) {
        Some(raw) => MonthWindow::parse(&raw)
            .ok_or_else(|| ServiceError::InvalidInput(format!("Invalid month {}, expected YYYY-MM", raw))),
        None => Ok(MonthWindow::containing(Utc::now())),
    }
}

fn unpaid_sort(query: &UnpaidQuery) -> Result<(UnpaidSort, bool), ServiceError> {
    let sort = match query.sort_by.as_deref().map(str::trim) {
        None | Some("") | Some("daysOverdue") => UnpaidSort::DaysOverdue,
        Some("amount") => UnpaidSort::Amount,
        Some(other) => {
            return Err(ServiceError::InvalidInput(format!("Unknown sortBy value: {}", other)));
        }
    };
    let descending = match query.order.as_deref().map(str::trim) {
        None | Some("") | Some("desc") => true,
        Some("asc") => false,
        Some(other) => return Err(ServiceError::InvalidInput(format!("Unknown order value: {}", other))),
    };
    Ok((sort, descending))
}

fn summarize(month: &MonthWindow, records: &[SalesRecord]) -> SalesSummary {
    let total_revenue: f64 = records.iter().map(|r| r.charged_amount).sum();
    let total_cost: f64 = records.iter().map(|r| r.cost).sum();
    let total_paid: f64 = records.iter().map(|r| r.amount_paid).sum();
    let mut status_breakdown = BTreeMap::new();
    for record in records {
        *status_breakdown.entry(record.status.clone()).or_insert(0u64) += 1;
    }
    SalesSummary {
        month: month.label(),
        total_revenue: round2(total_revenue),
        total_cost: round2(total_cost),
        profit: round2(total_revenue - total_cost),
        total_orders: records.len() as u64,
        total_paid: round2(total_paid),
        status_breakdown,
    }
}

fn sort_unpaid(orders: &mut [UnpaidOrder], sort: UnpaidSort, descending: bool) {
    orders.sort_by(|a, b| {
        let ordering = match sort {
            UnpaidSort::DaysOverdue => a.days_overdue.cmp(&b.days_overdue),
            UnpaidSort::Amount => a
                .remaining_amount
                .partial_cmp(&b.remaining_amount)
                .unwrap_or(Ordering::Equal),
        };
        if descending { ordering.reverse() } else { ordering }
    });
}

impl SalesServiceImpl {
    pub fn new(
        quote_repo: Arc<dyn QuoteRepository>,
        tracking_repo: Arc<dyn TrackingRepository>,
        client_repo: Arc<dyn ClientRepository>,
        quote_service: Arc<QuoteServiceImpl>,
        tracking_service: Arc<TrackingServiceImpl>,
    ) -> Self {
        Self { quote_repo, tracking_repo, client_repo, quote_service, tracking_service }
    }

    async fn names_for(&self, client_ids: impl Iterator<Item = ObjectId>) -> Result<HashMap<ObjectId, String>, ServiceError> {
        let mut ids: Vec<ObjectId> = client_ids.collect();
        ids.sort();
        ids.dedup();
        Ok(client_names(self.client_repo.find_by_ids(&ids).await?))
    }

    /// Comma-joined product names of the quotes travelling in each tracking.
    async fn shipment_products(&self, trackings: &[Tracking]) -> Result<HashMap<ObjectId, String>, ServiceError> {
        let lookups = trackings.iter().filter_map(|t| t.id).map(|id| async move {
            let quotes = self.quote_repo.list(&QuoteFilter::for_tracking(id)).await?;
            let products: Vec<String> = quotes.into_iter().map(|q| q.product).collect();
            Ok::<_, RepositoryError>((id, products.join(", ")))
        });
        Ok(try_join_all(lookups).await?.into_iter().collect())
    }

    async fn month_records(&self, window: &MonthWindow) -> Result<Vec<SalesRecord>, ServiceError> {
        let quote_filter = QuoteFilter::default()
            .with_statuses(&QuoteStatus::REVENUE)
            .created_between(window.bounds());
        let tracking_filter = TrackingFilter { created: Some(window.bounds()), ..Default::default() };
        let (quotes, trackings) = tokio::try_join!(
            self.quote_repo.list(&quote_filter),
            self.tracking_repo.list(&tracking_filter),
        )?;

        let names = self
            .names_for(quotes.iter().map(|q| q.client_id).chain(trackings.iter().map(|t| t.client_id)))
            .await?;
        let products = self.shipment_products(&trackings).await?;

        let mut records: Vec<SalesRecord> = quotes
            .into_iter()
            .filter_map(|quote| quote_record(quote, &names))
            .chain(trackings.into_iter().filter_map(|t| tracking_record(t, &names, &products)))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

fn quote_record(quote: Quote, names: &HashMap<ObjectId, String>) -> Option<SalesRecord> {
    Some(SalesRecord {
        id: quote.id?,
        kind: SaleKind::Quote,
        client_id: quote.client_id,
        client_name: names.get(&quote.client_id).cloned(),
        product: quote.product,
        platform: quote.platform,
        status: quote.status.to_string(),
        cost: quote.cost,
        charged_amount: quote.charged_amount,
        amount_paid: quote.amount_paid,
        payment_method: quote.payment_method,
        created_at: quote.created_at,
    })
}

fn tracking_record(
    tracking: Tracking,
    names: &HashMap<ObjectId, String>,
    products: &HashMap<ObjectId, String>,
) -> Option<SalesRecord> {
    let id = tracking.id?;
    Some(SalesRecord {
        id,
        kind: SaleKind::Tracking,
        client_id: tracking.client_id,
        client_name: names.get(&tracking.client_id).cloned(),
        product: products.get(&id).cloned().unwrap_or_default(),
        platform: None,
        status: tracking.status.to_string(),
        cost: tracking.shipping_cost,
        charged_amount: tracking.total_value,
        amount_paid: tracking.amount_paid,
        payment_method: None,
        created_at: tracking.created_at,
    })
}

#[async_trait]
impl SalesService for SalesServiceImpl {
    #[instrument(skip(self))]
    async fn list_sales(&self, query: SalesQuery) -> Result<Vec<SalesRecord>, ServiceError> {
        let window = month_window(query.month)?;
        let records = self.month_records(&window).await?;
        info!(month = %window.label(), records = records.len(), "Monthly sales listed");
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn summary(&self, query: SalesQuery) -> Result<SalesSummary, ServiceError> {
        let window = month_window(query.month)?;
        let records = self.month_records(&window).await?;
        Ok(summarize(&window, &records))
    }

    #[instrument(skip(self))]
    async fn unpaid_orders(&self, query: UnpaidQuery) -> Result<Vec<UnpaidOrder>, ServiceError> {
        let (sort, descending) = unpaid_sort(&query)?;
        let quote_filter = QuoteFilter {
            excluded_statuses: vec![QuoteStatus::Paid],
            ..Default::default()
        };
        let tracking_filter = TrackingFilter {
            excluded_status: Some(TrackingStatus::Paid),
            ..Default::default()
        };
        let (quotes, trackings) = tokio::try_join!(
            self.quote_repo.list(&quote_filter),
            self.tracking_repo.list(&tracking_filter),
        )?;
        let names = self
            .names_for(quotes.iter().map(|q| q.client_id).chain(trackings.iter().map(|t| t.client_id)))
            .await?;

        let now = Utc::now();
        let mut orders: Vec<UnpaidOrder> = Vec::with_capacity(quotes.len() + trackings.len());
        for quote in quotes {
            let Some(id) = quote.id else { continue };
            orders.push(UnpaidOrder {
                id,
                kind: SaleKind::Quote,
                client_id: quote.client_id,
                client_name: names.get(&quote.client_id).cloned(),
                days_overdue: days_overdue(quote.created_at.as_deref(), now),
                remaining_amount: round2(quote.remaining_amount()),
                description: quote.product,
                status: quote.status.to_string(),
                total_amount: quote.charged_amount,
                amount_paid: quote.amount_paid,
                created_at: quote.created_at,
            });
        }
        for tracking in trackings {
            let Some(id) = tracking.id else { continue };
            orders.push(UnpaidOrder {
                id,
                kind: SaleKind::Tracking,
                client_id: tracking.client_id,
                client_name: names.get(&tracking.client_id).cloned(),
                days_overdue: days_overdue(tracking.created_at.as_deref(), now),
                remaining_amount: round2(tracking.remaining_amount()),
                description: format!("Shipment {}", tracking.tracking_number),
                status: tracking.status.to_string(),
                total_amount: tracking.total_value,
                amount_paid: tracking.amount_paid,
                created_at: tracking.created_at,
            });
        }
        sort_unpaid(&mut orders, sort, descending);
        Ok(orders)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_sale(&self, id: ObjectId, request: UpdateSaleRequest) -> Result<UpdatedSale, ServiceError> {
        match self.quote_repo.get_by_id(id).await {
            Ok(_) => {
                let quote = self.quote_service.record_payment(id, request).await?;
                Ok(UpdatedSale::Quote(quote))
            }
            Err(RepositoryError::NotFound(_)) => {
                let payment = TrackingPaymentRequest {
                    amount_paid: request.amount_paid,
                    status: request.status,
                };
                let tracking = self.tracking_service.update_payment(id, payment).await?;
                Ok(UpdatedSale::Tracking(tracking))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, cost: f64, charged: f64, paid: f64) -> SalesRecord {
        SalesRecord {
            id: ObjectId::new(),
            kind: SaleKind::Quote,
            client_id: ObjectId::new(),
            client_name: None,
            product: "Item".to_string(),
            platform: None,
            status: status.to_string(),
            cost,
            charged_amount: charged,
            amount_paid: paid,
            payment_method: None,
            created_at: None,
        }
    }

    #[test]
    fn test_summary_over_records() {
        let month = MonthWindow::new(2026, 10).unwrap();
        let records = vec![
            record("purchased", 100.0, 130.0, 0.0),
            record("paid", 50.0, 80.0, 80.0),
            record("paid", 10.0, 20.0, 20.0),
        ];
        let summary = summarize(&month, &records);
        assert_eq!(summary.month, "2026-10");
        assert_eq!(summary.total_revenue, 230.0);
        assert_eq!(summary.total_cost, 160.0);
        assert_eq!(summary.profit, 70.0);
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_paid, 100.0);
        assert_eq!(summary.status_breakdown.get("paid"), Some(&2));
    }

    #[test]
    fn test_unpaid_sort_options() {
        let default = unpaid_sort(&UnpaidQuery::default()).unwrap();
        assert_eq!(default, (UnpaidSort::DaysOverdue, true));
        let query = UnpaidQuery { sort_by: Some("amount".into()), order: Some("asc".into()) };
        assert_eq!(unpaid_sort(&query).unwrap(), (UnpaidSort::Amount, false));
        let bad = UnpaidQuery { sort_by: Some("name".into()), order: None };
        assert!(unpaid_sort(&bad).is_err());
    }

    #[test]
    fn test_month_window_validation() {
        assert!(month_window(Some("2026-13".into())).is_err());
        assert_eq!(month_window(Some("2026-02".into())).unwrap().label(), "2026-02");
    }
}
