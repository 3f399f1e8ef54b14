#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bson::oid::ObjectId;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use shipdesk_backend::app::app::{create_router, Repositories, Services};
use shipdesk_backend::config::JwtConfig;
use shipdesk_backend::model::activity::Activity;
use shipdesk_backend::model::client::Client;
use shipdesk_backend::model::quote::{Quote, QuoteStatus};
use shipdesk_backend::model::settings::Settings;
use shipdesk_backend::model::tracking::Tracking;
use shipdesk_backend::model::user::{User, ROLE_ADMIN};
use shipdesk_backend::repository::activity_repo::ActivityRepository;
use shipdesk_backend::repository::client_repo::{ClientFilter, ClientRepository};
use shipdesk_backend::repository::quote_repo::{QuoteFilter, QuoteRepository};
use shipdesk_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use shipdesk_backend::repository::settings_repo::SettingsRepository;
use shipdesk_backend::repository::tracking_repo::{TrackingFilter, TrackingRepository};
use shipdesk_backend::repository::user_repo::UserRepository;
use shipdesk_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

#[derive(Default)]
pub struct MemoryData {
    pub clients: Vec<Client>,
    pub quotes: Vec<Quote>,
    pub trackings: Vec<Tracking>,
    pub activities: Vec<Activity>,
    pub settings: Option<Settings>,
    pub users: Vec<User>,
}

/// In-process stand-in for MongoDB implementing every repository trait.
/// Each operation runs under one lock, which gives the same all-or-nothing
/// outcome as the transactional Mongo implementation.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn lock(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap()
    }
}

fn in_range(range: &Option<(String, String)>, value: Option<&str>) -> bool {
    match range {
        None => true,
        Some((start, end)) => matches!(value, Some(v) if v >= start.as_str() && v < end.as_str()),
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn quote_matches(filter: &QuoteFilter, quote: &Quote) -> bool {
    if filter.client_id.is_some_and(|id| quote.client_id != id) {
        return false;
    }
    match filter.tracking_id {
        Some(id) if quote.tracking_id != Some(id) => return false,
        None if filter.untracked && quote.tracking_id.is_some() => return false,
        _ => {}
    }
    if !filter.statuses.is_empty() && !filter.statuses.contains(&quote.status) {
        return false;
    }
    if filter.excluded_statuses.contains(&quote.status) {
        return false;
    }
    if !in_range(&filter.created, quote.created_at.as_deref()) || !in_range(&filter.paid, quote.paid_at.as_deref()) {
        return false;
    }
    match filter.search.as_deref() {
        Some(s) => contains_ci(Some(&quote.product), s) || contains_ci(quote.notes.as_deref(), s),
        None => true,
    }
}

fn tracking_matches(filter: &TrackingFilter, tracking: &Tracking) -> bool {
    if filter.status.is_some_and(|s| tracking.status != s) {
        return false;
    }
    if filter.excluded_status.is_some_and(|s| tracking.status == s) {
        return false;
    }
    if filter.client_id.is_some_and(|id| tracking.client_id != id) {
        return false;
    }
    in_range(&filter.created, tracking.created_at.as_deref())
}

fn newest_first<T, F: Fn(&T) -> Option<String>>(items: &mut [T], key: F) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn duplicate_number(data: &MemoryData, tracking: &Tracking) -> Option<RepositoryError> {
    data.trackings
        .iter()
        .any(|t| t.tracking_number == tracking.tracking_number && t.id != tracking.id)
        .then(|| RepositoryError::already_exists(format!("Tracking number {} already exists", tracking.tracking_number)))
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn create(&self, mut client: Client) -> RepositoryResult<Client> {
        let mut data = self.lock();
        if data.clients.iter().any(|c| c.email == client.email) {
            return Err(RepositoryError::already_exists(format!(
                "A client with email {} already exists",
                client.email
            )));
        }
        client.id = Some(ObjectId::new());
        data.clients.push(client.clone());
        Ok(client)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Client> {
        self.lock()
            .clients
            .iter()
            .find(|c| c.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Client not found for ID: {}", id)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Client>> {
        Ok(self
            .lock()
            .clients
            .iter()
            .filter(|c| c.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn update(&self, id: ObjectId, mut client: Client) -> RepositoryResult<Client> {
        let mut data = self.lock();
        if data.clients.iter().any(|c| c.email == client.email && c.id != Some(id)) {
            return Err(RepositoryError::already_exists(format!(
                "A client with email {} already exists",
                client.email
            )));
        }
        client.id = Some(id);
        let slot = data
            .clients
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No client found to update for ID: {}", id)))?;
        *slot = client.clone();
        Ok(client)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut data = self.lock();
        if !data.clients.iter().any(|c| c.id == Some(id)) {
            return Err(RepositoryError::not_found(format!("Client not found for ID: {}", id)));
        }
        let quote_ids: Vec<Option<ObjectId>> =
            data.quotes.iter().filter(|q| q.client_id == id).map(|q| q.id).collect();
        data.activities.retain(|a| !quote_ids.contains(&Some(a.quote_id)));
        data.quotes.retain(|q| q.client_id != id);
        data.trackings.retain(|t| t.client_id != id);
        data.clients.retain(|c| c.id != Some(id));
        Ok(())
    }

    async fn list(&self, filter: &ClientFilter) -> RepositoryResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .lock()
            .clients
            .iter()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| match filter.search.as_deref() {
                Some(s) => {
                    contains_ci(Some(&c.name), s) || contains_ci(Some(&c.email), s) || contains_ci(c.company.as_deref(), s)
                }
                None => true,
            })
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }
}

#[async_trait]
impl QuoteRepository for MemoryStore {
    async fn create(&self, mut quote: Quote, mut activity: Activity) -> RepositoryResult<Quote> {
        let id = quote.id.unwrap_or_else(ObjectId::new);
        quote.id = Some(id);
        activity.quote_id = id;
        let mut data = self.lock();
        data.quotes.push(quote.clone());
        data.activities.push(activity);
        Ok(quote)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        self.lock()
            .quotes
            .iter()
            .find(|q| q.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Quote>> {
        Ok(self
            .lock()
            .quotes
            .iter()
            .filter(|q| q.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn update(&self, id: ObjectId, mut quote: Quote, activity: Option<Activity>) -> RepositoryResult<Quote> {
        quote.id = Some(id);
        let mut data = self.lock();
        let slot = data
            .quotes
            .iter_mut()
            .find(|q| q.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No quote found to update for ID: {}", id)))?;
        *slot = quote.clone();
        if let Some(activity) = activity {
            data.activities.push(activity);
        }
        Ok(quote)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut data = self.lock();
        if !data.quotes.iter().any(|q| q.id == Some(id)) {
            return Err(RepositoryError::not_found(format!("Quote not found for ID: {}", id)));
        }
        data.activities.retain(|a| a.quote_id != id);
        data.quotes.retain(|q| q.id != Some(id));
        Ok(())
    }

    async fn list(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>> {
        let mut quotes: Vec<Quote> =
            self.lock().quotes.iter().filter(|q| quote_matches(filter, q)).cloned().collect();
        newest_first(&mut quotes, |q| q.created_at.clone());
        Ok(quotes)
    }

    async fn count(&self, filter: &QuoteFilter) -> RepositoryResult<u64> {
        Ok(self.lock().quotes.iter().filter(|q| quote_matches(filter, q)).count() as u64)
    }

    async fn sum_charged_amount(&self, filter: &QuoteFilter) -> RepositoryResult<f64> {
        Ok(self
            .lock()
            .quotes
            .iter()
            .filter(|q| quote_matches(filter, q))
            .map(|q| q.charged_amount)
            .sum())
    }

    async fn count_by_status(&self, filter: &QuoteFilter) -> RepositoryResult<HashMap<QuoteStatus, u64>> {
        let mut counts = HashMap::new();
        for quote in self.lock().quotes.iter().filter(|q| quote_matches(filter, q)) {
            *counts.entry(quote.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn list_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Vec<Activity>> {
        let mut activities: Vec<Activity> =
            self.lock().activities.iter().filter(|a| a.quote_id == quote_id).cloned().collect();
        newest_first(&mut activities, |a| a.created_at.clone());
        Ok(activities)
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<Activity>> {
        let mut activities = self.lock().activities.clone();
        // insertion order breaks ties between equal timestamps
        activities.reverse();
        newest_first(&mut activities, |a| a.created_at.clone());
        activities.truncate(limit.max(0) as usize);
        Ok(activities)
    }
}

#[async_trait]
impl TrackingRepository for MemoryStore {
    async fn create(&self, mut tracking: Tracking, quote_ids: &[ObjectId]) -> RepositoryResult<Tracking> {
        tracking.id = Some(ObjectId::new());
        let mut data = self.lock();
        if let Some(err) = duplicate_number(&data, &tracking) {
            return Err(err);
        }
        for quote in data.quotes.iter_mut().filter(|q| q.id.is_some_and(|id| quote_ids.contains(&id))) {
            quote.tracking_id = tracking.id;
        }
        data.trackings.push(tracking.clone());
        Ok(tracking)
    }

    async fn create_shipment(
        &self,
        mut tracking: Tracking,
        quotes: Vec<Quote>,
        activities: Vec<Activity>,
    ) -> RepositoryResult<Tracking> {
        let id = tracking.id.unwrap_or_else(ObjectId::new);
        tracking.id = Some(id);
        let mut data = self.lock();
        if let Some(err) = duplicate_number(&data, &tracking) {
            return Err(err);
        }
        if quotes.iter().any(|q| !data.quotes.iter().any(|stored| stored.id == q.id)) {
            return Err(RepositoryError::not_found("Quote not found"));
        }
        for mut quote in quotes {
            quote.tracking_id = Some(id);
            if let Some(slot) = data.quotes.iter_mut().find(|stored| stored.id == quote.id) {
                *slot = quote;
            }
        }
        data.activities.extend(activities);
        data.trackings.push(tracking.clone());
        Ok(tracking)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Tracking> {
        self.lock()
            .trackings
            .iter()
            .find(|t| t.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Tracking not found for ID: {}", id)))
    }

    async fn update(&self, id: ObjectId, mut tracking: Tracking, quote_ids: &[ObjectId]) -> RepositoryResult<Tracking> {
        tracking.id = Some(id);
        let mut data = self.lock();
        if let Some(err) = duplicate_number(&data, &tracking) {
            return Err(err);
        }
        let slot = data
            .trackings
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No tracking found to update for ID: {}", id)))?;
        *slot = tracking.clone();
        for quote in data.quotes.iter_mut() {
            let selected = quote.id.is_some_and(|qid| quote_ids.contains(&qid));
            if selected {
                quote.tracking_id = Some(id);
            } else if quote.tracking_id == Some(id) {
                quote.tracking_id = None;
            }
        }
        Ok(tracking)
    }

    async fn save(&self, tracking: Tracking) -> RepositoryResult<Tracking> {
        let mut data = self.lock();
        let slot = data
            .trackings
            .iter_mut()
            .find(|t| t.id == tracking.id)
            .ok_or_else(|| RepositoryError::not_found("No tracking found to update"))?;
        *slot = tracking.clone();
        Ok(tracking)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut data = self.lock();
        if !data.trackings.iter().any(|t| t.id == Some(id)) {
            return Err(RepositoryError::not_found(format!("Tracking not found for ID: {}", id)));
        }
        for quote in data.quotes.iter_mut().filter(|q| q.tracking_id == Some(id)) {
            quote.tracking_id = None;
        }
        data.trackings.retain(|t| t.id != Some(id));
        Ok(())
    }

    async fn list(&self, filter: &TrackingFilter) -> RepositoryResult<Vec<Tracking>> {
        let mut trackings: Vec<Tracking> =
            self.lock().trackings.iter().filter(|t| tracking_matches(filter, t)).cloned().collect();
        newest_first(&mut trackings, |t| t.created_at.clone());
        Ok(trackings)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn get_or_create(&self) -> RepositoryResult<Settings> {
        let mut data = self.lock();
        let settings = data.settings.get_or_insert_with(|| Settings {
            id: Some(ObjectId::new()),
            ..Settings::default()
        });
        Ok(settings.clone())
    }

    async fn save(&self, settings: Settings) -> RepositoryResult<Settings> {
        self.lock().settings = Some(settings.clone());
        Ok(settings)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut data = self.lock();
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists(format!("User with email {} already exists", user.email)));
        }
        user.id = Some(ObjectId::new());
        data.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        user.id = Some(id);
        let mut data = self.lock();
        let slot = data
            .users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No user found to update for ID: {}", id)))?;
        *slot = user.clone();
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == Some(*id)).cloned())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub admin_token: String,
}

pub fn build_app() -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let repos = Repositories {
        clients: store.clone(),
        quotes: store.clone(),
        trackings: store.clone(),
        activities: store.clone(),
        settings: store.clone(),
        users: store.clone(),
    };
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
    let services = Services::new(&repos, jwt_utils.clone());
    let router = create_router(&services, CorsLayer::permissive());
    let admin_token = token_for(&jwt_utils, ROLE_ADMIN);
    TestApp { router, store, jwt_utils, admin_token }
}

pub fn token_for(jwt_utils: &JwtTokenUtilsImpl, role: &str) -> String {
    jwt_utils
        .generate_token_pair(&ObjectId::new().to_hex(), &format!("{}@example.com", role), role)
        .unwrap()
        .access_token
}

pub fn oid(value: &Value) -> String {
    value["_id"].as_str().expect("document id").to_string()
}

impl TestApp {
    pub async fn send(&self, token: Option<&str>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Sends as the admin user.
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.admin_token.clone();
        self.send(Some(&token), method, uri, body).await
    }

    pub async fn create_client(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .call("POST", "/api/clients", Some(json!({ "name": name, "email": email })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        oid(&body)
    }

    pub async fn create_quote(&self, client_id: &str, product: &str, charged: f64, status: &str) -> String {
        let (code, body) = self
            .call(
                "POST",
                "/api/quotes",
                Some(json!({
                    "clientId": client_id,
                    "product": product,
                    "cost": charged / 2.0,
                    "chargedAmount": charged,
                    "status": status,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
        oid(&body)
    }

    pub fn quote(&self, id: &str) -> Quote {
        let id = ObjectId::parse_str(id).unwrap();
        self.store.lock().quotes.iter().find(|q| q.id == Some(id)).cloned().unwrap()
    }

    pub fn activity_count(&self, quote_id: &str) -> usize {
        let id = ObjectId::parse_str(quote_id).unwrap();
        self.store.lock().activities.iter().filter(|a| a.quote_id == id).count()
    }
}
