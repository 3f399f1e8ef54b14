use std::error::Error;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::{AdminUserConfig, AppConfig, ConfigError, JwtConfig, MongoConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::model::user::{User, ROLE_ADMIN};
use crate::repository::activity_repo::{ActivityRepository, MongoActivityRepository};
use crate::repository::client_repo::{ClientRepository, MongoClientRepository};
use crate::repository::mongo_store::MongoStore;
use crate::repository::quote_repo::{MongoQuoteRepository, QuoteRepository};
use crate::repository::settings_repo::{MongoSettingsRepository, SettingsRepository};
use crate::repository::tracking_repo::{MongoTrackingRepository, TrackingRepository};
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::auth_router::auth_router;
use crate::router::client_router::client_router;
use crate::router::dashboard_router::dashboard_router;
use crate::router::quote_router::quote_router;
use crate::router::sales_router::sales_router;
use crate::router::settings_router::settings_router;
use crate::router::tracking_router::tracking_router;
use crate::service::client_service::ClientServiceImpl;
use crate::service::dashboard_service::DashboardServiceImpl;
use crate::service::quote_service::QuoteServiceImpl;
use crate::service::sales_service::SalesServiceImpl;
use crate::service::settings_service::SettingsServiceImpl;
use crate::service::tracking_service::TrackingServiceImpl;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::jwt::JwtTokenUtilsImpl;

/// Store handles, one per aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub clients: Arc<dyn ClientRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub trackings: Arc<dyn TrackingRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn mongo(store: &MongoStore) -> Self {
        Repositories {
            clients: Arc::new(MongoClientRepository::new(store)),
            quotes: Arc::new(MongoQuoteRepository::new(store)),
            trackings: Arc::new(MongoTrackingRepository::new(store)),
            activities: Arc::new(MongoActivityRepository::new(store)),
            settings: Arc::new(MongoSettingsRepository::new(store)),
            users: Arc::new(MongoUserRepository::new(store)),
        }
    }
}

pub struct Services {
    pub clients: Arc<ClientServiceImpl>,
    pub quotes: Arc<QuoteServiceImpl>,
    pub trackings: Arc<TrackingServiceImpl>,
    pub sales: Arc<SalesServiceImpl>,
    pub dashboard: Arc<DashboardServiceImpl>,
    pub settings: Arc<SettingsServiceImpl>,
    pub users: Arc<UserServiceImpl>,
    pub auth_state: Arc<AuthState>,
}

impl Services {
    pub fn new(repos: &Repositories, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        let quotes = Arc::new(QuoteServiceImpl::new(
            repos.quotes.clone(),
            repos.clients.clone(),
            repos.activities.clone(),
        ));
        let trackings = Arc::new(TrackingServiceImpl::new(
            repos.trackings.clone(),
            repos.quotes.clone(),
            repos.clients.clone(),
        ));
        Services {
            clients: Arc::new(ClientServiceImpl::new(
                repos.clients.clone(),
                repos.quotes.clone(),
                repos.trackings.clone(),
            )),
            sales: Arc::new(SalesServiceImpl::new(
                repos.quotes.clone(),
                repos.trackings.clone(),
                repos.clients.clone(),
                quotes.clone(),
                trackings.clone(),
            )),
            dashboard: Arc::new(DashboardServiceImpl::new(
                repos.quotes.clone(),
                repos.clients.clone(),
                repos.activities.clone(),
            )),
            settings: Arc::new(SettingsServiceImpl::new(repos.settings.clone())),
            users: Arc::new(UserServiceImpl::new(repos.users.clone(), jwt_utils.clone())),
            auth_state: Arc::new(AuthState { jwt_utils }),
            quotes,
            trackings,
        }
    }
}

/// Full HTTP surface: `/health` plus every business route under `/api`.
pub fn create_router(services: &Services, cors: CorsLayer) -> Router {
    let auth = services.auth_state.clone();
    let api = Router::new()
        .merge(auth_router(services.users.clone(), auth.clone()))
        .merge(client_router(services.clients.clone(), auth.clone()))
        .merge(quote_router(services.quotes.clone(), auth.clone()))
        .merge(tracking_router(services.trackings.clone(), auth.clone()))
        .merge(sales_router(services.sales.clone(), auth.clone()))
        .merge(dashboard_router(services.dashboard.clone(), auth.clone()))
        .merge(settings_router(services.settings.clone(), auth));

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { "OK" }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Restricts CORS to the configured SPA origin; permissive when none is set.
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, ConfigError> {
    let Some(origin) = config.cors_origin.as_deref() else {
        return Ok(CorsLayer::permissive());
    };
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::InvalidValue(format!("Invalid CORS_ORIGIN value: {}", origin)))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub services: Services,
}

impl App {
    pub async fn new() -> Result<Self, Box<dyn Error>> {
        let config = AppConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;

        let store = MongoStore::connect(&mongo_config).await?;
        store.ensure_indexes().await?;

        let repos = Repositories::mongo(&store);
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let services = Services::new(&repos, jwt_utils);
        let router = create_router(&services, cors_layer(&config)?);

        let app = App { config, router, services };
        app.create_first_admin_user().await;
        Ok(app)
    }

    pub async fn start(self) -> Result<(), Box<dyn Error>> {
        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Server listening on http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }

    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };

        match self.services.users.user_repo.find_by_email(&admin_conf.email).await {
            Ok(Some(_)) => {
                info!("Admin user already exists, skipping creation.");
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to check for existing admin user: {e}");
                return;
            }
        }

        let user = User {
            id: None,
            username: admin_conf.username,
            first_name: admin_conf.first_name,
            last_name: admin_conf.last_name,
            email: admin_conf.email,
            password_hash: String::new(),
            role: ROLE_ADMIN.to_string(),
            created_at: None,
            updated_at: None,
        };
        match self.services.users.register(user, admin_conf.password).await {
            Ok(_) => info!("First admin user created."),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
