use bson::doc;
use mongodb::{
    options::{ClientOptions, Credential, IndexOptions},
    Client, ClientSession, Collection, Database, IndexModel,
};
use tracing::{error, info};

use crate::config::mongo_conf::MongoConfig;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

pub const CLIENTS: &str = "clients";
pub const QUOTES: &str = "quotes";
pub const ACTIVITIES: &str = "activities";
pub const TRACKINGS: &str = "trackings";
pub const SETTINGS: &str = "settings";
pub const USERS: &str = "users";

/// Shared driver handle. Cloning is cheap; all clones use one connection pool.
#[derive(Clone, Debug)]
pub struct MongoStore {
    pub client: Client,
    pub db: Database,
}

impl MongoStore {
    pub async fn connect(config: &MongoConfig) -> RepositoryResult<Self> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;
        client_options.app_name = Some("ShipdeskBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client_options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        info!(database = %config.database, "MongoDB client created");
        Ok(MongoStore { client, db })
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.db.collection::<T>(name)
    }

    /// Unique indexes back the uniqueness rules; the rest serve the report queries.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        let indexes: Vec<(&str, IndexModel)> = vec![
            (TRACKINGS, IndexModel::builder().keys(doc! { "trackingNumber": 1 }).options(unique()).build()),
            (TRACKINGS, IndexModel::builder().keys(doc! { "clientId": 1, "createdAt": -1 }).build()),
            (CLIENTS, IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build()),
            (USERS, IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build()),
            (QUOTES, IndexModel::builder().keys(doc! { "clientId": 1 }).build()),
            (QUOTES, IndexModel::builder().keys(doc! { "trackingId": 1 }).build()),
            (QUOTES, IndexModel::builder().keys(doc! { "status": 1, "createdAt": -1 }).build()),
            (ACTIVITIES, IndexModel::builder().keys(doc! { "quoteId": 1 }).build()),
            (ACTIVITIES, IndexModel::builder().keys(doc! { "createdAt": -1 }).build()),
        ];

        for (collection, index) in indexes {
            self.db
                .collection::<bson::Document>(collection)
                .create_index(index, None)
                .await
                .map_err(|e| {
                    error!("Failed to create index on {}: {}", collection, e);
                    RepositoryError::from(e)
                })?;
        }
        info!("MongoDB indexes ensured");
        Ok(())
    }

    pub async fn start_transaction(&self) -> RepositoryResult<ClientSession> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;
        Ok(session)
    }

    /// Commits on success, aborts and hands back the error otherwise.
    pub async fn finish_transaction<T>(
        &self,
        mut session: ClientSession,
        outcome: RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        match outcome {
            Ok(value) => {
                session.commit_transaction().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    error!("Failed to abort transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }
}
