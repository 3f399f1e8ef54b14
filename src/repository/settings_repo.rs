use async_trait::async_trait;
use bson::doc;
use mongodb::{
    options::{FindOneAndUpdateOptions, ReplaceOptions, ReturnDocument},
    Collection,
};
use tracing::info;

use crate::model::settings::Settings;
use crate::repository::mongo_store::{MongoStore, SETTINGS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the singleton, inserting the defaults on first access.
    async fn get_or_create(&self) -> RepositoryResult<Settings>;
    async fn save(&self, settings: Settings) -> RepositoryResult<Settings>;
}

pub struct MongoSettingsRepository {
    collection: Collection<Settings>,
}

impl MongoSettingsRepository {
    pub fn new(store: &MongoStore) -> Self {
        MongoSettingsRepository {
            collection: store.collection(SETTINGS),
        }
    }
}

#[async_trait]
impl SettingsRepository for MongoSettingsRepository {
    #[tracing::instrument(skip(self))]
    async fn get_or_create(&self) -> RepositoryResult<Settings> {
        let mut defaults = bson::to_document(&Settings {
            updated_at: Some(crate::util::period::now_timestamp()),
            ..Settings::default()
        })?;
        defaults.remove("_id");

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        self.collection
            .find_one_and_update(doc! {}, doc! { "$setOnInsert": defaults }, options)
            .await?
            .ok_or_else(|| RepositoryError::database("Settings upsert returned no document"))
    }

    #[tracing::instrument(skip(self, settings))]
    async fn save(&self, settings: Settings) -> RepositoryResult<Settings> {
        let id = settings
            .id
            .ok_or_else(|| RepositoryError::validation("Settings without an ID cannot be saved"))?;
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection.replace_one(doc! { "_id": id }, &settings, options).await?;
        info!("Settings saved");
        Ok(settings)
    }
}
