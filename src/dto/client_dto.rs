use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::client::Client;
use crate::model::quote::Quote;
use crate::model::tracking::Tracking;

/// Body of both create and update; update replaces every field.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub id_number: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    /// `active` or `inactive`; defaults to `active` on create and is kept on update.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub quotes: Vec<Quote>,
    pub trackings: Vec<Tracking>,
}
