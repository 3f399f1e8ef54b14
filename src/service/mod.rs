pub mod client_service;
pub mod dashboard_service;
pub mod quote_service;
pub mod sales_service;
pub mod settings_service;
pub mod tracking_service;
pub mod user_service;

use std::collections::HashMap;
use std::str::FromStr;

use bson::oid::ObjectId;

use crate::model::client::Client;
use crate::util::error::ServiceError;

/// Parses an identifier carried in a body or query string.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidInput(format!("Invalid {} id: {}", what, raw)))
}

/// Parses a status string from the closed vocabularies.
pub(crate) fn parse_status<T: FromStr<Err = String>>(raw: &str) -> Result<T, ServiceError> {
    raw.parse::<T>().map_err(ServiceError::InvalidInput)
}

/// Empty strings from form fields count as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub(crate) fn client_names(clients: Vec<Client>) -> HashMap<ObjectId, String> {
    clients
        .into_iter()
        .filter_map(|client| client.id.map(|id| (id, client.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote::QuoteStatus;

    #[test]
    fn test_parse_helpers() {
        assert!(parse_id("123", "client").is_err());
        assert!(parse_status::<QuoteStatus>("ready_to_ship").is_ok());
        assert!(matches!(
            parse_status::<QuoteStatus>("shipment"),
            Err(ServiceError::InvalidInput(_))
        ));
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" Amazon ".to_string())).as_deref(), Some("Amazon"));
    }
}
