//! Request payloads accepted by the CRM routes.
//!
//! Forms are plain deserializable structs validated with `validator` and then
//! converted into domain values. Conversion is where value-object rules
//! (email format, ten digit phones, known status codes) are enforced.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::pagination;

pub mod auth;
pub mod clients;
pub mod leads;
pub mod tasks;
pub mod users;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid {field}: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: TypeConstraintError,
    },

    #[error("at least one role is required")]
    MissingRoles,
}

/// Attaches the offending field name to a value-object error.
pub(crate) trait FieldResult<T> {
    fn field(self, field: &'static str) -> Result<T, FormError>;
}

impl<T> FieldResult<T> for Result<T, TypeConstraintError> {
    fn field(self, field: &'static str) -> Result<T, FormError> {
        self.map_err(|source| FormError::InvalidField { field, source })
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = ...)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses an optional raw value with `parse`, tagging failures with `field`.
pub(crate) fn parse_opt<'a, T, F>(
    raw: Option<&'a str>,
    field: &'static str,
    parse: F,
) -> Result<Option<T>, FormError>
where
    F: FnOnce(&'a str) -> Result<T, TypeConstraintError>,
{
    raw.map(parse).transpose().field(field)
}

/// Query string shared by every paginated listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// Single status code; parsed into the listing's status enum.
    pub status: Option<String>,
}

impl ListQuery {
    /// 1-based page and capped page size.
    pub fn paging(&self) -> (usize, usize) {
        pagination::normalize(self.page, self.per_page)
    }

    /// Parses the status filter. Blank values mean "no filter".
    pub fn status_filter<S>(&self) -> Result<Option<S>, FormError>
    where
        S: FromStr<Err = TypeConstraintError>,
    {
        let raw = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        parse_opt(raw, "status", S::from_str)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::domain::lead::LeadStatus;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.phone, None);
        let null: Patch = serde_json::from_str(r#"{"phone":null}"#).unwrap();
        assert_eq!(null.phone, Some(None));
        let set: Patch = serde_json::from_str(r#"{"phone":"5551234567"}"#).unwrap();
        assert_eq!(set.phone, Some(Some("5551234567".to_string())));
    }

    #[test]
    fn list_query_status_filter() {
        let query = ListQuery {
            status: Some("qualified".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(
            query.status_filter::<LeadStatus>().unwrap(),
            Some(LeadStatus::Qualified)
        );

        let blank = ListQuery {
            status: Some("  ".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(blank.status_filter::<LeadStatus>().unwrap(), None);

        let bad = ListQuery {
            status: Some("WON".to_string()),
            ..ListQuery::default()
        };
        assert!(matches!(
            bad.status_filter::<LeadStatus>(),
            Err(FormError::InvalidField {
                field: "status",
                ..
            })
        ));
    }

    #[test]
    fn list_query_paging_defaults() {
        assert_eq!(ListQuery::default().paging(), (1, pagination::DEFAULT_ITEMS_PER_PAGE));
    }
}
