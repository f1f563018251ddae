use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ClientId, CompanyName, ContactEmail, ContactName, PhoneNumber, PostalAddress, UserId,
};

coded_enum! {
    /// Commercial state of a client.
    ClientStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        OnHold => "ON_HOLD",
        Closed => "CLOSED",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub name: ContactName,
    pub email: ContactEmail,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub address: Option<PostalAddress>,
    pub status: ClientStatus,
    pub assigned_to: UserId,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewClient {
    pub name: ContactName,
    pub email: ContactEmail,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub address: Option<PostalAddress>,
    pub status: ClientStatus,
    pub assigned_to: UserId,
    pub created_at: NaiveDateTime,
}

/// Partial client update. Nullable columns use a nested option so that
/// `Some(None)` clears the stored value.
#[derive(Clone, Debug, Default)]
pub struct UpdateClient {
    pub name: Option<ContactName>,
    pub email: Option<ContactEmail>,
    pub phone: Option<Option<PhoneNumber>>,
    pub company: Option<Option<CompanyName>>,
    pub address: Option<Option<PostalAddress>>,
    pub status: Option<ClientStatus>,
}

impl UpdateClient {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.address.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip_through_strings() {
        assert_eq!("on_hold".parse::<ClientStatus>().unwrap(), ClientStatus::OnHold);
        assert_eq!(ClientStatus::Closed.to_string(), "CLOSED");
        assert!("ARCHIVED".parse::<ClientStatus>().is_err());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateClient::default().is_empty());
        let update = UpdateClient {
            address: Some(None),
            ..UpdateClient::default()
        };
        assert!(!update.is_empty());
    }
}
