use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{
    ClientId, CompanyName, ContactEmail, ContactName, PhoneNumber, PostalAddress,
    TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub assigned_to: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub address: Option<&'a str>,
    pub status: &'a str,
    pub assigned_to: i32,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<Option<&'a str>>,
    pub company: Option<Option<&'a str>>,
    pub address: Option<Option<&'a str>>,
    pub status: Option<&'a str>,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::try_from(client.id)?,
            name: ContactName::new(client.name)?,
            email: ContactEmail::new(client.email)?,
            phone: client.phone.map(PhoneNumber::new).transpose()?,
            company: client.company.map(CompanyName::new).transpose()?,
            address: client.address.map(PostalAddress::new).transpose()?,
            status: client.status.parse()?,
            assigned_to: UserId::try_from(client.assigned_to)?,
            created_at: client.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            name: client.name.as_str(),
            email: client.email.as_str(),
            phone: client.phone.as_ref().map(|v| v.as_str()),
            company: client.company.as_ref().map(|v| v.as_str()),
            address: client.address.as_ref().map(|v| v.as_str()),
            status: client.status.as_str(),
            assigned_to: client.assigned_to.get(),
            created_at: client.created_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateClient> for UpdateClient<'a> {
    fn from(client: &'a DomainUpdateClient) -> Self {
        Self {
            name: client.name.as_ref().map(|v| v.as_str()),
            email: client.email.as_ref().map(|v| v.as_str()),
            phone: client
                .phone
                .as_ref()
                .map(|phone| phone.as_ref().map(|v| v.as_str())),
            company: client
                .company
                .as_ref()
                .map(|company| company.as_ref().map(|v| v.as_str())),
            address: client
                .address
                .as_ref()
                .map(|address| address.as_ref().map(|v| v.as_str())),
            status: client.status.map(|status| status.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::client::ClientStatus;

    #[test]
    fn from_domain_new_creates_newclient() {
        let domain = DomainNewClient {
            name: ContactName::new("John").unwrap(),
            email: ContactEmail::new("john@example.com").unwrap(),
            phone: Some(PhoneNumber::new("5550009999").unwrap()),
            company: None,
            address: None,
            status: ClientStatus::Active,
            assigned_to: UserId::new(2).unwrap(),
            created_at: Utc::now().naive_utc(),
        };
        let new: NewClient = (&domain).into();
        assert_eq!(new.name, "John");
        assert_eq!(new.email, "john@example.com");
        assert_eq!(new.phone, Some("5550009999"));
        assert_eq!(new.status, "ACTIVE");
        assert_eq!(new.assigned_to, 2);
    }

    #[test]
    fn client_into_domain() {
        let now = Utc::now().naive_utc();
        let db_client = Client {
            id: 1,
            name: "n".to_string(),
            email: "e@example.com".to_string(),
            phone: None,
            company: Some("c".to_string()),
            address: Some("a".to_string()),
            status: "ON_HOLD".to_string(),
            assigned_to: 5,
            created_at: now,
        };
        let domain: DomainClient = db_client.try_into().unwrap();
        assert_eq!(domain.id.get(), 1);
        assert_eq!(domain.status, ClientStatus::OnHold);
        assert_eq!(domain.address.unwrap().as_str(), "a");
        assert_eq!(domain.created_at, now);
    }
}
