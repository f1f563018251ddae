use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lead::{
    ConversionStatus, Lead as DomainLead, NewLead as DomainNewLead,
    UpdateLead as DomainUpdateLead,
};
use crate::domain::types::{
    CompanyName, ContactEmail, ContactName, ConversionMessage, LeadId, PhoneNumber,
    TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::leads)]
/// Diesel model for [`crate::domain::lead::Lead`].
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub assigned_to: i32,
    pub created_by: Option<i32>,
    pub conversion_status: Option<String>,
    pub conversion_message: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
/// Insertable form of [`Lead`].
pub struct NewLead<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub assigned_to: i32,
    pub created_by: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::leads)]
/// Data used when updating a [`Lead`] record.
pub struct UpdateLead<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<Option<&'a str>>,
    pub company: Option<Option<&'a str>>,
    pub status: Option<&'a str>,
    pub assigned_to: Option<i32>,
    pub conversion_status: Option<Option<&'a str>>,
    pub conversion_message: Option<Option<&'a str>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeadId::try_from(lead.id)?,
            name: ContactName::new(lead.name)?,
            email: ContactEmail::new(lead.email)?,
            phone: lead.phone.map(PhoneNumber::new).transpose()?,
            company: lead.company.map(CompanyName::new).transpose()?,
            status: lead.status.parse()?,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
            assigned_to: UserId::try_from(lead.assigned_to)?,
            created_by: lead.created_by.map(UserId::try_from).transpose()?,
            conversion_status: lead
                .conversion_status
                .as_deref()
                .map(str::parse::<ConversionStatus>)
                .transpose()?,
            conversion_message: lead
                .conversion_message
                .map(ConversionMessage::new)
                .transpose()?,
        })
    }
}

impl<'a> From<&'a DomainNewLead> for NewLead<'a> {
    fn from(lead: &'a DomainNewLead) -> Self {
        Self {
            name: lead.name.as_str(),
            email: lead.email.as_str(),
            phone: lead.phone.as_ref().map(|v| v.as_str()),
            company: lead.company.as_ref().map(|v| v.as_str()),
            status: lead.status.as_str(),
            created_at: lead.created_at,
            updated_at: lead.created_at,
            assigned_to: lead.assigned_to.get(),
            created_by: lead.created_by.map(UserId::get),
        }
    }
}

impl<'a> From<&'a DomainUpdateLead> for UpdateLead<'a> {
    fn from(lead: &'a DomainUpdateLead) -> Self {
        Self {
            name: lead.name.as_ref().map(|v| v.as_str()),
            email: lead.email.as_ref().map(|v| v.as_str()),
            phone: lead
                .phone
                .as_ref()
                .map(|phone| phone.as_ref().map(|v| v.as_str())),
            company: lead
                .company
                .as_ref()
                .map(|company| company.as_ref().map(|v| v.as_str())),
            status: lead.status.map(|status| status.as_str()),
            assigned_to: lead.assigned_to.map(UserId::get),
            conversion_status: lead
                .conversion_status
                .map(|status| status.map(|s| s.as_str())),
            conversion_message: lead
                .conversion_message
                .as_ref()
                .map(|message| message.as_ref().map(|v| v.as_str())),
            updated_at: lead.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::lead::LeadStatus;

    fn row() -> Lead {
        let now = Utc::now().naive_utc();
        Lead {
            id: 1,
            name: "Jane".to_string(),
            email: "Jane@Buyer.io".to_string(),
            phone: None,
            company: Some("Buyer".to_string()),
            status: "QUALIFIED".to_string(),
            created_at: now,
            updated_at: now,
            assigned_to: 3,
            created_by: None,
            conversion_status: Some("PENDING".to_string()),
            conversion_message: Some("please".to_string()),
        }
    }

    #[test]
    fn lead_into_domain() {
        let lead: DomainLead = row().try_into().unwrap();
        assert_eq!(lead.email.as_str(), "jane@buyer.io");
        assert_eq!(lead.status, LeadStatus::Qualified);
        assert_eq!(lead.conversion_status, Some(ConversionStatus::Pending));
        assert!(lead.phone.is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut bad = row();
        bad.status = "WON".to_string();
        assert!(DomainLead::try_from(bad).is_err());
    }

    #[test]
    fn update_clears_nullable_columns() {
        let now = Utc::now().naive_utc();
        let update = DomainUpdateLead {
            phone: Some(None),
            status: Some(LeadStatus::Lost),
            ..DomainUpdateLead::touch(now)
        };
        let changeset: UpdateLead = (&update).into();
        assert_eq!(changeset.phone, Some(None));
        assert_eq!(changeset.company, None);
        assert_eq!(changeset.status, Some("LOST"));
        assert_eq!(changeset.updated_at, now);
    }
}
