use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::lead::{LeadStatus, NewLead, UpdateLead};
use crate::domain::types::{
    CompanyName, ContactEmail, ContactName, ConversionMessage, PhoneNumber, UserId,
};
use crate::forms::{FieldResult, FormError, double_option, parse_opt};

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating a lead.
pub struct AddLeadForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Defaults to `NEW`.
    pub status: Option<String>,
    /// Only honoured for managers assigning to one of their reports.
    pub assigned_to: Option<i32>,
}

impl AddLeadForm {
    pub fn requested_assignee(&self) -> Result<Option<UserId>, FormError> {
        self.assigned_to
            .map(UserId::new)
            .transpose()
            .field("assigned_to")
    }

    pub fn to_new_lead(
        &self,
        assigned_to: UserId,
        created_by: UserId,
        now: NaiveDateTime,
    ) -> Result<NewLead, FormError> {
        Ok(NewLead {
            name: ContactName::new(self.name.as_str()).field("name")?,
            email: ContactEmail::new(self.email.as_str()).field("email")?,
            phone: parse_opt(self.phone.as_deref(), "phone", PhoneNumber::new)?,
            company: parse_opt(self.company.as_deref(), "company", CompanyName::new)?,
            status: parse_opt(self.status.as_deref(), "status", str::parse::<LeadStatus>)?
                .unwrap_or(LeadStatus::New),
            assigned_to,
            created_by: Some(created_by),
            created_at: now,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Partial lead update. `phone`/`company` accept `null` to clear the value.
pub struct UpdateLeadForm {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    pub status: Option<String>,
    pub assigned_to: Option<i32>,
}

impl UpdateLeadForm {
    pub fn requested_assignee(&self) -> Result<Option<UserId>, FormError> {
        self.assigned_to
            .map(UserId::new)
            .transpose()
            .field("assigned_to")
    }

    pub fn to_update_lead(&self, now: NaiveDateTime) -> Result<UpdateLead, FormError> {
        Ok(UpdateLead {
            name: parse_opt(self.name.as_deref(), "name", ContactName::new)?,
            email: parse_opt(self.email.as_deref(), "email", ContactEmail::new)?,
            phone: self
                .phone
                .as_ref()
                .map(|phone| phone.as_deref().map(PhoneNumber::new).transpose())
                .transpose()
                .field("phone")?,
            company: self
                .company
                .as_ref()
                .map(|company| company.as_deref().map(CompanyName::new).transpose())
                .transpose()
                .field("company")?,
            status: parse_opt(self.status.as_deref(), "status", str::parse::<LeadStatus>)?,
            assigned_to: self.requested_assignee()?,
            ..UpdateLead::touch(now)
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Note attached by an employee asking for conversion.
pub struct ConversionRequestForm {
    pub message: Option<String>,
}

impl ConversionRequestForm {
    pub fn message(&self) -> Result<Option<ConversionMessage>, FormError> {
        optional_message(self.message.as_deref())
    }
}

#[derive(Debug, Deserialize, Validate)]
/// A manager's answer to a pending conversion request.
pub struct ConversionDecisionForm {
    pub approve: bool,
    pub message: Option<String>,
}

impl ConversionDecisionForm {
    pub fn message(&self) -> Result<Option<ConversionMessage>, FormError> {
        optional_message(self.message.as_deref())
    }
}

/// Blank or markup-only notes are treated as absent.
fn optional_message(raw: Option<&str>) -> Result<Option<ConversionMessage>, FormError> {
    match raw.map(ConversionMessage::new) {
        None => Ok(None),
        Some(Ok(message)) => Ok(Some(message)),
        Some(Err(crate::domain::types::TypeConstraintError::EmptyString)) => Ok(None),
        Some(Err(source)) => Err(FormError::InvalidField {
            field: "message",
            source,
        }),
    }
}
