//! Leads and the two independent axes of their lifecycle.
//!
//! `status` is moved freely by the people working the lead. The
//! `conversion_status` axis tracks the employee to manager approval hand-off:
//! unset, then `PENDING`, then either `DENIED` or the lead disappears because
//! it became a client.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::client::{ClientStatus, NewClient};
use crate::domain::types::{
    CompanyName, ContactEmail, ContactName, ConversionMessage, LeadId, PhoneNumber, UserId,
};

/// Message stored on a lead when a manager denies conversion without a note.
pub const DEFAULT_DENIAL_MESSAGE: &str = "Conversion denied";

coded_enum! {
    /// Sales progress of a lead.
    LeadStatus {
        New => "NEW",
        Contacted => "CONTACTED",
        Qualified => "QUALIFIED",
        Lost => "LOST",
        Converted => "CONVERTED",
    }
}

coded_enum! {
    /// State of an employee's request to turn a lead into a client.
    ConversionStatus {
        Pending => "PENDING",
        Denied => "DENIED",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    pub name: ContactName,
    pub email: ContactEmail,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub status: LeadStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub assigned_to: UserId,
    pub created_by: Option<UserId>,
    pub conversion_status: Option<ConversionStatus>,
    pub conversion_message: Option<ConversionMessage>,
}

impl Lead {
    pub fn is_pending_conversion(&self) -> bool {
        self.conversion_status == Some(ConversionStatus::Pending)
    }

    /// Builds the client that replaces this lead once conversion goes through.
    pub fn to_new_client(&self, now: NaiveDateTime) -> NewClient {
        NewClient {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            address: None,
            status: ClientStatus::Active,
            assigned_to: self.assigned_to,
            created_at: now,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewLead {
    pub name: ContactName,
    pub email: ContactEmail,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub status: LeadStatus,
    pub assigned_to: UserId,
    pub created_by: Option<UserId>,
    /// Used for both `created_at` and `updated_at`.
    pub created_at: NaiveDateTime,
}

/// Partial lead update. `updated_at` is always written.
#[derive(Clone, Debug)]
pub struct UpdateLead {
    pub name: Option<ContactName>,
    pub email: Option<ContactEmail>,
    pub phone: Option<Option<PhoneNumber>>,
    pub company: Option<Option<CompanyName>>,
    pub status: Option<LeadStatus>,
    pub assigned_to: Option<UserId>,
    pub conversion_status: Option<Option<ConversionStatus>>,
    pub conversion_message: Option<Option<ConversionMessage>>,
    pub updated_at: NaiveDateTime,
}

impl UpdateLead {
    /// An update that changes nothing but the modification time.
    pub fn touch(updated_at: NaiveDateTime) -> Self {
        Self {
            name: None,
            email: None,
            phone: None,
            company: None,
            status: None,
            assigned_to: None,
            conversion_status: None,
            conversion_message: None,
            updated_at,
        }
    }

    pub fn conversion(
        status: ConversionStatus,
        message: Option<ConversionMessage>,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            conversion_status: Some(Some(status)),
            conversion_message: Some(message),
            ..Self::touch(updated_at)
        }
    }
}
