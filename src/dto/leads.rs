use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::lead::Lead;

/// What a conversion request or decision did to the lead.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The lead is gone and this client replaced it.
    Converted(Client),
    /// Waiting for the owner's manager.
    Pending(Lead),
    Denied(Lead),
}
