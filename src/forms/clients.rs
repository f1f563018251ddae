use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{ClientStatus, UpdateClient};
use crate::domain::types::{CompanyName, ContactEmail, ContactName, PhoneNumber, PostalAddress};
use crate::forms::{FieldResult, FormError, double_option, parse_opt};

#[derive(Debug, Default, Deserialize, Validate)]
/// Partial client update. Nullable fields accept `null` to clear the value.
pub struct UpdateClientForm {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    pub status: Option<String>,
}

impl TryFrom<&UpdateClientForm> for UpdateClient {
    type Error = FormError;

    fn try_from(form: &UpdateClientForm) -> Result<Self, Self::Error> {
        Ok(UpdateClient {
            name: parse_opt(form.name.as_deref(), "name", ContactName::new)?,
            email: parse_opt(form.email.as_deref(), "email", ContactEmail::new)?,
            phone: form
                .phone
                .as_ref()
                .map(|phone| phone.as_deref().map(PhoneNumber::new).transpose())
                .transpose()
                .field("phone")?,
            company: form
                .company
                .as_ref()
                .map(|company| company.as_deref().map(CompanyName::new).transpose())
                .transpose()
                .field("company")?,
            address: form
                .address
                .as_ref()
                .map(|address| address.as_deref().map(PostalAddress::new).transpose())
                .transpose()
                .field("address")?,
            status: parse_opt(form.status.as_deref(), "status", str::parse::<ClientStatus>)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_gives_empty_update() {
        let update = UpdateClient::try_from(&UpdateClientForm::default()).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn status_and_null_address() {
        let form: UpdateClientForm =
            serde_json::from_str(r#"{"status":"ON_HOLD","address":null}"#).unwrap();
        let update = UpdateClient::try_from(&form).unwrap();
        assert_eq!(update.status, Some(ClientStatus::OnHold));
        assert_eq!(update.address, Some(None));
    }
}
