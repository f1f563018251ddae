use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{
    Department, PersonName, PhoneNumber, PlainPassword, Position, PostalAddress, UserEmail,
    UserId, Username,
};
use crate::domain::user::{NewUser, Role, RoleSet, UpdateUser};
use crate::forms::{FieldResult, FormError, double_option};

fn parse_roles(raw: &[String]) -> Result<RoleSet, FormError> {
    let roles = raw
        .iter()
        .map(|role| role.parse::<Role>())
        .collect::<Result<RoleSet, _>>()
        .field("roles")?;
    if roles.is_empty() {
        return Err(FormError::MissingRoles);
    }
    Ok(roles)
}

#[derive(Debug, Deserialize, Validate)]
/// Payload used by an admin to register a new user.
pub struct AddUserForm {
    #[validate(length(min = 4))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub position: String,
    #[validate(length(min = 1))]
    pub department: String,
    #[validate(length(min = 8))]
    pub password: String,
    /// Role names such as `EMPLOYEE` or `ROLE_MANAGER`.
    pub roles: Vec<String>,
    pub manager_id: Option<i32>,
}

impl AddUserForm {
    pub fn password(&self) -> Result<PlainPassword, FormError> {
        PlainPassword::new(self.password.as_str()).field("password")
    }

    /// Converts the form into a [`NewUser`] carrying an already hashed password.
    pub fn to_new_user(&self, password_hash: String) -> Result<NewUser, FormError> {
        Ok(NewUser {
            username: Username::new(self.username.as_str()).field("username")?,
            email: UserEmail::new(self.email.as_str()).field("email")?,
            phone: PhoneNumber::new(self.phone.as_str()).field("phone")?,
            name: PersonName::new(self.name.as_str()).field("name")?,
            address: PostalAddress::new(self.address.as_str()).field("address")?,
            position: Position::new(self.position.as_str()).field("position")?,
            department: Department::new(self.department.as_str()).field("department")?,
            password_hash,
            roles: parse_roles(&self.roles)?,
            manager_id: self.manager_id.map(UserId::new).transpose().field("manager_id")?,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Partial profile update. Absent fields stay unchanged; `manager_id: null`
/// detaches the user from their manager.
pub struct UpdateUserForm {
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub roles: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<i32>>,
}

impl UpdateUserForm {
    pub fn to_update_user(&self) -> Result<UpdateUser, FormError> {
        Ok(UpdateUser {
            username: self
                .username
                .as_deref()
                .map(Username::new)
                .transpose()
                .field("username")?,
            email: self
                .email
                .as_deref()
                .map(UserEmail::new)
                .transpose()
                .field("email")?,
            phone: self
                .phone
                .as_deref()
                .map(PhoneNumber::new)
                .transpose()
                .field("phone")?,
            name: self
                .name
                .as_deref()
                .map(PersonName::new)
                .transpose()
                .field("name")?,
            address: self
                .address
                .as_deref()
                .map(PostalAddress::new)
                .transpose()
                .field("address")?,
            position: self
                .position
                .as_deref()
                .map(Position::new)
                .transpose()
                .field("position")?,
            department: self
                .department
                .as_deref()
                .map(Department::new)
                .transpose()
                .field("department")?,
            manager_id: self
                .manager_id
                .map(|manager| manager.map(UserId::new).transpose())
                .transpose()
                .field("manager_id")?,
            roles: self.roles.as_deref().map(parse_roles).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form() -> AddUserForm {
        AddUserForm {
            username: "emp1".to_string(),
            email: "Emp1@Example.com".to_string(),
            phone: "5551234567".to_string(),
            name: "Eve Employee".to_string(),
            address: "1 Main St".to_string(),
            position: "Rep".to_string(),
            department: "Sales".to_string(),
            password: "password1".to_string(),
            roles: vec!["ROLE_EMPLOYEE".to_string()],
            manager_id: Some(2),
        }
    }

    #[test]
    fn add_form_converts() {
        let form = add_form();
        assert!(form.validate().is_ok());
        let user = form.to_new_user("hash".to_string()).unwrap();
        assert_eq!(user.email.as_str(), "emp1@example.com");
        assert!(user.roles.contains(Role::Employee));
        assert_eq!(user.manager_id.map(UserId::get), Some(2));
    }

    #[test]
    fn add_form_requires_a_known_role() {
        let mut form = add_form();
        form.roles = vec![];
        assert!(matches!(
            form.to_new_user("hash".to_string()),
            Err(FormError::MissingRoles)
        ));
        form.roles = vec!["CLIENT".to_string()];
        assert!(matches!(
            form.to_new_user("hash".to_string()),
            Err(FormError::InvalidField { field: "roles", .. })
        ));
    }

    #[test]
    fn add_form_rejects_bad_phone() {
        let mut form = add_form();
        form.phone = "12345".to_string();
        assert!(matches!(
            form.to_new_user("hash".to_string()),
            Err(FormError::InvalidField { field: "phone", .. })
        ));
    }

    #[test]
    fn update_form_keeps_absent_fields_absent() {
        let form: UpdateUserForm = serde_json::from_str(r#"{"manager_id": null}"#).unwrap();
        let update = form.to_update_user().unwrap();
        assert!(update.username.is_none());
        assert_eq!(update.manager_id, Some(None));
        assert!(update.roles.is_none());
    }

    #[test]
    fn update_form_rejects_malformed_email() {
        let form = UpdateUserForm {
            email: Some("nope".to_string()),
            ..UpdateUserForm::default()
        };
        assert!(form.validate().is_err());
        assert!(matches!(
            form.to_update_user(),
            Err(FormError::InvalidField { field: "email", .. })
        ));
    }
}
