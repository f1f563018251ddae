//! Diesel models representing users and their role assignments.

use diesel::prelude::*;

use crate::domain::types::{
    Department, PersonName, PhoneNumber, Position, PostalAddress, TypeConstraintError, UserEmail,
    UserId, Username,
};
use crate::domain::user::{
    NewUser as DomainNewUser, Role, RoleSet, UpdateUser as DomainUpdateUser, User as DomainUser,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub address: String,
    pub position: String,
    pub department: String,
    pub password_hash: String,
    pub manager_id: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable, Associations, Identifiable, Insertable)]
#[diesel(primary_key(user_id, role))]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = crate::schema::user_roles)]
/// Association table linking users to roles.
pub struct UserRole {
    pub user_id: i32,
    pub role: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub position: &'a str,
    pub department: &'a str,
    pub password_hash: &'a str,
    pub manager_id: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
/// Data used when updating a [`User`] record. `None` fields are skipped.
pub struct UpdateUser<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub position: Option<&'a str>,
    pub department: Option<&'a str>,
    pub manager_id: Option<Option<i32>>,
}

/// Collects stored role names into a [`RoleSet`]. Names outside the closed
/// role set (such as the legacy `CLIENT` marker) carry no permissions.
pub fn role_set_from_rows(rows: &[UserRole]) -> RoleSet {
    rows.iter()
        .filter_map(|row| row.role.parse::<Role>().ok())
        .collect()
}

impl User {
    pub fn into_domain(self, roles: RoleSet) -> Result<DomainUser, TypeConstraintError> {
        Ok(DomainUser {
            id: UserId::try_from(self.id)?,
            username: Username::new(self.username)?,
            email: UserEmail::new(self.email)?,
            phone: PhoneNumber::new(self.phone)?,
            name: PersonName::new(self.name)?,
            address: PostalAddress::new(self.address)?,
            position: Position::new(self.position)?,
            department: Department::new(self.department)?,
            roles,
            manager_id: self.manager_id.map(UserId::try_from).transpose()?,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            username: user.username.as_str(),
            email: user.email.as_str(),
            phone: user.phone.as_str(),
            name: user.name.as_str(),
            address: user.address.as_str(),
            position: user.position.as_str(),
            department: user.department.as_str(),
            password_hash: user.password_hash.as_str(),
            manager_id: user.manager_id.map(UserId::get),
        }
    }
}

impl<'a> From<&'a DomainUpdateUser> for UpdateUser<'a> {
    fn from(user: &'a DomainUpdateUser) -> Self {
        Self {
            username: user.username.as_ref().map(|v| v.as_str()),
            email: user.email.as_ref().map(|v| v.as_str()),
            phone: user.phone.as_ref().map(|v| v.as_str()),
            name: user.name.as_ref().map(|v| v.as_str()),
            address: user.address.as_ref().map(|v| v.as_str()),
            position: user.position.as_ref().map(|v| v.as_str()),
            department: user.department.as_ref().map(|v| v.as_str()),
            manager_id: user.manager_id.map(|manager| manager.map(UserId::get)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> User {
        User {
            id: 4,
            username: "mgr1".to_string(),
            email: "mgr1@example.com".to_string(),
            phone: "5551112222".to_string(),
            name: "Mia Manager".to_string(),
            address: "2 Side St".to_string(),
            position: "Lead".to_string(),
            department: "Sales".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            manager_id: Some(1),
        }
    }

    #[test]
    fn legacy_roles_are_ignored() {
        let rows = vec![
            UserRole {
                user_id: 4,
                role: "MANAGER".to_string(),
            },
            UserRole {
                user_id: 4,
                role: "CLIENT".to_string(),
            },
        ];
        let roles = role_set_from_rows(&rows);
        assert!(roles.contains(Role::Manager));
        assert_eq!(roles.iter().count(), 1);
    }

    #[test]
    fn row_into_domain() {
        let user = row().into_domain(RoleSet::from(Role::Manager)).unwrap();
        assert_eq!(user.id.get(), 4);
        assert_eq!(user.username.as_str(), "mgr1");
        assert_eq!(user.manager_id.map(UserId::get), Some(1));
        assert!(user.has_role(Role::Manager));
    }

    #[test]
    fn invalid_row_is_rejected() {
        let mut bad = row();
        bad.phone = "12".to_string();
        assert_eq!(
            bad.into_domain(RoleSet::empty()).unwrap_err(),
            TypeConstraintError::InvalidPhone
        );
    }

    #[test]
    fn update_maps_nested_manager_option() {
        let detach = DomainUpdateUser {
            manager_id: Some(None),
            ..DomainUpdateUser::default()
        };
        let changeset: UpdateUser = (&detach).into();
        assert_eq!(changeset.manager_id, Some(None));
        assert!(changeset.username.is_none());
    }
}
