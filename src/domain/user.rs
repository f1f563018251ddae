//! Users, their roles and the manager hierarchy.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Department, PersonName, PhoneNumber, Position, PostalAddress, TypeConstraintError, UserEmail,
    UserId, Username,
};

/// Role marker that predates the closed role set. Kept only for reporting.
pub const LEGACY_CLIENT_ROLE: &str = "CLIENT";

/// Roles recognised by the CRM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Manager, Role::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Employee => 0b001,
            Role::Manager => 0b010,
            Role::Admin => 0b100,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeConstraintError;

    /// Accepts `EMPLOYEE` as well as the `ROLE_EMPLOYEE` spelling, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == name)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown role `{s}`")))
    }
}

/// Unordered set of roles held by a single user.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }

    /// Role names in a stable order, as stored and as put into tokens.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|role| role.as_str().to_string()).collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        std::iter::once(role).collect()
    }
}

impl std::fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(roles.into_iter().collect())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: UserEmail,
    pub phone: PhoneNumber,
    pub name: PersonName,
    pub address: PostalAddress,
    pub position: Position,
    pub department: Department,
    pub roles: RoleSet,
    pub manager_id: Option<UserId>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    /// True iff `employee` reports directly to `self`.
    pub fn is_manager_of(&self, employee: &User) -> bool {
        employee.manager_id == Some(self.id)
    }
}

/// How a caller relates to the user that owns a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerRelation {
    /// The caller is the assignee.
    Owner,
    /// The assignee reports directly to the caller.
    Manager,
    Unrelated,
}

impl OwnerRelation {
    pub fn of(caller: &User, owner: &User) -> Self {
        if caller.id == owner.id {
            OwnerRelation::Owner
        } else if caller.is_manager_of(owner) {
            OwnerRelation::Manager
        } else {
            OwnerRelation::Unrelated
        }
    }

    pub fn is_owner_or_manager(self) -> bool {
        !matches!(self, OwnerRelation::Unrelated)
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: Username,
    pub email: UserEmail,
    pub phone: PhoneNumber,
    pub name: PersonName,
    pub address: PostalAddress,
    pub position: Position,
    pub department: Department,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub roles: RoleSet,
    pub manager_id: Option<UserId>,
}

/// Partial profile update. `None` leaves a field unchanged; for the manager
/// reference `Some(None)` detaches the user from their manager.
#[derive(Clone, Debug, Default)]
pub struct UpdateUser {
    pub username: Option<Username>,
    pub email: Option<UserEmail>,
    pub phone: Option<PhoneNumber>,
    pub name: Option<PersonName>,
    pub address: Option<PostalAddress>,
    pub position: Option<Position>,
    pub department: Option<Department>,
    pub manager_id: Option<Option<UserId>>,
    /// Replaces the whole role set when present.
    pub roles: Option<RoleSet>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.name.is_none()
            && self.address.is_none()
            && self.position.is_none()
            && self.department.is_none()
            && self.manager_id.is_none()
            && self.roles.is_none()
    }

    /// True when at least one column of the `users` table changes.
    pub fn touches_profile(&self) -> bool {
        !Self {
            roles: None,
            ..self.clone()
        }
        .is_empty()
    }
}

/// A user together with the stored password hash, used only for login.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_user(id: i32, manager_id: Option<i32>, roles: &[Role]) -> User {
        User {
            id: UserId::new(id).unwrap(),
            username: Username::new(format!("user{id}")).unwrap(),
            email: UserEmail::new(format!("user{id}@example.com")).unwrap(),
            phone: PhoneNumber::new(format!("{:010}", 5_550_000_000u64 + id as u64)).unwrap(),
            name: PersonName::new(format!("User {id}")).unwrap(),
            address: PostalAddress::new("1 Main St").unwrap(),
            position: Position::new("Sales").unwrap(),
            department: Department::new("Sales").unwrap(),
            roles: roles.iter().copied().collect(),
            manager_id: manager_id.map(|id| UserId::new(id).unwrap()),
        }
    }

    #[test]
    fn role_parsing_accepts_prefixed_names() {
        assert_eq!("ROLE_MANAGER".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("CLIENT".parse::<Role>().is_err());
    }

    #[test]
    fn role_set_membership() {
        let roles: RoleSet = [Role::Employee, Role::Manager, Role::Employee]
            .into_iter()
            .collect();
        assert!(roles.contains(Role::Employee));
        assert!(roles.contains(Role::Manager));
        assert!(!roles.contains(Role::Admin));
        assert_eq!(roles.names(), vec!["EMPLOYEE", "MANAGER"]);
        assert!(RoleSet::empty().is_empty());
    }

    #[test]
    fn role_set_serializes_as_list() {
        let roles = RoleSet::from(Role::Admin);
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"["ADMIN"]"#);
        let back: RoleSet = serde_json::from_str(r#"["MANAGER","EMPLOYEE"]"#).unwrap();
        assert!(back.contains(Role::Manager) && back.contains(Role::Employee));
    }

    #[test]
    fn manager_relation_is_one_level() {
        let director = sample_user(1, None, &[Role::Manager]);
        let manager = sample_user(2, Some(1), &[Role::Manager]);
        let employee = sample_user(3, Some(2), &[Role::Employee]);

        assert!(manager.is_manager_of(&employee));
        assert!(!director.is_manager_of(&employee));
        assert_eq!(OwnerRelation::of(&employee, &employee), OwnerRelation::Owner);
        assert_eq!(OwnerRelation::of(&manager, &employee), OwnerRelation::Manager);
        assert_eq!(OwnerRelation::of(&director, &employee), OwnerRelation::Unrelated);
    }
}
