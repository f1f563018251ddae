#![allow(dead_code)]

use chrono::Utc;
use crm_core::db::{DbPool, establish_connection_pool};
use crm_core::domain::lead::{Lead, LeadStatus, NewLead};
use crm_core::domain::types::{
    ContactEmail, ContactName, Department, PersonName, PhoneNumber, Position, PostalAddress,
    UserEmail, UserId, Username,
};
use crm_core::domain::user::{NewUser, Role, User};
use crm_core::repository::{DieselRepository, LeadWriter, UserWriter};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrated SQLite database living in a temporary directory.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("build pool");
        pool.get()
            .expect("get connection")
            .run_pending_migrations(MIGRATIONS)
            .expect("run migrations");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

/// Builds a user whose unique columns derive from `n`.
pub fn new_user(n: u32, roles: &[Role], manager_id: Option<UserId>) -> NewUser {
    NewUser {
        username: Username::new(format!("user{n}")).unwrap(),
        email: UserEmail::new(format!("user{n}@example.com")).unwrap(),
        phone: PhoneNumber::new(format!("555{n:07}")).unwrap(),
        name: PersonName::new(format!("User {n}")).unwrap(),
        address: PostalAddress::new("1 Main St").unwrap(),
        position: Position::new("Sales").unwrap(),
        department: Department::new("Revenue").unwrap(),
        password_hash: "unusable".to_string(),
        roles: roles.iter().copied().collect(),
        manager_id,
    }
}

pub fn seed_user(
    repo: &DieselRepository,
    n: u32,
    roles: &[Role],
    manager_id: Option<UserId>,
) -> User {
    repo.create_user(&new_user(n, roles, manager_id)).unwrap()
}

pub fn seed_lead(repo: &DieselRepository, name: &str, assigned_to: UserId) -> Lead {
    repo.create_lead(&NewLead {
        name: ContactName::new(name).unwrap(),
        email: ContactEmail::new(format!("{}@lead.io", name.to_lowercase())).unwrap(),
        phone: None,
        company: None,
        status: LeadStatus::New,
        assigned_to,
        created_by: Some(assigned_to),
        created_at: Utc::now().naive_utc(),
    })
    .unwrap()
}
