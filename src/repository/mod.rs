use crate::db::{DbConnection, DbPool};
use crate::domain::client::{Client, ClientStatus, NewClient, UpdateClient};
use crate::domain::lead::{ConversionStatus, Lead, LeadStatus, NewLead, UpdateLead};
use crate::domain::task::{NewTask, Task, TaskStatus, TaskWithLead, UpdateTask};
use crate::domain::types::{ClientId, LeadId, PhoneNumber, TaskId, UserEmail, UserId, Username};
use crate::domain::user::{NewUser, UpdateUser, User, UserCredentials};
use crate::repository::errors::RepositoryResult;

pub mod analytics;
pub mod client;
pub mod errors;
pub mod lead;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod task;
pub mod user;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        let skipped = self.page.max(1) - 1;
        i64::try_from(skipped.saturating_mul(self.per_page)).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// Whose records a listing or count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeFilter {
    /// No restriction.
    Everyone,
    /// Records assigned to exactly this user.
    User(UserId),
    /// Records assigned to any direct report of this manager.
    ReportsOf(UserId),
}

#[derive(Debug, Clone)]
pub struct UserListQuery {
    pub manager_id: Option<UserId>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self {
            manager_id: None,
            pagination: None,
        }
    }

    /// Restricts the listing to the direct reports of `manager_id`.
    pub fn reports_of(mut self, manager_id: UserId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct LeadListQuery {
    pub assignee: AssigneeFilter,
    pub status: Option<LeadStatus>,
    pub conversion_status: Option<ConversionStatus>,
    pub pagination: Option<Pagination>,
}

impl LeadListQuery {
    pub fn new(assignee: AssigneeFilter) -> Self {
        Self {
            assignee,
            status: None,
            conversion_status: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn conversion_status(mut self, status: ConversionStatus) -> Self {
        self.conversion_status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct TaskListQuery {
    pub assignee: AssigneeFilter,
    pub status: Option<TaskStatus>,
    pub pagination: Option<Pagination>,
}

impl TaskListQuery {
    pub fn new(assignee: AssigneeFilter) -> Self {
        Self {
            assignee,
            status: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClientListQuery {
    pub assignee: AssigneeFilter,
    pub status: Option<ClientStatus>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new(assignee: AssigneeFilter) -> Self {
        Self {
            assignee,
            status: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: ClientStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
    fn get_user_by_phone(&self, phone: &PhoneNumber) -> RepositoryResult<Option<User>>;
    fn get_user_credentials(
        &self,
        username: &Username,
    ) -> RepositoryResult<Option<UserCredentials>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, user_id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
    fn update_user_password(&self, user_id: UserId, password_hash: &str) -> RepositoryResult<()>;
    fn delete_user(&self, user_id: UserId) -> RepositoryResult<()>;
}

pub trait LeadReader {
    fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>>;
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
}

pub trait LeadWriter {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
    fn update_lead(&self, lead_id: LeadId, updates: &UpdateLead) -> RepositoryResult<Lead>;
    fn delete_lead(&self, lead_id: LeadId) -> RepositoryResult<()>;
    /// Inserts `client` and removes the lead in a single transaction.
    fn convert_lead(&self, lead_id: LeadId, client: &NewClient) -> RepositoryResult<Client>;
}

pub trait TaskReader {
    fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<TaskWithLead>)>;
}

pub trait TaskWriter {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
    fn update_task(&self, task_id: TaskId, updates: &UpdateTask) -> RepositoryResult<Task>;
    fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()>;
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
}

pub trait ClientWriter {
    fn update_client(&self, client_id: ClientId, updates: &UpdateClient)
    -> RepositoryResult<Client>;
    fn delete_client(&self, client_id: ClientId) -> RepositoryResult<()>;
}

pub trait AnalyticsReader {
    fn count_leads(&self, assignee: AssigneeFilter) -> RepositoryResult<i64>;
    fn count_tasks(
        &self,
        assignee: AssigneeFilter,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<i64>;
    fn count_users(&self, manager_id: Option<UserId>) -> RepositoryResult<i64>;
    /// Counts users holding the raw stored role name, known or legacy.
    fn count_users_with_role(&self, role: &str) -> RepositoryResult<i64>;
}

/// Diesel backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
