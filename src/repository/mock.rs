//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::lead::{Lead, NewLead, UpdateLead};
use crate::domain::task::{NewTask, Task, TaskStatus, TaskWithLead, UpdateTask};
use crate::domain::types::{ClientId, LeadId, PhoneNumber, TaskId, UserEmail, UserId, Username};
use crate::domain::user::{NewUser, UpdateUser, User, UserCredentials};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AnalyticsReader, AssigneeFilter, ClientListQuery, ClientReader, ClientWriter, LeadListQuery,
    LeadReader, LeadWriter, TaskListQuery, TaskReader, TaskWriter, UserListQuery, UserReader,
    UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
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

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn update_user(&self, user_id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
        fn update_user_password(&self, user_id: UserId, password_hash: &str) -> RepositoryResult<()>;
        fn delete_user(&self, user_id: UserId) -> RepositoryResult<()>;
    }

    impl LeadReader for Repository {
        fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
    }

    impl LeadWriter for Repository {
        fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
        fn update_lead(&self, lead_id: LeadId, updates: &UpdateLead) -> RepositoryResult<Lead>;
        fn delete_lead(&self, lead_id: LeadId) -> RepositoryResult<()>;
        fn convert_lead(&self, lead_id: LeadId, client: &NewClient) -> RepositoryResult<Client>;
    }

    impl TaskReader for Repository {
        fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
        fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<TaskWithLead>)>;
    }

    impl TaskWriter for Repository {
        fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
        fn update_task(&self, task_id: TaskId, updates: &UpdateTask) -> RepositoryResult<Task>;
        fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()>;
    }

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    }

    impl ClientWriter for Repository {
        fn update_client(
            &self,
            client_id: ClientId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, client_id: ClientId) -> RepositoryResult<()>;
    }

    impl AnalyticsReader for Repository {
        fn count_leads(&self, assignee: AssigneeFilter) -> RepositoryResult<i64>;
        fn count_tasks(
            &self,
            assignee: AssigneeFilter,
            status: Option<TaskStatus>,
        ) -> RepositoryResult<i64>;
        fn count_users(&self, manager_id: Option<UserId>) -> RepositoryResult<i64>;
        fn count_users_with_role(&self, role: &str) -> RepositoryResult<i64>;
    }
}
