//! Role-scoped dashboard counts.

use crate::domain::analytics::{Dashboard, SystemCounts, TeamCounts, WorkloadCounts};
use crate::domain::task::TaskStatus;
use crate::domain::user::{LEGACY_CLIENT_ROLE, Role, User};
use crate::repository::{AnalyticsReader, AssigneeFilter};
use crate::services::ServiceResult;
use crate::services::access::{ensure_any_role, ensure_role};

fn workload<R>(repo: &R, assignee: AssigneeFilter) -> ServiceResult<WorkloadCounts>
where
    R: AnalyticsReader + ?Sized,
{
    Ok(WorkloadCounts {
        leads: repo.count_leads(assignee)?,
        tasks: repo.count_tasks(assignee, None)?,
        completed_tasks: repo.count_tasks(assignee, Some(TaskStatus::Done))?,
    })
}

/// The caller's own leads, tasks and finished tasks.
pub fn employee_summary<R>(repo: &R, caller: &User) -> ServiceResult<WorkloadCounts>
where
    R: AnalyticsReader + ?Sized,
{
    ensure_any_role(caller, &[Role::Employee, Role::Manager])?;
    workload(repo, AssigneeFilter::User(caller.id))
}

/// The same counts summed over the caller's direct reports.
pub fn manager_summary<R>(repo: &R, caller: &User) -> ServiceResult<TeamCounts>
where
    R: AnalyticsReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    Ok(TeamCounts {
        team_size: repo.count_users(Some(caller.id))?,
        workload: workload(repo, AssigneeFilter::ReportsOf(caller.id))?,
    })
}

pub fn admin_summary<R>(repo: &R, caller: &User) -> ServiceResult<SystemCounts>
where
    R: AnalyticsReader + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    Ok(SystemCounts {
        leads: repo.count_leads(AssigneeFilter::Everyone)?,
        tasks: repo.count_tasks(AssigneeFilter::Everyone, None)?,
        users: repo.count_users(None)?,
        client_users: repo.count_users_with_role(LEGACY_CLIENT_ROLE)?,
    })
}

/// Summary for the caller's most privileged role.
pub fn dashboard<R>(repo: &R, caller: &User) -> ServiceResult<Dashboard>
where
    R: AnalyticsReader + ?Sized,
{
    if caller.has_role(Role::Admin) {
        admin_summary(repo, caller).map(Dashboard::Admin)
    } else if caller.has_role(Role::Manager) {
        manager_summary(repo, caller).map(Dashboard::Manager)
    } else {
        employee_summary(repo, caller).map(Dashboard::Employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::tests::sample_user;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;

    #[test]
    fn employee_dashboard_counts_own_records() {
        let mut repo = MockRepository::new();
        repo.expect_count_leads()
            .withf(|assignee| matches!(assignee, AssigneeFilter::User(id) if id.get() == 2))
            .returning(|_| Ok(3));
        repo.expect_count_tasks()
            .returning(|_, status| Ok(if status.is_some() { 1 } else { 4 }));

        let caller = sample_user(2, Some(1), &[Role::Employee]);
        assert_eq!(
            dashboard(&repo, &caller).unwrap(),
            Dashboard::Employee(WorkloadCounts {
                leads: 3,
                tasks: 4,
                completed_tasks: 1,
            })
        );
    }

    #[test]
    fn manager_dashboard_covers_reports() {
        let mut repo = MockRepository::new();
        repo.expect_count_users()
            .withf(|manager| manager.map(|id| id.get()) == Some(1))
            .returning(|_| Ok(2));
        repo.expect_count_leads()
            .withf(|assignee| matches!(assignee, AssigneeFilter::ReportsOf(_)))
            .returning(|_| Ok(5));
        repo.expect_count_tasks().returning(|_, _| Ok(0));

        let caller = sample_user(1, None, &[Role::Manager, Role::Employee]);
        match dashboard(&repo, &caller).unwrap() {
            Dashboard::Manager(team) => {
                assert_eq!(team.team_size, 2);
                assert_eq!(team.workload.leads, 5);
            }
            other => panic!("unexpected dashboard {other:?}"),
        }
    }

    #[test]
    fn admin_dashboard_counts_legacy_client_role() {
        let mut repo = MockRepository::new();
        repo.expect_count_leads().returning(|_| Ok(10));
        repo.expect_count_tasks().returning(|_, _| Ok(20));
        repo.expect_count_users().returning(|_| Ok(6));
        repo.expect_count_users_with_role()
            .withf(|role| role == LEGACY_CLIENT_ROLE)
            .returning(|_| Ok(1));

        let caller = sample_user(9, None, &[Role::Admin]);
        assert_eq!(
            admin_summary(&repo, &caller).unwrap(),
            SystemCounts {
                leads: 10,
                tasks: 20,
                users: 6,
                client_users: 1,
            }
        );
    }

    #[test]
    fn manager_can_read_own_summary() {
        let mut repo = MockRepository::new();
        repo.expect_count_leads()
            .withf(|assignee| matches!(assignee, AssigneeFilter::User(id) if id.get() == 1))
            .returning(|_| Ok(2));
        repo.expect_count_tasks().returning(|_, _| Ok(0));

        let caller = sample_user(1, None, &[Role::Manager]);
        assert_eq!(employee_summary(&repo, &caller).unwrap().leads, 2);
    }

    #[test]
    fn admin_only_user_has_no_personal_summary() {
        let repo = MockRepository::new();
        let caller = sample_user(9, None, &[Role::Admin]);
        assert!(matches!(
            employee_summary(&repo, &caller),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_summary_requires_admin() {
        let repo = MockRepository::new();
        let caller = sample_user(1, None, &[Role::Manager]);
        assert!(matches!(
            admin_summary(&repo, &caller),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
