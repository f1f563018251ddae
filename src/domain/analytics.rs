//! Role-scoped dashboard figures.

use serde::Serialize;

/// Lead and task counts for one or more users.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WorkloadCounts {
    pub leads: i64,
    pub tasks: i64,
    pub completed_tasks: i64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct TeamCounts {
    pub team_size: i64,
    #[serde(flatten)]
    pub workload: WorkloadCounts,
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct SystemCounts {
    pub leads: i64,
    pub tasks: i64,
    pub users: i64,
    /// Users still carrying the legacy `CLIENT` role marker.
    pub client_users: i64,
}

/// Summary appropriate for the caller's most privileged role.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Dashboard {
    Employee(WorkloadCounts),
    Manager(TeamCounts),
    Admin(SystemCounts),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_counts_add_up() {
        let a = WorkloadCounts {
            leads: 2,
            tasks: 3,
            completed_tasks: 1,
        };
        let b = WorkloadCounts {
            leads: 1,
            tasks: 0,
            completed_tasks: 0,
        };
        assert_eq!(
            a + b,
            WorkloadCounts {
                leads: 3,
                tasks: 3,
                completed_tasks: 1
            }
        );
    }

    #[test]
    fn dashboard_is_tagged_by_scope() {
        let dashboard = Dashboard::Manager(TeamCounts {
            team_size: 2,
            workload: WorkloadCounts::default(),
        });
        let json = serde_json::to_value(dashboard).unwrap();
        assert_eq!(json["scope"], "manager");
        assert_eq!(json["team_size"], 2);
        assert_eq!(json["completed_tasks"], 0);
    }
}
