use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CompanyName, ContactName, LeadId, TaskDescription, TaskId, TaskTitle, UserId,
};

coded_enum! {
    TaskStatus {
        Todo => "TODO",
        InProgress => "IN_PROGRESS",
        Done => "DONE",
    }
}

coded_enum! {
    TaskPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: TaskTitle,
    pub description: Option<TaskDescription>,
    pub due_date: Option<NaiveDateTime>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub lead_id: Option<LeadId>,
    pub assigned_to: UserId,
    pub assigned_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Name and company of the lead a task is linked to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinkedLead {
    pub id: LeadId,
    pub name: ContactName,
    pub company: Option<CompanyName>,
}

/// Task row as returned by listings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskWithLead {
    pub task: Task,
    pub lead: Option<LinkedLead>,
}

/// A due date is acceptable only when it lies strictly after `now`.
pub fn is_valid_due_date(due_date: NaiveDateTime, now: NaiveDateTime) -> bool {
    due_date > now
}

#[derive(Clone, Debug)]
pub struct NewTask {
    pub title: TaskTitle,
    pub description: Option<TaskDescription>,
    pub due_date: Option<NaiveDateTime>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub lead_id: Option<LeadId>,
    pub assigned_to: UserId,
    pub assigned_by: UserId,
    pub created_at: NaiveDateTime,
}

/// Partial task update. `updated_at` is always written.
#[derive(Clone, Debug)]
pub struct UpdateTask {
    pub title: Option<TaskTitle>,
    pub description: Option<Option<TaskDescription>>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub lead_id: Option<Option<LeadId>>,
    pub assigned_to: Option<UserId>,
    pub assigned_by: Option<UserId>,
    pub updated_at: NaiveDateTime,
}

impl UpdateTask {
    pub fn touch(updated_at: NaiveDateTime) -> Self {
        Self {
            title: None,
            description: None,
            due_date: None,
            status: None,
            priority: None,
            lead_id: None,
            assigned_to: None,
            assigned_by: None,
            updated_at,
        }
    }
}
