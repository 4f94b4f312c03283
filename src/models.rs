use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{accounts, audit_log, chat_messages, feedback, ticket_history, tickets};

/// Account role. Stored as lowercase text, checked by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Collaborator,
    Technician,
    Administrator,
    Director,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Collaborator => "collaborator",
            Role::Technician => "technician",
            Role::Administrator => "administrator",
            Role::Director => "director",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "collaborator" => Some(Role::Collaborator),
            "technician" => Some(Role::Technician),
            "administrator" => Some(Role::Administrator),
            "director" => Some(Role::Director),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Anything unrecognized gets the widest SLA window.
    pub fn parse_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or(Priority::Low)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
    Cancelled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Resolved => "resolved",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Status::Pending),
            "in_progress" => Some(Status::InProgress),
            "resolved" => Some(Status::Resolved),
            "cancelled" => Some(Status::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = accounts)]
pub struct Account {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub sector: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Account {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub sector: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = tickets)]
pub struct Ticket {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub origin_sector: String,
    pub priority: String,
    pub status: String,
    pub requester_id: i32,
    pub requester_name: String,
    pub technician_id: Option<i32>,
    pub technician_name: Option<String>,
    pub notes: Option<String>,
    pub resolution: Option<String>,
    pub opened_at: NaiveDateTime,
    pub assigned_at: Option<NaiveDateTime>,
    pub resolved_at: Option<NaiveDateTime>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub attachments: Option<String>,
}

impl Ticket {
    pub fn priority(&self) -> Priority {
        Priority::parse_lossy(&self.priority)
    }

    pub fn status(&self) -> Option<Status> {
        Status::parse(&self.status)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub origin_sector: String,
    pub priority: String,
    pub status: String,
    pub requester_id: i32,
    pub requester_name: String,
    pub notes: Option<String>,
    pub opened_at: NaiveDateTime,
    pub sla_deadline: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = ticket_history)]
pub struct HistoryEntry {
    pub id: i32,
    pub ticket_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ticket_history)]
pub struct NewHistoryEntry {
    pub ticket_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = chat_messages)]
pub struct ChatMessage {
    pub id: i32,
    pub ticket_id: i32,
    pub user_id: i32,
    pub username: String,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub struct NewChatMessage {
    pub ticket_id: i32,
    pub user_id: i32,
    pub username: String,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = audit_log)]
pub struct AuditEntry {
    pub id: i32,
    pub user_id: i32,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAuditEntry {
    pub user_id: i32,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = feedback)]
pub struct FeedbackEntry {
    pub id: i32,
    pub user_id: i32,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feedback)]
pub struct NewFeedback {
    pub user_id: i32,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [
            Role::Collaborator,
            Role::Technician,
            Role::Administrator,
            Role::Director,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("intern"), None);
    }

    #[test]
    fn unknown_priority_falls_back_to_low() {
        assert_eq!(Priority::parse_lossy("urgent"), Priority::Low);
        assert_eq!(Priority::parse_lossy("high"), Priority::High);
    }

    #[test]
    fn terminal_statuses() {
        assert!(Status::Resolved.is_terminal());
        assert!(Status::Cancelled.is_terminal());
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::InProgress.is_terminal());
    }
}
