//! Cross-cutting audit trail and user feedback capture.

use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::error::{HelpdeskError, Result};
use crate::models::{AuditEntry, FeedbackEntry, NewAuditEntry, NewFeedback};
use crate::schema::{audit_log, feedback};

pub fn record_action(
    pool: &DbPool,
    user_id: i32,
    action: &str,
    details: Option<&str>,
) -> Result<()> {
    let mut conn = pool.get()?;
    diesel::insert_into(audit_log::table)
        .values(&NewAuditEntry {
            user_id,
            action: action.to_string(),
            details: details.map(str::to_string),
            recorded_at: Utc::now().naive_utc(),
        })
        .execute(&mut conn)?;
    Ok(())
}

pub fn recent_actions(pool: &DbPool, limit: i64) -> Result<Vec<AuditEntry>> {
    let mut conn = pool.get()?;
    let entries = audit_log::table
        .order(audit_log::recorded_at.desc())
        .limit(limit)
        .load::<AuditEntry>(&mut conn)?;
    Ok(entries)
}

pub fn save_feedback(pool: &DbPool, user_id: i32, body: &str) -> Result<()> {
    let body = body.trim();
    if body.is_empty() {
        return Err(HelpdeskError::validation("feedback must not be blank"));
    }

    let mut conn = pool.get()?;
    diesel::insert_into(feedback::table)
        .values(&NewFeedback {
            user_id,
            body: body.to_string(),
            sent_at: Utc::now().naive_utc(),
        })
        .execute(&mut conn)?;
    Ok(())
}

pub fn list_feedback(pool: &DbPool) -> Result<Vec<FeedbackEntry>> {
    let mut conn = pool.get()?;
    let entries = feedback::table
        .order(feedback::sent_at.asc())
        .load::<FeedbackEntry>(&mut conn)?;
    Ok(entries)
}
