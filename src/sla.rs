//! Deadline arithmetic. Everything here is pure; breach detection is
//! computed lazily at read time, never by a background timer.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{Priority, Status};

/// Maximum time from opening to resolution, by priority.
pub fn compute_deadline(priority: Priority, opened_at: NaiveDateTime) -> NaiveDateTime {
    let window = match priority {
        Priority::High => Duration::hours(4),
        Priority::Medium => Duration::hours(24),
        Priority::Low => Duration::hours(72),
    };
    opened_at + window
}

/// Time-to-deadline tiers, the presentation applied everywhere:
/// under two hours is Approaching, under one is Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Ok,
    Approaching,
    Critical,
    Breached,
    NotApplicable,
}

pub fn evaluate(
    deadline: Option<NaiveDateTime>,
    status: Status,
    now: NaiveDateTime,
) -> SlaStatus {
    let Some(deadline) = deadline else {
        return SlaStatus::NotApplicable;
    };
    if status == Status::Resolved {
        return SlaStatus::NotApplicable;
    }

    let remaining = deadline - now;
    if remaining < Duration::zero() {
        SlaStatus::Breached
    } else if remaining < Duration::hours(1) {
        SlaStatus::Critical
    } else if remaining < Duration::hours(2) {
        SlaStatus::Approaching
    } else {
        SlaStatus::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compliance {
    Compliant,
    Violated,
}

/// Classification at resolution time.
pub fn classify_resolution(resolved_at: NaiveDateTime, deadline: NaiveDateTime) -> Compliance {
    if resolved_at <= deadline {
        Compliance::Compliant
    } else {
        Compliance::Violated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn deadline_windows_by_priority() {
        assert_eq!(compute_deadline(Priority::High, t0()) - t0(), Duration::hours(4));
        assert_eq!(compute_deadline(Priority::Medium, t0()) - t0(), Duration::hours(24));
        assert_eq!(compute_deadline(Priority::Low, t0()) - t0(), Duration::hours(72));
    }

    #[test]
    fn unrecognized_priority_gets_low_window() {
        let priority = Priority::parse_lossy("emergency");
        assert_eq!(compute_deadline(priority, t0()) - t0(), Duration::hours(72));
    }

    #[test]
    fn high_ticket_still_pending_after_window_is_breached() {
        let deadline = compute_deadline(Priority::High, t0());
        let status = evaluate(Some(deadline), Status::Pending, t0() + Duration::hours(5));
        assert_eq!(status, SlaStatus::Breached);
    }

    #[test]
    fn tiers_track_remaining_time() {
        let deadline = t0() + Duration::hours(4);
        assert_eq!(evaluate(Some(deadline), Status::Pending, t0()), SlaStatus::Ok);
        assert_eq!(
            evaluate(Some(deadline), Status::InProgress, t0() + Duration::minutes(150)),
            SlaStatus::Approaching
        );
        assert_eq!(
            evaluate(Some(deadline), Status::InProgress, t0() + Duration::minutes(200)),
            SlaStatus::Critical
        );
        assert_eq!(
            evaluate(Some(deadline), Status::InProgress, t0() + Duration::hours(5)),
            SlaStatus::Breached
        );
    }

    #[test]
    fn resolved_and_deadline_free_tickets_are_not_applicable() {
        let deadline = t0() + Duration::hours(4);
        assert_eq!(
            evaluate(Some(deadline), Status::Resolved, t0() + Duration::hours(10)),
            SlaStatus::NotApplicable
        );
        assert_eq!(evaluate(None, Status::Pending, t0()), SlaStatus::NotApplicable);
    }

    #[test]
    fn resolution_on_the_deadline_is_compliant() {
        let deadline = t0() + Duration::hours(4);
        assert_eq!(classify_resolution(deadline, deadline), Compliance::Compliant);
        assert_eq!(
            classify_resolution(deadline + Duration::seconds(1), deadline),
            Compliance::Violated
        );
    }
}
