//! Reporting aggregates. Everything is recomputed on demand from the
//! repository, so a report is always consistent with the store at the
//! moment it was asked for.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::policy::{authorize, Action};
use crate::auth::UserIdentity;
use crate::db::DbPool;
use crate::error::Result;
use crate::models::{Status, Ticket};
use crate::schema::tickets;
use crate::sla::{self, Compliance, SlaStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

pub fn quick_stats(pool: &DbPool) -> Result<QuickStats> {
    let mut conn = pool.get()?;

    let total: i64 = tickets::table.count().get_result(&mut conn)?;
    let pending: i64 = tickets::table
        .filter(tickets::status.eq(Status::Pending.as_str()))
        .count()
        .get_result(&mut conn)?;
    let in_progress: i64 = tickets::table
        .filter(tickets::status.eq(Status::InProgress.as_str()))
        .count()
        .get_result(&mut conn)?;
    let resolved: i64 = tickets::table
        .filter(tickets::status.eq(Status::Resolved.as_str()))
        .count()
        .get_result(&mut conn)?;

    Ok(QuickStats {
        total,
        pending,
        in_progress,
        resolved,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TechnicianPerformance {
    pub technician_name: String,
    pub total_resolved: i64,
    pub avg_resolution_days: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub by_priority: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
    pub by_sector: BTreeMap<String, i64>,
    pub technician_performance: Vec<TechnicianPerformance>,
    pub last_30_days_trend: Vec<DailyCount>,
}

pub fn analytics(pool: &DbPool, actor: &UserIdentity) -> Result<AnalyticsReport> {
    authorize(actor, Action::ViewDashboard)?;

    let mut conn = pool.get()?;
    let all = tickets::table.load::<Ticket>(&mut conn)?;
    Ok(aggregate(&all, Utc::now().naive_utc()))
}

fn aggregate(all: &[Ticket], now: NaiveDateTime) -> AnalyticsReport {
    let mut by_priority = BTreeMap::new();
    let mut by_status = BTreeMap::new();
    let mut by_sector = BTreeMap::new();
    for ticket in all {
        *by_priority.entry(ticket.priority.clone()).or_insert(0) += 1;
        *by_status.entry(ticket.status.clone()).or_insert(0) += 1;
        *by_sector.entry(ticket.origin_sector.clone()).or_insert(0) += 1;
    }

    // Average days from opening to resolution, per named technician,
    // over resolved tickets only.
    let mut per_technician: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for ticket in all {
        let (Some(name), Some(resolved_at)) = (&ticket.technician_name, ticket.resolved_at) else {
            continue;
        };
        if ticket.status() != Some(Status::Resolved) {
            continue;
        }
        let days = (resolved_at - ticket.opened_at).num_seconds() as f64 / 86_400.0;
        let entry = per_technician.entry(name.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += days;
    }
    let mut technician_performance: Vec<TechnicianPerformance> = per_technician
        .into_iter()
        .map(|(technician_name, (total, sum_days))| TechnicianPerformance {
            technician_name,
            total_resolved: total,
            avg_resolution_days: sum_days / total as f64,
        })
        .collect();
    technician_performance.sort_by(|a, b| b.total_resolved.cmp(&a.total_resolved));

    let cutoff = now - Duration::days(30);
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for ticket in all {
        if ticket.opened_at >= cutoff {
            *per_day.entry(ticket.opened_at.date()).or_insert(0) += 1;
        }
    }
    let last_30_days_trend = per_day
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    AnalyticsReport {
        by_priority,
        by_status,
        by_sector,
        technician_performance,
        last_30_days_trend,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlaComplianceReport {
    pub compliant: i64,
    pub violated: i64,
    pub critical: i64,
}

/// Resolved tickets are classified against their deadline; `critical`
/// counts open tickets currently inside the critical window.
pub fn sla_compliance(all: &[Ticket], now: NaiveDateTime) -> SlaComplianceReport {
    let mut report = SlaComplianceReport {
        compliant: 0,
        violated: 0,
        critical: 0,
    };

    for ticket in all {
        let Some(deadline) = ticket.sla_deadline else {
            continue;
        };
        let status = ticket.status().unwrap_or(Status::Pending);
        if status == Status::Resolved {
            if let Some(resolved_at) = ticket.resolved_at {
                match sla::classify_resolution(resolved_at, deadline) {
                    Compliance::Compliant => report.compliant += 1,
                    Compliance::Violated => report.violated += 1,
                }
            }
        } else if sla::evaluate(Some(deadline), status, now) == SlaStatus::Critical {
            report.critical += 1;
        }
    }

    report
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub avg_resolution_hours: f64,
    pub sla_compliance_pct: f64,
}

/// The headline numbers shown on the management dashboard.
pub fn dashboard_metrics(all: &[Ticket]) -> DashboardMetrics {
    let mut pending = 0;
    let mut in_progress = 0;
    let mut resolved = 0;
    let mut resolution_hours = Vec::new();
    let mut compliant = 0i64;
    let mut with_deadline = 0i64;

    for ticket in all {
        match ticket.status() {
            Some(Status::Pending) => pending += 1,
            Some(Status::InProgress) => in_progress += 1,
            Some(Status::Resolved) => resolved += 1,
            _ => {}
        }
        if ticket.status() == Some(Status::Resolved) {
            if let Some(resolved_at) = ticket.resolved_at {
                resolution_hours.push((resolved_at - ticket.opened_at).num_seconds() as f64 / 3_600.0);
                if let Some(deadline) = ticket.sla_deadline {
                    with_deadline += 1;
                    if sla::classify_resolution(resolved_at, deadline) == Compliance::Compliant {
                        compliant += 1;
                    }
                }
            }
        }
    }

    let avg_resolution_hours = if resolution_hours.is_empty() {
        0.0
    } else {
        resolution_hours.iter().sum::<f64>() / resolution_hours.len() as f64
    };
    let sla_compliance_pct = if with_deadline == 0 {
        0.0
    } else {
        compliant as f64 * 100.0 / with_deadline as f64
    };

    DashboardMetrics {
        total: all.len() as i64,
        pending,
        in_progress,
        resolved,
        avg_resolution_hours,
        sla_compliance_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn ticket(id: i32, status: &str, opened: NaiveDateTime) -> Ticket {
        Ticket {
            id,
            title: format!("ticket {id}"),
            description: "something broke".into(),
            origin_sector: "Finance".into(),
            priority: "medium".into(),
            status: status.into(),
            requester_id: 1,
            requester_name: "Staff Collaborator".into(),
            technician_id: None,
            technician_name: None,
            notes: None,
            resolution: None,
            opened_at: opened,
            assigned_at: None,
            resolved_at: None,
            sla_deadline: Some(opened + Duration::hours(24)),
            attachments: None,
        }
    }

    #[test]
    fn compliance_counts_resolution_against_deadline() {
        let mut on_time = ticket(1, "resolved", t(1, 9));
        on_time.resolved_at = Some(t(1, 12));
        let mut late = ticket(2, "resolved", t(1, 9));
        late.resolved_at = Some(t(3, 9));
        let open = ticket(3, "pending", t(1, 9));

        // 30 minutes before the open ticket's deadline.
        let report = sla_compliance(&[on_time, late, open], t(2, 8) + Duration::minutes(30));
        assert_eq!(
            report,
            SlaComplianceReport {
                compliant: 1,
                violated: 1,
                critical: 1,
            }
        );
    }

    #[test]
    fn aggregate_groups_and_averages() {
        let mut a = ticket(1, "resolved", t(1, 9));
        a.technician_name = Some("IT Technician".into());
        a.resolved_at = Some(t(2, 9));
        let mut b = ticket(2, "resolved", t(1, 9));
        b.technician_name = Some("IT Technician".into());
        b.resolved_at = Some(t(4, 9));
        let c = ticket(3, "pending", t(5, 9));

        let report = aggregate(&[a, b, c], t(6, 9));
        assert_eq!(report.by_status.get("resolved"), Some(&2));
        assert_eq!(report.by_status.get("pending"), Some(&1));
        assert_eq!(report.by_sector.get("Finance"), Some(&3));

        assert_eq!(report.technician_performance.len(), 1);
        let perf = &report.technician_performance[0];
        assert_eq!(perf.total_resolved, 2);
        assert!((perf.avg_resolution_days - 2.0).abs() < 1e-9);

        // Two distinct opening days inside the window.
        assert_eq!(report.last_30_days_trend.len(), 2);
    }

    #[test]
    fn dashboard_metrics_average_and_compliance() {
        let mut a = ticket(1, "resolved", t(1, 9));
        a.resolved_at = Some(t(1, 13));
        let mut b = ticket(2, "resolved", t(1, 9));
        b.resolved_at = Some(t(3, 9));
        let metrics = dashboard_metrics(&[a, b]);

        assert_eq!(metrics.total, 2);
        assert_eq!(metrics.resolved, 2);
        assert!((metrics.avg_resolution_hours - 26.0).abs() < 1e-9);
        assert!((metrics.sla_compliance_pct - 50.0).abs() < 1e-9);
    }
}
