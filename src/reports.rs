//! Flat delimited-text exports for ticket listings, SLA analysis and
//! technician performance.

use chrono::{NaiveDateTime, Utc};

use crate::analytics::TechnicianPerformance;
use crate::error::Result;
use crate::models::Ticket;
use crate::sla;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_ts(value: Option<NaiveDateTime>) -> String {
    value
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn export_tickets(all: &[Ticket]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "title",
        "description",
        "origin_sector",
        "priority",
        "status",
        "requester_name",
        "technician_name",
        "notes",
        "resolution",
        "opened_at",
        "assigned_at",
        "resolved_at",
        "sla_deadline",
    ])?;

    for ticket in all {
        writer.write_record([
            ticket.id.to_string(),
            ticket.title.clone(),
            ticket.description.clone(),
            ticket.origin_sector.clone(),
            ticket.priority.clone(),
            ticket.status.clone(),
            ticket.requester_name.clone(),
            ticket.technician_name.clone().unwrap_or_default(),
            ticket.notes.clone().unwrap_or_default(),
            ticket.resolution.clone().unwrap_or_default(),
            fmt_ts(Some(ticket.opened_at)),
            fmt_ts(ticket.assigned_at),
            fmt_ts(ticket.resolved_at),
            fmt_ts(ticket.sla_deadline),
        ])?;
    }

    finish(writer)
}

/// Per-ticket deadline standing at `now`, resolved tickets classified
/// against their deadline.
pub fn export_sla_analysis(all: &[Ticket], now: NaiveDateTime) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "title",
        "priority",
        "status",
        "opened_at",
        "sla_deadline",
        "resolved_at",
        "sla_status",
        "compliance",
    ])?;

    for ticket in all {
        let status = ticket.status();
        let sla_status = status
            .map(|s| sla::evaluate(ticket.sla_deadline, s, now))
            .map(|s| format!("{s:?}"))
            .unwrap_or_default();
        let compliance = match (ticket.resolved_at, ticket.sla_deadline) {
            (Some(resolved_at), Some(deadline)) => {
                format!("{:?}", sla::classify_resolution(resolved_at, deadline))
            }
            _ => String::new(),
        };

        writer.write_record([
            ticket.id.to_string(),
            ticket.title.clone(),
            ticket.priority.clone(),
            ticket.status.clone(),
            fmt_ts(Some(ticket.opened_at)),
            fmt_ts(ticket.sla_deadline),
            fmt_ts(ticket.resolved_at),
            sla_status,
            compliance,
        ])?;
    }

    finish(writer)
}

pub fn export_technician_performance(rows: &[TechnicianPerformance]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["technician_name", "total_resolved", "avg_resolution_days"])?;
    for row in rows {
        writer.write_record([
            row.technician_name.clone(),
            row.total_resolved.to_string(),
            format!("{:.2}", row.avg_resolution_days),
        ])?;
    }
    finish(writer)
}

/// Shared naming convention for downloaded report files.
pub fn export_filename(prefix: &str) -> String {
    format!("{prefix}_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"))
}
