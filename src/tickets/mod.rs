//! Ticket repository and lifecycle engine. Every mutation appends its
//! history entry inside the same transaction, so a failed append rolls
//! the primary write back.

pub mod chat;

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use log::info;

use crate::auth::policy::{authorize, Action};
use crate::auth::UserIdentity;
use crate::db::DbPool;
use crate::error::{HelpdeskError, Result};
use crate::models::{HistoryEntry, NewHistoryEntry, NewTicket, Priority, Role, Status, Ticket};
use crate::schema::{accounts, ticket_history, tickets};
use crate::sla;

/// Audit action labels, fixed so history stays queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Creation,
    StatusChange,
    Assignment,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Creation => "creation",
            HistoryAction::StatusChange => "status_change",
            HistoryAction::Assignment => "assignment",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTicketInput {
    pub title: String,
    pub description: String,
    pub origin_sector: String,
    pub priority: Priority,
    pub notes: Option<String>,
}

/// Optional equality constraints, ANDed together. An empty filter
/// matches everything the caller is allowed to see.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub sector: Option<String>,
    pub requester_id: Option<i32>,
    pub technician_id: Option<i32>,
}

pub fn create_ticket(pool: &DbPool, actor: &UserIdentity, input: NewTicketInput) -> Result<i32> {
    authorize(actor, Action::CreateTicket)?;

    if input.title.trim().is_empty() {
        return Err(HelpdeskError::validation("title is required"));
    }
    if input.description.trim().is_empty() {
        return Err(HelpdeskError::validation("description is required"));
    }
    if input.origin_sector.trim().is_empty() {
        return Err(HelpdeskError::validation("origin sector is required"));
    }

    let now = Utc::now().naive_utc();
    let deadline = sla::compute_deadline(input.priority, now);

    let mut conn = pool.get()?;
    let id = conn.transaction::<_, HelpdeskError, _>(|conn| {
        let id = diesel::insert_into(tickets::table)
            .values(&NewTicket {
                title: input.title.trim().to_string(),
                description: input.description.trim().to_string(),
                origin_sector: input.origin_sector.trim().to_string(),
                priority: input.priority.as_str().to_string(),
                status: Status::Pending.as_str().to_string(),
                requester_id: actor.id,
                requester_name: actor.display_name.clone(),
                notes: input.notes.clone(),
                opened_at: now,
                sla_deadline: Some(deadline),
            })
            .returning(tickets::id)
            .get_result::<i32>(conn)?;

        append_history(
            conn,
            id,
            actor,
            HistoryAction::Creation,
            Some(format!("ticket opened with {} priority", input.priority.as_str())),
            now,
        )?;
        Ok(id)
    })?;

    info!("{} opened ticket {id}", actor.username);
    Ok(id)
}

/// Newest-opened-first listing, scoped to what the role may see:
/// collaborators their own requests, technicians their assignments plus
/// their own requests, administrators and the director everything.
pub fn list_tickets(pool: &DbPool, actor: &UserIdentity, filter: &TicketFilter) -> Result<Vec<Ticket>> {
    match actor.role {
        Role::Administrator | Role::Director => authorize(actor, Action::ViewAllTickets)?,
        Role::Collaborator | Role::Technician => authorize(actor, Action::ViewOwnTickets)?,
    }

    let mut conn = pool.get()?;
    let mut query = tickets::table.into_boxed();

    match actor.role {
        Role::Collaborator => {
            query = query.filter(tickets::requester_id.eq(actor.id));
        }
        Role::Technician => {
            query = query
                .filter(tickets::technician_id.eq(actor.id))
                .or_filter(tickets::requester_id.eq(actor.id));
        }
        Role::Administrator | Role::Director => {}
    }

    if let Some(status) = filter.status {
        query = query.filter(tickets::status.eq(status.as_str()));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(tickets::priority.eq(priority.as_str()));
    }
    if let Some(sector) = &filter.sector {
        query = query.filter(tickets::origin_sector.eq(sector.clone()));
    }
    if let Some(requester_id) = filter.requester_id {
        query = query.filter(tickets::requester_id.eq(requester_id));
    }
    if let Some(technician_id) = filter.technician_id {
        query = query.filter(tickets::technician_id.eq(technician_id));
    }

    let result = query
        .order(tickets::opened_at.desc())
        .then_order_by(tickets::id.desc())
        .load::<Ticket>(&mut conn)?;
    Ok(result)
}

pub fn get_ticket(pool: &DbPool, actor: &UserIdentity, ticket_id: i32) -> Result<Ticket> {
    let mut conn = pool.get()?;
    let ticket = load_ticket(&mut conn, ticket_id)?;
    ensure_visible(actor, &ticket)?;
    Ok(ticket)
}

/// Applies a status transition. Resolution records the detail as the
/// resolution text; a blank resolution is accepted and logged empty.
pub fn update_status(
    pool: &DbPool,
    actor: &UserIdentity,
    ticket_id: i32,
    new_status: Status,
    detail: Option<String>,
) -> Result<()> {
    let action = if new_status == Status::Cancelled {
        Action::CancelTicket
    } else {
        Action::UpdateTicket
    };
    authorize(actor, action)?;

    let now = Utc::now().naive_utc();
    let mut conn = pool.get()?;

    conn.transaction::<_, HelpdeskError, _>(|conn| {
        let ticket = load_ticket(conn, ticket_id)?;
        let current = parse_status(&ticket)?;
        ensure_actor_may_touch(actor, &ticket)?;

        match (current, new_status) {
            (Status::Pending, Status::InProgress) => {
                if ticket.technician_id.is_none() {
                    return Err(HelpdeskError::conflict(
                        "a technician must be assigned before work starts",
                    ));
                }
                diesel::update(tickets::table.find(ticket_id))
                    .set(tickets::status.eq(new_status.as_str()))
                    .execute(conn)?;
            }
            (Status::InProgress, Status::Resolved) => {
                diesel::update(tickets::table.find(ticket_id))
                    .set((
                        tickets::status.eq(new_status.as_str()),
                        tickets::resolved_at.eq(Some(now)),
                        tickets::resolution.eq(detail.clone().unwrap_or_default()),
                    ))
                    .execute(conn)?;
            }
            (Status::InProgress, Status::Pending) => {
                // Manual revert: back to the unassigned queue.
                diesel::update(tickets::table.find(ticket_id))
                    .set((
                        tickets::status.eq(new_status.as_str()),
                        tickets::technician_id.eq(None::<i32>),
                        tickets::technician_name.eq(None::<String>),
                        tickets::assigned_at.eq(None::<NaiveDateTime>),
                    ))
                    .execute(conn)?;
            }
            (from, Status::Cancelled) if !from.is_terminal() => {
                diesel::update(tickets::table.find(ticket_id))
                    .set(tickets::status.eq(new_status.as_str()))
                    .execute(conn)?;
            }
            (from, to) => {
                return Err(HelpdeskError::conflict(format!(
                    "cannot move ticket {ticket_id} from {} to {}",
                    from.as_str(),
                    to.as_str()
                )));
            }
        }

        let summary = format!(
            "status changed from {} to {}",
            current.as_str(),
            new_status.as_str()
        );
        let details = match detail {
            Some(text) => format!("{summary}: {text}"),
            None => summary,
        };
        append_history(conn, ticket_id, actor, HistoryAction::StatusChange, Some(details), now)?;
        Ok(())
    })?;

    info!(
        "{} moved ticket {ticket_id} to {}",
        actor.username,
        new_status.as_str()
    );
    Ok(())
}

/// Assigns a technician and moves the ticket into progress. Assignment
/// is a compare-and-set on the pending status: when two technicians race
/// for the same ticket exactly one wins, the other gets a conflict.
/// Re-assigning the technician already on the ticket is accepted and
/// leaves the ticket unchanged apart from the extra history entry.
pub fn assign_technician(
    pool: &DbPool,
    actor: &UserIdentity,
    ticket_id: i32,
    technician_id: i32,
) -> Result<()> {
    authorize(actor, Action::AssignTicket)?;
    if actor.role == Role::Technician && technician_id != actor.id {
        return Err(HelpdeskError::forbidden(
            "technicians may only assume tickets for themselves",
        ));
    }

    let now = Utc::now().naive_utc();
    let mut conn = pool.get()?;

    conn.transaction::<_, HelpdeskError, _>(|conn| {
        let technician = accounts::table
            .find(technician_id)
            .filter(accounts::is_active.eq(true))
            .filter(accounts::role.eq_any([
                Role::Technician.as_str(),
                Role::Administrator.as_str(),
            ]))
            .first::<crate::models::Account>(conn)
            .optional()?
            .ok_or_else(|| {
                HelpdeskError::validation(format!("no active technician with id {technician_id}"))
            })?;

        let ticket = load_ticket(conn, ticket_id)?;
        match parse_status(&ticket)? {
            Status::Pending => {
                let updated = diesel::update(
                    tickets::table
                        .find(ticket_id)
                        .filter(tickets::status.eq(Status::Pending.as_str())),
                )
                .set((
                    tickets::technician_id.eq(Some(technician_id)),
                    tickets::technician_name.eq(Some(technician.display_name.clone())),
                    tickets::assigned_at.eq(Some(now)),
                    tickets::status.eq(Status::InProgress.as_str()),
                ))
                .execute(conn)?;
                if updated == 0 {
                    return Err(HelpdeskError::conflict(format!(
                        "ticket {ticket_id} was assumed by someone else"
                    )));
                }
            }
            Status::InProgress if ticket.technician_id == Some(technician_id) => {
                // Idempotent re-assign; the history entry below is the
                // only effect.
            }
            Status::InProgress => {
                return Err(HelpdeskError::conflict(format!(
                    "ticket {ticket_id} is already assigned to {}",
                    ticket.technician_name.as_deref().unwrap_or("another technician")
                )));
            }
            status => {
                return Err(HelpdeskError::conflict(format!(
                    "ticket {ticket_id} is {} and cannot be assigned",
                    status.as_str()
                )));
            }
        }

        append_history(
            conn,
            ticket_id,
            actor,
            HistoryAction::Assignment,
            Some(format!("assigned to {}", technician.display_name)),
            now,
        )?;
        Ok(())
    })?;

    info!("{} assigned ticket {ticket_id} to account {technician_id}", actor.username);
    Ok(())
}

/// Audit trail for one ticket, oldest first.
pub fn list_history(pool: &DbPool, actor: &UserIdentity, ticket_id: i32) -> Result<Vec<HistoryEntry>> {
    let mut conn = pool.get()?;
    let ticket = load_ticket(&mut conn, ticket_id)?;
    ensure_visible(actor, &ticket)?;

    let entries = ticket_history::table
        .filter(ticket_history::ticket_id.eq(ticket_id))
        .order(ticket_history::recorded_at.asc())
        .then_order_by(ticket_history::id.asc())
        .load::<HistoryEntry>(&mut conn)?;
    Ok(entries)
}

pub(crate) fn load_ticket(conn: &mut SqliteConnection, ticket_id: i32) -> Result<Ticket> {
    tickets::table
        .find(ticket_id)
        .first::<Ticket>(conn)
        .optional()?
        .ok_or_else(|| HelpdeskError::not_found(format!("ticket {ticket_id}")))
}

fn parse_status(ticket: &Ticket) -> Result<Status> {
    ticket.status().ok_or_else(|| {
        HelpdeskError::conflict(format!(
            "ticket {} carries unknown status {}",
            ticket.id, ticket.status
        ))
    })
}

pub(crate) fn can_view(actor: &UserIdentity, ticket: &Ticket) -> bool {
    match actor.role {
        Role::Administrator | Role::Director => true,
        Role::Collaborator => ticket.requester_id == actor.id,
        Role::Technician => {
            ticket.requester_id == actor.id || ticket.technician_id == Some(actor.id)
        }
    }
}

fn ensure_visible(actor: &UserIdentity, ticket: &Ticket) -> Result<()> {
    if can_view(actor, ticket) {
        Ok(())
    } else {
        Err(HelpdeskError::forbidden(format!(
            "ticket {} is outside your scope",
            ticket.id
        )))
    }
}

/// Write-side ownership: a technician only touches tickets assigned to
/// them; the administrator is unrestricted.
fn ensure_actor_may_touch(actor: &UserIdentity, ticket: &Ticket) -> Result<()> {
    match actor.role {
        Role::Administrator => Ok(()),
        Role::Technician if ticket.technician_id == Some(actor.id) => Ok(()),
        Role::Technician => Err(HelpdeskError::forbidden(format!(
            "ticket {} is not assigned to you",
            ticket.id
        ))),
        _ => Err(HelpdeskError::forbidden("only technicians and administrators update tickets")),
    }
}

fn append_history(
    conn: &mut SqliteConnection,
    ticket_id: i32,
    actor: &UserIdentity,
    action: HistoryAction,
    details: Option<String>,
    recorded_at: NaiveDateTime,
) -> Result<()> {
    diesel::insert_into(ticket_history::table)
        .values(&NewHistoryEntry {
            ticket_id,
            user_id: actor.id,
            user_name: actor.display_name.clone(),
            action: action.as_str().to_string(),
            details,
            recorded_at,
        })
        .execute(conn)?;
    Ok(())
}
