//! Ticket-scoped internal chat. Append-only, ordered by send time.

use chrono::Utc;
use diesel::prelude::*;

use crate::auth::UserIdentity;
use crate::db::DbPool;
use crate::error::{HelpdeskError, Result};
use crate::models::{ChatMessage, NewChatMessage, Role};
use crate::schema::chat_messages;
use crate::tickets::can_view;

pub fn send_message(
    pool: &DbPool,
    actor: &UserIdentity,
    ticket_id: i32,
    body: &str,
) -> Result<i32> {
    let body = body.trim();
    if body.is_empty() {
        return Err(HelpdeskError::validation("message must not be blank"));
    }
    if actor.role == Role::Director {
        return Err(HelpdeskError::forbidden("director access is read-only"));
    }

    let mut conn = pool.get()?;
    let ticket = super::load_ticket(&mut conn, ticket_id)?;
    if !can_view(actor, &ticket) {
        return Err(HelpdeskError::forbidden(format!(
            "ticket {ticket_id} is outside your scope"
        )));
    }

    let id = diesel::insert_into(chat_messages::table)
        .values(&NewChatMessage {
            ticket_id,
            user_id: actor.id,
            username: actor.username.clone(),
            body: body.to_string(),
            sent_at: Utc::now().naive_utc(),
        })
        .returning(chat_messages::id)
        .get_result::<i32>(&mut conn)?;
    Ok(id)
}

pub fn list_messages(
    pool: &DbPool,
    actor: &UserIdentity,
    ticket_id: i32,
) -> Result<Vec<ChatMessage>> {
    let mut conn = pool.get()?;
    let ticket = super::load_ticket(&mut conn, ticket_id)?;
    if !can_view(actor, &ticket) {
        return Err(HelpdeskError::forbidden(format!(
            "ticket {ticket_id} is outside your scope"
        )));
    }

    let messages = chat_messages::table
        .filter(chat_messages::ticket_id.eq(ticket_id))
        .order(chat_messages::sent_at.asc())
        .then_order_by(chat_messages::id.asc())
        .load::<ChatMessage>(&mut conn)?;
    Ok(messages)
}
