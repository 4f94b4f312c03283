//! Administrator-only account management. Accounts are never deleted,
//! only deactivated, so every historic ticket keeps a valid reference.

use chrono::Utc;
use diesel::prelude::*;
use log::info;

use crate::auth::policy::{authorize, Action};
use crate::auth::{hash_password, UserIdentity};
use crate::db::DbPool;
use crate::error::{HelpdeskError, Result};
use crate::models::{Account, NewAccount, Role};
use crate::schema::accounts;

#[derive(Debug, Clone)]
pub struct NewUserInput {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub sector: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub sector: Option<String>,
    /// When set, resets the password.
    pub password: Option<String>,
}

pub fn list_users(pool: &DbPool, actor: &UserIdentity) -> Result<Vec<Account>> {
    authorize(actor, Action::ManageUsers)?;
    let mut conn = pool.get()?;
    let users = accounts::table
        .order(accounts::display_name.asc())
        .load::<Account>(&mut conn)?;
    Ok(users)
}

/// Active accounts a ticket can be assigned to: technicians and
/// administrators.
pub fn list_technicians(pool: &DbPool) -> Result<Vec<Account>> {
    let mut conn = pool.get()?;
    let technicians = accounts::table
        .filter(accounts::role.eq_any([
            Role::Technician.as_str(),
            Role::Administrator.as_str(),
        ]))
        .filter(accounts::is_active.eq(true))
        .order(accounts::display_name.asc())
        .load::<Account>(&mut conn)?;
    Ok(technicians)
}

pub fn create_user(pool: &DbPool, actor: &UserIdentity, input: NewUserInput) -> Result<i32> {
    authorize(actor, Action::ManageUsers)?;

    if input.username.trim().is_empty() {
        return Err(HelpdeskError::validation("username is required"));
    }
    if input.password.is_empty() {
        return Err(HelpdeskError::validation("password is required"));
    }
    if input.display_name.trim().is_empty() {
        return Err(HelpdeskError::validation("display name is required"));
    }
    if input.sector.trim().is_empty() {
        return Err(HelpdeskError::validation("sector is required"));
    }

    let mut conn = pool.get()?;

    let taken = accounts::table
        .filter(accounts::username.eq(input.username.trim()))
        .select(accounts::id)
        .first::<i32>(&mut conn)
        .optional()?
        .is_some();
    if taken {
        return Err(HelpdeskError::validation(format!(
            "username {} already exists",
            input.username.trim()
        )));
    }

    let id = diesel::insert_into(accounts::table)
        .values(&NewAccount {
            username: input.username.trim().to_string(),
            password_hash: hash_password(&input.password),
            display_name: input.display_name.trim().to_string(),
            email: input.email,
            role: input.role.as_str().to_string(),
            sector: input.sector.trim().to_string(),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        })
        .returning(accounts::id)
        .get_result::<i32>(&mut conn)?;

    info!("{} created account {} ({})", actor.username, input.username.trim(), id);
    Ok(id)
}

pub fn update_user(
    pool: &DbPool,
    actor: &UserIdentity,
    user_id: i32,
    input: UpdateUserInput,
) -> Result<()> {
    authorize(actor, Action::ManageUsers)?;
    let mut conn = pool.get()?;

    let exists = accounts::table
        .find(user_id)
        .select(accounts::id)
        .first::<i32>(&mut conn)
        .optional()?
        .is_some();
    if !exists {
        return Err(HelpdeskError::not_found(format!("user {user_id}")));
    }

    if let Some(display_name) = input.display_name {
        diesel::update(accounts::table.find(user_id))
            .set(accounts::display_name.eq(display_name))
            .execute(&mut conn)?;
    }
    if let Some(email) = input.email {
        diesel::update(accounts::table.find(user_id))
            .set(accounts::email.eq(email))
            .execute(&mut conn)?;
    }
    if let Some(role) = input.role {
        diesel::update(accounts::table.find(user_id))
            .set(accounts::role.eq(role.as_str()))
            .execute(&mut conn)?;
    }
    if let Some(sector) = input.sector {
        diesel::update(accounts::table.find(user_id))
            .set(accounts::sector.eq(sector))
            .execute(&mut conn)?;
    }
    if let Some(password) = input.password {
        if password.is_empty() {
            return Err(HelpdeskError::validation("password must not be empty"));
        }
        diesel::update(accounts::table.find(user_id))
            .set(accounts::password_hash.eq(hash_password(&password)))
            .execute(&mut conn)?;
    }

    Ok(())
}

pub fn set_user_active(
    pool: &DbPool,
    actor: &UserIdentity,
    user_id: i32,
    active: bool,
) -> Result<()> {
    authorize(actor, Action::ManageUsers)?;
    let mut conn = pool.get()?;

    let updated = diesel::update(accounts::table.find(user_id))
        .set(accounts::is_active.eq(active))
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(HelpdeskError::not_found(format!("user {user_id}")));
    }

    info!(
        "{} {} account {user_id}",
        actor.username,
        if active { "reactivated" } else { "deactivated" }
    );
    Ok(())
}
