use anyhow::Context;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use std::path::Path;

use crate::auth::hash_password;
use crate::error::Result;
use crate::models::{NewAccount, Role};
use crate::schema::{accounts, tickets};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Opens the embedded store, creating the parent directory for file-backed
/// databases on first run.
pub fn build_pool(database_url: &str, max_connections: u32) -> anyhow::Result<DbPool> {
    if database_url != ":memory:" {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_connections)
        .build(manager)
        .context("building connection pool")?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("getting connection for migrations")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("running migrations: {e}"))?;
    Ok(())
}

/// Bootstrap accounts, one per role. Idempotent: an existing username is
/// left untouched, so reinitialization never duplicates or overwrites.
pub fn seed_default_accounts(pool: &DbPool) -> Result<()> {
    let defaults = [
        ("admin", "admin123", "System Administrator", "admin@company.com", Role::Administrator, "IT"),
        ("technician", "technician123", "IT Technician", "technician@company.com", Role::Technician, "IT"),
        ("collaborator", "collaborator123", "Staff Collaborator", "collaborator@company.com", Role::Collaborator, "Administration"),
        ("director", "director123", "General Director", "director@company.com", Role::Director, "Board"),
    ];

    let mut conn = pool.get()?;
    for (username, password, display_name, email, role, sector) in defaults {
        let exists = accounts::table
            .filter(accounts::username.eq(username))
            .select(accounts::id)
            .first::<i32>(&mut conn)
            .optional()?
            .is_some();
        if exists {
            continue;
        }

        diesel::insert_into(accounts::table)
            .values(&NewAccount {
                username: username.to_string(),
                password_hash: hash_password(password),
                display_name: display_name.to_string(),
                email: Some(email.to_string()),
                role: role.as_str().to_string(),
                sector: sector.to_string(),
                is_active: true,
                created_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn)?;
        info!("seeded default account {username}");
    }

    Ok(())
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Health {
    pub users: i64,
    pub tickets: i64,
}

pub fn health_check(pool: &DbPool) -> Result<Health> {
    let mut conn = pool.get()?;
    let users: i64 = accounts::table.count().get_result(&mut conn)?;
    let tickets: i64 = tickets::table.count().get_result(&mut conn)?;
    Ok(Health { users, tickets })
}
