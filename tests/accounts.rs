mod common;

use helpdesk::auth::{self, users};
use helpdesk::db;
use helpdesk::models::Role;
use helpdesk::HelpdeskError;

#[test]
fn bootstrap_seeding_is_idempotent() {
    let store = common::store();
    db::seed_default_accounts(&store.pool).unwrap();
    db::seed_default_accounts(&store.pool).unwrap();

    let health = db::health_check(&store.pool).unwrap();
    assert_eq!(health.users, 4);
}

#[test]
fn all_bootstrap_roles_can_log_in() {
    let store = common::store();
    for username in ["admin", "technician", "collaborator", "director"] {
        let identity = common::login(&store.pool, username);
        assert_eq!(identity.username, username);
    }
}

#[test]
fn bad_credentials_are_rejected_uniformly() {
    let store = common::store();

    let err = auth::authenticate(&store.pool, "admin", "wrong").unwrap_err();
    assert!(matches!(err, HelpdeskError::InvalidCredentials));

    let err = auth::authenticate(&store.pool, "nobody", "admin123").unwrap_err();
    assert!(matches!(err, HelpdeskError::InvalidCredentials));
}

#[test]
fn deactivated_accounts_cannot_log_in() {
    let store = common::store();
    let admin = common::login(&store.pool, "admin");
    let collaborator = common::login(&store.pool, "collaborator");

    users::set_user_active(&store.pool, &admin, collaborator.id, false).unwrap();
    let err = auth::authenticate(&store.pool, "collaborator", "collaborator123").unwrap_err();
    assert!(matches!(err, HelpdeskError::InvalidCredentials));

    // Reactivation restores access; the account was never deleted.
    users::set_user_active(&store.pool, &admin, collaborator.id, true).unwrap();
    auth::authenticate(&store.pool, "collaborator", "collaborator123").unwrap();
}

#[test]
fn only_administrators_manage_users() {
    let store = common::store();
    let technician = common::login(&store.pool, "technician");

    let err = users::list_users(&store.pool, &technician).unwrap_err();
    assert!(matches!(err, HelpdeskError::Forbidden(_)));

    let err = users::create_user(
        &store.pool,
        &technician,
        users::NewUserInput {
            username: "rogue".into(),
            password: "rogue123".into(),
            display_name: "Rogue".into(),
            email: None,
            role: Role::Administrator,
            sector: "IT".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, HelpdeskError::Forbidden(_)));
}

#[test]
fn duplicate_usernames_are_rejected() {
    let store = common::store();
    let admin = common::login(&store.pool, "admin");

    let err = users::create_user(
        &store.pool,
        &admin,
        users::NewUserInput {
            username: "technician".into(),
            password: "x123".into(),
            display_name: "Shadow Technician".into(),
            email: None,
            role: Role::Technician,
            sector: "IT".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, HelpdeskError::Validation(_)));
}

#[test]
fn admin_updates_profile_role_and_password() {
    let store = common::store();
    let admin = common::login(&store.pool, "admin");
    let collaborator = common::login(&store.pool, "collaborator");

    users::update_user(
        &store.pool,
        &admin,
        collaborator.id,
        users::UpdateUserInput {
            display_name: Some("Senior Collaborator".into()),
            sector: Some("Finance".into()),
            role: Some(Role::Technician),
            password: Some("newpass123".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let identity = auth::authenticate(&store.pool, "collaborator", "newpass123").unwrap();
    assert_eq!(identity.display_name, "Senior Collaborator");
    assert_eq!(identity.sector, "Finance");
    assert_eq!(identity.role, Role::Technician);

    let err = users::update_user(
        &store.pool,
        &admin,
        9999,
        users::UpdateUserInput::default(),
    )
    .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound(_)));
}

#[test]
fn technician_listing_covers_active_technicians_and_admins() {
    let store = common::store();
    let admin = common::login(&store.pool, "admin");
    let technician = common::login(&store.pool, "technician");

    let before = users::list_technicians(&store.pool).unwrap();
    assert_eq!(before.len(), 2);

    users::set_user_active(&store.pool, &admin, technician.id, false).unwrap();
    let after = users::list_technicians(&store.pool).unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].username, "admin");
}
