use tempfile::TempDir;

use helpdesk::auth::{self, UserIdentity};
use helpdesk::db::{self, DbPool};

pub struct TestStore {
    pub pool: DbPool,
    _dir: TempDir,
}

/// Fresh file-backed store with migrations applied and the four
/// bootstrap accounts seeded.
pub fn store() -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("helpdesk.db");
    let pool = db::build_pool(path.to_str().expect("utf-8 path"), 2).expect("pool");
    db::run_migrations(&pool).expect("migrations");
    db::seed_default_accounts(&pool).expect("seed");
    TestStore { pool, _dir: dir }
}

/// Logs in one of the seeded accounts by username; the bootstrap
/// password convention is `<username>123`.
pub fn login(pool: &DbPool, username: &str) -> UserIdentity {
    auth::authenticate(pool, username, &format!("{username}123")).expect("login")
}
