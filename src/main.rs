use log::info;

use helpdesk::config::AppConfig;
use helpdesk::db;

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::load()?;
    info!("opening store at {}", config.database.url);

    let pool = db::build_pool(&config.database.url, config.database.max_connections)?;
    db::run_migrations(&pool)?;
    db::seed_default_accounts(&pool)?;

    let health = db::health_check(&pool)?;
    info!("store ready: {}", serde_json::to_string(&health)?);
    Ok(())
}
