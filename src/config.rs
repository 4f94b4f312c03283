use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            database: DatabaseConfig {
                url: env::var("HELPDESK_DB").unwrap_or_else(|_| "data/helpdesk.db".to_string()),
                max_connections: env::var("HELPDESK_DB_POOL")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
        })
    }
}
