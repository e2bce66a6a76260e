use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::{env, time::Duration};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection settings read from the environment
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`, loading `.env` first if present
    pub fn from_env() -> Result<Self, DbErr> {
        dotenvy::dotenv().ok();

        let url = env::var("DATABASE_URL")
            .map_err(|_| DbErr::Custom("DATABASE_URL must be set".to_string()))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Ok(Self {
            url,
            max_connections,
        })
    }
}

/// Creates a database connection from the environment
pub async fn create_connection() -> Result<DatabaseConnection, DbErr> {
    let settings = DatabaseSettings::from_env()?;
    connect(&settings).await
}

pub async fn connect(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(
        "Connected to database with up to {} connections",
        settings.max_connections
    );
    Ok(db)
}
