use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(Self {
            url: cfg
                .get_string("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://walkin_queue.db?mode=rwc".to_string()),
            max_connections: cfg.get_int("DATABASE_MAX_CONNECTIONS").unwrap_or(5) as u32,
        })
    }

    pub async fn create_pool(&self) -> Result<SqlitePool, sqlx::Error> {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&self.url)
            .await
    }
}

// Helper for running migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
}
