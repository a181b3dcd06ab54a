use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub app_name: String,
    pub app_version: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(Self {
            host: cfg.get_string("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: cfg.get_int("PORT").unwrap_or(8000) as u16,
            environment: cfg.get_string("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            app_name: cfg.get_string("APP_NAME").unwrap_or_else(|_| "walkin-queue".to_string()),
            app_version: cfg
                .get_string("APP_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
