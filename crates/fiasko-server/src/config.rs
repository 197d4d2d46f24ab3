use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
}

/// Initial user to seed on startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialUserConfig {
    pub email: String,
    pub username: String,
    pub password: String,
}

fn default_token_ttl() -> i64 {
    7 * 24 * 3600
}

/// Auth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 7 days)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
    pub initial_user: Option<InitialUserConfig>,
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen: String, // "0.0.0.0:3000"
    pub db: DbConfig,
    pub auth: AuthConfig,
}

/// Load server config from a YAML file with FIASKO__ env var overrides.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    use anyhow::Context;
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("FIASKO")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to load config file: {}", path))?
        .try_deserialize()
        .context("Failed to parse server config")?;
    Ok(config)
}
