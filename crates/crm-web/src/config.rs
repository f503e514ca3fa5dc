use anyhow::Context;
use std::io::Read;

pub const DEFAULT_CONFIG_PATH: &str = "./crm-config.toml";

#[derive(serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bind_address: String,
    pub bind_port: u16,
    pub database: crm_db::Config,
    #[serde(default)]
    pub tracing: TracingConfig,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TracingConfig {
    #[serde(default)]
    pub console: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            console: false,
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info,crm_web=debug".to_owned()
}

/// Reads `CRM_CONFIG` (default `./crm-config.toml`) after loading `.env`; `DATABASE_URL` wins over `database.db-url`.
pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    let path = std::env::var("CRM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let mut configuration = String::with_capacity(4096);
    std::fs::File::open(&path)
        .with_context(|| format!("unable to open configuration file {path}"))?
        .read_to_string(&mut configuration)
        .with_context(|| format!("unable to read configuration file {path}"))?;
    let config =
        parse(&configuration).with_context(|| format!("unable to parse configuration file {path}"))?;
    Ok(apply_environment(config, std::env::var("DATABASE_URL").ok()))
}

pub fn parse(configuration: &str) -> anyhow::Result<Config> {
    toml::from_str::<Config>(configuration).map_err(Into::into)
}

fn apply_environment(mut config: Config, database_url: Option<String>) -> Config {
    if let Some(database_url) = database_url.filter(|url| !url.is_empty()) {
        config.database.db_url = database_url;
    }
    config
}
