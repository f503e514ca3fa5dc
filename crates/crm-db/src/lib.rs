use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{
        mobc::{Builder, Pool},
        AsyncDieselConnectionManager,
    },
    AsyncPgConnection, RunQueryDsl,
};
use std::time::Duration;

pub mod models;
mod schema;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("getting connection from pool: {0}")]
    GetConnectionPool(#[from] mobc::Error<diesel_async::pooled_connection::PoolError>),
    #[error("result failure: {0}")]
    Result(#[from] diesel::result::Error),
}

/// Handle to the customer database. Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct Store {
    pool: Pool<AsyncPgConnection>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub db_url: String,
    #[serde(default = "default_max_open")]
    pub max_open: u64,
    #[serde(default = "default_max_idle")]
    pub max_idle: u64,
    #[serde(with = "humantime_serde", default)]
    pub max_lifetime: Option<Duration>,
    #[serde(with = "humantime_serde", default = "default_max_idle_lifetime")]
    pub max_idle_lifetime: Option<Duration>,
    #[serde(with = "humantime_serde", default = "default_timeout_for_get")]
    pub timeout_for_get: Duration,
}

fn default_max_open() -> u64 {
    20
}

fn default_max_idle() -> u64 {
    2
}

fn default_max_idle_lifetime() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_timeout_for_get() -> Duration {
    Duration::from_secs(2)
}

impl Config {
    pub fn new(db_url: impl Into<String>) -> Self {
        Self {
            db_url: db_url.into(),
            max_open: default_max_open(),
            max_idle: default_max_idle(),
            max_lifetime: None,
            max_idle_lifetime: default_max_idle_lifetime(),
            timeout_for_get: default_timeout_for_get(),
        }
    }
}

/// Builds the pool and checks out one connection so an unreachable database fails start-up.
pub async fn create(config: &Config) -> Result<Store, Error> {
    let pool = create_pool(config);
    drop(pool.get().await?);
    tracing::info!(
        max_open = config.max_open,
        max_idle = config.max_idle,
        "database pool ready"
    );
    Ok(Store { pool })
}

fn create_pool(config: &Config) -> Pool<AsyncPgConnection> {
    let builder = Builder::new()
        .max_open(config.max_open)
        .max_idle(config.max_idle.min(config.max_open))
        .max_lifetime(config.max_lifetime)
        .max_idle_lifetime(config.max_idle_lifetime)
        .get_timeout(Some(config.timeout_for_get));
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.db_url);
    builder.build(manager)
}

impl Store {
    async fn connection(
        &self,
    ) -> Result<mobc::Connection<AsyncDieselConnectionManager<AsyncPgConnection>>, Error> {
        self.pool.get().await.map_err(Into::into)
    }

    #[tracing::instrument(skip(self, new_customer))]
    pub async fn insert_customer(
        &self,
        new_customer: models::NewCustomer,
    ) -> Result<models::Customer, Error> {
        use schema::customers;
        let mut conn = self.connection().await?;
        let statement = diesel::insert_into(customers::table)
            .values(new_customer)
            .returning(models::Customer::as_returning());
        tracing::debug!(
            query = %diesel::debug_query::<diesel::pg::Pg, _>(&statement),
            "inserting customer"
        );
        let created = statement.get_result(&mut *conn).await?;
        Ok(created)
    }
}
