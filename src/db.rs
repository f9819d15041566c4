use crate::config::DatasourceSection;
use crate::error::Result;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Executor, Row};
use tokio::sync::OnceCell;

const POOL_MAX_CONNECTIONS: u32 = 4;

/// Handle on the spatial database.
///
/// The underlying pool is established on first use and then shared by every
/// rendering job for the lifetime of the process. Each pooled connection is
/// configured at establishment with a UTF8 client encoding and the statement
/// timeout from the configuration, so long-running spatial queries are cut
/// off server-side.
#[derive(Debug)]
pub struct Datasource {
    config: DatasourceSection,
    pool: OnceCell<PgPool>,
}

impl Datasource {
    pub fn new(config: DatasourceSection) -> Self {
        Datasource {
            config,
            pool: OnceCell::new(),
        }
    }

    /// The shared connection pool, connecting on first call.
    pub async fn pool(&self) -> Result<&PgPool> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<PgPool> {
        info!(
            "Connecting to database {} on {} as {}...",
            self.config.dbname, self.config.host, self.config.user
        );

        let timeout_ms = u64::from(self.config.request_timeout) * 60 * 1000;
        let pool = PgPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET client_encoding TO 'UTF8'").await?;
                    let set_timeout = format!("SET SESSION statement_timeout = {timeout_ms}");
                    conn.execute(set_timeout.as_str()).await?;
                    let row = conn.fetch_one("SHOW statement_timeout").await?;
                    let effective: String = row.try_get(0)?;
                    debug!("Configured statement timeout: {}.", effective);
                    Ok(())
                })
            })
            .connect(&self.config.url())
            .await?;

        Ok(pool)
    }
}
