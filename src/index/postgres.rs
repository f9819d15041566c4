use super::{IndexBuilder, IndexCategory, IndexEntry, IndexQuery, StreetIndex};
use crate::db::Datasource;
use crate::error::{RenderError, Result};
use async_trait::async_trait;
use itertools::{Itertools, MinMaxResult};
use log::debug;
use sqlx::Row;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the street index from an osm2pgsql database.
///
/// The grid squares are materialized into a temporary `<prefix>grid_squares`
/// table on a single pooled connection, joined against the named highways of
/// `planet_osm_line`, and the table is dropped before the connection goes
/// back to the pool.
pub struct PgIndexBuilder {
    datasource: Arc<Datasource>,
    table_name: String,
}

impl PgIndexBuilder {
    pub fn new(datasource: Arc<Datasource>, table_prefix: &str) -> Self {
        PgIndexBuilder {
            datasource,
            table_name: format!("{table_prefix}grid_squares"),
        }
    }
}

fn category_name(street: &str) -> String {
    match street.chars().next() {
        Some(c) if c.is_alphabetic() => c.to_uppercase().to_string(),
        _ => "#".to_string(),
    }
}

fn square_range(labels: &[String]) -> Option<String> {
    match labels.iter().minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(only) => Some(only.clone()),
        MinMaxResult::MinMax(first, last) => Some(format!("{first}-{last}")),
    }
}

#[async_trait]
impl IndexBuilder for PgIndexBuilder {
    async fn build(&self, query: &IndexQuery) -> Result<StreetIndex> {
        let pool = self.datasource.pool().await?;
        let mut conn = pool.acquire().await?;

        debug!(
            "Building the street index from {} grid squares...",
            query.squares.len()
        );

        let drop_sql = format!("DROP TABLE IF EXISTS {}", self.table_name);
        sqlx::query(&drop_sql).execute(&mut *conn).await?;

        let create_sql = format!(
            "CREATE TEMPORARY TABLE {} (label text NOT NULL, geom geometry NOT NULL)",
            self.table_name
        );
        sqlx::query(&create_sql).execute(&mut *conn).await?;

        let insert_sql = format!(
            "INSERT INTO {} (label, geom) VALUES ($1, ST_GeomFromText($2, 4002))",
            self.table_name
        );
        for (label, wkt) in &query.squares {
            sqlx::query(&insert_sql)
                .bind(label)
                .bind(wkt)
                .execute(&mut *conn)
                .await?;
        }

        let mut select_sql = format!(
            "SELECT name, array_agg(DISTINCT {t}.label) AS labels \
             FROM planet_osm_line \
             JOIN {t} ON ST_Intersects(ST_Transform(way, 4002), {t}.geom) \
             WHERE name IS NOT NULL AND highway IS NOT NULL",
            t = self.table_name
        );
        if query.boundary_wkt.is_some() {
            select_sql
                .push_str(" AND ST_Intersects(ST_Transform(way, 4002), ST_GeomFromText($1, 4002))");
        }
        select_sql.push_str(" GROUP BY name ORDER BY name");

        let mut select = sqlx::query(&select_sql);
        if let Some(boundary) = &query.boundary_wkt {
            select = select.bind(boundary);
        }
        let rows = select.fetch_all(&mut *conn).await?;

        if let Err(e) = sqlx::query(&drop_sql).execute(&mut *conn).await {
            debug!("Could not drop the grid table {}: {}.", self.table_name, e);
        }

        let mut grouped: BTreeMap<String, Vec<IndexEntry>> = BTreeMap::new();
        for row in rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| RenderError::DataIntegrity(format!("bad name column: {e}")))?;
            let labels: Vec<String> = row
                .try_get("labels")
                .map_err(|e| RenderError::DataIntegrity(format!("bad labels column: {e}")))?;
            let Some(squares) = square_range(&labels) else {
                continue;
            };
            grouped
                .entry(category_name(&name))
                .or_default()
                .push(IndexEntry {
                    label: name,
                    squares,
                });
        }

        let categories = grouped
            .into_iter()
            .map(|(name, entries)| IndexCategory { name, entries })
            .collect();
        Ok(StreetIndex { categories })
    }
}
