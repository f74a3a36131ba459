pub mod csv_sink;

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::info;

use crate::models::DetailRecord;
use crate::traits::RecordSink;

pub use csv_sink::CsvSink;

/// SQLite archive of extracted ad details, one row per ad URL
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(db_url: &str) -> Result<Self> {
        if let Some(parent) = sqlite_file(db_url).and_then(Path::parent)
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Create database file if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database file");
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePool::connect(db_url)
            .await
            .with_context(|| format!("Failed to open database {db_url}"))?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database, mostly for tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is a distinct database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Database initialized successfully");
        Ok(Self { pool })
    }

    pub async fn get_record(&self, url: &str) -> Result<Option<DetailRecord>> {
        let row = sqlx::query(
            "SELECT url, price, expenses, neighbourhood, surface, rooms FROM properties WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| DetailRecord {
            url: row.get("url"),
            price: row.get("price"),
            expenses: row.get("expenses"),
            neighbourhood: row.get("neighbourhood"),
            surface: row.get("surface"),
            rooms: row.get("rooms"),
        }))
    }

    pub async fn count_records(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM properties")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("total"))
    }
}

#[async_trait]
impl RecordSink for Database {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn append(&self, records: &[DetailRecord]) -> Result<()> {
        let scraped_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r"
                INSERT INTO properties (url, price, expenses, neighbourhood, surface, rooms, scraped_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(url) DO UPDATE SET
                    price = excluded.price,
                    expenses = excluded.expenses,
                    neighbourhood = excluded.neighbourhood,
                    surface = excluded.surface,
                    rooms = excluded.rooms,
                    scraped_at = excluded.scraped_at
                ",
            )
            .bind(&record.url)
            .bind(&record.price)
            .bind(&record.expenses)
            .bind(&record.neighbourhood)
            .bind(&record.surface)
            .bind(&record.rooms)
            .bind(scraped_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Filesystem path of a `sqlite:` URL, if it names a file
fn sqlite_file(db_url: &str) -> Option<&Path> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next()?;

    (!path.is_empty() && path != ":memory:").then(|| Path::new(path))
}
