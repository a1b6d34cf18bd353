use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info};

const CREATE_SALES_TABLE: &str = "CREATE TABLE IF NOT EXISTS sales (
    id INTEGER PRIMARY KEY,
    product_name TEXT,
    category TEXT,
    amount INTEGER,
    date DATE)";

const SEED_ROWS: [(&str, &str, i64, &str); 9] = [
    ("Laptop", "Electronics", 1200, "2023-01-15"),
    ("Mouse", "Electronics", 25, "2023-01-16"),
    ("Chair", "Furniture", 150, "2023-01-17"),
    ("Desk", "Furniture", 300, "2023-02-01"),
    ("Headphones", "Electronics", 100, "2023-02-10"),
    ("Laptop", "Electronics", 1200, "2023-03-05"),
    ("Monitor", "Electronics", 200, "2023-03-10"),
    ("Sofa", "Furniture", 800, "2023-04-05"),
    ("Phone", "Electronics", 900, "2023-04-12"),
];

// Rollback journal so read-only connections never need to create WAL files.
fn options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Delete)
}

/// Handle to the local sales database.
///
/// Obtained once through [`SalesStore::ensure_ready`], which guarantees the
/// `sales` table exists and is seeded, then passed to every operation that
/// touches the database. The handle holds no open connection: each operation
/// opens its own and closes it when done.
#[derive(Debug, Clone)]
pub struct SalesStore {
    path: PathBuf,
    allow_writes: bool,
}

impl SalesStore {
    pub async fn ensure_ready(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let mut conn = options(&path)
            .create_if_missing(true)
            .connect()
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))?;

        sqlx::query(CREATE_SALES_TABLE).execute(&mut conn).await?;

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM sales")
            .fetch_one(&mut conn)
            .await?;

        if count == 0 {
            let mut tx = conn.begin().await?;
            for (product_name, category, amount, date) in SEED_ROWS {
                sqlx::query(
                    "INSERT INTO sales (product_name, category, amount, date) VALUES (?, ?, ?, ?)",
                )
                .bind(product_name)
                .bind(category)
                .bind(amount)
                .bind(date)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            info!(rows = SEED_ROWS.len(), "Seeded sales table");
        } else {
            debug!(rows = count, "Sales table already populated");
        }

        conn.close().await?;

        Ok(SalesStore {
            path,
            allow_writes: false,
        })
    }

    /// Lets generated statements modify the database. Off by default.
    pub fn allow_writes(mut self, allow: bool) -> Self {
        self.allow_writes = allow;
        self
    }

    /// Opens a connection for a single operation. Read-only unless writes
    /// were allowed.
    pub async fn connect(&self) -> Result<SqliteConnection, Error> {
        options(&self.path)
            .read_only(!self.allow_writes)
            .connect()
            .await
            .with_context(|| format!("Failed to open database {}", self.path.display()))
    }

    pub async fn row_count(&self) -> Result<i64, Error> {
        let mut conn = self.connect().await?;
        let count = sqlx::query_scalar("SELECT count(*) FROM sales")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(count)
    }
}
