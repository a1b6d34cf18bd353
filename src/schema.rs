use anyhow::Error;
use sqlx::{Connection, Row};

use crate::query::decode_row;
use crate::store::SalesStore;

const SAMPLE_ROWS: usize = 3;

/// Describes every user table as its `CREATE TABLE` statement followed by a
/// few sample rows, ready to be pasted into a prompt.
pub async fn describe_schema(store: &SalesStore) -> Result<String, Error> {
    let mut conn = store.connect().await?;

    let tables = sqlx::query(
        "SELECT name, sql FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name",
    )
    .fetch_all(&mut conn)
    .await?;

    let mut tables_info = Vec::with_capacity(tables.len());

    for table in tables {
        let name: String = table.try_get("name")?;
        let ddl: String = table.try_get("sql")?;

        let sample_query = format!(
            "SELECT * FROM \"{}\" LIMIT {}",
            name.replace('"', "\"\""),
            SAMPLE_ROWS
        );
        let samples = sqlx::query(&sample_query).fetch_all(&mut conn).await?;

        let mut info = format!("{}\n\n/*\n{} rows from {} table:\n", ddl.trim(), SAMPLE_ROWS, name);

        if let Some(first) = samples.first() {
            let header: Vec<&str> = first
                .columns()
                .iter()
                .map(sqlx::Column::name)
                .collect();
            info.push_str(&header.join("\t"));
            info.push('\n');
        }

        for sample in &samples {
            let cells: Vec<String> = decode_row(sample)?
                .iter()
                .map(ToString::to_string)
                .collect();
            info.push_str(&cells.join("\t"));
            info.push('\n');
        }

        info.push_str("*/");
        tables_info.push(info);
    }

    conn.close().await?;

    Ok(tables_info.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn describes_sales_table_with_samples() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SalesStore::ensure_ready(dir.path().join("sales.db"))
            .await
            .expect("store");

        let schema = describe_schema(&store).await.expect("schema");

        assert!(schema.starts_with("CREATE TABLE sales"));
        assert!(schema.contains("product_name TEXT"));
        assert!(schema.contains("3 rows from sales table:"));
        assert!(schema.contains("id\tproduct_name\tcategory\tamount\tdate"));
        assert!(schema.contains("1\tLaptop\tElectronics\t1200\t2023-01-15"));
        assert!(schema.contains("3\tChair\tFurniture\t150\t2023-01-17"));
        assert!(!schema.contains("Desk"));
        assert!(schema.ends_with("*/"));
    }

    #[tokio::test]
    async fn only_internal_tables_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SalesStore::ensure_ready(dir.path().join("sales.db"))
            .await
            .expect("store");

        let mut conn = store.clone().allow_writes(true).connect().await.expect("connect");
        sqlx::query("CREATE TABLE sqliteusers (id INTEGER)")
            .execute(&mut conn)
            .await
            .expect("create");
        conn.close().await.expect("close");

        let schema = describe_schema(&store).await.expect("schema");

        assert!(schema.contains("CREATE TABLE sqliteusers (id INTEGER)"));
        assert!(schema.contains("3 rows from sqliteusers table:"));
        assert!(!schema.contains("sqlite_sequence"));
    }
}
