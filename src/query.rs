use std::fmt;

use anyhow::{bail, Context, Error};
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Connection, Either, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::debug;

use crate::store::SalesStore;

/// A single cell, typed by SQLite's runtime storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(bytes) => write!(f, "[BLOB {} bytes]", bytes.len()),
        }
    }
}

/// Tabular result of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        QueryResult { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// Runs `sql` verbatim on a fresh connection and materializes every row.
///
/// Exactly one statement producing a result set is accepted. Empty input,
/// comment-only input, several statements, or a statement without result
/// columns are errors.
pub async fn execute(store: &SalesStore, sql: &str) -> Result<QueryResult, Error> {
    let mut conn = store.connect().await?;

    let mut rows = Vec::new();
    let mut statements = 0;
    {
        let mut results = (&mut conn).fetch_many(sql);
        while let Some(item) = results
            .try_next()
            .await
            .context("Failed to execute query")?
        {
            if statements > 0 {
                bail!("You can only execute one statement at a time");
            }
            match item {
                Either::Left(_) => statements += 1,
                Either::Right(row) => rows.push(row),
            }
        }
    }

    if statements == 0 {
        bail!("No SQL statement to execute");
    }

    let columns: Vec<String> = match rows.first() {
        Some(row) => column_names(row.columns()),
        // Nothing to read names from; ask the prepared statement instead.
        None => {
            let statement = (&mut conn)
                .prepare(sql)
                .await
                .context("Failed to describe query")?;
            column_names(statement.columns())
        }
    };

    if columns.is_empty() {
        bail!("Query returned no result set");
    }

    let rows = rows
        .iter()
        .map(decode_row)
        .collect::<Result<Vec<_>, _>>()?;

    conn.close().await?;

    debug!(columns = columns.len(), rows = rows.len(), "Query executed");

    Ok(QueryResult::new(columns, rows))
}

fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|column| column.name().to_string()).collect()
}

pub(crate) fn decode_row(row: &SqliteRow) -> Result<Vec<Value>, Error> {
    let mut values = Vec::with_capacity(row.len());

    for index in 0..row.len() {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            values.push(Value::Null);
            continue;
        }

        let type_name = raw.type_info().name().to_owned();
        let value = match type_name.as_str() {
            "INTEGER" => Value::Integer(row.try_get(index)?),
            "REAL" => Value::Real(row.try_get(index)?),
            "BLOB" => Value::Blob(row.try_get(index)?),
            _ => Value::Text(row.try_get(index)?),
        };
        values.push(value);
    }

    Ok(values)
}
