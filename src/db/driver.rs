//! Concrete driver connections.
//!
//! Each backend keeps its own sqlx connection type so values are read with
//! the driver's full type support, then rendered to strings.

use super::params::BoundStatement;
use super::types::{unique_column_names, ResultSet, Row};
use super::DatabaseBackend;
use crate::error::{Result, ToolboxError};
use futures::{Stream, TryStreamExt};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, JsonValue, Uuid};
use sqlx::{
    Column, ColumnIndex, ConnectOptions, Connection, MySql, Postgres, Row as SqlxRow, Sqlite,
    TypeInfo, ValueRef,
};
use std::str::FromStr;
use tracing::debug;

/// Rendering of SQL NULL.
pub const NULL_PLACEHOLDER: &str = "";

type DecodeResult = std::result::Result<String, sqlx::Error>;

/// Renders the non-null value at `index`, given its upper-cased type name.
type ValueConverter<R> = fn(&R, usize, &str) -> DecodeResult;

/// Parsed connect options for one backend.
#[derive(Debug, Clone)]
pub(crate) enum DriverOptions {
    Postgres(PgConnectOptions),
    MySql(MySqlConnectOptions),
    Sqlite(SqliteConnectOptions),
}

impl DriverOptions {
    pub(crate) fn parse(backend: DatabaseBackend, connection_string: &str) -> Result<Self> {
        let invalid = |e: sqlx::Error| {
            ToolboxError::connection(format!("Invalid connection string: {e}"))
        };

        Ok(match backend {
            DatabaseBackend::Postgres => {
                Self::Postgres(PgConnectOptions::from_str(connection_string).map_err(invalid)?)
            }
            DatabaseBackend::MySql => {
                Self::MySql(MySqlConnectOptions::from_str(connection_string).map_err(invalid)?)
            }
            DatabaseBackend::Sqlite => {
                Self::Sqlite(SqliteConnectOptions::from_str(connection_string).map_err(invalid)?)
            }
        })
    }

    pub(crate) async fn connect(&self) -> std::result::Result<DriverConnection, sqlx::Error> {
        Ok(match self {
            Self::Postgres(options) => DriverConnection::Postgres(options.connect().await?),
            Self::MySql(options) => DriverConnection::MySql(options.connect().await?),
            Self::Sqlite(options) => DriverConnection::Sqlite(options.connect().await?),
        })
    }
}

/// One open driver connection.
#[derive(Debug)]
pub(crate) enum DriverConnection {
    Postgres(PgConnection),
    MySql(MySqlConnection),
    Sqlite(SqliteConnection),
}

impl DriverConnection {
    pub(crate) async fn close(self) -> std::result::Result<(), sqlx::Error> {
        match self {
            Self::Postgres(connection) => connection.close().await,
            Self::MySql(connection) => connection.close().await,
            Self::Sqlite(connection) => connection.close().await,
        }
    }

    /// Runs `bound` and walks the cursor to exhaustion, converting each row.
    pub(crate) async fn fetch_rows(&mut self, bound: &BoundStatement) -> Result<ResultSet> {
        let rows = match self {
            Self::Postgres(connection) => {
                let mut query = sqlx::query::<Postgres>(&bound.sql);
                for value in &bound.values {
                    query = query.bind(value.as_str());
                }
                collect_rows(query.fetch(&mut *connection), convert_pg_value).await?
            }
            Self::MySql(connection) => {
                let mut query = sqlx::query::<MySql>(&bound.sql);
                for value in &bound.values {
                    query = query.bind(value.as_str());
                }
                collect_rows(query.fetch(&mut *connection), convert_mysql_value).await?
            }
            Self::Sqlite(connection) => {
                let mut query = sqlx::query::<Sqlite>(&bound.sql);
                for value in &bound.values {
                    query = query.bind(value.as_str());
                }
                collect_rows(query.fetch(&mut *connection), convert_sqlite_value).await?
            }
        };

        debug!("Query returned {} rows", rows.len());
        Ok(rows)
    }
}

async fn collect_rows<R, S>(mut cursor: S, convert: ValueConverter<R>) -> Result<ResultSet>
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
    S: Stream<Item = std::result::Result<R, sqlx::Error>> + Unpin,
{
    let mut rows = ResultSet::new();
    let mut columns: Option<Vec<String>> = None;

    while let Some(row) = cursor.try_next().await.map_err(map_fetch_error)? {
        let names = columns
            .get_or_insert_with(|| unique_column_names(row.columns().iter().map(|c| c.name())));
        rows.push(convert_row(&row, names, convert)?);
    }

    Ok(rows)
}

fn convert_row<R>(row: &R, columns: &[String], convert: ValueConverter<R>) -> Result<Row>
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
{
    let mut converted = Row::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        let value = render_value(row, index, convert)
            .map_err(|e| ToolboxError::conversion(format!("Column '{name}': {e}")))?;
        converted.push(name.clone(), value);
    }
    Ok(converted)
}

fn render_value<R>(row: &R, index: usize, convert: ValueConverter<R>) -> DecodeResult
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
{
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(NULL_PLACEHOLDER.to_string());
        }
        raw.type_info().name().to_uppercase()
    };
    convert(row, index, &type_name)
}

/// Converts a Postgres value. Types without a dedicated arm are read as text.
fn convert_pg_value(row: &PgRow, index: usize, type_name: &str) -> DecodeResult {
    match type_name {
        "BOOL" => row.try_get::<bool, _>(index).map(|v| v.to_string()),
        "INT2" => row.try_get::<i16, _>(index).map(|v| v.to_string()),
        "INT4" => row.try_get::<i32, _>(index).map(|v| v.to_string()),
        "INT8" => row.try_get::<i64, _>(index).map(|v| v.to_string()),
        "FLOAT4" => row.try_get::<f32, _>(index).map(|v| v.to_string()),
        "FLOAT8" => row.try_get::<f64, _>(index).map(|v| v.to_string()),
        "NUMERIC" => row.try_get::<Decimal, _>(index).map(|v| v.to_string()),
        "BYTEA" => row.try_get::<Vec<u8>, _>(index).map(|v| to_hex(&v)),
        "DATE" => row.try_get::<NaiveDate, _>(index).map(|v| v.to_string()),
        "TIME" => row.try_get::<NaiveTime, _>(index).map(|v| v.to_string()),
        "TIMESTAMP" => row.try_get::<NaiveDateTime, _>(index).map(|v| v.to_string()),
        "TIMESTAMPTZ" => row.try_get::<DateTime<Utc>, _>(index).map(|v| v.to_string()),
        "UUID" => row.try_get::<Uuid, _>(index).map(|v| v.to_string()),
        "JSON" | "JSONB" => row.try_get::<JsonValue, _>(index).map(|v| v.to_string()),
        _ => row.try_get_unchecked::<String, _>(index),
    }
}

/// Converts a MySQL value. Types without a dedicated arm are read as text.
fn convert_mysql_value(row: &MySqlRow, index: usize, type_name: &str) -> DecodeResult {
    match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(index).map(|v| v.to_string()),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).map(|v| v.to_string())
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<u64, _>(index).map(|v| v.to_string()),
        "YEAR" => row.try_get_unchecked::<u16, _>(index).map(|v| v.to_string()),
        "FLOAT" => row.try_get::<f32, _>(index).map(|v| v.to_string()),
        "DOUBLE" => row.try_get::<f64, _>(index).map(|v| v.to_string()),
        "DECIMAL" => row.try_get::<Decimal, _>(index).map(|v| v.to_string()),
        "DATE" => row.try_get::<NaiveDate, _>(index).map(|v| v.to_string()),
        "TIME" => row.try_get::<NaiveTime, _>(index).map(|v| v.to_string()),
        "DATETIME" => row.try_get::<NaiveDateTime, _>(index).map(|v| v.to_string()),
        "TIMESTAMP" => row.try_get::<DateTime<Utc>, _>(index).map(|v| v.to_string()),
        "JSON" => row.try_get::<JsonValue, _>(index).map(|v| v.to_string()),
        "BIT" | "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|v| to_hex(&v)),
        _ => row.try_get_unchecked::<String, _>(index),
    }
}

/// Converts a SQLite value by its storage class, whatever the declared
/// column type (`DATETIME`, `BOOLEAN`, `NUMERIC`, ...).
fn convert_sqlite_value(row: &SqliteRow, index: usize, type_name: &str) -> DecodeResult {
    match type_name {
        "INTEGER" => row.try_get::<i64, _>(index).map(|v| v.to_string()),
        "REAL" => row.try_get::<f64, _>(index).map(|v| v.to_string()),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(|v| to_hex(&v)),
        _ => row.try_get_unchecked::<String, _>(index),
    }
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Sorts driver errors raised while reading rows into execution or conversion failures.
pub(crate) fn map_fetch_error(error: sqlx::Error) -> ToolboxError {
    match error {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => ToolboxError::conversion(error.to_string()),
        sqlx::Error::Database(db_error) => ToolboxError::execution(db_error.message().to_string()),
        other => ToolboxError::execution(other.to_string()),
    }
}
