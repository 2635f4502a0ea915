//! Store capability used by the query executor
//!
//! The executor only needs two things from a relational store: a scalar count
//! and a list of rows, each for a parameterized SQL string. Rows come back as
//! JSON objects keyed by column name so that every strategy (including custom
//! joins and computed columns) can be returned without a model type.

use std::future::Future;

use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgConnection, PgRow};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{
    Column, Either, Executor, PgPool, Postgres, Row as _, Sqlite, SqlitePool, Statement, TypeInfo,
    ValueRef,
};

use crate::error::{PagerError, Result};

/// One result row, keyed by column name
pub type Row = Map<String, Value>;

/// Parameterized read access to a relational store
///
/// `sql` is already rendered for the store's dialect; `params` are bound in
/// order. Implementations must not retry: any failure is returned as-is and
/// aborts the paginated request.
pub trait Store: Send + Sync {
    /// Run a `SELECT COUNT(*)` style query and return the single scalar
    fn count(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<i64>> + Send;

    /// Run a SELECT and decode every row
    fn fetch_all(&self, sql: &str, params: &[Value])
    -> impl Future<Output = Result<Vec<Row>>> + Send;
}

impl<S: Store> Store for &S {
    fn count(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<i64>> + Send {
        (**self).count(sql, params)
    }

    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>>> + Send {
        (**self).fetch_all(sql, params)
    }
}

// ============================================================================
// PostgreSQL
// ============================================================================

impl Store for PgPool {
    async fn count(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let mut conn = self.acquire().await?;
        let types = pg_parameter_types(&mut conn, sql).await?;
        let query = bind_pg_all(sqlx::query(sql), params, &types)?;
        let row = query.fetch_one(&mut *conn).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut conn = self.acquire().await?;
        let types = pg_parameter_types(&mut conn, sql).await?;
        let query = bind_pg_all(sqlx::query(sql), params, &types)?;
        let rows = query.fetch_all(&mut *conn).await?;
        rows.iter().map(pg_row_to_json).collect()
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Parameter types the server infers for `sql`
///
/// The statement is prepared on `conn` and cached there, so the query that
/// follows on the same connection does not parse it again.
async fn pg_parameter_types(conn: &mut PgConnection, sql: &str) -> Result<Vec<String>> {
    let statement = (&mut *conn).prepare(sql).await?;
    Ok(match statement.parameters() {
        Some(Either::Left(types)) => types.iter().map(|t| t.name().to_string()).collect(),
        _ => Vec::new(),
    })
}

fn bind_pg_all<'q>(mut query: PgQuery<'q>, params: &[Value], types: &[String]) -> Result<PgQuery<'q>> {
    for (index, param) in params.iter().enumerate() {
        query = match types.get(index) {
            Some(type_name) => bind_pg_as(query, param, type_name)?,
            None => bind_pg(query, param),
        };
    }
    Ok(query)
}

/// Bind `value` as the server-side parameter type
///
/// Strings are parsed into dates, timestamps, UUIDs and numbers so that
/// `start_date >= $1` compares against a `DATE` rather than `TEXT`. A value
/// that cannot be read as the column's type is an invalid filter.
fn bind_pg_as<'q>(query: PgQuery<'q>, value: &Value, type_name: &str) -> Result<PgQuery<'q>> {
    if value.is_null() {
        return Ok(query.bind(None::<String>));
    }
    let mismatch = || PagerError::invalid_filter(format!("cannot compare {} with {}", value, type_name));

    let query = match type_name {
        "BOOL" => query.bind(json_bool(value).ok_or_else(mismatch)?),
        "INT2" => query.bind(
            json_i64(value)
                .and_then(|i| i16::try_from(i).ok())
                .ok_or_else(mismatch)?,
        ),
        "INT4" => query.bind(
            json_i64(value)
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(mismatch)?,
        ),
        "INT8" => query.bind(json_i64(value).ok_or_else(mismatch)?),
        "FLOAT4" => query.bind(json_f64(value).ok_or_else(mismatch)? as f32),
        "FLOAT8" => query.bind(json_f64(value).ok_or_else(mismatch)?),
        "NUMERIC" => query.bind(json_decimal(value).ok_or_else(mismatch)?),
        "DATE" => query.bind(
            value
                .as_str()
                .and_then(|s| s.parse::<chrono::NaiveDate>().ok())
                .ok_or_else(mismatch)?,
        ),
        "TIMESTAMP" => query.bind(
            value
                .as_str()
                .and_then(parse_naive_datetime)
                .ok_or_else(mismatch)?,
        ),
        "TIMESTAMPTZ" => query.bind(
            value
                .as_str()
                .and_then(|s| {
                    s.parse::<chrono::DateTime<chrono::Utc>>()
                        .ok()
                        .or_else(|| parse_naive_datetime(s).map(|dt| dt.and_utc()))
                })
                .ok_or_else(mismatch)?,
        ),
        "UUID" => query.bind(
            value
                .as_str()
                .and_then(|s| uuid::Uuid::parse_str(s).ok())
                .ok_or_else(mismatch)?,
        ),
        "JSON" | "JSONB" => query.bind(sqlx::types::Json(value.clone())),
        // Text, enums and domains take the textual form
        _ => match value {
            Value::String(s) => query.bind(s.clone()),
            other => query.bind(other.to_string()),
        },
    };
    Ok(query)
}

/// Bind by JSON type when the server reported no parameter types
fn bind_pg<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(sqlx::types::Json(other.clone())),
    }
}

fn json_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_decimal(value: &Value) -> Option<rust_decimal::Decimal> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(rust_decimal::Decimal::from(i)),
            None => n.as_f64().and_then(|f| rust_decimal::Decimal::try_from(f).ok()),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `2024-01-01T10:00:00`, `2024-01-01 10:00:00` or a bare date at midnight
fn parse_naive_datetime(s: &str) -> Option<chrono::NaiveDateTime> {
    s.parse::<chrono::NaiveDateTime>()
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            s.parse::<chrono::NaiveDate>()
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn pg_row_to_json(row: &PgRow) -> Result<Row> {
    let mut map = Map::new();
    for column in row.columns() {
        let value = pg_column_value(row, column.ordinal(), column.type_info().name())?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

fn pg_column_value(row: &PgRow, index: usize, type_name: &str) -> Result<Value> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .and_then(|v| Number::from_f64(f64::from(v)))
            .map(Value::Number),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        "NUMERIC" => {
            use rust_decimal::prelude::ToPrimitive;
            row.try_get::<Option<rust_decimal::Decimal>, _>(index)?
                .and_then(|d| d.to_f64())
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            row.try_get::<Option<String>, _>(index)?.map(Value::String)
        }
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)?
            .map(|v| Value::String(v.to_rfc3339())),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)?
            .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)?
            .map(|v| Value::String(v.to_string())),
        "UUID" => row
            .try_get::<Option<uuid::Uuid>, _>(index)?
            .map(|v| Value::String(v.to_string())),
        // Enums, domains and anything else textual
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String),
    };

    Ok(value.unwrap_or(Value::Null))
}

// ============================================================================
// SQLite
// ============================================================================

impl Store for SqlitePool {
    async fn count(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_sqlite(query, param);
        }
        let row = query.fetch_one(self).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_sqlite(query, param);
        }
        let rows = query.fetch_all(self).await?;
        rows.iter().map(sqlite_row_to_json).collect()
    }
}

fn bind_sqlite<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(sqlx::types::Json(other.clone())),
    }
}

fn sqlite_row_to_json(row: &SqliteRow) -> Result<Row> {
    let mut map = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let declared = column.type_info().name().to_ascii_uppercase();
        let storage = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_ascii_uppercase())
            }
        };

        let value = match (declared.as_str(), storage.as_deref()) {
            (_, None) => Value::Null,
            ("BOOLEAN", Some("INTEGER")) => Value::Bool(row.try_get::<bool, _>(index)?),
            (_, Some("INTEGER")) => Value::from(row.try_get::<i64, _>(index)?),
            (_, Some("REAL")) => Number::from_f64(row.try_get::<f64, _>(index)?)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            (_, Some("TEXT")) => Value::String(row.try_get::<String, _>(index)?),
            // BLOB has no JSON form
            _ => Value::Null,
        };

        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}
