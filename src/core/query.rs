use std::fmt;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::core::config::RunConfig;
use crate::error::{DiagError, Result};

/// Target of an engine query: server, database, timeout, credential.
#[derive(Debug, Clone)]
pub struct QueryTarget {
    pub server: String,
    pub database: String,
    pub timeout: Duration,
    pub username: String,
    pub password: String,
}

impl QueryTarget {
    pub fn from_config(config: &RunConfig) -> Self {
        QueryTarget {
            server: config.server.clone(),
            database: config.database.clone(),
            timeout: config.query_timeout,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

/// Result of a scalar query: the first column of the first row.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ScalarValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Integer(i) => Some(*i as f64),
            ScalarValue::Real(f) => Some(*f),
            ScalarValue::Text(t) => t.trim().parse().ok(),
            ScalarValue::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Integer(i) => Some(*i),
            ScalarValue::Real(f) => Some(*f as i64),
            ScalarValue::Text(t) => t.trim().parse().ok(),
            ScalarValue::Null => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Real(r) => write!(f, "{}", r),
            ScalarValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Executes a scalar SQL query against the target engine.
///
/// This is the seam between the collector and the database engine; the rest
/// of the crate never talks to an engine driver directly.
pub trait QueryExecutor {
    fn execute_scalar(&self, target: &QueryTarget, sql: &str) -> Result<ScalarValue>;
}

/// Embedded-engine executor backed by SQLite.
///
/// The target's database name is treated as a file path (`:memory:` works)
/// and the configured query timeout maps to the busy timeout. The embedded
/// engine has no credential check, so the username/password travel with the
/// target but are not consulted here.
#[derive(Debug, Default)]
pub struct SqliteQueryExecutor;

impl QueryExecutor for SqliteQueryExecutor {
    fn execute_scalar(&self, target: &QueryTarget, sql: &str) -> Result<ScalarValue> {
        let conn = Connection::open(&target.database)?;
        conn.busy_timeout(target.timeout)?;

        let result = conn.query_row(sql, [], |row| {
            Ok(match row.get_ref(0)? {
                ValueRef::Null => ScalarValue::Null,
                ValueRef::Integer(i) => ScalarValue::Integer(i),
                ValueRef::Real(f) => ScalarValue::Real(f),
                ValueRef::Text(t) => ScalarValue::Text(String::from_utf8_lossy(t).into_owned()),
                ValueRef::Blob(_) => ScalarValue::Null,
            })
        });

        match result {
            Ok(value) => Ok(value),
            // An aggregate over zero rows still yields one row; a genuinely
            // empty result is reported as NULL rather than an error.
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(ScalarValue::Null),
            Err(rusqlite::Error::SqliteFailure(e, msg))
                if e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                Err(DiagError::query_timeout(
                    msg.unwrap_or_else(|| "database busy".to_string()),
                ))
            }
            Err(e) => Err(DiagError::query(e.to_string())),
        }
    }
}
