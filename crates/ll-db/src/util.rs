use chrono::{DateTime, SecondsFormat, Utc};
use ll_core::LifelineError;
use rusqlite::{Connection, Params, Row};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("json encode failed: {message}")]
    JsonEncode { message: String },
    #[error("json decode failed: {message}")]
    JsonDecode { message: String },
    #[error("invalid enum value: {value}")]
    InvalidEnum { value: String },
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
}

impl From<DbError> for LifelineError {
    fn from(err: DbError) -> Self {
        LifelineError::internal(err)
    }
}

/// Fixed-width so stored timestamps sort lexically.
pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_rfc3339(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub fn opt_rfc3339(value: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
    value.as_deref().map(from_rfc3339).transpose()
}

pub fn encode_json<T: Serialize>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })
}

pub fn decode_json<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    serde_json::from_str(value).map_err(|err| DbError::JsonDecode {
        message: err.to_string(),
    })
}

pub fn encode_enum<T: Serialize>(value: &T) -> Result<String, DbError> {
    let json = serde_json::to_value(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })?;
    match json {
        Value::String(value) => Ok(value),
        other => Err(DbError::InvalidEnum {
            value: other.to_string(),
        }),
    }
}

pub fn decode_enum<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    let json = Value::String(value.to_string());
    serde_json::from_value(json).map_err(|_| DbError::InvalidEnum {
        value: value.to_string(),
    })
}

pub fn query_all<T, P, F>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: F,
) -> Result<Vec<T>, LifelineError>
where
    P: Params,
    F: Fn(&Row<'_>) -> Result<T, LifelineError>,
{
    let mut stmt = conn.prepare(sql).map_err(LifelineError::store)?;
    let mut rows = stmt.query(params).map_err(LifelineError::store)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next().map_err(LifelineError::store)? {
        items.push(map(row)?);
    }
    Ok(items)
}

pub fn query_one<T, P, F>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: F,
) -> Result<Option<T>, LifelineError>
where
    P: Params,
    F: Fn(&Row<'_>) -> Result<T, LifelineError>,
{
    let mut stmt = conn.prepare(sql).map_err(LifelineError::store)?;
    let mut rows = stmt.query(params).map_err(LifelineError::store)?;
    match rows.next().map_err(LifelineError::store)? {
        Some(row) => map(row).map(Some),
        None => Ok(None),
    }
}

pub fn column<T: rusqlite::types::FromSql>(row: &Row<'_>, idx: usize) -> Result<T, LifelineError> {
    row.get(idx).map_err(LifelineError::store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ll_core::types::{Priority, RequestStatus};

    #[test]
    fn enums_round_trip_as_bare_strings() {
        assert_eq!(encode_enum(&RequestStatus::InProgress).unwrap(), "in-progress");
        assert_eq!(
            decode_enum::<RequestStatus>("accepted").unwrap(),
            RequestStatus::Assigned
        );
        assert!(matches!(
            decode_enum::<Priority>("urgent"),
            Err(DbError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn timestamps_have_fixed_width() {
        let whole = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let fractional = DateTime::parse_from_rfc3339("2026-03-01T10:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let (a, b) = (to_rfc3339(&whole), to_rfc3339(&fractional));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(from_rfc3339(&b).unwrap(), fractional);
    }
}
