use rusqlite::{Connection, Result};
use std::path::Path;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub fn open(path: &Path, busy_timeout_ms: u64) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    let busy_timeout = i64::try_from(busy_timeout_ms).unwrap_or(i64::MAX);
    conn.pragma_update(None, "busy_timeout", busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    let sql = include_str!("../migrations/0001_init.sql");
    conn.execute_batch(sql)?;
    Ok(())
}

pub fn open_and_migrate(path: &Path, busy_timeout_ms: u64) -> Result<Connection> {
    let conn = open(path, busy_timeout_ms)?;
    migrate(&conn)?;
    Ok(conn)
}

pub fn with_test_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    migrate(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifeline.db");
        let conn = open_and_migrate(&path, DEFAULT_BUSY_TIMEOUT_MS).unwrap();
        migrate(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('requests', 'profiles', 'assignments', 'communications', 'sessions', 'events')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 6);
    }
}
