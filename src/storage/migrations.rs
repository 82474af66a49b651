/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has the document table and its indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 2;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "Database schema version {} is newer than supported version {}",
            current_version, CURRENT_VERSION
        )));
    }

    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })?
        .unwrap_or(0);

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    if from_version < 2 {
        migration_v2(conn)?;
    }

    Ok(())
}

/// Migration to version 1: the shared document table
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        [],
    )?;

    // Most queries are "collection for user, optionally on/between dates"
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_user_date
         ON documents (collection, user_id, date)",
        [],
    )?;

    tracing::info!("Applied migration v1: Created document schema");
    Ok(())
}

/// Migration to version 2: document ids are unique per user, not globally
///
/// SQLite cannot alter a primary key, so the table is rebuilt and the rows
/// copied across inside one transaction.
fn migration_v2(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "BEGIN;
         CREATE TABLE documents_v2 (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (collection, user_id, id)
         );
         INSERT INTO documents_v2 (collection, id, user_id, date, created_at, updated_at, body)
            SELECT collection, id, user_id, date, created_at, updated_at, body FROM documents;
         DROP INDEX IF EXISTS idx_documents_user_date;
         DROP TABLE documents;
         ALTER TABLE documents_v2 RENAME TO documents;
         CREATE INDEX idx_documents_user_date ON documents (collection, user_id, date);
         COMMIT;",
    )?;

    tracing::info!("Applied migration v2: Keyed documents by user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_database() {
        let conn = Connection::open_in_memory().unwrap();

        // Should succeed on a fresh database
        assert!(initialize_database(&conn).is_ok());

        // Should succeed when called again (idempotent)
        assert!(initialize_database(&conn).is_ok());

        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'documents'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 1);
    }

    #[test]
    fn test_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_database(&conn).unwrap();
        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_same_id_allowed_for_different_users() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();

        let insert = "INSERT INTO documents (collection, id, user_id, created_at, updated_at, body)
                      VALUES ('water', 'w1', ?1, 'now', 'now', '{}')";
        conn.execute(insert, ["alice"]).unwrap();
        conn.execute(insert, ["bob"]).unwrap();
        assert!(conn.execute(insert, ["bob"]).is_err());
    }

    #[test]
    fn test_v1_rows_survive_rekey() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE schema_version (version INTEGER PRIMARY KEY)", [])
            .unwrap();
        migration_v1(&conn).unwrap();
        set_version(&conn, 1).unwrap();
        conn.execute(
            "INSERT INTO documents (collection, id, user_id, date, created_at, updated_at, body)
             VALUES ('water', 'w1', 'alice', '2024-01-01', 'now', 'now', '{}')",
            [],
        )
        .unwrap();

        initialize_database(&conn).unwrap();

        assert_eq!(get_current_version(&conn).unwrap(), 2);
        let owner: String = conn
            .query_row("SELECT user_id FROM documents WHERE id = 'w1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(owner, "alice");
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        set_version(&conn, CURRENT_VERSION + 1).unwrap();

        assert!(matches!(
            initialize_database(&conn),
            Err(StorageError::Migration(_))
        ));
    }
}
