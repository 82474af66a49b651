/// SQLite implementation of the document storage interface
///
/// All collections share one `documents` table keyed by (collection, user, id),
/// with the owning user and calendar day pulled out into indexed columns and
/// the record itself kept as a JSON body.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::storage::{
    migrations, Collection, DateFilter, DocumentStore, StorageError, StoredDocument,
};

const SELECT_COLUMNS: &str = "SELECT id, user_id, date, created_at, updated_at, body FROM documents";

/// Raw column values, converted after the statement is done with the row
struct RawRow {
    id: String,
    user_id: String,
    date: Option<String>,
    created_at: String,
    updated_at: String,
    body: String,
}

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the `DocumentStore` trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    /// Open a private in-memory database (used by tests and dry runs)
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        migrations::initialize_database(&conn)?;
        Ok(Self { conn })
    }

    fn timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            body: row.get(5)?,
        })
    }

    fn convert_row(collection: Collection, raw: RawRow) -> Result<StoredDocument, StorageError> {
        let corrupt = |reason: String| StorageError::Corrupt {
            collection: collection.as_str(),
            id: raw.id.clone(),
            reason,
        };

        let date = match &raw.date {
            Some(s) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| corrupt(format!("invalid date '{}'", s)))?,
            ),
            None => None,
        };
        let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
            .map_err(|_| corrupt("invalid created_at".to_string()))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&raw.updated_at)
            .map_err(|_| corrupt("invalid updated_at".to_string()))?
            .with_timezone(&Utc);
        let body = serde_json::from_str(&raw.body).map_err(|e| corrupt(e.to_string()))?;

        Ok(StoredDocument {
            collection,
            id: raw.id,
            user_id: raw.user_id,
            date,
            created_at,
            updated_at,
            body,
        })
    }

    fn collect_rows(
        collection: Collection,
        rows: impl Iterator<Item = rusqlite::Result<RawRow>>,
    ) -> Result<Vec<StoredDocument>, StorageError> {
        let mut docs = Vec::new();
        for raw in rows {
            docs.push(Self::convert_row(collection, raw?)?);
        }
        Ok(docs)
    }
}

impl DocumentStore for SqliteStorage {
    fn insert(&self, doc: &StoredDocument) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO documents (collection, id, user_id, date, created_at, updated_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                doc.collection.as_str(),
                doc.id,
                doc.user_id,
                doc.date.map(|d| d.to_string()),
                Self::timestamp(&doc.created_at),
                Self::timestamp(&doc.updated_at),
                doc.body.to_string(),
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Inserted {} document {}", doc.collection.as_str(), doc.id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::Duplicate {
                    collection: doc.collection.as_str(),
                    id: doc.id.clone(),
                })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn replace(&self, doc: &StoredDocument) -> Result<(), StorageError> {
        // The original created_at survives a replace
        self.conn.execute(
            "INSERT INTO documents (collection, id, user_id, date, created_at, updated_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (collection, user_id, id) DO UPDATE SET
                date = excluded.date,
                updated_at = excluded.updated_at,
                body = excluded.body",
            params![
                doc.collection.as_str(),
                doc.id,
                doc.user_id,
                doc.date.map(|d| d.to_string()),
                Self::timestamp(&doc.created_at),
                Self::timestamp(&doc.updated_at),
                doc.body.to_string(),
            ],
        )?;

        tracing::debug!("Replaced {} document {}", doc.collection.as_str(), doc.id);
        Ok(())
    }

    fn get(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StorageError> {
        let sql = format!("{} WHERE collection = ?1 AND user_id = ?2 AND id = ?3", SELECT_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![collection.as_str(), user_id, id], Self::read_row)
            .optional()?;

        raw.map(|r| Self::convert_row(collection, r)).transpose()
    }

    fn delete(&self, collection: Collection, user_id: &str, id: &str) -> Result<bool, StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND user_id = ?2 AND id = ?3",
            params![collection.as_str(), user_id, id],
        )?;

        tracing::debug!("Deleted {} document {} ({} rows)", collection.as_str(), id, rows_affected);
        Ok(rows_affected > 0)
    }

    fn list(
        &self,
        collection: Collection,
        user_id: &str,
        filter: DateFilter,
    ) -> Result<Vec<StoredDocument>, StorageError> {
        const ORDER: &str = "ORDER BY date DESC, created_at DESC";

        match filter {
            DateFilter::Any => {
                let sql = format!("{} WHERE collection = ?1 AND user_id = ?2 {}", SELECT_COLUMNS, ORDER);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![collection.as_str(), user_id], Self::read_row)?;
                Self::collect_rows(collection, rows)
            }
            DateFilter::On(date) => {
                let sql = format!(
                    "{} WHERE collection = ?1 AND user_id = ?2 AND date = ?3 {}",
                    SELECT_COLUMNS, ORDER
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(
                    params![collection.as_str(), user_id, date.to_string()],
                    Self::read_row,
                )?;
                Self::collect_rows(collection, rows)
            }
            DateFilter::Between(start, end) => {
                let sql = format!(
                    "{} WHERE collection = ?1 AND user_id = ?2 AND date BETWEEN ?3 AND ?4 {}",
                    SELECT_COLUMNS, ORDER
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(
                    params![collection.as_str(), user_id, start.to_string(), end.to_string()],
                    Self::read_row,
                )?;
                Self::collect_rows(collection, rows)
            }
        }
    }
}
