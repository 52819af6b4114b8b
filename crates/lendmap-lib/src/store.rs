//! Record store: persistence seam for books and reading records.
//!
//! The discovery core only needs equality filters and point lookups, so the
//! seam is a small object-safe trait. [`SqliteStore`] is the production
//! implementation; [`MemoryStore`] backs unit and handler tests.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Book, ReadingRecord, ReadingStatus};

/// Read/write access to the book catalog and reading records.
///
/// Query failures surface as [`Error::StoreUnavailable`] so callers can
/// distinguish "no data" from "could not ask".
pub trait RecordStore: Send + Sync {
    /// All reading records whose owner differs from `owner`.
    ///
    /// An empty `owner` excludes nothing, since no record carries an empty
    /// owner identity.
    fn readings_excluding(&self, owner: &str) -> Result<Vec<ReadingRecord>>;

    /// A single user's reading records.
    fn readings_for(&self, owner: &str) -> Result<Vec<ReadingRecord>>;

    /// Batch point lookup of books by ISBN. ISBNs without a catalog entry
    /// are simply absent from the returned map.
    fn books_by_isbns(&self, isbns: &[&str]) -> Result<HashMap<String, Book>>;

    /// Point lookup of a single book.
    fn book_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// Insert the book unless its ISBN is already cataloged. Returns whether
    /// a new entry was created; an existing entry is left untouched.
    fn register_book(&self, book: &Book) -> Result<bool>;

    /// Create or replace the (owner, isbn) reading record.
    fn upsert_reading(&self, record: &ReadingRecord) -> Result<()>;

    /// Update the status of an existing reading record. Returns whether a
    /// record matched.
    fn set_reading_status(&self, owner: &str, isbn: &str, status: ReadingStatus) -> Result<bool>;

    /// Delete the (owner, isbn) reading record. Returns whether a record
    /// matched.
    fn remove_reading(&self, owner: &str, isbn: &str) -> Result<bool>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS books (
    isbn            TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    author          TEXT NOT NULL,
    publisher       TEXT NOT NULL,
    published_year  TEXT NOT NULL,
    cover_url       TEXT,
    description     TEXT
);
CREATE TABLE IF NOT EXISTS readings (
    owner      TEXT NOT NULL,
    isbn       TEXT NOT NULL,
    status     TEXT NOT NULL,
    latitude   TEXT NOT NULL,
    longitude  TEXT NOT NULL,
    PRIMARY KEY (owner, isbn)
);
";

const READING_COLUMNS: &str = "owner, isbn, status, latitude, longitude";
const BOOK_COLUMNS: &str = "isbn, title, author, publisher, published_year, cover_url, description";

/// SQLite-backed record store.
///
/// The connection sits behind a mutex so the store can be shared across
/// threads; every operation is a single short statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path, bootstrapping the schema
    /// if it is missing. Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened sqlite record store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::StoreUnavailable {
            message: "record store lock poisoned".to_string(),
        })
    }
}

fn unavailable(err: rusqlite::Error) -> Error {
    Error::StoreUnavailable {
        message: err.to_string(),
    }
}

/// Map raw reading rows into typed records, skipping rows with a status the
/// current schema does not know.
fn collect_readings(
    rows: Vec<(String, String, String, String, String)>,
) -> Vec<ReadingRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for (owner, isbn, status, latitude, longitude) in rows {
        let status: ReadingStatus = match status.parse() {
            Ok(status) => status,
            Err(_) => {
                warn!(%owner, %isbn, %status, "skipping reading record with unknown status");
                continue;
            }
        };
        records.push(ReadingRecord {
            owner,
            isbn,
            status,
            latitude,
            longitude,
        });
    }
    records
}

fn read_book_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        isbn: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        publisher: row.get(3)?,
        published_year: row.get(4)?,
        cover_url: row.get(5)?,
        description: row.get(6)?,
    })
}

impl SqliteStore {
    fn query_readings(
        &self,
        sql: &str,
        owner: &str,
    ) -> Result<Vec<ReadingRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .map_err(unavailable)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)?;
        Ok(collect_readings(rows))
    }
}

impl RecordStore for SqliteStore {
    fn readings_excluding(&self, owner: &str) -> Result<Vec<ReadingRecord>> {
        self.query_readings(
            &format!("SELECT {READING_COLUMNS} FROM readings WHERE owner <> ?1"),
            owner,
        )
    }

    fn readings_for(&self, owner: &str) -> Result<Vec<ReadingRecord>> {
        self.query_readings(
            &format!("SELECT {READING_COLUMNS} FROM readings WHERE owner = ?1"),
            owner,
        )
    }

    fn books_by_isbns(&self, isbns: &[&str]) -> Result<HashMap<String, Book>> {
        if isbns.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.lock()?;
        let placeholders = vec!["?"; isbns.len()].join(", ");
        let sql =
            format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn IN ({placeholders})");
        let mut stmt = conn.prepare(&sql).map_err(unavailable)?;
        let books = stmt
            .query_map(rusqlite::params_from_iter(isbns.iter()), read_book_row)
            .map_err(unavailable)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)?;
        Ok(books
            .into_iter()
            .map(|book| (book.isbn.clone(), book))
            .collect())
    }

    fn book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1");
        let mut stmt = conn.prepare(&sql).map_err(unavailable)?;
        let mut rows = stmt
            .query_map(params![isbn], read_book_row)
            .map_err(unavailable)?;
        match rows.next() {
            Some(book) => Ok(Some(book.map_err(unavailable)?)),
            None => Ok(None),
        }
    }

    fn register_book(&self, book: &Book) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO books \
                 (isbn, title, author, publisher, published_year, cover_url, description) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    book.isbn,
                    book.title,
                    book.author,
                    book.publisher,
                    book.published_year,
                    book.cover_url,
                    book.description,
                ],
            )
            .map_err(unavailable)?;
        Ok(inserted > 0)
    }

    fn upsert_reading(&self, record: &ReadingRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO readings (owner, isbn, status, latitude, longitude) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.owner,
                record.isbn,
                record.status.as_str(),
                record.latitude,
                record.longitude,
            ],
        )
        .map_err(unavailable)?;
        Ok(())
    }

    fn set_reading_status(&self, owner: &str, isbn: &str, status: ReadingStatus) -> Result<bool> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE readings SET status = ?1 WHERE owner = ?2 AND isbn = ?3",
                params![status.as_str(), owner, isbn],
            )
            .map_err(unavailable)?;
        Ok(updated > 0)
    }

    fn remove_reading(&self, owner: &str, isbn: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM readings WHERE owner = ?1 AND isbn = ?2",
                params![owner, isbn],
            )
            .map_err(unavailable)?;
        Ok(deleted > 0)
    }
}

#[derive(Default)]
struct MemoryInner {
    books: BTreeMap<String, Book>,
    readings: BTreeMap<(String, String), ReadingRecord>,
}

/// In-memory record store for tests.
///
/// Iteration order is (owner, isbn), so results are deterministic. The store
/// can be switched into an unavailable state to exercise failure paths.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable {
                message: "memory store marked unavailable".to_string(),
            });
        }
        self.inner.lock().map_err(|_| Error::StoreUnavailable {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

impl RecordStore for MemoryStore {
    fn readings_excluding(&self, owner: &str) -> Result<Vec<ReadingRecord>> {
        let inner = self.guard()?;
        Ok(inner
            .readings
            .values()
            .filter(|record| record.owner != owner)
            .cloned()
            .collect())
    }

    fn readings_for(&self, owner: &str) -> Result<Vec<ReadingRecord>> {
        let inner = self.guard()?;
        Ok(inner
            .readings
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect())
    }

    fn books_by_isbns(&self, isbns: &[&str]) -> Result<HashMap<String, Book>> {
        let inner = self.guard()?;
        Ok(isbns
            .iter()
            .filter_map(|isbn| inner.books.get(*isbn))
            .map(|book| (book.isbn.clone(), book.clone()))
            .collect())
    }

    fn book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let inner = self.guard()?;
        Ok(inner.books.get(isbn).cloned())
    }

    fn register_book(&self, book: &Book) -> Result<bool> {
        let mut inner = self.guard()?;
        if inner.books.contains_key(&book.isbn) {
            return Ok(false);
        }
        inner.books.insert(book.isbn.clone(), book.clone());
        Ok(true)
    }

    fn upsert_reading(&self, record: &ReadingRecord) -> Result<()> {
        let mut inner = self.guard()?;
        inner
            .readings
            .insert((record.owner.clone(), record.isbn.clone()), record.clone());
        Ok(())
    }

    fn set_reading_status(&self, owner: &str, isbn: &str, status: ReadingStatus) -> Result<bool> {
        let mut inner = self.guard()?;
        match inner
            .readings
            .get_mut(&(owner.to_string(), isbn.to_string()))
        {
            Some(record) => {
                record.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_reading(&self, owner: &str, isbn: &str) -> Result<bool> {
        let mut inner = self.guard()?;
        Ok(inner
            .readings
            .remove(&(owner.to_string(), isbn.to_string()))
            .is_some())
    }
}
