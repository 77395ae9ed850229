//! SQLite persistence for fetched accommodations.
//!
//! One table, ten columns, append-only apart from [`AccommodationStore::wipe`].
//! Records and rows are converted by [`accommodation_to_row`] and
//! [`accommodation_from_row`], which share the column order in [`COLUMNS`].

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Accommodation, QueuePoints, QUEUE_RANKS};

/// Column order shared by inserts and reads.
pub const COLUMNS: [&str; 10] = [
    "address",
    "refid",
    "size",
    "date",
    "applicants",
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
];

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS accommodations (
        address    text,
        refid      text,
        size       text,
        date       text,
        applicants integer,
        first      integer,
        second     integer,
        third      integer,
        fourth     integer,
        fifth      integer
    );
";

const INSERT: &str = "INSERT INTO accommodations VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

/// A predicate over the `accommodations` table.
///
/// The predicate is SQLite expression text; anything that comes from outside
/// belongs in `params` and is bound as `?1`, `?2`, ... never spliced into the
/// text.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicate: Option<String>,
    params: Vec<Value>,
}

impl Filter {
    pub fn new(predicate: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            predicate: Some(predicate.into()),
            params,
        }
    }

    /// Every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Rows whose date matches a `LIKE` pattern, e.g. `2021-05-17` or `2021-05-%`.
    pub fn date_like(pattern: impl Into<String>) -> Self {
        Self::new("date LIKE ?1", vec![Value::Text(pattern.into())])
    }

    pub fn refid(refid: impl Into<String>) -> Self {
        Self::new("refid = ?1", vec![Value::Text(refid.into())])
    }

    fn sql(&self) -> String {
        match &self.predicate {
            Some(predicate) => format!("SELECT * FROM accommodations WHERE {predicate}"),
            None => "SELECT * FROM accommodations".to_string(),
        }
    }
}

/// Owns the database connection and the `accommodations` schema.
///
/// Not meant to be shared between threads; writes take `&mut self`.
pub struct AccommodationStore {
    conn: Connection,
}

impl AccommodationStore {
    /// Open the database at `path`.
    ///
    /// With `create_fresh`, the parent directory is created if needed and the
    /// table is emptied after the schema is ensured. Without it, a missing
    /// file is reported as [`Error::Setup`] and nothing is created.
    pub fn open(path: impl AsRef<Path>, create_fresh: bool) -> Result<Self> {
        let path = path.as_ref();

        if create_fresh {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        } else if !path.is_file() {
            return Err(Error::Setup {
                path: path.to_path_buf(),
            });
        }

        debug!("Opening database at {}", path.display());
        let mut store = Self::with_connection(Connection::open(path)?)?;

        if create_fresh {
            store.wipe()?;
            info!("Initialized fresh database at {}", path.display());
        }

        Ok(store)
    }

    /// In-memory database with the same schema.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Append one row. Duplicate refids are allowed.
    pub fn insert(&mut self, accommodation: &Accommodation) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(INSERT, params_from_iter(accommodation_to_row(accommodation)))?;
        tx.commit()?;
        Ok(())
    }

    /// Append several rows in a single transaction; either all land or none.
    pub fn insert_all<'a, I>(&mut self, accommodations: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Accommodation>,
    {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(INSERT)?;
            for accommodation in accommodations {
                stmt.execute(params_from_iter(accommodation_to_row(accommodation)))?;
                count += 1;
            }
        }
        tx.commit()?;
        debug!("Inserted {} accommodations", count);
        Ok(count)
    }

    /// Run `filter` and convert each matching row.
    ///
    /// Rows are read up front; conversion happens as the iterator is
    /// consumed, so a malformed row surfaces as an `Err` item at its position.
    pub fn query(
        &self,
        filter: &Filter,
    ) -> Result<impl Iterator<Item = Result<Accommodation>>> {
        let mut stmt = self.conn.prepare(&filter.sql())?;
        let rows = stmt
            .query_map(params_from_iter(filter.params.iter()), |row| {
                (0..row.as_ref().column_count())
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Query matched {} rows", rows.len());
        Ok(rows.into_iter().map(accommodation_from_row))
    }

    pub fn by_date(
        &self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = Result<Accommodation>>> {
        self.query(&Filter::date_like(pattern))
    }

    pub fn all(&self) -> Result<impl Iterator<Item = Result<Accommodation>>> {
        self.query(&Filter::all())
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM accommodations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete every row. The schema stays.
    pub fn wipe(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM accommodations", [])?;
        tx.commit()?;
        debug!("Wiped {} rows", removed);
        Ok(())
    }
}

/// Record to row, in [`COLUMNS`] order. Transient details are dropped.
pub fn accommodation_to_row(accommodation: &Accommodation) -> [Value; 10] {
    let [first, second, third, fourth, fifth] = *accommodation.queue_points.as_array();
    [
        Value::Text(accommodation.address.clone()),
        Value::Text(accommodation.refid.clone()),
        Value::Text(accommodation.size.to_string()),
        Value::Text(accommodation.deadline.clone()),
        Value::Integer(accommodation.applicants),
        Value::Integer(first),
        Value::Integer(second),
        Value::Integer(third),
        Value::Integer(fourth),
        Value::Integer(fifth),
    ]
}

/// Row to record. The row must hold exactly the ten [`COLUMNS`].
pub fn accommodation_from_row(row: Vec<Value>) -> Result<Accommodation> {
    if row.len() != COLUMNS.len() {
        return Err(Error::MalformedRow(format!(
            "expected {} columns, got {}",
            COLUMNS.len(),
            row.len()
        )));
    }

    let mut values = row.into_iter().zip(COLUMNS);
    let mut next = || values.next().ok_or_else(|| Error::MalformedRow("row ended early".into()));

    let address = text(next()?)?;
    let refid = text(next()?)?;
    let size = real(next()?)?;
    let deadline = text(next()?)?;
    let applicants = integer(next()?)?;

    let mut points = [0; QUEUE_RANKS];
    for slot in points.iter_mut() {
        *slot = integer(next()?)?;
    }

    Ok(Accommodation::new(
        address,
        refid,
        size,
        deadline,
        applicants,
        QueuePoints::new(points),
    ))
}

fn text((value, column): (Value, &str)) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(mismatch(column, "text", &other)),
    }
}

fn integer((value, column): (Value, &str)) -> Result<i64> {
    match value {
        Value::Integer(n) => Ok(n),
        other => Err(mismatch(column, "integer", &other)),
    }
}

// `size` is a text column, but older databases may hold REAL values.
fn real((value, column): (Value, &str)) -> Result<f64> {
    match value {
        Value::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| Error::MalformedRow(format!("{column}: {s:?} is not a number"))),
        Value::Real(f) => Ok(f),
        Value::Integer(n) => Ok(n as f64),
        other => Err(mismatch(column, "number", &other)),
    }
}

fn mismatch(column: &str, expected: &str, value: &Value) -> Error {
    Error::MalformedRow(format!(
        "{column}: expected {expected}, found {:?}",
        value.data_type()
    ))
}
