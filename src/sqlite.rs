//! SQLite table store.
//!
//! The dataset lives in a `services` table with no key or uniqueness
//! constraint. Every save deletes all rows and reinserts the full dataset.

use rusqlite::{Connection, params};
use std::path::Path;

use crate::error::StoreError;
use crate::record::{Dataset, ServiceRecord};
use crate::store::{DatasetStore, seed_rng};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS services (
        service TEXT,
        urgency INTEGER,
        resources INTEGER,
        regulations INTEGER,
        uncertainty INTEGER
    );
    CREATE TABLE IF NOT EXISTS dashboard_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

pub struct SqliteStore {
    conn: Connection,
    seed: Option<u64>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Fixes the random seed used if this store seeds its table.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn, seed: None })
    }

    /// True once the table has held data, even if it is empty now.
    fn is_initialised(&self) -> Result<bool, StoreError> {
        let marked: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM dashboard_meta WHERE key = 'seeded')",
            [],
            |row| row.get(0),
        )?;
        if marked {
            return Ok(true);
        }
        let rows: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
        Ok(rows > 0)
    }

    fn read_rows(&self) -> Result<Dataset, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT service, urgency, resources, regulations, uncertainty
             FROM services ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                [
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ],
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (name, values) = row?;
            let mut ratings = [0u8; 4];
            for (slot, value) in ratings.iter_mut().zip(values) {
                *slot = u8::try_from(value)
                    .map_err(|_| StoreError::Corrupt(format!("{}: rating {}", name, value)))?;
            }
            let [u, r, g, c] = ratings;
            records.push(ServiceRecord::new(name, u, r, g, c));
        }
        Ok(Dataset::new(records))
    }
}

impl DatasetStore for SqliteStore {
    fn load(&mut self) -> Result<Dataset, StoreError> {
        if self.is_initialised()? {
            return self.read_rows();
        }
        let dataset = Dataset::seeded(&mut seed_rng(self.seed));
        self.save(&dataset)?;
        log::info!("seeded services table with {} records", dataset.len());
        Ok(dataset)
    }

    fn save(&mut self, dataset: &Dataset) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM services", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO services (service, urgency, resources, regulations, uncertainty)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in dataset {
                insert.execute(params![
                    record.name,
                    record.urgency,
                    record.resources,
                    record.regulations,
                    record.uncertainty
                ])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO dashboard_meta (key, value) VALUES ('seeded', '1')",
            [],
        )?;
        tx.commit()?;
        Ok(())
    }
}
