//! SQLite data store backing every pipeline layer.
//!
//! One [`Store`] wraps one connection. Staging, production and warehouse
//! relations share a single database file; layers are distinguished by
//! table name (see [`ecom_model::Layer::table`]).

pub mod error;
pub mod rows;
mod schema;

use std::fs;
use std::path::Path;
use std::time::Duration;

use ecom_model::DatabaseConfig;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

pub use error::{Result, StoreError};
pub use rows::{
    InsertMode, Record, clear_table, count_rows, insert_record, insert_row, select_all,
    select_unloaded,
};
pub use schema::SCHEMA_VERSION;

/// Owned handle on the pipeline database. The connection closes on drop.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database file and bring the schema up.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let path = config.path.as_path();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn =
            Connection::open_with_flags(path, flags).map_err(|source| open_err(path, source))?;
        apply_pragmas(&conn, config.busy_timeout_ms).map_err(|source| open_err(path, source))?;
        let mut store = Self { conn };
        schema::initialize_schema(&mut store.conn)?;
        debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        schema::initialize_schema(&mut store.conn)?;
        Ok(store)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Round-trip a trivial query.
    pub fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    pub fn row_count(&self, table: &str) -> Result<u64> {
        count_rows(&self.conn, table)
    }
}

fn open_err(path: &Path, source: rusqlite::Error) -> StoreError {
    StoreError::Open {
        path: path.to_path_buf(),
        source,
    }
}

fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}
