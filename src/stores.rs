//! Backend handles: setup and per-key operations
//!
//! One handle per backend, created once per process and shared by every
//! benchmark case. Concurrency safety is the backend's own contract (redb's
//! writer lock, the pool's connection checkout); the harness adds no locking.

use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use log::info;
use redb::{
    Database, ReadableDatabase, ReadableTableMetadata, TableDefinition, TableError,
};
use tokio_postgres::NoTls;

use crate::config::BenchConfig;
use crate::workload::{key_text, PAYLOAD};

const DATA: TableDefinition<&str, &[u8]> = TableDefinition::new("data");

const INSERT_SQL: &str = "INSERT INTO data (key, value) VALUES ($1, $2)";
const SELECT_SQL: &str = "SELECT value FROM data WHERE key = $1";

/// Embedded single-file store handle
pub struct KvStore {
    db: Database,
}

impl KvStore {
    /// Open the backing file, wiping any prior state first when requested.
    ///
    /// A missing file during clear is not an error (a fresh machine and a
    /// second reset both start from nothing); any other setup failure is
    /// fatal to the run.
    pub fn open(config: &BenchConfig) -> Result<Self> {
        if config.clear {
            clear_file(&config.kv_path)?;
        }
        if let Some(parent) = config.kv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let db = Database::create(&config.kv_path)
            .with_context(|| format!("opening {}", config.kv_path.display()))?;
        Ok(Self { db })
    }

    /// Write the fixed payload under key `n`, one transaction per call
    pub fn put(&self, n: u64) -> Result<()> {
        let key = key_text(n);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DATA)?;
            table.insert(key.as_str(), PAYLOAD)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Read the value under key `n`; a missing key (or a file no write has
    /// touched yet) is `None`, not an error
    pub fn get(&self, n: u64) -> Result<Option<Vec<u8>>> {
        let key = key_text(n);
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(DATA) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(table.get(key.as_str())?.map(|guard| guard.value().to_vec()))
    }

    /// Number of keys currently stored
    pub fn key_count(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        match txn.open_table(DATA) {
            Ok(table) => Ok(table.len()?),
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(err) => Err(err.into()),
        }
    }
}

fn clear_file(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!("[redb] cleared {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("clearing {}", path.display())),
    }
}

/// Relational store handle: a shared connection pool
///
/// Cloning shares the pool; parallel workers clone it and check out their own
/// connections.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PgStore {
    /// Build the pool, ping the server, optionally drop and recreate the
    /// whole `public` schema, then ensure the benchmark table exists.
    ///
    /// The clear step is destructive to everything in the database, not just
    /// this harness's table. The pool size bound is effectively unlimited;
    /// connections open on demand.
    pub async fn connect(config: &BenchConfig) -> Result<Self> {
        let manager = PostgresConnectionManager::new_from_stringlike(&config.postgres_conn, NoTls)
            .context("parsing postgres connection string")?;
        let pool = Pool::builder()
            .max_size(u32::MAX)
            .build(manager)
            .await
            .context("building postgres connection pool")?;

        let client = pool.get().await.context("checking out a connection")?;
        client
            .query_one("SELECT 1", &[])
            .await
            .context("pinging postgres")?;

        if config.clear {
            client
                .batch_execute("DROP SCHEMA public CASCADE")
                .await
                .context("dropping public schema")?;
            client
                .batch_execute("CREATE SCHEMA public")
                .await
                .context("recreating public schema")?;
            info!("[postgres] cleared benchmark database");
        }
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS data (key bigint not null, value bytea not null)",
            )
            .await
            .context("creating data table")?;
        drop(client);

        Ok(Self { pool })
    }

    /// Insert the fixed payload under every key in `keys`, in order, on one
    /// pooled connection with a statement prepared once.
    ///
    /// The table has no key constraint, so repeated keys insert repeated rows.
    pub async fn insert_range(&self, keys: Range<u64>) -> Result<()> {
        let client = self.pool.get().await.context("checking out a connection")?;
        let stmt = client
            .prepare(INSERT_SQL)
            .await
            .context("preparing insert")?;
        for n in keys {
            client
                .execute(&stmt, &[&(n as i64), &PAYLOAD])
                .await
                .with_context(|| format!("inserting key {n}"))?;
        }
        Ok(())
    }

    /// Look up every key in `keys` in order, returning the number of rows
    /// seen. Zero matching rows for a key is not an error; only a failed
    /// statement execution is.
    pub async fn read_range(&self, keys: Range<u64>) -> Result<u64> {
        let client = self.pool.get().await.context("checking out a connection")?;
        let stmt = client
            .prepare(SELECT_SQL)
            .await
            .context("preparing select")?;
        let mut rows_seen = 0u64;
        for n in keys {
            let rows = client
                .query(&stmt, &[&(n as i64)])
                .await
                .with_context(|| format!("reading key {n}"))?;
            rows_seen += rows.len() as u64;
        }
        Ok(rows_seen)
    }

    /// Total rows in the benchmark table
    pub async fn row_count(&self) -> Result<i64> {
        let client = self.pool.get().await.context("checking out a connection")?;
        let row = client.query_one("SELECT count(*) FROM data", &[]).await?;
        Ok(row.get(0))
    }

    /// All values stored under `key`, one entry per row
    pub async fn values_for(&self, key: u64) -> Result<Vec<Vec<u8>>> {
        let client = self.pool.get().await.context("checking out a connection")?;
        let rows = client.query(SELECT_SQL, &[&(key as i64)]).await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }
}
