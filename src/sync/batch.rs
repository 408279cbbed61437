// src/sync/batch.rs

//! Bounded commit batches for long reconciliation runs
//!
//! A [`CommitBatcher`] keeps one transaction open and commits it every
//! `batch_size` items. Each item runs inside its own savepoint, so a failed
//! item leaves nothing behind while the rest of the batch survives. A crash
//! (or an aborted run) loses only the batch in progress: dropping the
//! batcher without calling [`CommitBatcher::finish`] rolls that batch back.
//!
//! The batcher also owns the batch-start watermark handed to every item.
//! It is taken when the batcher is created and refreshed right after each
//! commit, so items in a later batch never carry an earlier timestamp than
//! the moment their batch began.

use crate::error::{Error, Result};
use chrono::Utc;
use rusqlite::{Connection, Transaction};
use tracing::debug;

/// Default number of items per committed batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Current wall-clock time in unix seconds
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Groups per-item writes into bounded transactions
pub struct CommitBatcher<'conn> {
    conn: &'conn Connection,
    tx: Option<Transaction<'conn>>,
    batch_size: usize,
    pending: usize,
    committed: usize,
    watermark: i64,
    clock: fn() -> i64,
}

impl<'conn> CommitBatcher<'conn> {
    /// Create a batcher using the system clock for watermarks
    pub fn new(conn: &'conn Connection, batch_size: usize) -> Result<Self> {
        Self::with_clock(conn, batch_size, now_timestamp)
    }

    /// Create a batcher with an explicit watermark clock
    pub fn with_clock(
        conn: &'conn Connection,
        batch_size: usize,
        clock: fn() -> i64,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::ConfigError("batch size must be at least 1".to_string()));
        }

        Ok(Self {
            conn,
            tx: None,
            batch_size,
            pending: 0,
            committed: 0,
            watermark: clock(),
            clock,
        })
    }

    /// Watermark of the batch currently being filled
    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    /// Number of batches committed so far
    pub fn committed_batches(&self) -> usize {
        self.committed
    }

    /// Run one item inside a savepoint of the current batch
    ///
    /// `f` receives the connection and the batch watermark. On error the
    /// item's writes are rolled back and the error is returned; the batch
    /// itself stays open. Failed items still count towards the batch size.
    pub fn item<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, i64) -> Result<T>,
    {
        if self.tx.is_none() {
            self.tx = Some(self.conn.unchecked_transaction()?);
        }

        self.conn.execute_batch("SAVEPOINT batch_item")?;
        let result = match f(self.conn, self.watermark) {
            Ok(value) => {
                self.conn.execute_batch("RELEASE batch_item")?;
                Ok(value)
            }
            Err(e) => {
                self.conn
                    .execute_batch("ROLLBACK TO batch_item; RELEASE batch_item")?;
                Err(e)
            }
        };

        self.pending += 1;
        if self.pending >= self.batch_size {
            self.commit()?;
        }
        result
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()?;
            self.committed += 1;
            debug!("Committed batch {} ({} items)", self.committed, self.pending);
        }
        self.pending = 0;
        self.watermark = (self.clock)();
        Ok(())
    }

    /// Commit the last partial batch, returning the number of batches committed
    pub fn finish(mut self) -> Result<usize> {
        if self.pending > 0 {
            self.commit()?;
        }
        Ok(self.committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .unwrap()
    }

    fn insert(conn: &Connection, name: &str) -> Result<()> {
        conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
        Ok(())
    }

    #[test]
    fn test_commits_every_batch_size_items() {
        let conn = db::open_in_memory().unwrap();
        let mut batcher = CommitBatcher::new(&conn, 2).unwrap();

        for name in ["a", "b", "c"] {
            batcher.item(|conn, _| insert(conn, name)).unwrap();
        }
        assert_eq!(batcher.committed_batches(), 1);
        assert_eq!(batcher.finish().unwrap(), 2);
        assert_eq!(count(&conn), 3);
    }

    #[test]
    fn test_failed_item_is_rolled_back_alone() {
        let conn = db::open_in_memory().unwrap();
        let mut batcher = CommitBatcher::new(&conn, 10).unwrap();

        batcher.item(|conn, _| insert(conn, "kept")).unwrap();
        let failed: Result<()> = batcher.item(|conn, _| {
            insert(conn, "discarded")?;
            Err(Error::DataContract("maintainer without type".to_string()))
        });
        assert!(failed.is_err());
        batcher.finish().unwrap();

        let names: Vec<String> = conn
            .prepare("SELECT name FROM categories")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec!["kept"]);
    }

    #[test]
    fn test_drop_discards_only_uncommitted_batch() {
        let conn = db::open_in_memory().unwrap();
        {
            let mut batcher = CommitBatcher::new(&conn, 2).unwrap();
            for name in ["a", "b", "c"] {
                batcher.item(|conn, _| insert(conn, name)).unwrap();
            }
            // dropped without finish()
        }
        assert_eq!(count(&conn), 2);
    }

    static TICKS: AtomicI64 = AtomicI64::new(1000);

    fn ticking_clock() -> i64 {
        TICKS.fetch_add(10, Ordering::SeqCst)
    }

    #[test]
    fn test_watermark_refreshed_after_commit() {
        let conn = db::open_in_memory().unwrap();
        let mut batcher = CommitBatcher::with_clock(&conn, 2, ticking_clock).unwrap();

        let mut seen = Vec::new();
        for name in ["a", "b", "c", "d", "e"] {
            let watermark = batcher
                .item(|conn, watermark| insert(conn, name).map(|_| watermark))
                .unwrap();
            seen.push(watermark);
        }
        batcher.finish().unwrap();

        // Items share their batch's watermark; each batch starts later
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[2], seen[3]);
        assert!(seen[2] > seen[1]);
        assert!(seen[4] > seen[3]);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let conn = db::open_in_memory().unwrap();
        assert!(matches!(
            CommitBatcher::new(&conn, 0),
            Err(Error::ConfigError(_))
        ));
    }
}
