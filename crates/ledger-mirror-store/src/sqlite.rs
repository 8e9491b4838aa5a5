//! SQLite implementation of the Mirror trait.
//!
//! This is the primary backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ledger_mirror_core::CallContext;
use rusqlite::{params, Connection, InterruptHandle, OptionalExtension, TransactionBehavior};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InitResult, Mirror, DEFAULT_VALUE, SINGLETON_ID};

/// How long SQLite waits on a lock held by another process before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based mirror.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteMirror {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    interrupter: Arc<Interrupter>,
}

/// Stops the statement of one job on the shared connection.
///
/// Jobs are numbered; `running` names the job currently holding the
/// connection, so an abandoned caller never interrupts someone else's query.
struct Interrupter {
    handle: InterruptHandle,
    running: parking_lot::Mutex<Option<u64>>,
    next_job: AtomicU64,
}

impl Interrupter {
    fn new(conn: &Connection) -> Arc<Self> {
        Arc::new(Self {
            handle: conn.get_interrupt_handle(),
            running: parking_lot::Mutex::new(None),
            next_job: AtomicU64::new(0),
        })
    }

    fn next_job(&self) -> u64 {
        self.next_job.fetch_add(1, Ordering::Relaxed)
    }

    fn enter(&self, job: u64) {
        *self.running.lock() = Some(job);
    }

    fn leave(&self) {
        *self.running.lock() = None;
    }

    fn interrupt(&self, job: u64) {
        let running = self.running.lock();
        if *running == Some(job) {
            tracing::debug!(job, "interrupting abandoned mirror query");
            self.handle.interrupt();
        }
    }
}

impl SqliteMirror {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist. The
    /// singleton row is not created here; see [`Mirror::ensure_initialized`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migration::migrate(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            interrupter: Interrupter::new(&conn),
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run a blocking operation on the connection, bounded by `ctx`.
    ///
    /// If the context expires while the query is running, the caller gets
    /// `Timeout`/`Cancelled` immediately and the running statement is
    /// interrupted so the connection is freed for the next caller. A write
    /// that had already committed stays committed, so the outcome of an
    /// interrupted write is unknown to the caller.
    async fn blocking<F, T>(&self, ctx: &CallContext, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        ctx.check()?;

        let conn = self.conn.clone();
        let interrupter = Arc::clone(&self.interrupter);
        let job = interrupter.next_job();
        let task_ctx = ctx.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))?;
            interrupter.enter(job);
            // The caller may have given up while we waited for the lock.
            let result = task_ctx.check().map_err(StoreError::from).and_then(|()| f(&mut conn));
            interrupter.leave();
            result
        });

        match ctx.run(task).await {
            Ok(joined) => {
                joined.map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
            }
            Err(interrupted) => {
                self.interrupter.interrupt(job);
                Err(interrupted.into())
            }
        }
    }
}

#[async_trait]
impl Mirror for SqliteMirror {
    async fn ensure_initialized(&self, ctx: &CallContext) -> Result<InitResult> {
        self.blocking(ctx, |conn| {
            migration::migrate(conn)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT value FROM storage WHERE id = ?1",
                    params![SINGLETON_ID],
                    |row| row.get(0),
                )
                .optional()?;

            let result = match existing {
                Some(value) => {
                    tracing::debug!(%value, "mirror row already present");
                    InitResult::AlreadyPresent
                }
                None => {
                    tx.execute(
                        "INSERT INTO storage (id, value) VALUES (?1, ?2)",
                        params![SINGLETON_ID, DEFAULT_VALUE],
                    )?;
                    tracing::info!(value = DEFAULT_VALUE, "created mirror row");
                    InitResult::Created
                }
            };

            tx.commit()?;
            Ok(result)
        })
        .await
    }

    async fn write(&self, ctx: &CallContext, value: &str) -> Result<()> {
        let value = value.to_string();

        self.blocking(ctx, move |conn| {
            let updated = conn.execute(
                "UPDATE storage SET value = ?1 WHERE id = ?2",
                params![value, SINGLETON_ID],
            )?;

            if updated == 0 {
                return Err(StoreError::NotFound(format!("id = {}", SINGLETON_ID)));
            }
            Ok(())
        })
        .await
    }

    async fn read(&self, ctx: &CallContext) -> Result<String> {
        self.blocking(ctx, |conn| {
            conn.query_row(
                "SELECT value FROM storage WHERE id = ?1",
                params![SINGLETON_ID],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("id = {}", SINGLETON_ID)))
        })
        .await
    }
}
