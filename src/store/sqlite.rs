use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use super::migrations::run_migrations;
use super::{StateStore, StoreChange, Subscribers};

/// Key/value state in a SQLite file shared by every dashboard process.
///
/// Each write bumps a global revision. `sync` uses `PRAGMA data_version` to
/// notice commits from other connections and replays every row newer than
/// the last revision this handle has seen.
pub struct SqliteStore {
    conn: Connection,
    subscribers: RefCell<Subscribers>,
    last_seen: Cell<i64>,
    data_version: Cell<i64>,
    own_revisions: RefCell<HashSet<i64>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening database at {:?}", path))?;

        // WAL lets several dashboards read while one writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(Duration::from_secs(2))?;
        run_migrations(&conn)?;

        let last_seen: i64 =
            conn.query_row("SELECT COALESCE(MAX(revision), 0) FROM kv", [], |row| {
                row.get(0)
            })?;
        let data_version: i64 = conn.query_row("PRAGMA data_version", [], |row| row.get(0))?;

        Ok(Self {
            conn,
            subscribers: RefCell::new(Subscribers::default()),
            last_seen: Cell::new(last_seen),
            data_version: Cell::new(data_version),
            own_revisions: RefCell::new(HashSet::new()),
        })
    }

    fn write(&self, key: &str, value: Option<&str>) -> Result<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let revision: i64 =
            tx.query_row("SELECT COALESCE(MAX(revision), 0) + 1 FROM kv", [], |row| {
                row.get(0)
            })?;
        tx.execute(
            "INSERT INTO kv (key, value, revision, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(key) DO UPDATE
                SET value = ?2, revision = ?3, updated_at = datetime('now')",
            params![key, value, revision],
        )?;
        tx.commit()?;

        self.own_revisions.borrow_mut().insert(revision);
        self.subscribers.borrow_mut().publish(StoreChange {
            key: key.to_string(),
            new_value: value.map(str::to_string),
        });
        Ok(())
    }

    pub fn meta(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(anyhow::Error::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map(Option::flatten)
            .map_err(anyhow::Error::from)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, Some(value))
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.get_raw(key)?.is_some() {
            self.write(key, None)?;
        }
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StoreChange> {
        self.subscribers.borrow_mut().add()
    }

    fn sync(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?;
        if version == self.data_version.get() {
            // No other connection committed, so every newer row is ours.
            let mut own = self.own_revisions.borrow_mut();
            if let Some(newest) = own.iter().copied().max() {
                self.last_seen.set(self.last_seen.get().max(newest));
                own.clear();
            }
            return Ok(());
        }
        self.data_version.set(version);

        let mut stmt = self.conn.prepare(
            "SELECT key, value, revision FROM kv WHERE revision > ?1 ORDER BY revision",
        )?;
        let rows = stmt
            .query_map(params![self.last_seen.get()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut own = self.own_revisions.borrow_mut();
        let mut subscribers = self.subscribers.borrow_mut();
        for (key, new_value, revision) in rows {
            self.last_seen.set(self.last_seen.get().max(revision));
            if own.remove(&revision) {
                continue;
            }
            log::debug!("External change to '{}' (rev {})", key, revision);
            subscribers.publish(StoreChange { key, new_value });
        }
        let seen = self.last_seen.get();
        own.retain(|rev| *rev > seen);
        Ok(())
    }
}
