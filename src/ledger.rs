//! Session ledger: per-day focus totals persisted as one JSON blob.

use crate::date::{to_calendar_date, CalendarDate};
use crate::models::SessionRecord;
use crate::store::{BlobStore, StoreError};
use chrono::{DateTime, TimeZone};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Key under which the whole ledger is stored.
pub const SESSIONS_KEY: &str = "focusflow.sessions";

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("Malformed persisted data: {0}")]
    MalformedPersistedData(#[from] serde_json::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Adds `duration` to the record for `date`, inserting one if none exists.
///
/// Records keep their existing order; a new day goes to the end.
pub fn merge_session(records: &mut Vec<SessionRecord>, date: CalendarDate, duration: i64) {
    match records.iter_mut().find(|r| r.date == date) {
        Some(existing) => existing.duration += duration,
        None => records.push(SessionRecord::new(date, duration)),
    }
}

pub struct Ledger<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads every record from the store, in stored order.
    ///
    /// A missing blob is an empty ledger, not an error.
    pub fn load(&self) -> Result<Vec<SessionRecord>, LedgerError> {
        match self.store.get(SESSIONS_KEY)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    /// Like [`Ledger::load`], but any failure reads as "no history yet".
    pub fn load_or_empty(&self) -> Vec<SessionRecord> {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load sessions, treating ledger as empty");
            Vec::new()
        })
    }

    /// Overwrites the stored ledger with `records`.
    pub fn save(&mut self, records: &[SessionRecord]) -> Result<(), LedgerError> {
        let blob = serde_json::to_string(records)?;
        self.store.set(SESSIONS_KEY, &blob)?;
        debug!(records = records.len(), "saved sessions");
        Ok(())
    }

    /// Records `duration_secs` of focus for the calendar day of `instant`.
    pub fn append<Tz: TimeZone>(
        &mut self,
        instant: &DateTime<Tz>,
        duration_secs: i64,
    ) -> Result<Vec<SessionRecord>, LedgerError> {
        self.append_on(to_calendar_date(instant), duration_secs)
    }

    /// Records `duration_secs` of focus for `date` and returns the updated ledger.
    ///
    /// Store failures abort before anything is written. An unreadable blob is
    /// replaced, matching what [`Ledger::load_or_empty`] reports.
    pub fn append_on(
        &mut self,
        date: CalendarDate,
        duration_secs: i64,
    ) -> Result<Vec<SessionRecord>, LedgerError> {
        if duration_secs <= 0 {
            warn!(%date, duration_secs, "appending non-positive focus duration");
        }

        let mut records = match self.load() {
            Ok(records) => records,
            Err(LedgerError::MalformedPersistedData(e)) => {
                warn!(error = %e, "discarding malformed session data");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        merge_session(&mut records, date, duration_secs);
        self.save(&records)?;
        info!(%date, duration_secs, "recorded focus session");
        Ok(records)
    }
}

/// A ledger shared between threads. Each append holds the lock for the
/// whole load-merge-save sequence, so concurrent appends never overwrite
/// each other's contribution.
pub struct SharedLedger<S: BlobStore> {
    inner: Arc<Mutex<Ledger<S>>>,
}

impl<S: BlobStore> Clone for SharedLedger<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BlobStore> SharedLedger<S> {
    pub fn new(ledger: Ledger<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger<S>> {
        // A panic mid-append leaves at worst an unsaved merge; the store
        // itself is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn load(&self) -> Result<Vec<SessionRecord>, LedgerError> {
        self.lock().load()
    }

    pub fn load_or_empty(&self) -> Vec<SessionRecord> {
        self.lock().load_or_empty()
    }

    pub fn save(&self, records: &[SessionRecord]) -> Result<(), LedgerError> {
        self.lock().save(records)
    }

    pub fn append<Tz: TimeZone>(
        &self,
        instant: &DateTime<Tz>,
        duration_secs: i64,
    ) -> Result<Vec<SessionRecord>, LedgerError> {
        self.lock().append(instant, duration_secs)
    }

    pub fn append_on(
        &self,
        date: CalendarDate,
        duration_secs: i64,
    ) -> Result<Vec<SessionRecord>, LedgerError> {
        self.lock().append_on(date, duration_secs)
    }
}
