//! FocusFlow - focus timer core.
//!
//! A pomodoro countdown, an ambient sound session, and a local ledger of
//! completed focus time with streak metrics derived from it.

pub mod app;
pub mod audio;
pub mod date;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod settings;
pub mod store;
pub mod timer;

pub use app::{AppError, CompletionEvent, FocusApp};
pub use date::CalendarDate;
pub use ledger::{Ledger, LedgerError, SharedLedger};
pub use metrics::{compute_metrics, summarize, ActivitySummary};
pub use models::{Metrics, SessionRecord, Settings};
pub use persistence::SqliteStore;
pub use store::{BlobStore, MemoryStore, StoreError};
