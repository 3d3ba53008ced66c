//! Main application state and logic.

use crate::date::{to_calendar_date, CalendarDate};
use crate::ledger::{Ledger, LedgerError};
use crate::metrics::{compute_metrics, summarize, ActivitySummary};
use crate::models::{Metrics, Period, SessionRecord, Settings};
use crate::settings::{load_settings_or_default, save_settings, SettingsError};
use crate::store::BlobStore;
use crate::timer::FocusTimer;
use chrono::{DateTime, TimeZone};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Events that should trigger a chime or refresh on the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    WorkComplete {
        focus_secs: u32,
        /// False when the session could not be written to the store.
        recorded: bool,
        metrics: Metrics,
    },
    BreakComplete {
        period: Period,
    },
}

pub struct FocusApp<S: BlobStore> {
    pub settings: Settings,
    pub timer: FocusTimer,
    ledger: Ledger<S>,
}

impl<S: BlobStore> FocusApp<S> {
    /// Creates the app over `store`, reading saved settings if any.
    pub fn new(store: S) -> Self {
        let settings = load_settings_or_default(&store);
        Self {
            timer: FocusTimer::new(&settings),
            settings,
            ledger: Ledger::new(store),
        }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    /// Advances the timer by one second. A finished work period is recorded
    /// against the calendar day of `now`; an empty one is passed over.
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<CompletionEvent> {
        let end = self.timer.tick()?;

        let Some(focus_secs) = end.focus_secs() else {
            return Some(CompletionEvent::BreakComplete { period: end.period });
        };
        if focus_secs == 0 {
            debug!("skipping zero-length work period");
            return None;
        }

        let recorded = match self.record_session(now, i64::from(focus_secs)) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, focus_secs, "focus session was not saved");
                false
            }
        };

        Some(CompletionEvent::WorkComplete {
            focus_secs,
            recorded,
            metrics: self.metrics(now),
        })
    }

    /// Adds a completed focus session to the ledger.
    pub fn record_session<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        duration_secs: i64,
    ) -> Result<Vec<SessionRecord>, LedgerError> {
        self.ledger.append(now, duration_secs)
    }

    /// Adds focus time to an explicit calendar day, e.g. for manual entry.
    pub fn record_session_on(
        &mut self,
        date: CalendarDate,
        duration_secs: i64,
    ) -> Result<Vec<SessionRecord>, LedgerError> {
        self.ledger.append_on(date, duration_secs)
    }

    /// All stored records; read failures are reported.
    pub fn history(&self) -> Result<Vec<SessionRecord>, LedgerError> {
        self.ledger.load()
    }

    /// Dashboard metrics as of `now`. Unreadable history counts as empty.
    pub fn metrics<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Metrics {
        compute_metrics(&self.ledger.load_or_empty(), to_calendar_date(now))
    }

    /// Activity summary over the `days` calendar days ending at `now`.
    pub fn summary<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        days: usize,
    ) -> Result<ActivitySummary, AppError> {
        if days == 0 {
            return Err(LedgerError::InvalidArgument("day count must be at least 1".into()).into());
        }
        Ok(summarize(
            &self.ledger.load_or_empty(),
            to_calendar_date(now),
            days,
        ))
    }

    /// Saves updated settings, then hands the new durations to the timer.
    /// Nothing changes in memory if the save fails.
    pub fn update_setting<F>(&mut self, updater: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut updated = self.settings.clone();
        updater(&mut updated);
        save_settings(self.ledger.store_mut(), &updated)?;

        self.timer.apply_settings(&updated);
        self.settings = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SqliteStore;
    use crate::settings::load_settings;
    use crate::store::{MemoryStore, StoreError};
    use chrono::{Duration, FixedOffset};

    fn create_test_app() -> FocusApp<SqliteStore> {
        FocusApp::new(SqliteStore::new_in_memory().unwrap())
    }

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, day, hour, 0, 0)
            .unwrap()
    }

    fn one_minute_work(app: &mut FocusApp<impl BlobStore>) {
        app.update_setting(|s| {
            s.work_mins = 1;
            s.short_break_mins = 1;
        })
        .unwrap();
    }

    fn tick_until_event<S: BlobStore>(
        app: &mut FocusApp<S>,
        now: &DateTime<FixedOffset>,
    ) -> CompletionEvent {
        for _ in 0..10_000 {
            if let Some(event) = app.tick(now) {
                return event;
            }
        }
        panic!("no completion event");
    }

    #[test]
    fn test_app_initial_state() {
        let app = create_test_app();
        assert!(!app.timer.is_running());
        assert_eq!(app.settings, Settings::default());
        assert_eq!(app.metrics(&at(1, 9)), Metrics::default());
    }

    #[test]
    fn test_app_reads_saved_settings() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            work_mins: 40,
            ..Settings::default()
        };
        save_settings(&mut store, &settings).unwrap();

        let app = FocusApp::new(store);
        assert_eq!(app.settings.work_mins, 40);
        assert_eq!(app.timer.remaining_secs(), 40 * 60);
    }

    #[test]
    fn test_work_period_is_recorded() {
        let mut app = create_test_app();
        one_minute_work(&mut app);
        app.timer.toggle();

        let now = at(3, 10);
        let event = tick_until_event(&mut app, &now);

        assert_eq!(
            event,
            CompletionEvent::WorkComplete {
                focus_secs: 60,
                recorded: true,
                metrics: Metrics {
                    total_today: 60,
                    sessions_today: 1,
                    current_streak: 1,
                    longest_streak: 1,
                },
            }
        );
        assert_eq!(app.history().unwrap().len(), 1);
    }

    #[test]
    fn test_break_is_not_recorded() {
        let mut app = create_test_app();
        one_minute_work(&mut app);
        app.timer.toggle();

        let now = at(3, 10);
        tick_until_event(&mut app, &now);
        let event = tick_until_event(&mut app, &now);

        assert_eq!(
            event,
            CompletionEvent::BreakComplete {
                period: Period::ShortBreak
            }
        );
        assert_eq!(app.history().unwrap()[0].duration, 60);
    }

    #[test]
    fn test_streak_builds_over_days() {
        let mut app = create_test_app();
        for day in 1..=3 {
            app.record_session(&at(day, 9), 1500).unwrap();
        }
        app.record_session(&at(3, 18), 1500).unwrap();

        let metrics = app.metrics(&at(3, 20));
        assert_eq!(metrics.total_today, 3000);
        assert_eq!(metrics.sessions_today, 1);
        assert_eq!(metrics.current_streak, 3);
        assert_eq!(metrics.longest_streak, 3);

        let tomorrow = at(3, 20) + Duration::days(1);
        assert_eq!(app.metrics(&tomorrow).current_streak, 0);
    }

    #[test]
    fn test_summary_requires_days() {
        let app = create_test_app();
        assert!(matches!(
            app.summary(&at(1, 9), 0),
            Err(AppError::Ledger(LedgerError::InvalidArgument(_)))
        ));
        assert_eq!(app.summary(&at(1, 9), 7).unwrap().chart.len(), 7);
    }

    #[test]
    fn test_update_setting_persists() {
        let mut app = create_test_app();
        app.update_setting(|s| s.work_mins = 30).unwrap();

        assert_eq!(app.settings.work_mins, 30);
        assert_eq!(app.timer.remaining_secs(), 30 * 60);
        let loaded = load_settings(app.ledger().store()).unwrap();
        assert_eq!(loaded.work_mins, 30);
    }

    struct ReadOnlyStore(MemoryStore);

    impl BlobStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _blob: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".into()))
        }
    }

    #[test]
    fn test_zero_length_work_period_is_not_recorded() {
        let mut store = MemoryStore::new();
        save_settings(
            &mut store,
            &Settings {
                work_mins: 0,
                ..Settings::default()
            },
        )
        .unwrap();
        let mut app = FocusApp::new(store);
        app.timer.toggle();

        let now = at(1, 9);
        assert_eq!(app.tick(&now), None);
        assert_eq!(app.timer.period(), Period::ShortBreak);
        assert!(app.history().unwrap().is_empty());
        assert_eq!(app.metrics(&now), Metrics::default());
    }

    #[test]
    fn test_failed_settings_save_changes_nothing() {
        let mut app = FocusApp::new(ReadOnlyStore(MemoryStore::new()));

        let result = app.update_setting(|s| s.work_mins = 50);
        assert!(matches!(result, Err(AppError::Settings(_))));
        assert_eq!(app.settings, Settings::default());
        assert_eq!(app.timer.remaining_secs(), 25 * 60);
    }

    #[test]
    fn test_lost_session_is_reported() {
        let mut store = MemoryStore::new();
        save_settings(
            &mut store,
            &Settings {
                work_mins: 1,
                ..Settings::default()
            },
        )
        .unwrap();
        let mut app = FocusApp::new(ReadOnlyStore(store));
        app.timer.toggle();

        let event = tick_until_event(&mut app, &at(5, 12));
        assert!(matches!(
            event,
            CompletionEvent::WorkComplete {
                recorded: false,
                metrics: Metrics { total_today: 0, .. },
                ..
            }
        ));
    }
}
