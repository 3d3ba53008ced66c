//! Data models for the FocusFlow core.

use crate::date::CalendarDate;
use serde::{Deserialize, Serialize};

/// Aggregated focus time for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: CalendarDate,
    /// Completed focus time in seconds.
    pub duration: i64,
}

impl SessionRecord {
    pub fn new(date: CalendarDate, duration: i64) -> Self {
        Self { date, duration }
    }
}

/// Rolling statistics derived from the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Focus seconds recorded for today.
    pub total_today: i64,
    /// Records found for today (0 or 1 while the ledger stays deduplicated).
    pub sessions_today: u32,
    /// Consecutive days ending today.
    pub current_streak: u32,
    /// Longest run of consecutive days anywhere in the ledger.
    pub longest_streak: u32,
}

/// One segment of the pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Work,
    ShortBreak,
    LongBreak,
}

impl Period {
    /// The fixed four-step cycle: work, short break, work, long break.
    pub const CYCLE: [Period; 4] = [
        Period::Work,
        Period::ShortBreak,
        Period::Work,
        Period::LongBreak,
    ];

    pub fn is_work(&self) -> bool {
        matches!(self, Self::Work)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }
}

/// User-configurable settings for the focus timer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Duration of a work period in minutes.
    pub work_mins: u32,
    /// Duration of a short break in minutes.
    pub short_break_mins: u32,
    /// Duration of a long break in minutes.
    pub long_break_mins: u32,
    /// Whether to play the chime when a period ends.
    pub sound_enabled: bool,
    /// Whether to show system notifications.
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_mins: 25,
            short_break_mins: 5,
            long_break_mins: 15,
            sound_enabled: true,
            notifications_enabled: false,
        }
    }
}

impl Settings {
    /// Length of a period in seconds, saturating for out-of-range minutes.
    pub fn period_secs(&self, period: Period) -> u32 {
        let mins = match period {
            Period::Work => self.work_mins,
            Period::ShortBreak => self.short_break_mins,
            Period::LongBreak => self.long_break_mins,
        };
        mins.saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.work_mins, 25);
        assert_eq!(settings.short_break_mins, 5);
        assert_eq!(settings.long_break_mins, 15);
        assert!(settings.sound_enabled);
        assert!(!settings.notifications_enabled);
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"work_mins": 50}"#).unwrap();
        assert_eq!(settings.work_mins, 50);
        assert_eq!(settings.long_break_mins, 15);
    }

    #[test]
    fn test_period_secs() {
        let settings = Settings::default();
        assert_eq!(settings.period_secs(Period::Work), 1500);
        assert_eq!(settings.period_secs(Period::ShortBreak), 300);
        assert_eq!(settings.period_secs(Period::LongBreak), 900);
    }

    #[test]
    fn test_period_secs_saturates() {
        let settings = Settings {
            work_mins: 100_000_000,
            ..Settings::default()
        };
        assert_eq!(settings.period_secs(Period::Work), u32::MAX);
    }

    #[test]
    fn test_cycle_alternates_work() {
        let work: Vec<bool> = Period::CYCLE.iter().map(Period::is_work).collect();
        assert_eq!(work, vec![true, false, true, false]);
    }

    #[test]
    fn test_session_record_json_shape() {
        let record = SessionRecord::new("2024-01-03".parse().unwrap(), 1500);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-03","duration":1500}"#);

        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
