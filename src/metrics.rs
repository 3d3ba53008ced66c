//! Metrics engine: today's totals and streaks derived from ledger records.

use crate::date::{day_label, days_between, days_ending_at, CalendarDate};
use crate::models::{Metrics, SessionRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Longest streak needed for the five-day badge.
const FIVE_DAY_STREAK: u32 = 5;
/// Session count needed for the hundred-sessions badge.
const HUNDRED_SESSIONS: usize = 100;

/// Derives the dashboard metrics for `today` from the full ledger.
///
/// Records need not be sorted or deduplicated. Future-dated records are
/// not filtered out.
pub fn compute_metrics(records: &[SessionRecord], today: CalendarDate) -> Metrics {
    let mut sorted: Vec<&SessionRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut total_today = 0;
    let mut sessions_today = 0;
    for record in sorted.iter().filter(|r| r.date == today) {
        total_today += record.duration;
        sessions_today += 1;
    }

    Metrics {
        total_today,
        sessions_today,
        current_streak: current_streak(&sorted, today),
        longest_streak: longest_streak(&sorted),
    }
}

/// `sorted` must be ascending by date.
fn longest_streak(sorted: &[&SessionRecord]) -> u32 {
    let mut longest: u32 = 0;
    let mut current: u32 = 0;
    let mut prev: Option<CalendarDate> = None;

    for record in sorted {
        match prev {
            None => current = 1,
            Some(last) => {
                let gap = days_between(last, record.date);
                if gap == 1 {
                    current += 1;
                } else if gap > 1 {
                    current = 1;
                }
                // A zero gap is a duplicate day: leave the run untouched.
            }
        }
        longest = longest.max(current);
        prev = Some(record.date);
    }

    longest
}

/// Zero unless today has a record; otherwise the run of consecutive days
/// counted back from the newest recorded day, future days included.
fn current_streak(sorted: &[&SessionRecord], today: CalendarDate) -> u32 {
    let days: BTreeSet<CalendarDate> = sorted.iter().map(|r| r.date).collect();

    if !days.contains(&today) {
        return 0;
    }

    let mut streak = 1;
    let mut newer: Option<CalendarDate> = None;
    for day in days.iter().rev() {
        if let Some(newer) = newer {
            if days_between(*day, newer) != 1 {
                break;
            }
            streak += 1;
        }
        newer = Some(*day);
    }
    streak
}

/// A milestone shown on the activity dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    FiveDayStreak,
    HundredSessions,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FiveDayStreak => "5-Day Streak",
            Self::HundredSessions => "100 Sessions",
        }
    }
}

/// Focus minutes for one charted day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBar {
    pub date: CalendarDate,
    pub label: &'static str,
    pub minutes: f64,
}

/// Everything the activity dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub metrics: Metrics,
    pub chart: Vec<DayBar>,
    pub total_sessions: usize,
    pub total_minutes: f64,
    /// Mean of the charted days, empty days included.
    pub average_minutes: f64,
    pub badges: Vec<Badge>,
}

/// Builds the dashboard for the `days` calendar days ending at `today`.
pub fn summarize(records: &[SessionRecord], today: CalendarDate, days: usize) -> ActivitySummary {
    let metrics = compute_metrics(records, today);

    let chart: Vec<DayBar> = days_ending_at(today, days)
        .into_iter()
        .map(|date| {
            let secs: i64 = records
                .iter()
                .filter(|r| r.date == date)
                .map(|r| r.duration)
                .sum();
            DayBar {
                date,
                label: day_label(date),
                minutes: secs as f64 / 60.0,
            }
        })
        .collect();

    let total_sessions = records.len();
    let total_minutes: f64 = records.iter().map(|r| r.duration as f64 / 60.0).sum();
    let average_minutes = if chart.is_empty() {
        0.0
    } else {
        chart.iter().map(|bar| bar.minutes).sum::<f64>() / chart.len() as f64
    };

    let mut badges = Vec::new();
    if metrics.longest_streak >= FIVE_DAY_STREAK {
        badges.push(Badge::FiveDayStreak);
    }
    if total_sessions >= HUNDRED_SESSIONS {
        badges.push(Badge::HundredSessions);
    }

    ActivitySummary {
        metrics,
        chart,
        total_sessions,
        total_minutes,
        average_minutes,
        badges,
    }
}
