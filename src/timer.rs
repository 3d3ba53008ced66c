//! Pomodoro countdown cycling through work and break periods.

use crate::models::{Period, Settings};

/// Emitted by [`FocusTimer::tick`] when a period runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodEnd {
    pub period: Period,
    /// Full length of the period that just ended.
    pub duration_secs: u32,
}

impl PeriodEnd {
    /// Focus seconds to record, if the ended period was a work period.
    pub fn focus_secs(&self) -> Option<u32> {
        self.period.is_work().then_some(self.duration_secs)
    }
}

/// Countdown state. Ticking is driven from outside, once per second.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTimer {
    durations: [u32; 4],
    index: usize,
    remaining_secs: u32,
    running: bool,
}

impl FocusTimer {
    pub fn new(settings: &Settings) -> Self {
        let durations = Self::durations_for(settings);
        Self {
            durations,
            index: 0,
            remaining_secs: durations[0],
            running: false,
        }
    }

    fn durations_for(settings: &Settings) -> [u32; 4] {
        Period::CYCLE.map(|period| settings.period_secs(period))
    }

    /// Picks up new durations. The current countdown is left alone unless
    /// the timer sits untouched at the start of its period.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let pristine = !self.running && self.remaining_secs == self.total_secs();
        self.durations = Self::durations_for(settings);
        if pristine {
            self.remaining_secs = self.total_secs();
        }
    }

    pub fn period(&self) -> Period {
        Period::CYCLE[self.index]
    }

    /// Position in the four-step cycle (0-3).
    pub fn cycle_position(&self) -> usize {
        self.index
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.durations[self.index]
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts or pauses the countdown.
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Stops and rewinds to the first work period.
    pub fn reset(&mut self) {
        self.running = false;
        self.index = 0;
        self.remaining_secs = self.durations[0];
    }

    /// Returns the progress fraction (0.0 to 1.0) through the current period.
    pub fn progress(&self) -> f32 {
        let total = self.total_secs();
        if total == 0 {
            return 1.0;
        }
        1.0 - (self.remaining_secs as f32 / total as f32)
    }

    /// Advances the countdown by one second.
    ///
    /// When the period runs out the timer moves on to the next period and
    /// keeps running.
    pub fn tick(&mut self) -> Option<PeriodEnd> {
        if !self.running {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let ended = PeriodEnd {
            period: self.period(),
            duration_secs: self.total_secs(),
        };
        self.index = (self.index + 1) % self.durations.len();
        self.remaining_secs = self.total_secs();
        Some(ended)
    }
}

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One-line status for the terminal, e.g. `▶ Focus 24:59`.
pub fn format_status(timer: &FocusTimer) -> String {
    let icon = if timer.is_running() { "▶" } else { "⏸" };
    format!(
        "{} {} {}",
        icon,
        timer.period().label(),
        format_time(timer.remaining_secs())
    )
}
