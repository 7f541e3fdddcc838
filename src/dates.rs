//! Splits a long date range into windows short enough for the recordings
//! endpoint, which rejects `from`/`to` spans over a month.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Maximum span of a single recordings query.
pub const WINDOW_DAYS: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },

    #[error("window size must be at least one day")]
    ZeroWindow,
}

/// One `[start, end)` sub-range, sent upstream as `from`/`to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// A restartable description of the windows covering `[start, end)`.
///
/// Iterating never mutates the description, so the same value can be walked
/// once per user.
#[derive(Debug, Clone, Copy)]
pub struct DateWindows {
    start: NaiveDate,
    end: NaiveDate,
    step: Duration,
}

impl DateWindows {
    pub fn new(start: NaiveDate, end: NaiveDate, window_days: u32) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        if window_days == 0 {
            return Err(RangeError::ZeroWindow);
        }
        Ok(Self {
            start,
            end,
            step: Duration::days(i64::from(window_days)),
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn iter(&self) -> WindowIter {
        WindowIter {
            cursor: self.start,
            end: self.end,
            step: self.step,
        }
    }
}

impl IntoIterator for DateWindows {
    type Item = DateWindow;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

impl IntoIterator for &DateWindows {
    type Item = DateWindow;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct WindowIter {
    cursor: NaiveDate,
    end: NaiveDate,
    step: Duration,
}

impl Iterator for WindowIter {
    type Item = DateWindow;

    fn next(&mut self) -> Option<DateWindow> {
        if self.cursor >= self.end {
            return None;
        }
        let start = self.cursor;
        // Overflow past the calendar's end can only happen when `end` is
        // already near it, so clipping to `end` is correct either way.
        let end = start
            .checked_add_signed(self.step)
            .map_or(self.end, |next| next.min(self.end));
        self.cursor = end;
        Some(DateWindow { start, end })
    }
}
