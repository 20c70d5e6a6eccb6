use chrono::{NaiveDate, NaiveTime};

use crate::error::AppError;

/// Half-open time-of-day range `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::InvalidRange(format!(
                "end time {} must be after start time {}",
                end.format("%H:%M"),
                start.format("%H:%M"),
            )));
        }
        Ok(Self { start, end })
    }

    /// Both bounds are optional on the wire; a range needs both or neither.
    pub fn from_bounds(
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<Option<Self>, AppError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(AppError::InvalidRange(
                "start and end time must be given together".to_string(),
            )),
        }
    }

    /// Rows coming back from storage already passed the `start < end` check.
    pub(crate) fn stored(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Back-to-back ranges (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A calendar day plus a time range on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub date: NaiveDate,
    pub range: TimeRange,
}

impl Slot {
    pub fn new(date: NaiveDate, range: TimeRange) -> Self {
        Self { date, range }
    }

    /// Slots on different days never overlap.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.date == other.date && self.range.overlaps(&other.range)
    }
}
