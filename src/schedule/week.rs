//! Week-view assembly: group lectures by day and lay each day out.
//!
//! Weeks start on Monday. The visible time window defaults to 08:00-20:00
//! with hour marks at every full hour except the last.

use chrono::{Datelike, Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::layout::{layout, LayoutParams, SlotGeometry};
use super::types::{DayOfWeek, Lecture, TimeOfDay};
use super::DayEvent;

// ============================================================================
// Time Window
// ============================================================================

/// The visible time range of the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeWindow {
    /// Start of the visible range.
    pub start: TimeOfDay,
    /// End of the visible range (exclusive).
    pub end: TimeOfDay,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: TimeOfDay::from_minutes_unchecked(8 * 60),
            end: TimeOfDay::from_minutes_unchecked(20 * 60),
        }
    }
}

impl TimeWindow {
    /// Full hours covered by the window, excluding the closing hour.
    /// An 08:00-20:00 window yields marks at 08:00 through 19:00.
    pub fn hour_marks(&self) -> Vec<TimeOfDay> {
        let first = self.start.hour();
        let last = self.end.hour();
        (first..last)
            .filter_map(|h| TimeOfDay::new(h, 0).ok())
            .collect()
    }

    /// Window extent in minutes.
    pub fn span_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

// ============================================================================
// Week arithmetic
// ============================================================================

/// The Monday on or before the given date.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(days_from_monday)
}

/// The Monday of the week before the given date's week.
pub fn previous_week(date: NaiveDate) -> NaiveDate {
    week_start(date) - Duration::days(7)
}

/// The Monday of the week after the given date's week.
pub fn next_week(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(7)
}

// ============================================================================
// Week Schedule
// ============================================================================

/// A lecture together with its computed placement for one day column.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PositionedLecture {
    /// The lecture being placed.
    pub lecture: Lecture,
    /// Its visual geometry within the day column.
    pub geometry: SlotGeometry,
}

/// One day column of the week view.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DaySchedule {
    /// Calendar date of the column.
    pub date: NaiveDate,
    /// Day of week of the column.
    pub day_of_week: DayOfWeek,
    /// Positioned lectures, ordered by start time then id.
    pub lectures: Vec<PositionedLecture>,
}

/// A fully laid-out week: seven day columns starting on Monday.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WeekSchedule {
    /// Monday of the displayed week.
    pub week_start: NaiveDate,
    /// The seven day columns, Monday first.
    pub days: Vec<DaySchedule>,
    /// The visible time window the geometry is relative to.
    pub window: TimeWindow,
    /// Vertical length units per hour used for the geometry.
    pub units_per_hour: f64,
}

impl WeekSchedule {
    /// Build the week containing `reference` from the given lectures.
    ///
    /// Each lecture is assigned to its day-of-week column; every day is
    /// laid out independently. Lectures with invalid intervals or
    /// duplicate ids surface as errors rather than degenerate geometry.
    pub fn build(
        reference: NaiveDate,
        lectures: &[Lecture],
        window: TimeWindow,
        units_per_hour: f64,
    ) -> Result<Self> {
        let start = week_start(reference);
        let params = LayoutParams {
            window_start_minutes: window.start.minutes(),
            units_per_hour,
        };

        let mut days = Vec::with_capacity(7);
        for offset in 0..7 {
            let date = start + Duration::days(offset);
            let day_of_week = DayOfWeek::from_weekday(date.weekday());

            let mut day_lectures: Vec<&Lecture> = lectures
                .iter()
                .filter(|l| l.day_of_week == day_of_week)
                .collect();
            day_lectures.sort_by(|a, b| {
                a.start_time
                    .cmp(&b.start_time)
                    .then_with(|| a.id.cmp(&b.id))
            });

            let day_events: Vec<DayEvent> = day_lectures
                .iter()
                .map(|l| DayEvent::new(l.id.clone(), l.start_time, l.end_time))
                .collect::<std::result::Result<_, _>>()?;
            let mut geometry = layout(&params, &day_events)?;

            let mut placed = Vec::with_capacity(day_lectures.len());
            for lecture in day_lectures {
                if let Some(geometry) = geometry.remove(&lecture.id) {
                    placed.push(PositionedLecture {
                        lecture: lecture.clone(),
                        geometry,
                    });
                }
            }

            days.push(DaySchedule {
                date,
                day_of_week,
                lectures: placed,
            });
        }

        Ok(Self {
            week_start: start,
            days,
            window,
            units_per_hour,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
