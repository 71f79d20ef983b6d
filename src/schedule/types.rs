//! Core schedule types: wall-clock times, weekdays, and lectures.
//!
//! Times are minute-precision wall-clock values (`HH:MM`). Inputs in
//! `HH:MM:SS` form are accepted with the seconds discarded, matching the
//! upstream data source.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

// ============================================================================
// Time of Day
// ============================================================================

/// A wall-clock time on a 24-hour scale with minute precision.
///
/// Stored as minutes since midnight (0..1440). Ordering follows clock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Create from hour and minute components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self(hour as u16 * 60 + minute as u16))
    }

    /// Constructor for in-crate constants; `minutes` must be below 1440.
    pub(crate) const fn from_minutes_unchecked(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Create from minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self, ScheduleError> {
        if minutes >= 24 * 60 {
            return Err(ScheduleError::InvalidTime(format!("{} minutes", minutes)));
        }
        Ok(Self(minutes))
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Hour component (0-23).
    pub fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    /// Minute component (0-59).
    pub fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    /// Parse `HH:MM` or `HH:MM:SS`; seconds are discarded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime(s.to_string());

        let mut parts = s.split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let seconds = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }
        if let Some(sec) = seconds {
            if sec.len() != 2 || sec.parse::<u8>().map_err(|_| invalid())? > 59 {
                return Err(invalid());
            }
        }

        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;

        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for TimeOfDay {
    fn schema_name() -> String {
        "TimeOfDay".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

// ============================================================================
// Day of Week
// ============================================================================

/// Day of the week, numbered 0-6 with 0 = Sunday on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All days in wire order (Sunday first).
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Wire index (0 = Sunday).
    pub fn index(&self) -> u8 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }

    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }

    /// Convert from a chrono weekday.
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }

    /// Convert to a chrono weekday.
    pub fn weekday(&self) -> Weekday {
        match self {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayOfWeek::ALL
            .get(value as usize)
            .copied()
            .ok_or(ScheduleError::InvalidDay(value))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day.index()
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        DayOfWeek::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for DayOfWeek {
    fn schema_name() -> String {
        "DayOfWeek".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        u8::json_schema(gen)
    }
}

// ============================================================================
// Lecture
// ============================================================================

/// A scheduled lecture occurrence within the weekly timetable.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Lecture {
    /// Unique identifier for the lecture.
    pub id: String,
    /// Lecture title.
    pub title: String,
    /// Lecture description.
    #[serde(default)]
    pub description: String,
    /// ID of the teacher who owns this lecture.
    pub teacher_id: String,
    /// Day of the week the lecture takes place.
    pub day_of_week: DayOfWeek,
    /// Start time (wall clock).
    pub start_time: TimeOfDay,
    /// End time (wall clock); must be strictly after `start_time`.
    pub end_time: TimeOfDay,
    /// Enrollment capacity.
    pub max_students: u32,
    /// IDs of enrolled students.
    #[serde(default)]
    pub enrolled_students: Vec<String>,
    /// When the lecture was created.
    pub created_at: DateTime<Utc>,
    /// When the lecture was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Default enrollment capacity for new lectures.
pub const DEFAULT_CAPACITY: u32 = 30;

impl Lecture {
    /// Create a new lecture with a generated ID.
    pub fn new(
        title: impl Into<String>,
        teacher_id: impl Into<String>,
        day_of_week: DayOfWeek,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Self {
        Self::with_id(
            uuid::Uuid::new_v4().to_string(),
            title,
            teacher_id,
            day_of_week,
            start_time,
            end_time,
        )
    }

    /// Create a lecture with a specific ID.
    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        teacher_id: impl Into<String>,
        day_of_week: DayOfWeek,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            teacher_id: teacher_id.into(),
            day_of_week,
            start_time,
            end_time,
            max_students: DEFAULT_CAPACITY,
            enrolled_students: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the enrollment capacity.
    pub fn with_capacity(mut self, max_students: u32) -> Self {
        self.max_students = max_students;
        self
    }

    /// Check the interval invariant: end strictly after start.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_time <= self.start_time {
            return Err(ScheduleError::InvalidInterval {
                id: self.id.clone(),
                start: self.start_time.to_string(),
                end: self.end_time.to_string(),
            });
        }
        Ok(())
    }

    /// Duration in minutes.
    pub fn duration_minutes(&self) -> u16 {
        self.end_time.minutes().saturating_sub(self.start_time.minutes())
    }

    /// Whether enrollment has reached capacity.
    pub fn is_full(&self) -> bool {
        self.enrolled_students.len() >= self.max_students as usize
    }

    /// Whether the given student is enrolled.
    pub fn has_student(&self, student_id: &str) -> bool {
        self.enrolled_students.iter().any(|s| s == student_id)
    }

    /// Check if this lecture overlaps another on the same day.
    ///
    /// Intervals are half-open: `[start, end)`.
    pub fn overlaps_with(&self, other: &Lecture) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

// ============================================================================
// Lecture Update
// ============================================================================

/// Partial update for a lecture. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LectureUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New owning teacher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    /// New day of week.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    /// New start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeOfDay>,
    /// New end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
    /// New enrollment capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_students: Option<u32>,
}

impl LectureUpdate {
    /// Apply this update to a lecture, refreshing its update timestamp.
    pub fn apply_to(&self, lecture: &mut Lecture) {
        if let Some(ref title) = self.title {
            lecture.title = title.clone();
        }
        if let Some(ref description) = self.description {
            lecture.description = description.clone();
        }
        if let Some(ref teacher_id) = self.teacher_id {
            lecture.teacher_id = teacher_id.clone();
        }
        if let Some(day_of_week) = self.day_of_week {
            lecture.day_of_week = day_of_week;
        }
        if let Some(start_time) = self.start_time {
            lecture.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            lecture.end_time = end_time;
        }
        if let Some(max_students) = self.max_students {
            lecture.max_students = max_students;
        }
        lecture.updated_at = Utc::now();
    }
}

// ============================================================================
// Lecture Filter
// ============================================================================

/// Filter criteria for listing lectures.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LectureFilter {
    /// Filter by day of week.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    /// Filter by owning teacher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    /// Filter by an enrolled student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_student: Option<String>,
    /// Text search over title and description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// Maximum number of results.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

impl Default for LectureFilter {
    fn default() -> Self {
        Self {
            day_of_week: None,
            teacher_id: None,
            enrolled_student: None,
            search_query: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl LectureFilter {
    /// Create a filter for a single day.
    pub fn for_day(day: DayOfWeek) -> Self {
        Self {
            day_of_week: Some(day),
            ..Default::default()
        }
    }

    /// Create a filter for a teacher's lectures.
    pub fn for_teacher(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: Some(teacher_id.into()),
            ..Default::default()
        }
    }

    /// Set the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check if a lecture matches this filter.
    pub fn matches(&self, lecture: &Lecture) -> bool {
        if let Some(day) = self.day_of_week {
            if lecture.day_of_week != day {
                return false;
            }
        }

        if let Some(ref teacher_id) = self.teacher_id {
            if &lecture.teacher_id != teacher_id {
                return false;
            }
        }

        if let Some(ref student) = self.enrolled_student {
            if !lecture.has_student(student) {
                return false;
            }
        }

        if let Some(ref query) = self.search_query {
            let query_lower = query.to_lowercase();
            let matches_title = lecture.title.to_lowercase().contains(&query_lower);
            let matches_desc = lecture.description.to_lowercase().contains(&query_lower);
            if !matches_title && !matches_desc {
                return false;
            }
        }

        true
    }
}

// ============================================================================
// Tests
// ============================================================================
