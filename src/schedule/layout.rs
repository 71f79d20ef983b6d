//! Overlap layout for a single day column of the weekly calendar.
//!
//! Given the events of one day, assigns each a collision-free 2-D placement:
//! vertical position from its times, horizontal column from its overlaps.
//! Events that overlap share the usable width evenly; an event with no
//! overlaps spans the full usable width.
//!
//! Column counts are local: each event is measured against its own direct
//! overlaps only, not against the transitive overlap chain. Members of the
//! same chain can therefore report different column counts (see
//! `uneven_cluster_sizes_across_a_chain`). This is intentional and load-
//! bearing for the rendered output; do not replace it with a global
//! interval-graph coloring.
//!
//! The computation is pure: identical input always yields identical
//! geometry, regardless of input order. Nothing is cached between calls.

use std::collections::{HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

use super::types::TimeOfDay;

/// Margin reserved at the left edge of a day column, in percent.
pub const LEFT_MARGIN_PERCENT: f64 = 5.0;

/// Usable width of a day column, in percent. A matching margin remains on
/// the right edge.
pub const USABLE_WIDTH_PERCENT: f64 = 90.0;

// ============================================================================
// Layout Input
// ============================================================================

/// Scale and window parameters for one layout pass.
///
/// `window_start_minutes` is the minute-of-day where the visible grid
/// begins; `units_per_hour` is the vertical length (in the renderer's
/// units, e.g. rem) of one hour. Both apply uniformly to every event in
/// the pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutParams {
    /// Minute-of-day at which the visible grid begins.
    pub window_start_minutes: u16,
    /// Vertical length units per hour.
    pub units_per_hour: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            window_start_minutes: 8 * 60,
            units_per_hour: 4.0,
        }
    }
}

/// One event in a single day's layout input.
///
/// Construction enforces a strictly positive duration, so every value of
/// this type is a valid half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEvent {
    id: String,
    start_minutes: u16,
    end_minutes: u16,
}

impl DayEvent {
    /// Create an event from wall-clock times.
    pub fn new(
        id: impl Into<String>,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Self, ScheduleError> {
        let id = id.into();
        if end <= start {
            return Err(ScheduleError::InvalidInterval {
                id,
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            id,
            start_minutes: start.minutes(),
            end_minutes: end.minutes(),
        })
    }

    /// Event identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Start, in minutes since midnight.
    pub fn start_minutes(&self) -> u16 {
        self.start_minutes
    }

    /// End, in minutes since midnight.
    pub fn end_minutes(&self) -> u16 {
        self.end_minutes
    }

    /// Half-open interval intersection test.
    fn overlaps(&self, other: &DayEvent) -> bool {
        self.start_minutes < other.end_minutes && other.start_minutes < self.end_minutes
    }

    /// Whether `other` orders before `self` in a cluster: ascending start
    /// time, ties broken by ascending id.
    fn orders_after(&self, other: &DayEvent) -> bool {
        (other.start_minutes, other.id.as_str()) < (self.start_minutes, self.id.as_str())
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Visual placement of one event inside its day column.
///
/// `top_offset` and `height` are in the renderer's vertical units
/// (`units_per_hour` per hour); `width_percent` and `left_percent` are
/// percentages of the day-column width. `top_offset` is relative to the
/// window start and may be negative for events starting before it; the
/// engine never clips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlotGeometry {
    /// Vertical offset from the top of the visible window.
    pub top_offset: f64,
    /// Vertical extent.
    pub height: f64,
    /// Column width as a percentage of the day column.
    pub width_percent: f64,
    /// Column left edge as a percentage of the day column.
    pub left_percent: f64,
}

impl SlotGeometry {
    /// Right edge of the horizontal span, in percent.
    pub fn right_percent(&self) -> f64 {
        self.left_percent + self.width_percent
    }

    /// Whether two geometries share any horizontal extent.
    pub fn collides_with(&self, other: &SlotGeometry) -> bool {
        self.left_percent < other.right_percent() && other.left_percent < self.right_percent()
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Compute collision-free geometry for one day's events.
///
/// For each event the column count is the size of its direct overlap set
/// (itself included) and its column index is its rank in that set, ordered
/// by ascending start time with ties broken by ascending id. Ids must be
/// pairwise distinct; two events sharing an id would break the total
/// ordering and are rejected as [`ScheduleError::DuplicateIdentifier`].
///
/// An empty input yields an empty map.
pub fn layout(
    params: &LayoutParams,
    events: &[DayEvent],
) -> Result<HashMap<String, SlotGeometry>, ScheduleError> {
    let mut seen = HashSet::with_capacity(events.len());
    for event in events {
        if !seen.insert(event.id.as_str()) {
            return Err(ScheduleError::DuplicateIdentifier(event.id.clone()));
        }
    }

    let mut placements = HashMap::with_capacity(events.len());
    for event in events {
        let mut columns = 0usize;
        let mut index = 0usize;
        for other in events {
            if event.overlaps(other) {
                columns += 1;
                if event.orders_after(other) {
                    index += 1;
                }
            }
        }

        // The event always overlaps itself, so columns >= 1.
        let width_percent = USABLE_WIDTH_PERCENT / columns as f64;
        let left_percent = LEFT_MARGIN_PERCENT + index as f64 * width_percent;

        let start_offset = event.start_minutes as f64 - params.window_start_minutes as f64;
        let duration = (event.end_minutes - event.start_minutes) as f64;

        placements.insert(
            event.id.clone(),
            SlotGeometry {
                top_offset: start_offset / 60.0 * params.units_per_hour,
                height: duration / 60.0 * params.units_per_hour,
                width_percent,
                left_percent,
            },
        );
    }

    Ok(placements)
}

// ============================================================================
// Tests
// ============================================================================
