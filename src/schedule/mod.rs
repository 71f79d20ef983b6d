//! Schedule module: lectures, weekly layout, and enrollment.
//!
//! This module provides the course-schedule functionality:
//!
//! - **Lectures**: weekly recurring slots with a day, times, and capacity
//! - **Lecture Management**: CRUD and enrollment operations
//! - **Week Assembly**: group lectures per day for a Monday-start week
//! - **Overlap Layout**: collision-aware 2-D placement per day column
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Schedule Layer                              │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              LectureManager                               │  │
//! │  │  - Lecture CRUD operations                                │  │
//! │  │  - Enrollment with capacity checks                        │  │
//! │  │  - Week-view assembly                                     │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                           │                                      │
//! │              ┌────────────┴────────────┐                         │
//! │              ▼                         ▼                         │
//! │  ┌──────────────────────┐  ┌───────────────────────────────┐    │
//! │  │    LectureStore      │  │      Overlap Layout           │    │
//! │  │  (in-memory backend) │  │  - per-day, pure, stateless   │    │
//! │  └──────────────────────┘  │  - local overlap clusters     │    │
//! │                            │  - deterministic tie-breaks   │    │
//! │                            └───────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rota::schedule::{DayOfWeek, Lecture, LectureManager, TimeWindow};
//! use rota::store::MemoryLectureStore;
//! use std::sync::Arc;
//!
//! let manager = LectureManager::new(Arc::new(MemoryLectureStore::new()));
//!
//! let lecture = Lecture::new(
//!     "Algorithms",
//!     teacher.id.clone(),
//!     DayOfWeek::Monday,
//!     "09:00".parse()?,
//!     "10:30".parse()?,
//! );
//! let lecture = manager.create(lecture).await?;
//!
//! manager.enroll(&lecture.id, &student.id).await?;
//!
//! // Lay out the week for rendering.
//! let week = manager.week(today, TimeWindow::default(), 4.0).await?;
//! ```

mod lectures;
pub mod layout;
pub mod types;
pub mod week;

pub use layout::{layout, DayEvent, LayoutParams, SlotGeometry};
pub use lectures::LectureManager;
pub use types::{DayOfWeek, Lecture, LectureFilter, LectureUpdate, TimeOfDay, DEFAULT_CAPACITY};
pub use week::{
    next_week, previous_week, week_start, DaySchedule, PositionedLecture, TimeWindow, WeekSchedule,
};
