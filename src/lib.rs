//! Rota: Course-Schedule Service
//!
//! A Rust service for course-enrollment scheduling: lecture and user
//! management, token sessions, and a weekly calendar layout engine that
//! assigns overlap-free 2-D geometry to each lecture.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod schedule;
pub mod store;
pub mod users;

pub use api::{create_rest_router, ApiState, RestApiConfig};
pub use auth::{AuthContext, AuthLayer, AuthMiddleware, Session, SessionRegistry};
pub use config::Config;
pub use error::{
    AuthError, ConfigError, EnrollmentError, Result, RotaError, ScheduleError, StorageError,
};
pub use schedule::{
    layout, DayEvent, DayOfWeek, DaySchedule, LayoutParams, Lecture, LectureFilter,
    LectureManager, LectureUpdate, PositionedLecture, SlotGeometry, TimeOfDay, TimeWindow,
    WeekSchedule,
};
pub use store::{LectureStore, MemoryLectureStore, MemoryUserStore, UserStore};
pub use users::{CreateUser, Role, User, UserManager, UserUpdate};
