//! REST API request handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::{parse_bearer, AuthContext, SessionRegistry};
use crate::error::{AuthError, EnrollmentError, RotaError, ScheduleError, StorageError};
use crate::schedule::{
    next_week, previous_week, DayOfWeek, Lecture, LectureFilter, LectureManager, LectureUpdate,
    SlotGeometry, TimeOfDay, TimeWindow, WeekSchedule, DEFAULT_CAPACITY,
};
use crate::store::{MemoryLectureStore, MemoryUserStore};
use crate::users::{CreateUser, User, UserManager, UserUpdate};

/// Application state shared across handlers.
pub struct ApiState {
    /// Lecture manager.
    pub lectures: LectureManager<MemoryLectureStore>,
    /// User manager.
    pub users: UserManager<MemoryUserStore>,
    /// Session registry.
    pub sessions: Arc<SessionRegistry>,
    /// Visible calendar window.
    pub window: TimeWindow,
    /// Vertical length units per hour of the rendered grid.
    pub units_per_hour: f64,
}

impl ApiState {
    /// Create new API state.
    pub fn new(
        lectures: LectureManager<MemoryLectureStore>,
        users: UserManager<MemoryUserStore>,
        sessions: Arc<SessionRegistry>,
        window: TimeWindow,
        units_per_hour: f64,
    ) -> Self {
        Self {
            lectures,
            users,
            sessions,
            window,
            units_per_hour,
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Error response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: crate::users::Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: UserResponse,
}

/// Users list response.
#[derive(Debug, Clone, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// Create lecture request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLectureRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Owning teacher; defaults to the authenticated user.
    #[serde(default)]
    pub teacher: Option<String>,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default = "default_capacity")]
    pub max_students: u32,
}

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

/// Public view of a lecture.
#[derive(Debug, Clone, Serialize)]
pub struct LectureResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub teacher: String,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub max_students: u32,
    pub students: Vec<String>,
}

impl From<&Lecture> for LectureResponse {
    fn from(lecture: &Lecture) -> Self {
        Self {
            id: lecture.id.clone(),
            title: lecture.title.clone(),
            description: lecture.description.clone(),
            teacher: lecture.teacher_id.clone(),
            day_of_week: lecture.day_of_week,
            start_time: lecture.start_time,
            end_time: lecture.end_time,
            max_students: lecture.max_students,
            students: lecture.enrolled_students.clone(),
        }
    }
}

/// Lectures list response.
#[derive(Debug, Clone, Serialize)]
pub struct LecturesListResponse {
    pub lectures: Vec<LectureResponse>,
    pub total: usize,
}

/// Lecture list query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LectureListQuery {
    /// Filter by day of week (0 = Sunday).
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    /// Filter by owning teacher.
    #[serde(default)]
    pub teacher: Option<String>,
    /// Text search over title and description.
    #[serde(default)]
    pub q: Option<String>,
    /// Maximum results.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

/// Enrollment response.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub message: String,
}

/// Week view query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct WeekQuery {
    /// Any date inside the requested week; defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Visible window description for the week response.
#[derive(Debug, Clone, Serialize)]
pub struct WindowResponse {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub hour_marks: Vec<TimeOfDay>,
}

/// A positioned lecture in the week response.
#[derive(Debug, Clone, Serialize)]
pub struct PositionedLectureResponse {
    pub lecture: LectureResponse,
    pub geometry: SlotGeometry,
}

/// One day column of the week response.
#[derive(Debug, Clone, Serialize)]
pub struct WeekDayResponse {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub lectures: Vec<PositionedLectureResponse>,
}

/// Week view response: the rendering contract for the calendar grid.
#[derive(Debug, Clone, Serialize)]
pub struct WeekResponse {
    pub week_start: NaiveDate,
    pub previous_week: NaiveDate,
    pub next_week: NaiveDate,
    pub window: WindowResponse,
    pub units_per_hour: f64,
    pub days: Vec<WeekDayResponse>,
}

impl WeekResponse {
    fn from_schedule(schedule: WeekSchedule) -> Self {
        Self {
            week_start: schedule.week_start,
            previous_week: previous_week(schedule.week_start),
            next_week: next_week(schedule.week_start),
            window: WindowResponse {
                start: schedule.window.start,
                end: schedule.window.end,
                hour_marks: schedule.window.hour_marks(),
            },
            units_per_hour: schedule.units_per_hour,
            days: schedule
                .days
                .into_iter()
                .map(|day| WeekDayResponse {
                    date: day.date,
                    day_of_week: day.day_of_week,
                    lectures: day
                        .lectures
                        .into_iter()
                        .map(|p| PositionedLectureResponse {
                            lecture: LectureResponse::from(&p.lecture),
                            geometry: p.geometry,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map a domain error onto an HTTP status and error envelope.
fn error_response(err: RotaError) -> Response {
    let (status, code) = match &err {
        RotaError::Schedule(ScheduleError::DuplicateIdentifier(_)) => {
            (StatusCode::CONFLICT, "duplicate_identifier")
        }
        RotaError::Schedule(_) => (StatusCode::BAD_REQUEST, "invalid_schedule"),
        RotaError::Enrollment(EnrollmentError::LectureFull { .. }) => {
            (StatusCode::CONFLICT, "lecture_full")
        }
        RotaError::Enrollment(EnrollmentError::AlreadyEnrolled { .. }) => {
            (StatusCode::CONFLICT, "already_enrolled")
        }
        RotaError::Enrollment(EnrollmentError::NotEnrolled { .. }) => {
            (StatusCode::CONFLICT, "not_enrolled")
        }
        RotaError::Storage(StorageError::LectureNotFound(_))
        | RotaError::Storage(StorageError::UserNotFound(_)) => {
            (StatusCode::NOT_FOUND, "not_found")
        }
        RotaError::Storage(StorageError::DuplicateUsername(_)) => {
            (StatusCode::CONFLICT, "duplicate_username")
        }
        RotaError::Storage(StorageError::DuplicateId(_)) => (StatusCode::CONFLICT, "duplicate_id"),
        RotaError::Auth(AuthError::Forbidden(_)) => (StatusCode::FORBIDDEN, "forbidden"),
        RotaError::Auth(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn forbidden(reason: &str) -> Response {
    error_response(AuthError::Forbidden(reason.to_string()).into())
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{} not found", what),
            code: "not_found".to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Auth Handlers
// ============================================================================

/// POST /auth/token - Exchange credentials for a session token.
pub async fn login_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state
        .users
        .verify_credentials(&request.username, &request.password)
        .await
    {
        Ok(user) => {
            let session = state.sessions.issue(&user);
            tracing::info!("User {} logged in", user.username);
            (
                StatusCode::OK,
                Json(LoginResponse {
                    token: session.token,
                    expires_at: session.expires_at,
                    user: UserResponse::from(&user),
                }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// POST /auth/logout - Revoke the presented session token.
pub async fn logout_handler(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
    {
        state.sessions.revoke(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

/// GET /auth/me - Current authenticated user.
pub async fn me_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Response {
    let Some(user_id) = ctx.user_id else {
        return error_response(AuthError::MissingCredentials.into());
    };

    match state.users.get(&user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(&user))).into_response(),
        Ok(None) => error_response(AuthError::InvalidCredentials.into()),
        Err(err) => error_response(err),
    }
}

// ============================================================================
// Lecture Handlers
// ============================================================================

/// GET /api/lectures - List lectures.
pub async fn list_lectures_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<LectureListQuery>,
) -> Response {
    let filter = LectureFilter {
        day_of_week: params.day_of_week,
        teacher_id: params.teacher,
        enrolled_student: None,
        search_query: params.q,
        limit: params.limit,
        offset: params.offset,
    };

    match state.lectures.list(&filter).await {
        Ok(lectures) => {
            let lectures: Vec<LectureResponse> =
                lectures.iter().map(LectureResponse::from).collect();
            let total = lectures.len();
            (
                StatusCode::OK,
                Json(LecturesListResponse { lectures, total }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// POST /api/lectures - Create a lecture (teacher or admin).
pub async fn create_lecture_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(request): Json<CreateLectureRequest>,
) -> Response {
    if !ctx.can_manage_lectures() {
        return forbidden("only teachers and admins can create lectures");
    }

    let Some(teacher) = request.teacher.or(ctx.user_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No teacher given for the lecture".to_string(),
                code: "missing_teacher".to_string(),
            }),
        )
            .into_response();
    };

    let lecture = Lecture::new(
        request.title,
        teacher,
        request.day_of_week,
        request.start_time,
        request.end_time,
    )
    .with_description(request.description)
    .with_capacity(request.max_students);

    match state.lectures.create(lecture).await {
        Ok(created) => {
            (StatusCode::CREATED, Json(LectureResponse::from(&created))).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// GET /api/lectures/:id - Get a lecture.
pub async fn get_lecture_handler(
    State(state): State<Arc<ApiState>>,
    Path(lecture_id): Path<String>,
) -> Response {
    match state.lectures.get(&lecture_id).await {
        Ok(Some(lecture)) => {
            (StatusCode::OK, Json(LectureResponse::from(&lecture))).into_response()
        }
        Ok(None) => not_found("Lecture"),
        Err(err) => error_response(err),
    }
}

/// PATCH /api/lectures/:id - Update a lecture (teacher or admin).
pub async fn update_lecture_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(lecture_id): Path<String>,
    Json(update): Json<LectureUpdate>,
) -> Response {
    if !ctx.can_manage_lectures() {
        return forbidden("only teachers and admins can update lectures");
    }

    match state.lectures.update(&lecture_id, update).await {
        Ok(Some(lecture)) => {
            (StatusCode::OK, Json(LectureResponse::from(&lecture))).into_response()
        }
        Ok(None) => not_found("Lecture"),
        Err(err) => error_response(err),
    }
}

/// DELETE /api/lectures/:id - Delete a lecture (teacher or admin).
pub async fn delete_lecture_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(lecture_id): Path<String>,
) -> Response {
    if !ctx.can_manage_lectures() {
        return forbidden("only teachers and admins can delete lectures");
    }

    match state.lectures.delete(&lecture_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found("Lecture"),
        Err(err) => error_response(err),
    }
}

/// POST /api/lectures/:id/enroll - Enroll the authenticated user.
pub async fn enroll_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(lecture_id): Path<String>,
) -> Response {
    let Some(student_id) = ctx.user_id else {
        return error_response(AuthError::MissingCredentials.into());
    };

    match state.lectures.enroll(&lecture_id, &student_id).await {
        Ok(lecture) => (
            StatusCode::OK,
            Json(EnrollmentResponse {
                message: format!("Enrolled in {}", lecture.title),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/lectures/:id/unenroll - Drop the authenticated user's enrollment.
pub async fn unenroll_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(lecture_id): Path<String>,
) -> Response {
    let Some(student_id) = ctx.user_id else {
        return error_response(AuthError::MissingCredentials.into());
    };

    match state.lectures.unenroll(&lecture_id, &student_id).await {
        Ok(lecture) => (
            StatusCode::OK,
            Json(EnrollmentResponse {
                message: format!("Unenrolled from {}", lecture.title),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

// ============================================================================
// Week View Handler
// ============================================================================

/// GET /api/schedule/week - Lay out the week containing the given date.
pub async fn week_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<WeekQuery>,
) -> Response {
    let reference = params
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    match state
        .lectures
        .week(reference, state.window, state.units_per_hour)
        .await
    {
        Ok(schedule) => {
            (StatusCode::OK, Json(WeekResponse::from_schedule(schedule))).into_response()
        }
        Err(err) => error_response(err),
    }
}

// ============================================================================
// User Handlers (admin only)
// ============================================================================

/// GET /api/users - List user accounts.
pub async fn list_users_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Response {
    if !ctx.is_admin() {
        return forbidden("only admins can list users");
    }

    match state.users.list().await {
        Ok(users) => {
            let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
            let total = users.len();
            (StatusCode::OK, Json(UsersListResponse { users, total })).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// POST /api/users - Create a user account.
pub async fn create_user_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(request): Json<CreateUser>,
) -> Response {
    if !ctx.is_admin() {
        return forbidden("only admins can create users");
    }

    match state.users.create(request).await {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(&user))).into_response(),
        Err(err) => error_response(err),
    }
}

/// PATCH /api/users/:id - Update a user account.
pub async fn update_user_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Response {
    if !ctx.is_admin() {
        return forbidden("only admins can update users");
    }

    match state.users.update(&user_id, update).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(&user))).into_response(),
        Ok(None) => not_found("User"),
        Err(err) => error_response(err),
    }
}

/// DELETE /api/users/:id - Delete a user account.
pub async fn delete_user_handler(
    State(state): State<Arc<ApiState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Response {
    if !ctx.is_admin() {
        return forbidden("only admins can delete users");
    }

    match state.users.delete(&user_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found("User"),
        Err(err) => error_response(err),
    }
}

// ============================================================================
// Info Handlers
// ============================================================================

/// GET /health - Liveness probe.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api - API info.
pub async fn api_info_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Rota REST API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "REST API for the rota course-schedule service",
        "endpoints": {
            "login": {
                "method": "POST",
                "path": "/auth/token",
                "description": "Exchange credentials for a session token"
            },
            "logout": {
                "method": "POST",
                "path": "/auth/logout",
                "description": "Revoke the presented session token"
            },
            "me": {
                "method": "GET",
                "path": "/auth/me",
                "description": "Current authenticated user"
            },
            "lectures": {
                "method": "GET|POST",
                "path": "/api/lectures",
                "description": "List or create lectures"
            },
            "lecture": {
                "method": "GET|PATCH|DELETE",
                "path": "/api/lectures/:id",
                "description": "Get, update, or delete a lecture"
            },
            "enroll": {
                "method": "POST",
                "path": "/api/lectures/:id/enroll",
                "description": "Enroll the authenticated user"
            },
            "unenroll": {
                "method": "POST",
                "path": "/api/lectures/:id/unenroll",
                "description": "Drop the authenticated user's enrollment"
            },
            "users": {
                "method": "GET|POST",
                "path": "/api/users",
                "description": "List or create user accounts (admin)"
            },
            "user": {
                "method": "PATCH|DELETE",
                "path": "/api/users/:id",
                "description": "Update or delete a user account (admin)"
            },
            "week": {
                "method": "GET",
                "path": "/api/schedule/week",
                "params": {
                    "date": "Any date inside the requested week (default: today)"
                },
                "description": "Laid-out week view with per-lecture geometry"
            }
        }
    }))
}
