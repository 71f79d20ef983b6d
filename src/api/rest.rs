//! REST API router and configuration.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::api::handlers::{
    api_info_handler, create_lecture_handler, create_user_handler, delete_lecture_handler,
    delete_user_handler, enroll_handler, get_lecture_handler, health_handler,
    list_lectures_handler, list_users_handler, login_handler, logout_handler, me_handler,
    unenroll_handler, update_lecture_handler, update_user_handler, week_handler, ApiState,
};
use crate::auth::AuthLayer;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    /// Enable CORS.
    pub enable_cors: bool,
    /// Allowed origins for CORS.
    pub cors_origins: Vec<String>,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Create the REST API router.
///
/// Endpoints:
/// - POST   /auth/token                   - Login
/// - POST   /auth/logout                  - Logout
/// - GET    /auth/me                      - Current user
/// - GET    /api/lectures                 - List lectures
/// - POST   /api/lectures                 - Create a lecture
/// - GET    /api/lectures/:id             - Get a lecture
/// - PATCH  /api/lectures/:id             - Update a lecture
/// - DELETE /api/lectures/:id             - Delete a lecture
/// - POST   /api/lectures/:id/enroll      - Enroll
/// - POST   /api/lectures/:id/unenroll    - Unenroll
/// - GET    /api/users                    - List users (admin)
/// - POST   /api/users                    - Create a user (admin)
/// - PATCH  /api/users/:id                - Update a user (admin)
/// - DELETE /api/users/:id                - Delete a user (admin)
/// - GET    /api/schedule/week            - Laid-out week view
/// - GET    /api                          - API info
/// - GET    /health                       - Liveness probe
pub fn create_rest_router(state: Arc<ApiState>, config: &RestApiConfig) -> Router {
    let sessions = state.sessions.clone();

    let router = Router::new()
        .route("/auth/token", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route(
            "/api/lectures",
            get(list_lectures_handler).post(create_lecture_handler),
        )
        .route(
            "/api/lectures/:id",
            get(get_lecture_handler)
                .patch(update_lecture_handler)
                .delete(delete_lecture_handler),
        )
        .route("/api/lectures/:id/enroll", post(enroll_handler))
        .route("/api/lectures/:id/unenroll", post(unenroll_handler))
        .route(
            "/api/users",
            get(list_users_handler).post(create_user_handler),
        )
        .route(
            "/api/users/:id",
            axum::routing::patch(update_user_handler).delete(delete_user_handler),
        )
        .route("/api/schedule/week", get(week_handler))
        .route("/api", get(api_info_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(AuthLayer::new(sessions));

    // Add CORS if enabled
    if config.enable_cors {
        let origins = if config.cors_origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            AllowOrigin::list(
                config
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse::<HeaderValue>().ok()),
            )
        };

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(origins);

        router.layer(cors)
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionRegistry;
    use crate::schedule::{LectureManager, TimeWindow};
    use crate::store::{MemoryLectureStore, MemoryUserStore};
    use crate::users::UserManager;

    fn test_state() -> Arc<ApiState> {
        Arc::new(ApiState::new(
            LectureManager::new(Arc::new(MemoryLectureStore::new())),
            UserManager::new(Arc::new(MemoryUserStore::new())),
            Arc::new(SessionRegistry::new(3600, true)),
            TimeWindow::default(),
            4.0,
        ))
    }

    #[test]
    fn test_default_config() {
        let config = RestApiConfig::default();
        assert!(config.enable_cors);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_create_router() {
        let _router = create_rest_router(test_state(), &RestApiConfig::default());
    }

    #[test]
    fn test_create_router_without_cors() {
        let config = RestApiConfig {
            enable_cors: false,
            cors_origins: Vec::new(),
        };
        let _router = create_rest_router(test_state(), &config);
    }
}
