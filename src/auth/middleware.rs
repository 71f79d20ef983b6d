//! Session middleware for the HTTP transport.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{HeaderMap, Request, Response, StatusCode};
use futures::future::BoxFuture;
use http_body::Body as HttpBody;
use tower::{Layer, Service};

use super::{AuthContext, SessionRegistry};

/// Routes reachable without a session.
fn is_public_path(path: &str) -> bool {
    matches!(path, "/" | "/health" | "/api" | "/auth/token")
}

/// Session middleware layer.
#[derive(Clone)]
pub struct AuthLayer {
    registry: Arc<SessionRegistry>,
}

impl AuthLayer {
    /// Create a new auth layer over a session registry.
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            registry: self.registry.clone(),
        }
    }
}

/// Session middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    registry: Arc<SessionRegistry>,
}

impl<S> AuthMiddleware<S> {
    /// Resolve the auth context from request headers.
    fn extract_auth_context(&self, headers: &HeaderMap) -> AuthContext {
        let auth_header = headers.get("authorization").and_then(|v| v.to_str().ok());

        match self.registry.authenticate(auth_header) {
            Ok(ctx) => ctx,
            Err(_) => AuthContext::anonymous(),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let auth_ctx = self.extract_auth_context(req.headers());

        if self.registry.is_enabled()
            && auth_ctx.anonymous
            && !is_public_path(req.uri().path())
        {
            return Box::pin(async move {
                let response = Response::builder()
                    .status(StatusCode::UNAUTHORIZED)
                    .header("WWW-Authenticate", "Token")
                    .body(ResBody::default())
                    .unwrap_or_default();
                Ok(response)
            });
        }

        // Store auth context in request extensions for the handlers.
        req.extensions_mut().insert(auth_ctx);

        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move { inner.call(req).await })
    }
}
