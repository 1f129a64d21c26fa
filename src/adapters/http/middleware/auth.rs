//! Authentication middleware and extractor for axum.
//!
//! The middleware uses the `SessionValidator` port, so the same code serves
//! the JWT validator in production and fixed tokens in tests.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedSubject into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads it back
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthenticatedSubject, ErrorCode};
use crate::ports::SessionValidator;

use crate::adapters::http::error::{ApiError, ErrorResponse};

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Validates `Authorization: Bearer <token>` when present.
///
/// A valid token puts the `AuthenticatedSubject` into request extensions.
/// No header lets the request through unauthenticated; `RequireAuth` then
/// refuses it. A bad token is refused here with 401.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(&token).await {
        Ok(subject) => {
            request.extensions_mut().insert(subject);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %request.uri().path(), "Rejected bearer token");
            ApiError::from(e).into_response()
        }
    }
}

/// Extractor that requires an authenticated subject.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedSubject);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedSubject>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(ErrorCode::Unauthorized, "Authentication required")),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::{Role, UserId};
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn subject() -> AuthenticatedSubject {
        AuthenticatedSubject::new(UserId::new("manager-1").unwrap(), Role::LabManager)
    }

    async fn whoami(RequireAuth(subject): RequireAuth) -> String {
        format!("{}:{}", subject.id, subject.role)
    }

    fn app() -> Router {
        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_subject("good", subject()));
        Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(validator, auth_middleware))
    }

    fn request(auth: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/me");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let response = app().oneshot(request(Some("Bearer good"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"manager-1:LAB_MANAGER");
    }

    #[tokio::test]
    async fn missing_token_is_401_from_extractor() {
        let response = app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_token_is_401_from_middleware() {
        let response = app().oneshot(request(Some("Bearer forged"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn require_auth_extracts_subject_from_extensions() {
        use axum::extract::FromRequestParts;

        let mut request: axum::http::Request<()> =
            axum::http::Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(subject());
        let (mut parts, _body) = request.into_parts();

        let RequireAuth(found) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, subject());
    }
}
