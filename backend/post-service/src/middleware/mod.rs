/// HTTP middleware for post-service
///
/// - `JwtAuthMiddleware`: verifies the bearer token and stores the caller
///   identity in request extensions
/// - `AuthenticatedUser`: extractor for that identity
/// - `MetricsMiddleware`: request latency histogram and debug log
use crate::error::AppError;
use crate::metrics::HTTP_REQUEST_DURATION_SECONDS;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::JwtKeys;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Caller identity stored in request extensions after auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Verify an `Authorization` header value against `keys`.
pub fn authenticate(header: Option<&str>, keys: &JwtKeys) -> Result<AuthenticatedUser, AppError> {
    let header =
        header.ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Invalid Authorization scheme".into()))?;

    let (user_id, username) = keys
        .identity_from_token(token.trim())
        .map_err(|_| AppError::Unauthenticated("Invalid or expired token".into()))?;

    Ok(AuthenticatedUser { user_id, username })
}

/// Actix middleware that validates a Bearer token with the shared HS256 keys.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    keys: Arc<JwtKeys>,
}

impl JwtAuthMiddleware {
    pub fn new(keys: Arc<JwtKeys>) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        match authenticate(header, &self.keys) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let service = self.service.clone();

                Box::pin(async move {
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                })
            }
            Err(e) => {
                tracing::debug!(path = %req.path(), error = %e, "Rejected request");
                let response = req.error_response(e).map_into_right_body();

                Box::pin(async move { Ok(response) })
            }
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("User not authenticated".into())),
        )
    }
}

// =====================================================================
// Metrics middleware
// =====================================================================

pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        // Route pattern keeps label cardinality bounded
        let path = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed();

            let status = match &res {
                Ok(resp) => resp.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };

            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[&method, &path, &status.to_string()])
                .observe(elapsed.as_secs_f64());

            tracing::debug!(
                %method,
                %path,
                status,
                elapsed_ms = elapsed.as_millis() as u64,
                "request completed"
            );
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "middleware-test-secret-0123456789abcdef";

    #[test]
    fn test_authenticate_accepts_valid_bearer() {
        let keys = JwtKeys::from_secret(SECRET);
        let user_id = Uuid::new_v4();
        let token = keys.generate_access_token(user_id, "alice").unwrap();

        let user = authenticate(Some(&format!("Bearer {}", token)), &keys).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn test_authenticate_rejects_missing_header() {
        let keys = JwtKeys::from_secret(SECRET);
        assert!(matches!(
            authenticate(None, &keys),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_authenticate_rejects_wrong_scheme() {
        let keys = JwtKeys::from_secret(SECRET);
        let token = keys.generate_access_token(Uuid::new_v4(), "alice").unwrap();
        assert!(authenticate(Some(&format!("Basic {}", token)), &keys).is_err());
    }

    #[test]
    fn test_authenticate_rejects_foreign_signature() {
        let keys = JwtKeys::from_secret(SECRET);
        let other = JwtKeys::from_secret("some-other-secret-0123456789abcdefgh");
        let token = other.generate_access_token(Uuid::new_v4(), "mallory").unwrap();
        assert!(authenticate(Some(&format!("Bearer {}", token)), &keys).is_err());
    }
}
