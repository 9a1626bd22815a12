//! Authorization guard middleware for axum
//!
//! A tower layer that verifies the `Authorization: Bearer` access token and
//! stashes the authenticated identity in request extensions. The guard is
//! stateless: verification is a signature and claims check with no database
//! round trip, which is also why a disable or role change does not bite
//! until outstanding access tokens expire.
//!
//! Requests with no credentials pass through without a user context;
//! per-route extractors decide whether authentication is required.

use axum::{body::Body, extract::Request, http::StatusCode, response::Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::{AuthError, ErrorResponse};
use crate::token::TokenIssuer;

/// Authorization guard layer
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenIssuer>,
}

impl AuthLayer {
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
        }
    }
}

/// Authorization guard service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenIssuer>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let tokens = self.tokens.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match bearer_token(req.headers()) {
                Some(token) => match tokens.authenticate(&token) {
                    Ok(user) => {
                        let (mut parts, body) = req.into_parts();
                        parts.extensions.insert(user);
                        let req = Request::from_parts(parts, body);
                        inner.call(req).await
                    }
                    Err(e) => Ok(auth_error_response(e)),
                },
                // No credentials: let the request through without a user
                // context; extractors reject where auth is required.
                None => inner.call(req).await,
            }
        })
    }
}

/// Extract the bearer token from the Authorization header, if any
fn bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(String::from)
}

/// Build the JSON error response for an auth failure
pub fn auth_error_response(error: AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(&error);

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_error_response_status() {
        let response = auth_error_response(AuthError::Unauthenticated);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = auth_error_response(AuthError::Forbidden);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
