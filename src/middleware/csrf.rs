//! Synchronizer-token CSRF protection.
//!
//! Every GET hands out a fresh token in a script-readable cookie. Unsafe
//! requests must echo that token in a header; the cookie and header are
//! compared and nothing is stored server-side.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::ApiError;

pub const CSRF_COOKIE: &str = "_csrf";
pub const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

#[derive(Debug, Clone)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: HeaderName,
    /// Only send the cookie over HTTPS.
    pub cookie_secure: bool,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: CSRF_COOKIE.to_string(),
            header_name: CSRF_HEADER,
            cookie_secure: false,
        }
    }
}

impl CsrfConfig {
    fn set_cookie(&self, token: &str) -> String {
        let mut cookie = format!("{}={}; Path=/; SameSite=Lax", self.cookie_name, token);
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn cookie_token<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, token)| token)
    }

    fn header_token<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers.get(&self.header_name)?.to_str().ok()
    }

    /// Both sides present, non-empty and equal.
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        match (self.cookie_token(headers), self.header_token(headers)) {
            (Some(cookie), Some(header)) => !cookie.is_empty() && cookie == header,
            _ => false,
        }
    }
}

pub fn issue_token() -> String {
    Uuid::new_v4().to_string()
}

pub async fn csrf(State(config): State<Arc<CsrfConfig>>, request: Request, next: Next) -> Response {
    match *request.method() {
        Method::GET => {
            let token = issue_token();
            let mut response = next.run(request).await;
            match HeaderValue::from_str(&config.set_cookie(&token)) {
                Ok(cookie) => {
                    response.headers_mut().append(SET_COOKIE, cookie);
                }
                Err(err) => tracing::warn!(error = %err, "csrf cookie is not a valid header value"),
            }
            response
        }
        Method::HEAD | Method::OPTIONS | Method::TRACE => next.run(request).await,
        _ => {
            if config.verify(request.headers()) {
                next.run(request).await
            } else {
                tracing::debug!(method = %request.method(), uri = %request.uri(), "csrf token mismatch");
                ApiError::Csrf.into_response()
            }
        }
    }
}
