//! Request logging middleware.
//!
//! Logs one line when a request starts and one when it completes, under the
//! `api` target. Credentials are reduced to a short label.

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::HeaderMap;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER};

/// Characters of an API key that may appear in logs.
const LOGGED_KEY_CHARS: usize = 8;

/// Describe the credentials on a request without revealing them.
fn caller_label(headers: &HeaderMap) -> String {
    if headers.contains_key(ADMIN_KEY_HEADER) {
        return "admin-key".to_string();
    }

    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(key) if key.chars().count() >= LOGGED_KEY_CHARS => {
            let prefix: String = key.chars().take(LOGGED_KEY_CHARS).collect();
            format!("{}...", prefix)
        }
        Some(_) => "invalid".to_string(),
        None => "none".to_string(),
    }
}

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query = req.query_string().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let caller = caller_label(req.headers());

        info!(
            target: "api",
            method = %method,
            path = %path,
            query = %query,
            remote_addr = %remote_addr,
            caller = %caller,
            "Request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let elapsed = start.elapsed();
            let status = res.status();
            let status_code = status.as_u16();

            if status.is_server_error() {
                error!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status_code,
                    duration_ms = %elapsed.as_millis(),
                    "Server error"
                );
            } else if status.is_client_error() {
                warn!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status_code,
                    duration_ms = %elapsed.as_millis(),
                    caller = %caller,
                    "Client error"
                );
            } else {
                info!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status_code,
                    duration_ms = %elapsed.as_millis(),
                    "Request completed"
                );
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::{HeaderName, HeaderValue};

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn test_caller_label() {
        assert_eq!(caller_label(&headers(&[])), "none");
        assert_eq!(
            caller_label(&headers(&[("x-api-key", "nh_0123456789abcdef")])),
            "nh_01234..."
        );
        assert_eq!(caller_label(&headers(&[("x-api-key", "short")])), "invalid");
        assert_eq!(
            caller_label(&headers(&[("x-admin-key", "whatever"), ("x-api-key", "nh_0123456789")])),
            "admin-key"
        );
    }
}
