//! Actix-web extractor for API key authentication.
//!
//! Header values are wrapped in `SecretString` as soon as they are read and are
//! never logged.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::AdminKey;
use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER};
use crate::db::DbPool;
use crate::error::{AppError, ErrorResponse};
use crate::models::AuthenticatedCaller;
use crate::services::api_key;

/// Extract a secret header value, wrapping it in SecretString.
/// Returns None if the header is missing or invalid UTF-8.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|s| SecretString::from(s.to_string()))
}

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: String,
}

impl AuthError {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized(message) => Self::unauthorized(message),
            other => {
                tracing::error!("API key verification failed: {}", other);
                Self::internal("Failed to verify API key")
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        let error = if self.status == StatusCode::UNAUTHORIZED {
            "UNAUTHORIZED"
        } else {
            "INTERNAL_ERROR"
        };
        HttpResponse::build(self.status).json(ErrorResponse {
            error: error.to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid admin key or API key.
///
/// ```ignore
/// async fn protected_handler(auth: ApiKeyAuth) -> impl Responder {
///     // auth.caller contains the authenticated caller info
/// }
/// ```
///
/// `X-Admin-Key` is checked first and yields the bootstrap caller. Otherwise
/// `X-API-Key` is hashed and looked up.
pub struct ApiKeyAuth {
    pub caller: AuthenticatedCaller,
}

impl FromRequest for ApiKeyAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let stored_admin_key = req.app_data::<web::Data<AdminKey>>().cloned();

        let provided_api_key = extract_secret_header(req, API_KEY_HEADER);
        let provided_admin_key = extract_secret_header(req, ADMIN_KEY_HEADER);

        Box::pin(async move {
            if let Some(provided) = provided_admin_key {
                let verified = stored_admin_key
                    .as_ref()
                    .is_some_and(|key| key.verify(provided.expose_secret()));
                if verified {
                    return Ok(ApiKeyAuth {
                        caller: AuthenticatedCaller::bootstrap(),
                    });
                }
                debug!("Rejected admin key");
                if provided_api_key.is_none() {
                    return Err(AuthError::unauthorized("Invalid admin key"));
                }
            }

            let Some(key) = provided_api_key else {
                return Err(AuthError::unauthorized(
                    "Missing API key. Provide X-API-Key header.",
                ));
            };

            let Some(pool) = pool else {
                return Err(AuthError::internal("Internal configuration error"));
            };

            let caller = api_key::verify_key(pool.get_ref(), key.expose_secret()).await?;
            Ok(ApiKeyAuth { caller })
        })
    }
}
