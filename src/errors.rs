use actix_web::HttpResponse;
use thiserror::Error;

use crate::validation::Violations;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Violations),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Violations> for AppError {
    fn from(v: Violations) -> Self {
        AppError::Validation(v)
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(violations) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "errors": violations
                }))
            }
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn validation_returns_422() {
        let mut v = Violations::new();
        v.add("customer_name", "is required");
        let resp = AppError::Validation(v).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display() {
        assert_eq!(AppError::NotFound.to_string(), "Not found");
    }

    #[test]
    fn internal_error_display() {
        assert_eq!(
            AppError::Internal("msg".to_string()).to_string(),
            "Internal error: msg"
        );
    }

    #[test]
    fn violations_convert_to_validation_variant() {
        let mut v = Violations::new();
        v.add("email", "must be a valid email address");
        let app_err: AppError = v.into();
        assert!(matches!(app_err, AppError::Validation(_)));
    }

    #[test]
    fn diesel_not_found_maps_to_app_not_found() {
        let app_err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(app_err, AppError::NotFound));
    }
}
