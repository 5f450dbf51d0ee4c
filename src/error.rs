use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

use crate::gacha::GachaError;
use crate::models::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Insufficient funds: balance {balance}, cost {cost}")]
    InsufficientFunds { balance: i64, cost: i64 },

    #[error("No eligible rewards")]
    NoEligibleRewards,

    #[error("Transaction failed: {0}")]
    TransactionFailed(DbErr),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl From<GachaError> for AppError {
    fn from(err: GachaError) -> Self {
        match err {
            GachaError::NoEligibleRewards => AppError::NoEligibleRewards,
            GachaError::InvalidConfiguration(msg) => AppError::InvalidConfiguration(msg),
        }
    }
}

impl AppError {
    /// 调用方可以整体重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransactionFailed(_))
    }

    /// 错误码 (与响应体中的 code 一致)
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            AppError::NoEligibleRewards => "NO_ELIGIBLE_REWARDS",
            AppError::TransactionFailed(_) => "TRANSACTION_FAILED",
            AppError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::ConfigError(_) | AppError::InternalError(_) | AppError::SerdeJsonError(_) => {
                "INTERNAL_ERROR"
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::InsufficientFunds { .. } | AppError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NoEligibleRewards => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TransactionFailed(_) => StatusCode::CONFLICT,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InsufficientFunds { balance, cost } => {
                log::warn!("Insufficient funds: balance {balance}, cost {cost}");
                "Not enough coins".to_string()
            }
            AppError::NoEligibleRewards => {
                log::warn!("Roll requested but no eligible rewards are configured");
                "No rewards are currently available".to_string()
            }
            AppError::TransactionFailed(err) => {
                log::error!("Roll transaction failed: {err}");
                "Roll could not be completed, please retry".to_string()
            }
            AppError::InvalidConfiguration(msg) => {
                log::error!("Invalid gacha configuration: {msg}");
                "Reward configuration is invalid".to_string()
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                "Invalid access token".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                "Forbidden".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.code(), message))
    }
}
