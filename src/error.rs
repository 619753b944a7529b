/*
 * Responsibility
 * - HTTP 境界の AppError 定義
 * - IntoResponse 実装 (status + plain-text message のみ。構造化 error body は返さない)
 * - AuthorizationError → AppError の collapse (MissingCredential 以外は全て Unauthorized)
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::authorizer::AuthorizationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No bearer token!")]
    MissingCredential,

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MissingCredential => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}

impl From<AuthorizationError> for AppError {
    fn from(e: AuthorizationError) -> Self {
        // The cause was already logged by the pipeline.
        match e {
            AuthorizationError::MissingCredential => AppError::MissingCredential,
            AuthorizationError::VerificationFailed(_)
            | AuthorizationError::WrongTokenType(_)
            | AuthorizationError::InsufficientScope(_) => AppError::Unauthorized,
        }
    }
}
