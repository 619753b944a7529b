/*
 * Responsibility
 * - POST /authorize (TOKEN authorizer event → AuthorizationDecision)
 * - 判定ロジックは services::authorizer に置く。ここは変換のみ
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::dto::authorize::TokenAuthorizerEvent,
    error::AppError,
    services::authorizer::{AuthorizationDecision, AuthorizationRequest},
    state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    Json(event): Json<TokenAuthorizerEvent>,
) -> Result<Json<AuthorizationDecision>, AppError> {
    let req = AuthorizationRequest::from(event);
    let decision = state.authorizer.authorize(&req).await?;

    Ok(Json(decision))
}
