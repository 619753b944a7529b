/*
 * Responsibility
 * - API Gateway TOKEN authorizer event の request DTO
 * - response は AuthorizationDecision をそのまま serialize する
 */
use serde::Deserialize;

use crate::services::authorizer::AuthorizationRequest;

/// `type` (always "TOKEN") is accepted but not read; unknown fields are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthorizerEvent {
    #[serde(default)]
    pub authorization_token: Option<String>,
    pub method_arn: String,
}

impl From<TokenAuthorizerEvent> for AuthorizationRequest {
    fn from(event: TokenAuthorizerEvent) -> Self {
        Self {
            authorization_header: event.authorization_token,
            resource: event.method_arn,
        }
    }
}
