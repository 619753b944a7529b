//! Allow decision in the API Gateway authorizer response shape.

use serde::Serialize;

use super::claims::AccessClaims;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDecision {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: DecisionContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: &'static str,
    pub effect: Effect,
    pub resource: String,
}

/// Only `Allow` exists: denial is an error, never a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionContext {
    pub username: String,
    pub scope: String,
}

impl AuthorizationDecision {
    /// Grant `execute-api:Invoke` on exactly `resource`.
    pub fn allow(claims: &AccessClaims, resource: &str) -> Self {
        let principal_id = claims
            .sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();

        let username = claims.username.as_deref().unwrap_or(UNKNOWN).to_string();

        Self {
            principal_id,
            policy_document: PolicyDocument {
                version: POLICY_VERSION,
                statement: vec![Statement {
                    action: INVOKE_ACTION,
                    effect: Effect::Allow,
                    resource: resource.to_string(),
                }],
            },
            context: DecisionContext {
                username,
                scope: claims.scope.clone(),
            },
        }
    }
}
