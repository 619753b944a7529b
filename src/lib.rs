//! Bearer-token authorization decision engine for API Gateway style
//! TOKEN authorizers backed by a Cognito user pool.
//!
//! The decision pipeline lives in [`services::authorizer`]; the rest of the
//! crate is the HTTP host around it.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
