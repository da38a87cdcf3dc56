use crate::{
    api::{extract::AuthSession, response::Reply},
    core::token::Claims,
};

/// Returns the claims of a valid bearer token; the extractor rejects anything else with 401.
pub async fn current(AuthSession(claims): AuthSession) -> Reply<Claims> {
    Reply::ok(claims)
}
