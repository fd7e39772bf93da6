use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use gatehouse_core::{EmailClient, KvStore, UserStore};
use serde_json::json;

use crate::{error::ApiError, state::AuthState};

/// Full validity check for the presented access token: signature, expiry,
/// denylist and live session.
#[tracing::instrument(name = "VerifyToken", skip_all)]
pub async fn verify_token<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let token = jar
        .get(&state.cookies.access_name)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(ApiError::InvalidToken)?;

    let claims = state.access_guard.validate(&token).await?;

    Ok(Json(json!({ "userId": claims.sub })))
}
