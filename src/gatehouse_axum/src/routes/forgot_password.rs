use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use gatehouse_core::{EmailClient, KvStore, UserStore};
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiError, state::AuthState};

use super::client_ip;

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Acknowledges identically for known and unknown addresses; only rate
/// limiting produces a distinguishable response.
#[tracing::instrument(name = "ForgotPassword", skip_all)]
pub async fn forgot_password<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    headers: HeaderMap,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    state
        .forgot_password_use_case()
        .execute(&request.email, client_ip(&headers))
        .await?;

    Ok(Json(json!({ "success": true })))
}
