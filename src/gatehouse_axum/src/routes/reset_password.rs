use axum::{Json, extract::State, response::IntoResponse};
use gatehouse_core::{EmailClient, KvStore, UserStore};
use secrecy::Secret;
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiError, state::AuthState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: Secret<String>,
}

#[tracing::instrument(name = "ResetPassword", skip_all)]
pub async fn reset_password<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    state
        .reset_password_use_case()
        .execute(&request.token, request.new_password)
        .await?;

    Ok(Json(json!({ "success": true })))
}
