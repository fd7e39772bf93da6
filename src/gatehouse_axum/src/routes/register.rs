use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use gatehouse_core::{EmailClient, KvStore, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use crate::{error::ApiError, state::AuthState};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let profile = state
        .register_use_case()
        .execute(&request.name, &request.email, request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}
