use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use gatehouse_core::{EmailClient, KvStore, UserStore};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AuthState};

use super::{client_ip, user_agent};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}

/// Tokens are returned in the body as well as in cookies so non-browser
/// clients can use the API without a cookie jar.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let pair = state
        .login_use_case()
        .execute(
            &request.email,
            request.password,
            user_agent(&headers),
            client_ip(&headers),
        )
        .await?;

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            state
                .cookies
                .access_cookie(&pair.access.token, pair.access.expires_in_seconds),
        ),
        (
            SET_COOKIE,
            state
                .cookies
                .refresh_cookie(&pair.refresh.token, pair.refresh.expires_in_seconds),
        ),
    ]);

    Ok((
        cookies,
        Json(TokenResponse {
            access_token: pair.access.token,
            refresh_token: pair.refresh.token,
            expires_in: pair.access.expires_in_seconds,
        }),
    ))
}
