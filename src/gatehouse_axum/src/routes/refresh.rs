use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use axum_extra::extract::CookieJar;
use gatehouse_core::{EmailClient, KvStore, UserStore};

use crate::{error::ApiError, state::AuthState};

use super::login::TokenResponse;

/// Rotates the refresh token presented in the cookie into a fresh pair.
///
/// Signature and expiry are checked here; the use case owns the stateful
/// checks (live session, unconsumed record).
#[tracing::instrument(name = "Refresh", skip_all)]
pub async fn refresh<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let token = jar
        .get(&state.cookies.refresh_name)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(ApiError::InvalidRefreshToken)?;

    let claims = state.codec.verify_refresh_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "refresh token rejected");
        ApiError::InvalidRefreshToken
    })?;

    let pair = state
        .refresh_use_case()
        .execute(&claims.sub, &claims.jti, &claims.sid)
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
