use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use axum_extra::extract::CookieJar;
use gatehouse_application::TokenCodec;
use gatehouse_core::{EmailClient, KvStore, UserStore};
use serde_json::json;

use crate::state::AuthState;

/// Tears down whatever the cookies identify and always reports success.
///
/// Tokens are decoded without signature or expiry checks; an expired login
/// must still be able to clean up after itself.
#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout<U, K, E>(
    State(state): State<AuthState<U, K, E>>,
    jar: CookieJar,
) -> impl IntoResponse
where
    U: UserStore + Clone + 'static,
    K: KvStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let access_token = jar
        .get(&state.cookies.access_name)
        .map(|cookie| cookie.value().to_owned());
    let refresh_token = jar
        .get(&state.cookies.refresh_name)
        .map(|cookie| cookie.value().to_owned());

    let refresh_claims = refresh_token.as_deref().and_then(TokenCodec::decode_unsafe);
    let access_claims = access_token.as_deref().and_then(TokenCodec::decode_unsafe);

    let session_id = refresh_claims
        .as_ref()
        .map(|claims| claims.sid.clone())
        .or_else(|| access_claims.as_ref().map(|claims| claims.sid.clone()));
    let refresh_jti = refresh_claims
        .map(|claims| claims.jti)
        .filter(|jti| !jti.is_empty());

    state
        .logout_use_case()
        .execute(session_id, refresh_jti, access_token)
        .await;

    let cookies = AppendHeaders([
        (SET_COOKIE, state.cookies.access_removal_cookie()),
        (SET_COOKIE, state.cookies.refresh_removal_cookie()),
    ]);

    (cookies, Json(json!({ "success": true })))
}
