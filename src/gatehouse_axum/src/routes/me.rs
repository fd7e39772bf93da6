use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use gatehouse_core::{EmailClient, KvStore, UserStore};

use crate::{error::ApiError, state::AuthState};

#[tracing::instrument(name = "Me", skip_all)]
pub async fn me<U, K, E>(
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

    let profile = state.get_profile_use_case().execute(&claims.sub).await?;

    Ok(Json(profile))
}
