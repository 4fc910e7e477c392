//! Registration and profile endpoints. These run before the caller has a
//! `User`, so they only see the verified external id.

use api_types::user::{UserRegister, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{User, UserProfile};

use crate::{ServerError, server::{ExternalId, ServerState}};

pub(crate) fn map_user(user: User) -> UserView {
    UserView {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        phone: user.phone,
        registration_date: user.registration_date,
    }
}

pub async fn register(
    Extension(ExternalId(external_id)): Extension<ExternalId>,
    State(state): State<ServerState>,
    Json(payload): Json<UserRegister>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(
            &external_id,
            UserProfile {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                phone: payload.phone,
            },
        )
        .await?;
    tracing::info!("registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn profile(
    Extension(ExternalId(external_id)): Extension<ExternalId>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user_by_external_id(&external_id).await?;
    Ok(Json(map_user(user)))
}
