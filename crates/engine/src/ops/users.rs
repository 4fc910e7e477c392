use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, UserProfile, users,
    util::{normalize_display, normalize_optional_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register the user behind an identity-provider id.
    pub async fn register_user(&self, external_id: &str, profile: UserProfile) -> ResultEngine<User> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(EngineError::InvalidId(
                "external id must not be empty".to_string(),
            ));
        }
        let first_name = normalize_display(&profile.first_name, "first")?;
        let last_name = normalize_display(&profile.last_name, "last")?;
        let email = profile.email.trim().to_string();
        if email.is_empty() {
            return Err(EngineError::InvalidName("email must not be empty".to_string()));
        }

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::ExternalId.eq(external_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(external_id.to_string()));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                external_id: ActiveValue::Set(external_id.to_string()),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                email: ActiveValue::Set(email),
                phone: ActiveValue::Set(normalize_optional_text(profile.phone.as_deref())),
                registration_date: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!("registered user {}", model.id);

            Ok(User::from(model))
        })
    }

    /// Resolve the user behind an identity-provider id.
    pub async fn user_by_external_id(&self, external_id: &str) -> ResultEngine<User> {
        users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id))
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
