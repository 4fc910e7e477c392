//! Bank accounts registered through the transaction provider.
//!
//! The access token is kept on the model only, sealed with
//! [`TokenCipher`](crate::TokenCipher). [`ExternalAccount`] never carries it.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExternalAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub institutional_id: String,
    pub account_name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "external_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub institutional_id: String,
    /// `base64(nonce || ciphertext)`, never the raw token.
    pub access_token: String,
    pub account_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(has_many = "super::sources::Entity")]
    Sources,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ExternalAccount {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            institutional_id: model.institutional_id,
            account_name: model.account_name,
        }
    }
}
