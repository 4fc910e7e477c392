use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CategoryMapping, EngineError, ResultEngine, categories, category_mappings,
    expense_categories,
    util::{normalize_display, normalize_key},
};

use super::{Engine, expenses::delete_expenses_with_primary_category, with_tx};

impl Engine {
    /// Add a transaction category to a budget (owner or admin).
    ///
    /// Names are unique per budget, compared case-insensitively.
    pub async fn create_category(
        &self,
        budget_id: Uuid,
        name: &str,
        user_id: Uuid,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;

            let display = normalize_display(name, "category")?;
            let name_norm = normalize_key(&display);
            let exists = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(budget_id))
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(display));
            }

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                budget_id: ActiveValue::Set(budget_id),
                name: ActiveValue::Set(display),
                name_norm: ActiveValue::Set(name_norm),
            }
            .insert(&db_tx)
            .await?;

            Ok(Category::from(model))
        })
    }

    /// Categories of a budget sorted by name (owner, admin or viewer).
    pub async fn list_categories(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;
            let rows = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(budget_id))
                .order_by_asc(categories::Column::NameNorm)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Category::from).collect::<Vec<_>>())
        })
    }

    /// Delete a category and everything that depends on it (owner or admin).
    ///
    /// Expenses whose primary category is this one are deleted too. Other
    /// expenses only lose the tag.
    pub async fn delete_category(&self, category_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            self.require_budget_write(&db_tx, category.budget_id, user_id, EngineError::Forbidden)
                .await?;

            let removed = delete_expenses_with_primary_category(&db_tx, category_id).await?;
            expense_categories::Entity::delete_many()
                .filter(expense_categories::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            category_mappings::Entity::delete_many()
                .filter(category_mappings::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            tracing::info!("deleted category {category_id} and {removed} expenses");

            Ok(())
        })
    }

    /// Map a literal bank-transaction description to a budget category
    /// (owner or admin).
    ///
    /// Registering the same description again re-points the existing mapping,
    /// so the most recent registration wins.
    pub async fn categorize_transaction(
        &self,
        budget_id: Uuid,
        description: &str,
        category_name: &str,
        user_id: Uuid,
    ) -> ResultEngine<CategoryMapping> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(EngineError::InvalidName(
                "transaction description must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;

            let category = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(budget_id))
                .filter(categories::Column::NameNorm.eq(normalize_key(category_name.trim())))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::UnknownCategory(category_name.trim().to_string()))?;

            let existing = category_mappings::Entity::find()
                .filter(category_mappings::Column::BudgetId.eq(budget_id))
                .filter(category_mappings::Column::TransactionName.eq(description.clone()))
                .one(&db_tx)
                .await?;
            let model = match existing {
                Some(mapping) => {
                    let mut active: category_mappings::ActiveModel = mapping.into();
                    active.category_id = ActiveValue::Set(category.id);
                    active.created_at = ActiveValue::Set(Utc::now());
                    active.update(&db_tx).await?
                }
                None => {
                    category_mappings::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4()),
                        budget_id: ActiveValue::Set(budget_id),
                        category_id: ActiveValue::Set(category.id),
                        transaction_name: ActiveValue::Set(description),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?
                }
            };

            Ok(CategoryMapping::from(model))
        })
    }

    /// Description mappings of a budget (owner, admin or viewer).
    pub async fn list_category_mappings(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<CategoryMapping>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;
            let rows = category_mappings::Entity::find()
                .filter(category_mappings::Column::BudgetId.eq(budget_id))
                .order_by_asc(category_mappings::Column::TransactionName)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(CategoryMapping::from).collect::<Vec<_>>())
        })
    }
}

/// Description to category name lookup for a budget.
///
/// Rows are applied oldest first, so the last registered mapping for a
/// description wins.
pub(super) async fn mapping_lookup<C: ConnectionTrait>(
    db: &C,
    budget_id: Uuid,
) -> ResultEngine<HashMap<String, String>> {
    let rows = category_mappings::Entity::find()
        .filter(category_mappings::Column::BudgetId.eq(budget_id))
        .order_by_asc(category_mappings::Column::CreatedAt)
        .find_also_related(categories::Entity)
        .all(db)
        .await?;

    let mut lookup = HashMap::new();
    for (mapping, category) in rows {
        if let Some(category) = category {
            lookup.insert(mapping.transaction_name, category.name);
        }
    }
    Ok(lookup)
}
