use std::collections::{BTreeMap, HashMap};

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ChargeCycle, EngineError, Expense, ExpenseUpdate, MoneyCents, NewExpense, ResultEngine,
    categories, charge_cycles, expense_categories, expenses,
    util::{normalize_display, normalize_key, normalize_optional_text},
};

use super::{
    Engine,
    charge_cycles::{cycle_by_id, expense_cycle},
    with_tx,
};

fn validate_value(value: MoneyCents) -> ResultEngine<()> {
    if value.is_negative() {
        return Err(EngineError::InvalidAmount(
            "expense value must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn expense_from(model: expenses::Model, cycle: ChargeCycle, categories: Vec<String>) -> Expense {
    Expense {
        id: model.id,
        budget_id: model.budget_id,
        name: model.name,
        value: MoneyCents::new(model.value_minor),
        description: model.description,
        charge_cycle: cycle,
        category_id: model.category_id,
        categories,
    }
}

impl Engine {
    /// Add an expense to a budget (owner or admin).
    ///
    /// Every name in `categories` must already exist in the budget; tags are
    /// never created implicitly. The row and its tags are written in one DB
    /// transaction.
    pub async fn add_expense(&self, new: NewExpense, user_id: Uuid) -> ResultEngine<Expense> {
        let name = normalize_display(&new.name, "expense")?;
        validate_value(new.value)?;
        let description = normalize_optional_text(new.description.as_deref());

        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, new.budget_id).await?;
            let cycle = expense_cycle(&db_tx, new.charge_cycle.trim()).await?;
            self.require_budget_write(&db_tx, new.budget_id, user_id, EngineError::Unauthorized)
                .await?;

            if let Some(category_id) = new.category_id {
                require_category_in_budget(&db_tx, new.budget_id, category_id).await?;
            }
            let tags = resolve_tags(&db_tx, new.budget_id, &new.categories).await?;

            let model = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                budget_id: ActiveValue::Set(new.budget_id),
                name: ActiveValue::Set(name),
                value_minor: ActiveValue::Set(new.value.cents()),
                description: ActiveValue::Set(description),
                charge_cycle_id: ActiveValue::Set(cycle.id),
                category_id: ActiveValue::Set(new.category_id),
            }
            .insert(&db_tx)
            .await?;
            insert_tags(&db_tx, model.id, tags.keys().copied()).await?;

            let mut names: Vec<String> = tags.into_values().collect();
            names.sort();
            Ok(expense_from(model, cycle.into(), names))
        })
    }

    /// Fetch an expense with its charge cycle and tags. No access check.
    pub async fn get_expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        expense_view(&self.database, model).await
    }

    /// Fetch an expense the user can read.
    pub async fn get_expense_for_user(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = require_expense(&db_tx, expense_id).await?;
            self.require_budget_read(&db_tx, model.budget_id, user_id, EngineError::Unauthorized)
                .await?;
            expense_view(&db_tx, model).await
        })
    }

    /// Every expense of a budget, ordered by id (owner, admin or viewer).
    pub async fn list_expenses_for_budget(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, budget_id, user_id, EngineError::Unauthorized)
                .await?;
            expenses_in_budget(&db_tx, budget_id).await
        })
    }

    /// Replace an expense's fields (owner or admin of its budget).
    ///
    /// The budget an expense belongs to cannot change.
    pub async fn update_expense(
        &self,
        update: ExpenseUpdate,
        user_id: Uuid,
    ) -> ResultEngine<Expense> {
        let name = normalize_display(&update.name, "expense")?;
        validate_value(update.value)?;
        let description = normalize_optional_text(update.description.as_deref());

        with_tx!(self, |db_tx| {
            let current = require_expense(&db_tx, update.id).await?;
            self.require_budget_write(
                &db_tx,
                current.budget_id,
                user_id,
                EngineError::Unauthorized,
            )
            .await?;
            let cycle = expense_cycle(&db_tx, update.charge_cycle.trim()).await?;

            if let Some(names) = update.categories.as_ref() {
                let tags = resolve_tags(&db_tx, current.budget_id, names).await?;
                expense_categories::Entity::delete_many()
                    .filter(expense_categories::Column::ExpenseId.eq(current.id))
                    .exec(&db_tx)
                    .await?;
                insert_tags(&db_tx, current.id, tags.keys().copied()).await?;
            }

            let mut active: expenses::ActiveModel = current.into();
            active.name = ActiveValue::Set(name);
            active.value_minor = ActiveValue::Set(update.value.cents());
            active.description = ActiveValue::Set(description);
            active.charge_cycle_id = ActiveValue::Set(cycle.id);
            let model = active.update(&db_tx).await?;

            expense_view(&db_tx, model).await
        })
    }

    /// Delete one expense of `budget_id` (owner or admin).
    pub async fn delete_expense(
        &self,
        expense_id: Uuid,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_expense(&db_tx, expense_id).await?;
            if model.budget_id != budget_id {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }
            self.require_budget_write(&db_tx, model.budget_id, user_id, EngineError::Unauthorized)
                .await?;

            expense_categories::Entity::delete_many()
                .filter(expense_categories::Column::ExpenseId.eq(expense_id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Delete every expense of a budget (owner-only). Returns how many rows
    /// were removed.
    pub async fn delete_all_expenses_for_budget(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            self.require_budget_owner(&db_tx, budget_id, user_id, EngineError::Unauthorized)
                .await?;
            self.delete_expenses_in_budget(&db_tx, budget_id).await
        })
    }

    /// Caller must have authorized the budget owner.
    pub(super) async fn delete_expenses_in_budget(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultEngine<u64> {
        let ids: Vec<Uuid> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Id)
            .filter(expenses::Column::BudgetId.eq(budget_id))
            .into_tuple()
            .all(db)
            .await?;
        delete_expenses(db, ids).await
    }
}

/// Delete the expenses whose primary category is `category_id`, with their
/// tags.
pub(super) async fn delete_expenses_with_primary_category(
    db: &DatabaseTransaction,
    category_id: Uuid,
) -> ResultEngine<u64> {
    let ids: Vec<Uuid> = expenses::Entity::find()
        .select_only()
        .column(expenses::Column::Id)
        .filter(expenses::Column::CategoryId.eq(category_id))
        .into_tuple()
        .all(db)
        .await?;
    delete_expenses(db, ids).await
}

async fn delete_expenses(db: &DatabaseTransaction, ids: Vec<Uuid>) -> ResultEngine<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    expense_categories::Entity::delete_many()
        .filter(expense_categories::Column::ExpenseId.is_in(ids.clone()))
        .exec(db)
        .await?;
    let deleted = expenses::Entity::delete_many()
        .filter(expenses::Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(deleted.rows_affected)
}

async fn require_expense(db: &DatabaseTransaction, expense_id: Uuid) -> ResultEngine<expenses::Model> {
    expenses::Entity::find_by_id(expense_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
}

async fn require_category_in_budget(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    category_id: Uuid,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(categories::Column::BudgetId.eq(budget_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::UnknownCategory(category_id.to_string()))
}

/// Resolve tag names to category ids within a budget, case-insensitively.
/// Duplicate names collapse to one tag.
async fn resolve_tags(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    names: &[String],
) -> ResultEngine<BTreeMap<Uuid, String>> {
    let mut resolved = BTreeMap::new();
    for name in names {
        let display = normalize_display(name, "category")
            .map_err(|_| EngineError::UnknownCategory(name.clone()))?;
        let category = categories::Entity::find()
            .filter(categories::Column::BudgetId.eq(budget_id))
            .filter(categories::Column::NameNorm.eq(normalize_key(&display)))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::UnknownCategory(display.clone()))?;
        resolved.insert(category.id, category.name);
    }
    Ok(resolved)
}

async fn insert_tags(
    db: &DatabaseTransaction,
    expense_id: Uuid,
    category_ids: impl Iterator<Item = Uuid>,
) -> ResultEngine<()> {
    for category_id in category_ids {
        expense_categories::ActiveModel {
            expense_id: ActiveValue::Set(expense_id),
            category_id: ActiveValue::Set(category_id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Tag names per expense, sorted.
async fn tag_names<C: ConnectionTrait>(
    db: &C,
    expense_ids: Vec<Uuid>,
) -> ResultEngine<HashMap<Uuid, Vec<String>>> {
    let mut tags: HashMap<Uuid, Vec<String>> = HashMap::new();
    if expense_ids.is_empty() {
        return Ok(tags);
    }
    let rows = expense_categories::Entity::find()
        .filter(expense_categories::Column::ExpenseId.is_in(expense_ids))
        .find_also_related(categories::Entity)
        .all(db)
        .await?;
    for (row, category) in rows {
        if let Some(category) = category {
            tags.entry(row.expense_id).or_default().push(category.name);
        }
    }
    for names in tags.values_mut() {
        names.sort();
    }
    Ok(tags)
}

async fn expense_view<C: ConnectionTrait>(db: &C, model: expenses::Model) -> ResultEngine<Expense> {
    let cycle = cycle_by_id(db, model.charge_cycle_id).await?;
    let mut tags = tag_names(db, vec![model.id]).await?;
    let names = tags.remove(&model.id).unwrap_or_default();
    Ok(expense_from(model, cycle.into(), names))
}

/// Expenses of a budget ordered by id, with cycles and tags resolved.
pub(super) async fn expenses_in_budget<C: ConnectionTrait>(
    db: &C,
    budget_id: Uuid,
) -> ResultEngine<Vec<Expense>> {
    let models = expenses::Entity::find()
        .filter(expenses::Column::BudgetId.eq(budget_id))
        .order_by_asc(expenses::Column::Id)
        .all(db)
        .await?;

    let cycles: HashMap<i32, ChargeCycle> = charge_cycles::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, ChargeCycle::from(m)))
        .collect();
    let mut tags = tag_names(db, models.iter().map(|m| m.id).collect()).await?;

    models
        .into_iter()
        .map(|model| {
            let cycle = cycles.get(&model.charge_cycle_id).cloned().ok_or_else(|| {
                EngineError::KeyNotFound(format!(
                    "expense charge cycle {}",
                    model.charge_cycle_id
                ))
            })?;
            let names = tags.remove(&model.id).unwrap_or_default();
            Ok(expense_from(model, cycle, names))
        })
        .collect()
}
