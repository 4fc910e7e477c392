use std::sync::Arc;

use chrono::NaiveDate;
use engine::{EngineError, MoneyCents, NewExpense};
use uuid::Uuid;

mod common;

use common::{
    FakeProvider, account, block_deletes, database, engine, engine_on, engine_with_provider,
    register,
};

#[tokio::test]
async fn budget_names_are_unique_per_owner() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    engine.create_budget("Household", alice.id).await.unwrap();
    let err = engine
        .create_budget("  household ", alice.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("household".to_string()));

    engine.create_budget("Household", bob.id).await.unwrap();
}

#[tokio::test]
async fn empty_budget_name_is_rejected() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;

    let err = engine.create_budget("   ", alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn only_the_owner_deletes_a_budget() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let admin = register(&engine, "admin").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .add_role(owner.id, budget.id, admin.id, "Full Rights")
        .await
        .unwrap();

    let err = engine.delete_budget(budget.id, admin.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine
        .delete_budget(Uuid::new_v4(), owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn deleting_a_budget_removes_everything_scoped_to_it() {
    let provider = Arc::new(FakeProvider {
        accounts: vec![account("acc-1", "Checking", Some("Gold Standard"))],
        ..FakeProvider::default()
    });
    let engine = engine_with_provider(provider).await;
    let owner = register(&engine, "owner").await;
    let member = register(&engine, "member").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    let other = engine.create_budget("Other", owner.id).await.unwrap();

    engine
        .add_role(owner.id, budget.id, member.id, "View Rights")
        .await
        .unwrap();
    let groceries = engine
        .create_category(budget.id, "Groceries", owner.id)
        .await
        .unwrap();
    engine
        .categorize_transaction(budget.id, "WHOLE FOODS", "groceries", owner.id)
        .await
        .unwrap();
    engine
        .add_expense(
            NewExpense {
                budget_id: budget.id,
                name: "Food".to_string(),
                value: MoneyCents::new(40_000),
                charge_cycle: "monthly".to_string(),
                category_id: Some(groceries.id),
                categories: vec!["Groceries".to_string()],
                ..NewExpense::default()
            },
            owner.id,
        )
        .await
        .unwrap();
    let accounts = engine
        .link_external_accounts(owner.id, "public-sandbox")
        .await
        .unwrap();
    engine
        .create_source(budget.id, accounts[0].id, owner.id)
        .await
        .unwrap();
    engine
        .create_source(other.id, accounts[0].id, owner.id)
        .await
        .unwrap();

    engine.delete_budget(budget.id, owner.id).await.unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
    assert!(matches!(
        engine.list_expenses_for_budget(budget.id, owner.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.list_categories(budget.id, owner.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.list_sources(budget.id, owner.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.budget_expense_summary(budget.id, owner.id, today).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(!engine.is_viewer(budget.id, member.id).await.unwrap());
    assert!(!engine.is_owner(budget.id, owner.id).await.unwrap());

    // The account itself and its other links survive.
    assert_eq!(engine.list_external_accounts(owner.id).await.unwrap().len(), 1);
    assert_eq!(engine.list_sources(other.id, owner.id).await.unwrap().len(), 1);
    let budgets = engine.list_budgets(owner.id).await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].budget.id, other.id);
}

#[tokio::test]
async fn delete_all_expenses_is_owner_only() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let admin = register(&engine, "admin").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .add_role(owner.id, budget.id, admin.id, "Full Rights")
        .await
        .unwrap();
    for name in ["Rent", "Internet"] {
        engine
            .add_expense(
                NewExpense {
                    budget_id: budget.id,
                    name: name.to_string(),
                    value: MoneyCents::new(1_000),
                    charge_cycle: "monthly".to_string(),
                    ..NewExpense::default()
                },
                admin.id,
            )
            .await
            .unwrap();
    }

    let err = engine
        .delete_all_expenses_for_budget(budget.id, admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let removed = engine
        .delete_all_expenses_for_budget(budget.id, owner.id)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(
        engine
            .list_expenses_for_budget(budget.id, owner.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn failed_budget_delete_leaves_everything_in_place() {
    let provider = Arc::new(FakeProvider {
        accounts: vec![account("acc-1", "Checking", None)],
        ..FakeProvider::default()
    });
    let db = database().await;
    let engine = engine_on(db.clone(), provider).await;
    let owner = register(&engine, "owner").await;
    let member = register(&engine, "member").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .add_role(owner.id, budget.id, member.id, "View Rights")
        .await
        .unwrap();
    engine
        .create_category(budget.id, "Groceries", owner.id)
        .await
        .unwrap();
    engine
        .categorize_transaction(budget.id, "WHOLE FOODS", "Groceries", owner.id)
        .await
        .unwrap();
    engine
        .add_expense(
            NewExpense {
                budget_id: budget.id,
                name: "Food".to_string(),
                value: MoneyCents::new(40_000),
                charge_cycle: "monthly".to_string(),
                categories: vec!["Groceries".to_string()],
                ..NewExpense::default()
            },
            owner.id,
        )
        .await
        .unwrap();
    let accounts = engine
        .link_external_accounts(owner.id, "public-sandbox")
        .await
        .unwrap();
    engine
        .create_source(budget.id, accounts[0].id, owner.id)
        .await
        .unwrap();

    // Sources, mappings and expenses go first; the category step then fails.
    block_deletes(&db, "budget_transaction_categories").await;
    let err = engine.delete_budget(budget.id, owner.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));

    assert!(engine.is_owner(budget.id, owner.id).await.unwrap());
    assert!(engine.is_viewer(budget.id, member.id).await.unwrap());
    assert_eq!(engine.list_sources(budget.id, owner.id).await.unwrap().len(), 1);
    assert_eq!(
        engine
            .list_category_mappings(budget.id, owner.id)
            .await
            .unwrap()
            .len(),
        1
    );
    let expenses = engine
        .list_expenses_for_budget(budget.id, owner.id)
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].categories, vec!["Groceries"]);
    assert_eq!(engine.list_categories(budget.id, owner.id).await.unwrap().len(), 1);
}
