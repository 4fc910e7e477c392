use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use chrono::NaiveDate;
use engine::{Engine, EngineError, MoneyCents, NewExpense, UNCATEGORIZED, User};
use uuid::Uuid;

mod common;

use common::{FakeProvider, account, bank_tx, engine, engine_with_provider, register};

fn may_31() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
}

fn bank() -> FakeProvider {
    FakeProvider {
        accounts: vec![
            account("acc-checking", "Checking", Some("Gold Standard")),
            account("acc-credit", "Credit Card", None),
        ],
        transactions: vec![
            bank_tx("acc-checking", "Uber 063015", 540, &["Travel", "Taxi"]),
            bank_tx("acc-checking", "Tectra Inc", 500, &["Food and Drink"]),
            bank_tx("acc-checking", "CD DEPOSIT .INITIAL.", -100_000, &["Transfer"]),
            bank_tx("acc-credit", "Uber 072515", 630, &["Travel", "Taxi"]),
            bank_tx("acc-credit", "AUTOMATIC PAYMENT", 2_078, &["Payment"]),
            bank_tx("acc-credit", "Madison Bicycle Shop", 50_000, &["Shops"]),
            bank_tx("acc-unlinked", "Touchstone Climbing", 7_839, &["Recreation"]),
        ],
        ..FakeProvider::default()
    }
}

/// Budget fed by both bank accounts of its owner.
async fn linked_budget(engine: &Engine) -> (User, Uuid) {
    let owner = register(engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    for linked in engine
        .link_external_accounts(owner.id, "public-owner")
        .await
        .unwrap()
    {
        engine
            .create_source(budget.id, linked.id, owner.id)
            .await
            .unwrap();
    }
    (owner, budget.id)
}

#[tokio::test]
async fn spend_is_bucketed_by_mapped_description() {
    let provider = Arc::new(bank());
    let engine = engine_with_provider(provider.clone()).await;
    let (owner, budget_id) = linked_budget(&engine).await;
    engine
        .create_category(budget_id, "Travel", owner.id)
        .await
        .unwrap();
    engine
        .create_category(budget_id, "Dining", owner.id)
        .await
        .unwrap();
    for (description, category) in [
        ("Uber 063015", "Travel"),
        ("Uber 072515", "Travel"),
        ("Tectra Inc", "Dining"),
    ] {
        engine
            .categorize_transaction(budget_id, description, category, owner.id)
            .await
            .unwrap();
    }
    let rent = engine
        .add_expense(
            NewExpense {
                budget_id,
                name: "Rent".to_string(),
                value: MoneyCents::new(120_000),
                charge_cycle: "monthly".to_string(),
                ..NewExpense::default()
            },
            owner.id,
        )
        .await
        .unwrap();

    let summary = engine
        .budget_expense_summary(budget_id, owner.id, may_31())
        .await
        .unwrap();

    let totals: Vec<_> = summary
        .categories
        .iter()
        .map(|c| (c.category_name.as_str(), c.running_total.cents()))
        .collect();
    assert_eq!(
        totals,
        vec![("Dining", 500), ("Travel", 1_170), (UNCATEGORIZED, 50_000)]
    );
    let uncategorized = &summary.categories[2];
    assert_eq!(uncategorized.transactions.len(), 1);
    assert_eq!(uncategorized.transactions[0].name, "Madison Bicycle Shop");
    assert!(
        summary
            .categories
            .iter()
            .flat_map(|c| &c.transactions)
            .all(|tx| tx.account_id != "acc-unlinked")
    );
    assert_eq!(summary.expenses, vec![rent]);

    assert_eq!(provider.transaction_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *provider.last_window.lock().unwrap(),
        Some((NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), may_31()))
    );
}

#[tokio::test]
async fn unmapped_spend_lands_in_uncategorized() {
    let engine = engine_with_provider(Arc::new(bank())).await;
    let (owner, budget_id) = linked_budget(&engine).await;

    let summary = engine
        .budget_expense_summary(budget_id, owner.id, may_31())
        .await
        .unwrap();
    assert_eq!(summary.categories.len(), 1);
    assert_eq!(summary.categories[0].category_name, UNCATEGORIZED);
    assert_eq!(
        summary.categories[0].running_total,
        MoneyCents::new(540 + 500 + 630 + 50_000)
    );
}

#[tokio::test]
async fn budgets_without_sources_need_no_provider() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    let summary = engine
        .budget_expense_summary(budget.id, owner.id, may_31())
        .await
        .unwrap();
    assert_eq!(summary.categories.len(), 1);
    assert_eq!(summary.categories[0].running_total, MoneyCents::ZERO);
    assert!(summary.categories[0].transactions.is_empty());
    assert!(summary.expenses.is_empty());
}

#[tokio::test]
async fn summary_is_limited_to_writers() {
    let engine = engine_with_provider(Arc::new(bank())).await;
    let (owner, budget_id) = linked_budget(&engine).await;
    let viewer = register(&engine, "viewer").await;
    let admin = register(&engine, "admin").await;
    engine
        .add_role(owner.id, budget_id, viewer.id, "View Rights")
        .await
        .unwrap();
    engine
        .add_role(owner.id, budget_id, admin.id, "Full Rights")
        .await
        .unwrap();

    assert!(matches!(
        engine
            .budget_expense_summary(budget_id, viewer.id, may_31())
            .await,
        Err(EngineError::Forbidden(_))
    ));
    engine
        .budget_expense_summary(budget_id, admin.id, may_31())
        .await
        .unwrap();
    assert!(matches!(
        engine
            .budget_expense_summary(Uuid::new_v4(), owner.id, may_31())
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn provider_failure_aborts_the_summary() {
    let provider = Arc::new(bank());
    let engine = engine_with_provider(provider.clone()).await;
    let (owner, budget_id) = linked_budget(&engine).await;
    provider.failing.store(true, Ordering::SeqCst);

    let err = engine
        .budget_expense_summary(budget_id, owner.id, may_31())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DependencyUnavailable(_)));
    assert_eq!(provider.transaction_calls.load(Ordering::SeqCst), 1);

    // The store stays usable after the failed call.
    assert_eq!(engine.list_sources(budget_id, owner.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let provider = Arc::new(FakeProvider {
        delay: Some(Duration::from_secs(2)),
        ..bank()
    });
    let engine = engine_with_provider(provider).await;
    let (owner, budget_id) = linked_budget(&engine).await;

    let err = engine
        .budget_expense_summary(budget_id, owner.id, may_31())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DependencyUnavailable(_)));
}
