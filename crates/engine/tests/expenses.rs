use engine::{EngineError, ExpenseUpdate, MoneyCents, NewExpense};
use uuid::Uuid;

mod common;

use common::{engine, register};

fn rent(budget_id: Uuid) -> NewExpense {
    NewExpense {
        budget_id,
        name: "Rent".to_string(),
        value: MoneyCents::new(120_000),
        description: Some("flat".to_string()),
        charge_cycle: "monthly".to_string(),
        ..NewExpense::default()
    }
}

#[tokio::test]
async fn listed_expenses_carry_their_charge_cycle() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    let mut ids = Vec::new();
    for (name, cycle) in [("Rent", "monthly"), ("Gym", "weekly"), ("Insurance", "yearly")] {
        let expense = engine
            .add_expense(
                NewExpense {
                    name: name.to_string(),
                    charge_cycle: cycle.to_string(),
                    ..rent(budget.id)
                },
                owner.id,
            )
            .await
            .unwrap();
        ids.push((expense.id, cycle));
    }
    ids.sort();

    let listed = engine
        .list_expenses_for_budget(budget.id, owner.id)
        .await
        .unwrap();
    let seen: Vec<_> = listed
        .iter()
        .map(|e| (e.id, e.charge_cycle.unit.as_str()))
        .collect();
    assert_eq!(seen, ids);

    let yearly = listed
        .iter()
        .find(|e| e.charge_cycle.unit == "yearly")
        .unwrap();
    assert_eq!(yearly.charge_cycle.days, 365);
    assert_eq!(
        engine.resolve_cycle_unit(yearly.charge_cycle.id).await.unwrap(),
        "yearly"
    );
}

#[tokio::test]
async fn unknown_charge_cycle_is_a_client_error() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    let err = engine
        .add_expense(
            NewExpense {
                charge_cycle: "fortnightly".to_string(),
                ..rent(budget.id)
            },
            owner.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "expense_charge_cycle fortnightly is not valid");

    assert!(matches!(
        engine.resolve_cycle_id("fortnightly").await,
        Err(EngineError::KeyNotFound(_))
    ));
    let units: Vec<_> = engine
        .list_cycles()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.unit)
        .collect();
    assert_eq!(
        units,
        vec!["daily", "weekly", "biweekly", "monthly", "quarterly", "yearly"]
    );
}

#[tokio::test]
async fn viewers_cannot_add_expenses_but_admins_can() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let viewer = register(&engine, "viewer").await;
    let admin = register(&engine, "admin").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .add_role(owner.id, budget.id, viewer.id, "View Rights")
        .await
        .unwrap();
    engine
        .add_role(owner.id, budget.id, admin.id, "Full Rights")
        .await
        .unwrap();

    let err = engine
        .add_expense(rent(budget.id), viewer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let expense = engine.add_expense(rent(budget.id), admin.id).await.unwrap();
    assert_eq!(expense.value, MoneyCents::new(120_000));

    // Viewers still read.
    let listed = engine
        .list_expenses_for_budget(budget.id, viewer.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let fetched = engine
        .get_expense_for_user(expense.id, viewer.id)
        .await
        .unwrap();
    assert_eq!(fetched, expense);
}

#[tokio::test]
async fn missing_budget_is_reported_before_authorization() {
    let engine = engine().await;
    let outsider = register(&engine, "outsider").await;

    let err = engine
        .add_expense(rent(Uuid::new_v4()), outsider.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn tags_must_name_existing_categories() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .create_category(budget.id, "Housing", owner.id)
        .await
        .unwrap();

    let err = engine
        .add_expense(
            NewExpense {
                categories: vec!["Housing".to_string(), "Leisure".to_string()],
                ..rent(budget.id)
            },
            owner.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownCategory("Leisure".to_string()));
    assert!(
        engine
            .list_expenses_for_budget(budget.id, owner.id)
            .await
            .unwrap()
            .is_empty()
    );

    let expense = engine
        .add_expense(
            NewExpense {
                categories: vec!["housing".to_string(), "HOUSING".to_string()],
                ..rent(budget.id)
            },
            owner.id,
        )
        .await
        .unwrap();
    assert_eq!(expense.categories, vec!["Housing".to_string()]);
}

#[tokio::test]
async fn negative_values_are_rejected() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    let err = engine
        .add_expense(
            NewExpense {
                value: MoneyCents::new(-1),
                ..rent(budget.id)
            },
            owner.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn update_keeps_tags_unless_a_list_is_given() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    for name in ["Housing", "Utilities"] {
        engine
            .create_category(budget.id, name, owner.id)
            .await
            .unwrap();
    }
    let expense = engine
        .add_expense(
            NewExpense {
                categories: vec!["Housing".to_string()],
                ..rent(budget.id)
            },
            owner.id,
        )
        .await
        .unwrap();

    let updated = engine
        .update_expense(
            ExpenseUpdate {
                id: expense.id,
                name: "Rent and heating".to_string(),
                value: MoneyCents::new(130_000),
                description: None,
                charge_cycle: "quarterly".to_string(),
                categories: None,
            },
            owner.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Rent and heating");
    assert_eq!(updated.charge_cycle.unit, "quarterly");
    assert_eq!(updated.description, None);
    assert_eq!(updated.categories, vec!["Housing".to_string()]);

    let updated = engine
        .update_expense(
            ExpenseUpdate {
                id: expense.id,
                name: "Rent and heating".to_string(),
                value: MoneyCents::new(130_000),
                description: None,
                charge_cycle: "quarterly".to_string(),
                categories: Some(vec!["Utilities".to_string()]),
            },
            owner.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.categories, vec!["Utilities".to_string()]);
    assert_eq!(engine.get_expense(expense.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_is_authorized_against_the_expense_budget() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let intruder = register(&engine, "intruder").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .create_budget("Intruder budget", intruder.id)
        .await
        .unwrap();
    let expense = engine.add_expense(rent(budget.id), owner.id).await.unwrap();

    let err = engine
        .update_expense(
            ExpenseUpdate {
                id: expense.id,
                name: "Stolen".to_string(),
                value: MoneyCents::new(1),
                charge_cycle: "monthly".to_string(),
                ..ExpenseUpdate::default()
            },
            intruder.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine
        .update_expense(
            ExpenseUpdate {
                id: Uuid::new_v4(),
                name: "Ghost".to_string(),
                charge_cycle: "monthly".to_string(),
                ..ExpenseUpdate::default()
            },
            owner.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_expense_checks_budget_and_role() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let viewer = register(&engine, "viewer").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    let other = engine.create_budget("Other", owner.id).await.unwrap();
    engine
        .add_role(owner.id, budget.id, viewer.id, "View Rights")
        .await
        .unwrap();
    let expense = engine.add_expense(rent(budget.id), owner.id).await.unwrap();

    let err = engine
        .delete_expense(expense.id, other.id, owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .delete_expense(expense.id, budget.id, viewer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    engine
        .delete_expense(expense.id, budget.id, owner.id)
        .await
        .unwrap();
    assert!(matches!(
        engine.get_expense(expense.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
