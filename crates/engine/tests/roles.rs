use engine::{BudgetRole, EngineError};
use uuid::Uuid;

mod common;

use common::{engine, register};

#[tokio::test]
async fn only_the_owner_can_grant_roles() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let admin = register(&engine, "admin").await;
    let outsider = register(&engine, "outsider").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    engine
        .add_role(owner.id, budget.id, admin.id, "Full Rights")
        .await
        .unwrap();

    let err = engine
        .add_role(admin.id, budget.id, outsider.id, "View Rights")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .add_role(outsider.id, budget.id, outsider.id, "Full Rights")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    assert!(!engine.is_admin(budget.id, outsider.id).await.unwrap());
    assert!(!engine.is_viewer(budget.id, outsider.id).await.unwrap());
}

#[tokio::test]
async fn role_names_are_normalized_and_upserted() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let member = register(&engine, "member").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    let granted = engine
        .add_role(owner.id, budget.id, member.id, "full RIGHTS")
        .await
        .unwrap();
    assert_eq!(granted.role, BudgetRole::Admin);
    assert!(engine.is_admin(budget.id, member.id).await.unwrap());
    assert!(!engine.is_viewer(budget.id, member.id).await.unwrap());

    let granted = engine
        .add_role(owner.id, budget.id, member.id, "read only please")
        .await
        .unwrap();
    assert_eq!(granted.role, BudgetRole::Viewer);
    assert!(engine.is_viewer(budget.id, member.id).await.unwrap());
    assert!(!engine.is_admin(budget.id, member.id).await.unwrap());

    let roles = engine.list_roles(budget.id, owner.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role, BudgetRole::Viewer);
}

#[tokio::test]
async fn owner_predicate_does_not_need_a_role_row() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    assert!(engine.is_owner(budget.id, owner.id).await.unwrap());
    assert!(!engine.is_admin(budget.id, owner.id).await.unwrap());
    assert!(!engine.is_owner(Uuid::new_v4(), owner.id).await.unwrap());
}

#[tokio::test]
async fn grants_require_existing_budget_and_member() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();

    let err = engine
        .add_role(owner.id, Uuid::new_v4(), owner.id, "Full Rights")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .add_role(owner.id, budget.id, Uuid::new_v4(), "Full Rights")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .add_role(owner.id, budget.id, owner.id, "View Rights")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRole(_)));
}

#[tokio::test]
async fn removed_members_lose_access() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let member = register(&engine, "member").await;
    let budget = engine.create_budget("Home", owner.id).await.unwrap();
    engine
        .add_role(owner.id, budget.id, member.id, "View Rights")
        .await
        .unwrap();

    let err = engine
        .remove_role(budget.id, member.id, member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .remove_role(budget.id, member.id, owner.id)
        .await
        .unwrap();
    assert!(!engine.is_viewer(budget.id, member.id).await.unwrap());
    let err = engine
        .list_expenses_for_budget(budget.id, member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn list_budgets_includes_shared_budgets_with_role() {
    let engine = engine().await;
    let owner = register(&engine, "owner").await;
    let member = register(&engine, "member").await;
    let shared = engine.create_budget("Shared", owner.id).await.unwrap();
    engine.create_budget("Private", owner.id).await.unwrap();
    let own = engine.create_budget("Allowance", member.id).await.unwrap();
    engine
        .add_role(owner.id, shared.id, member.id, "Full Rights")
        .await
        .unwrap();

    let budgets = engine.list_budgets(member.id).await.unwrap();
    let seen: Vec<_> = budgets
        .iter()
        .map(|access| (access.budget.id, access.role))
        .collect();
    assert_eq!(
        seen,
        vec![(own.id, BudgetRole::Owner), (shared.id, BudgetRole::Admin)]
    );
}
