//! Initial schema migration.
//!
//! - `users`: identity-provider users
//! - `budgets`: spending contexts owned by users
//! - `budget_roles`: shared access to budgets
//! - `expense_charge_cycles`: recurrence catalog (seeded separately)
//! - `budget_transaction_categories`: categories per budget
//! - `expenses`: recurring expenses declared on a budget
//! - `budget_expense_transaction_categories`: expense tags
//! - `category_transaction_mappings`: bank description to category rules
//! - `external_accounts`: provider-linked bank accounts
//! - `budget_transaction_sources`: budget to external account links

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    ExternalId,
    FirstName,
    LastName,
    Email,
    Phone,
    RegistrationDate,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    OwnerId,
    Name,
}

#[derive(Iden)]
enum BudgetRoles {
    Table,
    BudgetId,
    UserId,
    Role,
}

#[derive(Iden)]
pub(crate) enum ExpenseChargeCycles {
    Table,
    Id,
    Unit,
    Days,
}

#[derive(Iden)]
enum BudgetTransactionCategories {
    Table,
    Id,
    BudgetId,
    Name,
    NameNorm,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    BudgetId,
    Name,
    ValueMinor,
    Description,
    ChargeCycleId,
    CategoryId,
}

#[derive(Iden)]
enum BudgetExpenseTransactionCategories {
    Table,
    ExpenseId,
    CategoryId,
}

#[derive(Iden)]
enum CategoryTransactionMappings {
    Table,
    Id,
    BudgetId,
    CategoryId,
    TransactionName,
    CreatedAt,
}

#[derive(Iden)]
enum ExternalAccounts {
    Table,
    Id,
    UserId,
    InstitutionalId,
    AccessToken,
    AccountName,
}

#[derive(Iden)]
enum BudgetTransactionSources {
    Table,
    Id,
    BudgetId,
    ExternalAccountId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).blob().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::ExternalId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(
                        ColumnDef::new(Users::RegistrationDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::OwnerId).blob().not_null())
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-owner_id")
                            .from(Budgets::Table, Budgets::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-owner_id-name-unique")
                    .table(Budgets::Table)
                    .col(Budgets::OwnerId)
                    .col(Budgets::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Budget roles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BudgetRoles::BudgetId).blob().not_null())
                    .col(ColumnDef::new(BudgetRoles::UserId).blob().not_null())
                    .col(ColumnDef::new(BudgetRoles::Role).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(BudgetRoles::BudgetId)
                            .col(BudgetRoles::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_roles-budget_id")
                            .from(BudgetRoles::Table, BudgetRoles::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_roles-user_id")
                            .from(BudgetRoles::Table, BudgetRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_roles-user_id")
                    .table(BudgetRoles::Table)
                    .col(BudgetRoles::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Charge cycles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseChargeCycles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseChargeCycles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseChargeCycles::Unit)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ExpenseChargeCycles::Days).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetTransactionCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetTransactionCategories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetTransactionCategories::BudgetId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetTransactionCategories::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetTransactionCategories::NameNorm)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_transaction_categories-budget_id")
                            .from(
                                BudgetTransactionCategories::Table,
                                BudgetTransactionCategories::BudgetId,
                            )
                            .to(Budgets::Table, Budgets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_transaction_categories-budget_id-name_norm-unique")
                    .table(BudgetTransactionCategories::Table)
                    .col(BudgetTransactionCategories::BudgetId)
                    .col(BudgetTransactionCategories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Expenses and tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::BudgetId).blob().not_null())
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::ValueMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(ColumnDef::new(Expenses::ChargeCycleId).integer().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).blob())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-budget_id")
                            .from(Expenses::Table, Expenses::BudgetId)
                            .to(Budgets::Table, Budgets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-charge_cycle_id")
                            .from(Expenses::Table, Expenses::ChargeCycleId)
                            .to(ExpenseChargeCycles::Table, ExpenseChargeCycles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(
                                BudgetTransactionCategories::Table,
                                BudgetTransactionCategories::Id,
                            ),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-budget_id")
                    .table(Expenses::Table)
                    .col(Expenses::BudgetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetExpenseTransactionCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetExpenseTransactionCategories::ExpenseId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetExpenseTransactionCategories::CategoryId)
                            .blob()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BudgetExpenseTransactionCategories::ExpenseId)
                            .col(BudgetExpenseTransactionCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_expense_transaction_categories-expense_id")
                            .from(
                                BudgetExpenseTransactionCategories::Table,
                                BudgetExpenseTransactionCategories::ExpenseId,
                            )
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_expense_transaction_categories-category_id")
                            .from(
                                BudgetExpenseTransactionCategories::Table,
                                BudgetExpenseTransactionCategories::CategoryId,
                            )
                            .to(
                                BudgetTransactionCategories::Table,
                                BudgetTransactionCategories::Id,
                            ),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Category mappings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CategoryTransactionMappings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryTransactionMappings::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CategoryTransactionMappings::BudgetId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategoryTransactionMappings::CategoryId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategoryTransactionMappings::TransactionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategoryTransactionMappings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_transaction_mappings-budget_id")
                            .from(
                                CategoryTransactionMappings::Table,
                                CategoryTransactionMappings::BudgetId,
                            )
                            .to(Budgets::Table, Budgets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_transaction_mappings-category_id")
                            .from(
                                CategoryTransactionMappings::Table,
                                CategoryTransactionMappings::CategoryId,
                            )
                            .to(
                                BudgetTransactionCategories::Table,
                                BudgetTransactionCategories::Id,
                            ),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-category_transaction_mappings-budget_id-name-unique")
                    .table(CategoryTransactionMappings::Table)
                    .col(CategoryTransactionMappings::BudgetId)
                    .col(CategoryTransactionMappings::TransactionName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. External accounts and sources
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExternalAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalAccounts::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExternalAccounts::UserId).blob().not_null())
                    .col(
                        ColumnDef::new(ExternalAccounts::InstitutionalId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalAccounts::AccessToken)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalAccounts::AccountName)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-external_accounts-user_id")
                            .from(ExternalAccounts::Table, ExternalAccounts::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetTransactionSources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetTransactionSources::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetTransactionSources::BudgetId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetTransactionSources::ExternalAccountId)
                            .blob()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_transaction_sources-budget_id")
                            .from(
                                BudgetTransactionSources::Table,
                                BudgetTransactionSources::BudgetId,
                            )
                            .to(Budgets::Table, Budgets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_transaction_sources-external_account_id")
                            .from(
                                BudgetTransactionSources::Table,
                                BudgetTransactionSources::ExternalAccountId,
                            )
                            .to(ExternalAccounts::Table, ExternalAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_transaction_sources-budget_id-account-unique")
                    .table(BudgetTransactionSources::Table)
                    .col(BudgetTransactionSources::BudgetId)
                    .col(BudgetTransactionSources::ExternalAccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(BudgetTransactionSources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExternalAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(CategoryTransactionMappings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(BudgetExpenseTransactionCategories::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(BudgetTransactionCategories::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseChargeCycles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
