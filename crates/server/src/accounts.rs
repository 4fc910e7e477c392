//! External (bank) account endpoints

use api_types::account::{
    AccountDetailsView, AccountLink, AccountListResponse, AccountTransactionsResponse, AccountView,
    BalancesView, LinkTokenView, TransactionWindow,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, Local};
use engine::{AccountBalances, ExternalAccount, MoneyCents, ProviderAccount, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, summary::map_transaction};

/// Window used when the query leaves out `start`.
const DEFAULT_WINDOW_DAYS: i64 = 30;

fn map_account(account: ExternalAccount) -> AccountView {
    AccountView {
        id: account.id,
        institutional_id: account.institutional_id,
        account_name: account.account_name,
    }
}

fn split(amount: Option<MoneyCents>) -> (Option<String>, Option<i64>) {
    (amount.map(|a| a.to_string()), amount.map(MoneyCents::cents))
}

fn map_balances(balances: AccountBalances) -> BalancesView {
    let (available, available_minor) = split(balances.available);
    let (current, current_minor) = split(balances.current);
    let (limit, limit_minor) = split(balances.limit);
    BalancesView {
        available,
        available_minor,
        current,
        current_minor,
        limit,
        limit_minor,
        iso_currency_code: balances.iso_currency_code,
    }
}

fn map_details(id: Uuid, account: ProviderAccount) -> AccountDetailsView {
    AccountDetailsView {
        id,
        institutional_id: account.account_id,
        name: account.name,
        official_name: account.official_name,
        mask: account.mask,
        account_type: account.account_type,
        subtype: account.subtype,
        balances: map_balances(account.balances),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state
        .engine
        .list_external_accounts(user.id)
        .await?
        .into_iter()
        .map(map_account)
        .collect();

    Ok(Json(AccountListResponse { accounts }))
}

/// Start a Link session for the caller.
pub async fn link_token(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<LinkTokenView>), ServerError> {
    let link_token = state.engine.create_link_token(user.id).await?;
    Ok((StatusCode::CREATED, Json(LinkTokenView { link_token })))
}

/// Exchange a Link public token and register the granted accounts.
pub async fn link(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountLink>,
) -> Result<(StatusCode, Json<AccountListResponse>), ServerError> {
    let accounts = state
        .engine
        .link_external_accounts(user.id, &payload.public_token)
        .await?
        .into_iter()
        .map(map_account)
        .collect();

    Ok((StatusCode::CREATED, Json(AccountListResponse { accounts })))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_external_account(account_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountDetailsView>, ServerError> {
    let account = state
        .engine
        .account_information(account_id, user.id)
        .await?;
    Ok(Json(map_details(account_id, account)))
}

pub async fn balances(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountDetailsView>, ServerError> {
    let account = state.engine.account_balances(account_id, user.id).await?;
    Ok(Json(map_details(account_id, account)))
}

pub async fn transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Query(window): Query<TransactionWindow>,
) -> Result<Json<AccountTransactionsResponse>, ServerError> {
    let end = window.end.unwrap_or_else(|| Local::now().date_naive());
    let start = window
        .start
        .unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS));
    let transactions = state
        .engine
        .account_transactions(account_id, user.id, start, end)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(AccountTransactionsResponse { transactions }))
}
