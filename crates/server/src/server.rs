use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    IdentityError, IdentityVerifier, ServerError, accounts, budgets, categories, expenses, roles,
    sources, summary, user,
};
use engine::{Engine, EngineError, User};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// External id of a verified caller that may not be registered yet.
#[derive(Clone, Debug)]
pub(crate) struct ExternalId(pub String);

async fn verified_external_id(
    state: &ServerState,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<String, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthenticated(
            "missing bearer token".to_string(),
        ));
    };
    state
        .verifier
        .verify(bearer.token())
        .await
        .map_err(|err| match err {
            IdentityError::InvalidToken => ServerError::Unauthenticated(err.to_string()),
            IdentityError::Unavailable(reason) => ServerError::IdentityUnavailable(reason),
        })
}

/// Verifies the token only. Used by registration and profile lookup.
async fn identify(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let external_id = verified_external_id(&state, bearer).await?;
    request.extensions_mut().insert(ExternalId(external_id));
    Ok(next.run(request).await)
}

/// Verifies the token and resolves the registered [`User`].
async fn auth(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let external_id = verified_external_id(&state, bearer).await?;
    let user: User = match state.engine.user_by_external_id(&external_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            return Err(ServerError::Unauthenticated(
                "user is not registered".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let bootstrap = Router::new()
        .route("/user/register", post(user::register))
        .route("/user/profile", get(user::profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify));

    let api = Router::new()
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/{budget_id}", delete(budgets::delete))
        .route(
            "/budgets/{budget_id}/roles",
            get(roles::list).post(roles::add),
        )
        .route("/budgets/{budget_id}/roles/{user_id}", delete(roles::remove))
        .route(
            "/budgets/{budget_id}/expenses",
            get(expenses::list)
                .post(expenses::create)
                .delete(expenses::delete_all),
        )
        .route(
            "/budgets/{budget_id}/expenses/{expense_id}",
            delete(expenses::delete),
        )
        .route(
            "/expenses/{expense_id}",
            get(expenses::get).put(expenses::update),
        )
        .route("/charge-cycles", get(expenses::charge_cycles))
        .route(
            "/budgets/{budget_id}/sources",
            get(sources::list).post(sources::create),
        )
        .route("/sources/{source_id}", delete(sources::delete))
        .route(
            "/budgets/{budget_id}/categories",
            get(categories::list).post(categories::create),
        )
        .route("/categories/{category_id}", delete(categories::delete))
        .route(
            "/budgets/{budget_id}/category-mappings",
            get(categories::list_mappings).post(categories::categorize),
        )
        .route("/budgets/{budget_id}/summary", get(summary::get))
        .route("/accounts", get(accounts::list))
        .route("/accounts/link", post(accounts::link))
        .route("/accounts/link-token", post(accounts::link_token))
        .route(
            "/accounts/{account_id}",
            get(accounts::get).delete(accounts::delete),
        )
        .route("/accounts/{account_id}/balances", get(accounts::balances))
        .route(
            "/accounts/{account_id}/transactions",
            get(accounts::transactions),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    bootstrap.merge(api).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    verifier: Arc<dyn IdentityVerifier>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        verifier,
    };

    axum::serve(listener, router(state)).await
}
