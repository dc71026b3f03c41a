//! Account routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use tb_engine::Account;

use crate::api::{
    parse_hex_id, AccountsResponse, ApiAccount, ApiBatchFailure, ApiTransfer,
    CreateAccountRequest, CreateBatchResponse, TransfersResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// `POST /accounts`
pub async fn create_accounts(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<CreateAccountRequest>>,
) -> Result<Json<CreateBatchResponse>, AppError> {
    let accounts = requests
        .iter()
        .map(Account::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let results = state.engine.lock().unwrap().create_accounts(&accounts);

    let failures = results
        .into_iter()
        .map(|r| ApiBatchFailure {
            index: r.index,
            result: format!("{:?}", r.result),
        })
        .collect();

    Ok(Json(CreateBatchResponse { failures }))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    ids: String,
}

/// `GET /accounts?ids=<comma-separated hex ids>`
pub async fn lookup_accounts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<AccountsResponse>, AppError> {
    let ids = query
        .ids
        .split(',')
        .filter(|s| !s.is_empty())
        .map(parse_hex_id)
        .collect::<Result<Vec<_>, _>>()?;

    let accounts = state.engine.lock().unwrap().lookup_accounts(&ids);

    Ok(Json(AccountsResponse {
        accounts: accounts.iter().map(ApiAccount::from).collect(),
    }))
}

/// `GET /accounts/:id`
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiAccount>, AppError> {
    let id = parse_hex_id(&id)?;
    let accounts = state.engine.lock().unwrap().lookup_accounts(&[id]);

    accounts
        .first()
        .map(|a| Json(ApiAccount::from(a)))
        .ok_or_else(|| AppError::NotFound(format!("account {:032x} not found", id)))
}

#[derive(Debug, Deserialize)]
pub struct AccountTransfersQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

/// `GET /accounts/:id/transfers`
pub async fn get_account_transfers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<AccountTransfersQuery>,
) -> Result<Json<TransfersResponse>, AppError> {
    let id = parse_hex_id(&id)?;
    let transfers = state
        .engine
        .lock()
        .unwrap()
        .account_transfers(id, query.limit);

    Ok(Json(TransfersResponse {
        transfers: transfers.iter().map(ApiTransfer::from).collect(),
    }))
}
