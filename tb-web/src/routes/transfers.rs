//! Transfer routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use tb_engine::Transfer;

use crate::api::{
    parse_hex_id, ApiBatchFailure, ApiTransfer, CreateBatchResponse, CreateTransferRequest,
    TransfersResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// `POST /transfers`
pub async fn create_transfers(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<CreateTransferRequest>>,
) -> Result<Json<CreateBatchResponse>, AppError> {
    let transfers = requests
        .iter()
        .map(Transfer::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let results = state.engine.lock().unwrap().create_transfers(&transfers);

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

/// `GET /transfers?ids=<comma-separated hex ids>`
pub async fn lookup_transfers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<TransfersResponse>, AppError> {
    let ids = query
        .ids
        .split(',')
        .filter(|s| !s.is_empty())
        .map(parse_hex_id)
        .collect::<Result<Vec<_>, _>>()?;

    let transfers = state.engine.lock().unwrap().lookup_transfers(&ids);

    Ok(Json(TransfersResponse {
        transfers: transfers.iter().map(ApiTransfer::from).collect(),
    }))
}

/// `GET /transfers/:id`
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiTransfer>, AppError> {
    let id = parse_hex_id(&id)?;
    let transfers = state.engine.lock().unwrap().lookup_transfers(&[id]);

    transfers
        .first()
        .map(|t| Json(ApiTransfer::from(t)))
        .ok_or_else(|| AppError::NotFound(format!("transfer {:032x} not found", id)))
}
