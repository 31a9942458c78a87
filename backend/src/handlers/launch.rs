//! HTTP handlers for purchase stock launch endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use shared::{LaunchRow, ReferenceOptions, RowEdit};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::{CurrentUser, PERMISSION_LAUNCH, PERMISSION_REVERT};
use crate::services::{
    EditedRows, LaunchReceipt, LaunchSession, RevertReceipt, StatusReport, SubmitOutcome,
};
use crate::AppState;

/// Rows as currently held by the client; at most 1000 per request
#[derive(Debug, Deserialize, Validate)]
pub struct RowsInput {
    #[validate(length(max = 1000))]
    pub rows: Vec<LaunchRow>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditInput {
    #[validate(length(max = 1000))]
    pub rows: Vec<LaunchRow>,
    pub edit: RowEdit,
}

/// Open the launch flow for a purchase order
pub async fn open_launch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<LaunchSession>> {
    current_user.0.require(PERMISSION_LAUNCH)?;
    let session = state.launch.open(order_id).await?;
    Ok(Json(session))
}

/// Persist in-progress rows
pub async fn save_launch_draft(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<RowsInput>,
) -> AppResult<Json<EditedRows>> {
    current_user.0.require(PERMISSION_LAUNCH)?;
    input.validate()?;
    let saved = state.launch.save_draft(order_id, input.rows).await?;
    Ok(Json(saved))
}

/// Edit one field of one row
pub async fn edit_launch_row(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((order_id, index)): Path<(Uuid, usize)>,
    Json(input): Json<EditInput>,
) -> AppResult<Json<EditedRows>> {
    current_user.0.require(PERMISSION_LAUNCH)?;
    input.validate()?;
    let edited = state
        .launch
        .edit_row(order_id, input.rows, index, &input.edit)
        .await?;
    Ok(Json(edited))
}

/// Apply one field value to every row
pub async fn apply_to_all_rows(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<EditInput>,
) -> AppResult<Json<EditedRows>> {
    current_user.0.require(PERMISSION_LAUNCH)?;
    input.validate()?;
    let edited = state
        .launch
        .apply_to_all(order_id, input.rows, &input.edit)
        .await?;
    Ok(Json(edited))
}

/// Submit the batch
pub async fn submit_launch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<RowsInput>,
) -> AppResult<Json<LaunchReceipt>> {
    current_user.0.require(PERMISSION_LAUNCH)?;
    input.validate()?;
    match state
        .launch
        .submit(order_id, input.rows, &current_user.0.name)
        .await?
    {
        SubmitOutcome::Launched(receipt) => Ok(Json(receipt)),
        SubmitOutcome::Rejected { error, rows } => Err(AppError::LaunchRejected { error, rows }),
    }
}

/// Revert a launch
pub async fn revert_launch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<RevertReceipt>> {
    current_user.0.require(PERMISSION_REVERT)?;
    let receipt = state.launch.revert(order_id, &current_user.0.name).await?;
    Ok(Json(receipt))
}

/// Get derived stock status for a purchase order
pub async fn get_stock_status(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<StatusReport>> {
    let report = state.launch.status(order_id).await?;
    Ok(Json(report))
}

/// Condition, location and warranty lists
pub async fn get_launch_options(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ReferenceOptions>> {
    let options = state.launch.options().await?;
    Ok(Json(options))
}
