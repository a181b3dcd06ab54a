use axum::{
    extract::{Path, State},
    Json,
};

use crate::config::AppState;
use crate::dto::{EnqueueRequest, EntryResponse, MessageResponse};
use crate::interceptors::{ApiSuccess, AppError};
use crate::services::QueueService;

fn queue_service(state: &AppState) -> QueueService {
    QueueService::new(state.store.clone(), state.queue_lock.clone())
}

/// List all waiting entries ordered by position
pub async fn list_queue(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<EntryResponse>>, AppError> {
    let entries = queue_service(&state).list().await?;

    Ok(ApiSuccess::new("Queue retrieved successfully", entries))
}

/// Get the waiting entry at a 1-based position
pub async fn get_by_position(
    State(state): State<AppState>,
    Path(position): Path<u32>,
) -> Result<ApiSuccess<EntryResponse>, AppError> {
    let entry = queue_service(&state)
        .get_by_position(i64::from(position))
        .await?;

    Ok(ApiSuccess::new("Entry retrieved successfully", entry))
}

/// Add a new entry to the queue
pub async fn enqueue(
    State(state): State<AppState>,
    Json(request): Json<EnqueueRequest>,
) -> Result<ApiSuccess<EntryResponse>, AppError> {
    let entry = queue_service(&state).enqueue(request).await?;

    Ok(ApiSuccess::created("Entry added to the queue", entry))
}

/// Call the next entry for service
pub async fn call_next(
    State(state): State<AppState>,
) -> Result<ApiSuccess<MessageResponse>, AppError> {
    let confirmation = queue_service(&state).call_next().await?;

    Ok(ApiSuccess::new("Next entry called", confirmation))
}

/// Remove the entry at a 1-based position
pub async fn remove_by_position(
    State(state): State<AppState>,
    Path(position): Path<u32>,
) -> Result<ApiSuccess<MessageResponse>, AppError> {
    let confirmation = queue_service(&state)
        .remove_by_position(i64::from(position))
        .await?;

    Ok(ApiSuccess::new("Entry removed from the queue", confirmation))
}
