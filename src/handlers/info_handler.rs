use axum::extract::State;
use serde_json::{json, Value};

use crate::config::AppState;
use crate::interceptors::{ApiSuccess, AppError};

/// Root endpoint with service information and the endpoint map
pub async fn service_info(State(state): State<AppState>) -> Result<ApiSuccess<Value>, AppError> {
    let data = json!({
        "name": state.config.app_name,
        "version": state.config.app_version,
        "endpoints": {
            "GET /queue": "List all waiting entries",
            "GET /queue/{position}": "Get the entry at a position",
            "POST /queue": "Add a new entry to the queue",
            "PUT /queue": "Call the next entry for service",
            "DELETE /queue/{position}": "Remove the entry at a position",
        },
    });

    Ok(ApiSuccess::new("Walk-in service queue API", data))
}
