use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::Category;

/// Enqueue request: the caller supplies a name and an attendance category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnqueueRequest {
    #[validate(custom(function = validate_name))]
    pub name: String,

    #[validate(custom(function = validate_category))]
    pub category: String,
}

/// Queue entry response. The storage id is internal and never exposed;
/// the position is the public identity of a waiting entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResponse {
    pub position: i64,
    pub name: String,
    pub category: Category,
    pub arrival_time: DateTime<Utc>,
}

/// Confirmation message response (call-next, remove)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("name_empty").with_message("Name must not be empty".into()));
    }
    if trimmed.chars().count() > 20 {
        return Err(ValidationError::new("name_too_long")
            .with_message("Name must be at most 20 characters".into()));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if Category::parse(category).is_none() {
        return Err(ValidationError::new("category_unknown")
            .with_message("Category must be P (priority) or N (normal)".into()));
    }
    Ok(())
}
