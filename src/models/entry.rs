use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::EntryResponse;

/// Attendance category. Priority entries are always placed ahead of
/// normal entries, FIFO within each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    #[serde(rename = "P")]
    #[sqlx(rename = "P")]
    Priority,
    #[serde(rename = "N")]
    #[sqlx(rename = "N")]
    Normal,
}

impl Category {
    /// Parse user input into a category. Accepts the one-letter code or the
    /// spelled-out name, case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "P" | "PRIORITY" => Some(Category::Priority),
            "N" | "NORMAL" => Some(Category::Normal),
            _ => None,
        }
    }

    /// Canonical one-letter code, as persisted and exposed over the API.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Priority => "P",
            Category::Normal => "N",
        }
    }
}

/// Queue entry model (database entity)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueEntry {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub arrival_time: DateTime<Utc>,
    /// 1-based rank while waiting; 0 once called or before the first
    /// renumbering pass.
    pub position: i64,
    pub served: bool,
}

impl QueueEntry {
    /// Create a new waiting entry. The position stays at the 0 placeholder
    /// until the renumbering pass assigns the real rank.
    pub fn new(name: String, category: Category) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category,
            arrival_time: Utc::now(),
            position: 0,
            served: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.served
    }

    /// Convert to response (without storage id)
    pub fn to_response(&self) -> EntryResponse {
        EntryResponse {
            position: self.position,
            name: self.name.clone(),
            category: self.category,
            arrival_time: self.arrival_time,
        }
    }
}
