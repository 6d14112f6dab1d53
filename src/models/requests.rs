//! Request DTOs for the notification hub API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::store::MAX_TASK_LENGTH;

/// Request body for creating an item (POST /api/todos)
///
/// # Fields
/// - `task`: Description of the task
/// - `deadline`: RFC 3339 timestamp the task is due at
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    /// The task description
    pub task: String,
    /// When the task is due
    pub deadline: DateTime<Utc>,
}

impl CreateItemRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.task.trim().is_empty() {
            return Some("Task cannot be empty".to_string());
        }
        if self.task.len() > MAX_TASK_LENGTH {
            return Some(format!(
                "Task exceeds maximum length of {} bytes",
                MAX_TASK_LENGTH
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_request_deserialize() {
        let json = r#"{"task": "write docs", "deadline": "2026-03-01T10:30:00Z"}"#;
        let req: CreateItemRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.task, "write docs");
        assert_eq!(
            req.deadline,
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_create_request_with_offset() {
        let json = r#"{"task": "call", "deadline": "2026-03-01T12:30:00+02:00"}"#;
        let req: CreateItemRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req.deadline,
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_create_request_rejects_bad_deadline() {
        let json = r#"{"task": "call", "deadline": "tomorrow"}"#;
        assert!(serde_json::from_str::<CreateItemRequest>(json).is_err());
    }

    #[test]
    fn test_validate_empty_task() {
        let req = CreateItemRequest {
            task: "   ".to_string(),
            deadline: Utc::now(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_task_too_long() {
        let req = CreateItemRequest {
            task: "x".repeat(MAX_TASK_LENGTH + 1),
            deadline: Utc::now(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = CreateItemRequest {
            task: "valid".to_string(),
            deadline: Utc::now(),
        };
        assert!(req.validate().is_none());
    }
}
