//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains all request/response structures used by the API.

pub mod card;
pub mod student;

// Re-export commonly used types
pub use card::*;
pub use student::*;

use serde::Serialize;

/// Generic success response envelope
///
/// Every JSON endpoint answers with `{success, message, data?}`. The source
/// service's cosmetic `code` field is intentionally not carried over.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}
