//! Uniform response envelope for paginated endpoints

use serde::{Deserialize, Serialize};

use crate::pagination::PaginationResponse;

/// Envelope returned by paginated endpoints
///
/// `status` is derived from `code`: `"error"` for 400 and above, `"success"`
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub code: u16,
    pub status: String,
    pub message: String,
    pub data: Option<T>,
    pub pagination: PaginationResponse,
}

impl<T> PaginatedResponse<T> {
    pub fn new(
        code: u16,
        message: impl Into<String>,
        data: Option<T>,
        pagination: PaginationResponse,
    ) -> Self {
        let status = if code >= 400 { "error" } else { "success" };
        Self {
            code,
            status: status.to_string(),
            message: message.into(),
            data,
            pagination,
        }
    }

    /// 200 with data
    pub fn success(message: impl Into<String>, data: T, pagination: PaginationResponse) -> Self {
        Self::new(200, message, Some(data), pagination)
    }

    /// Error envelope without data or page metadata
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::new(code, message, None, PaginationResponse::default())
    }

    pub fn is_success(&self) -> bool {
        self.code < 400
    }
}
