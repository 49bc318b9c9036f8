//! Common DTO types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard success envelope wrapping a single payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Success indicator
    pub success: bool,
    /// The payload
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Generic paginated response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    /// Success indicator
    pub success: bool,
    /// Data items
    pub data: Vec<T>,
    /// Total count (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Current page
    pub page: i64,
    /// Items per page
    pub limit: i64,
    /// Has more items
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total: Option<i64>) -> Self {
        let has_more = total
            .map(|t| (page * limit) < t)
            .unwrap_or(data.len() as i64 >= limit);
        Self {
            success: true,
            data,
            total,
            page,
            limit,
            has_more,
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

impl PaginationParams {
    /// Get the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.clamped_limit(MAX_PAGE_SIZE)
    }

    /// Get the limit clamped to max
    pub fn clamped_limit(&self, max: i64) -> i64 {
        self.limit.min(max).max(1)
    }
}

/// Upper bound on page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Generic success response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Success indicator
    pub success: bool,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let params = PaginationParams { page: 1, limit: 10 };
        assert_eq!(params.offset(), 0);

        let params = PaginationParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_limit_clamped() {
        let params = PaginationParams { page: 1, limit: 10_000 };
        assert_eq!(params.clamped_limit(MAX_PAGE_SIZE), MAX_PAGE_SIZE);

        let params = PaginationParams { page: 1, limit: 0 };
        assert_eq!(params.clamped_limit(MAX_PAGE_SIZE), 1);
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_string(&ApiResponse::new(vec![1, 2])).unwrap();
        assert_eq!(body, r#"{"success":true,"data":[1,2]}"#);

        let body = serde_json::to_string(&PaginatedResponse::new(vec![1], 1, 10, Some(1))).unwrap();
        assert!(body.starts_with(r#"{"success":true"#));
    }

    #[test]
    fn test_paginated_response_has_more() {
        let response = PaginatedResponse::new(vec![1, 2, 3], 1, 10, Some(30));
        assert!(response.has_more);
        let response = PaginatedResponse::new(vec![1, 2, 3], 3, 10, Some(23));
        assert!(!response.has_more);
    }
}
