//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Largest page size a listing will return
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Default page size for inventory listings
pub const DEFAULT_INVENTORY_PAGE_LIMIT: u32 = 100;

/// Default page size for sales listings
pub const DEFAULT_SALES_PAGE_LIMIT: u32 = 10;

/// Standard success envelope returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Resolve raw query values; missing or zero values fall back to page 1
    /// and `default_limit`, and the limit is capped at [`MAX_PAGE_LIMIT`].
    pub fn resolve(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_SALES_PAGE_LIMIT,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, pagination: &Pagination, total_items: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(pagination, total_items),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let limit = u64::from(pagination.limit.max(1));
        let total_pages = u32::try_from(total_items.div_ceil(limit)).unwrap_or(u32::MAX);
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Inclusive calendar date range for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if start > end {
            return Err("Start date must not be after end date");
        }
        Ok(Self { start, end })
    }
}
