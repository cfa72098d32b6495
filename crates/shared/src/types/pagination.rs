//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Largest page size served.
    pub const MAX_PER_PAGE: u32 = 100;

    /// Page number, treating 0 as the first page.
    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page.max(1)
    }

    /// Items per page, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, Self::MAX_PER_PAGE)
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number() - 1) * self.limit()
    }

    /// Returns the limit for database queries, capped at 100.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size())
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if total == 0 || per_page == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };

        Self {
            data,
            meta: PageMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Creates a response describing the page the query actually served.
    #[must_use]
    pub fn for_request(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self::new(data, request.page_number(), request.page_size(), total)
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
