use serde::Serialize;

use crate::error::ApiError;

pub const DEFAULT_ITEMS_PER_PAGE: i64 = 20;
pub const MAX_ITEMS_PER_PAGE: i64 = 100;

/// A validated page request: `page >= 1`, `1 <= items_per_page <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub items_per_page: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_count: i64,
    pub total_page: i64,
    pub current_page: i64,
    pub items_per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.items_per_page)
    }

    pub fn take(&self) -> i64 {
        self.items_per_page
    }

    pub fn total_page(&self, total_count: i64) -> i64 {
        (total_count + self.items_per_page - 1) / self.items_per_page
    }

    /// Builds the page metadata, or fails with 404 when the requested page
    /// does not exist. An empty listing still has a (blank) first page.
    pub fn meta(&self, total_count: i64) -> Result<PageMeta, ApiError> {
        let total_page = self.total_page(total_count);
        let out_of_range = if total_count > 0 {
            self.page > total_page
        } else {
            self.page > 1
        };
        if out_of_range {
            return Err(ApiError::NotFound(format!("Page {} not found", self.page)));
        }

        Ok(PageMeta {
            total_count,
            total_page,
            current_page: self.page,
            items_per_page: self.items_per_page,
            has_next: self.page < total_page,
            has_previous: self.page > 1,
        })
    }
}
