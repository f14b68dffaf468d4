use actix_web::http::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::repos::crud::PagedList;

pub const X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

/// Paging summary sent in the `X-Pagination` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaginationMetaData {
    pub total_count: u64,
    pub page_size: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

impl PaginationMetaData {
    pub fn from_paged<T>(list: &PagedList<T>) -> Self {
        Self {
            total_count: list.total_count,
            page_size: list.page_size,
            current_page: list.current_page,
            total_pages: list.total_pages,
        }
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        serde_json::to_string(self)
            .ok()
            .and_then(|json| HeaderValue::from_str(&json).ok())
    }
}
