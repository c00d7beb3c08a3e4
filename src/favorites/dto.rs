use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::FavoriteStock;
use crate::error::ApiError;

pub const MAX_SYMBOL_CHARS: usize = 10;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Create payload. Any client-supplied owner field is simply not read; the
/// stored owner is always the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct CreateFavoriteRequest {
    pub stock_symbol: String,
}

impl CreateFavoriteRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.stock_symbol.is_empty() {
            return Err(ApiError::Validation("Stock symbol is required".into()));
        }
        if self.stock_symbol.chars().count() > MAX_SYMBOL_CHARS {
            return Err(ApiError::Validation(format!(
                "Stock symbol must be at most {MAX_SYMBOL_CHARS} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteStockResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub stock_symbol: String,
    #[serde(with = "time::serde::rfc3339")]
    pub added_on: OffsetDateTime,
}

impl From<FavoriteStock> for FavoriteStockResponse {
    fn from(row: FavoriteStock) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            stock_symbol: row.stock_symbol,
            added_on: row.added_on,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteListResponse {
    pub count: i64,
    pub results: Vec<FavoriteStockResponse>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}
