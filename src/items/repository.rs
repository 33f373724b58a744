pub mod memory_item_repository;
pub mod okapi_item_repository;

use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::items::dto::ItemDto;
use crate::utils::cql;

// ItemQuery matches items by barcode, optionally right-truncated.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct ItemQuery {
    pub barcode: String,
    pub wildcard: bool,
}

impl ItemQuery {
    pub(crate) fn new(barcode: &str, wildcard: bool) -> Self {
        Self {
            barcode: barcode.trim().to_string(),
            wildcard,
        }
    }

    pub(crate) fn to_cql(&self) -> String {
        if self.wildcard {
            cql::prefix("barcode", self.barcode.as_str())
        } else {
            cql::exact("barcode", self.barcode.as_str())
        }
    }

    pub(crate) fn matches(&self, item: &ItemDto) -> bool {
        match item.barcode.as_deref() {
            Some(barcode) if self.wildcard => barcode.starts_with(self.barcode.as_str()),
            Some(barcode) => barcode == self.barcode,
            None => false,
        }
    }
}

#[async_trait]
pub(crate) trait ItemRepository: Sync + Send {
    async fn query_items(&self, query: &ItemQuery, offset: usize, limit: usize) -> LibraryResult<PaginatedResult<ItemDto>>;
}
