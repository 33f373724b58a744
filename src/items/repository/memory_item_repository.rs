use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::items::dto::ItemDto;
use crate::items::repository::{ItemQuery, ItemRepository};
use crate::utils::memory::MemoryCirculation;

pub(crate) struct MemoryItemRepository {
    backend: Arc<MemoryCirculation>,
}

impl MemoryItemRepository {
    pub(crate) fn new(backend: Arc<MemoryCirculation>) -> Self {
        Self {
            backend,
        }
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn query_items(&self, query: &ItemQuery, offset: usize, limit: usize) -> LibraryResult<PaginatedResult<ItemDto>> {
        self.backend.query_items(query, offset, limit)
    }
}
