use async_recursion::async_recursion;
use async_trait::async_trait;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::items::domain::ItemService;
use crate::items::dto::ItemDto;
use crate::items::repository::{ItemQuery, ItemRepository};

pub(crate) struct ItemServiceImpl {
    chunk_size: usize,
    item_repository: Box<dyn ItemRepository>,
}

impl ItemServiceImpl {
    pub(crate) fn new(config: &Configuration, item_repository: Box<dyn ItemRepository>) -> Self {
        Self {
            chunk_size: config.item_chunk_size.max(1),
            item_repository,
        }
    }

    #[async_recursion]
    async fn fetch_from(&self, query: &ItemQuery, offset: usize, mut found: Vec<ItemDto>) -> LibraryResult<Vec<ItemDto>> {
        let page = self.item_repository.query_items(query, offset, self.chunk_size).await?;
        let next = page.next_offset();
        found.extend(page.records);
        match next {
            Some(next) => self.fetch_from(query, next, found).await,
            None => Ok(found),
        }
    }
}

#[async_trait]
impl ItemService for ItemServiceImpl {
    async fn find_items_by_barcode(&self, barcode: &str, wildcard: bool) -> LibraryResult<Vec<ItemDto>> {
        let query = ItemQuery::new(barcode, wildcard);
        let items = self.fetch_from(&query, 0, vec![]).await?;
        tracing::debug!(barcode = %barcode, wildcard = wildcard, found = items.len(), "item lookup");
        Ok(items)
    }
}
