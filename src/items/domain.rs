pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::items::dto::ItemDto;

#[async_trait]
pub(crate) trait ItemService: Sync + Send {
    // every item matching `barcode`, fetched page by page until a short page
    async fn find_items_by_barcode(&self, barcode: &str, wildcard: bool) -> LibraryResult<Vec<ItemDto>>;
}
