use async_trait::async_trait;
use serde::Deserialize;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::items::dto::ItemDto;
use crate::items::repository::{ItemQuery, ItemRepository};
use crate::utils::okapi::OkapiClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsPage {
    #[serde(default)]
    items: Vec<ItemDto>,
    #[serde(default)]
    total_records: Option<usize>,
}

pub(crate) struct OkapiItemRepository {
    client: OkapiClient,
}

impl OkapiItemRepository {
    pub(crate) fn new(client: OkapiClient) -> Self {
        Self {
            client,
        }
    }
}

#[async_trait]
impl ItemRepository for OkapiItemRepository {
    async fn query_items(&self, query: &ItemQuery, offset: usize, limit: usize) -> LibraryResult<PaginatedResult<ItemDto>> {
        let page: ItemsPage = self.client.get_json("/inventory/items", &[
            ("query", query.to_cql()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ]).await?;
        Ok(PaginatedResult::new(offset, limit, page.total_records, page.items))
    }
}
