use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::patrons::dto::{AutomatedBlockDto, ManualBlockDto, PatronDto, ProxyForDto};
use crate::patrons::identifiers::IdentifierQuery;
use crate::patrons::repository::PatronRepository;
use crate::utils::memory::MemoryCirculation;

pub(crate) struct MemoryPatronRepository {
    backend: Arc<MemoryCirculation>,
}

impl MemoryPatronRepository {
    pub(crate) fn new(backend: Arc<MemoryCirculation>) -> Self {
        Self {
            backend,
        }
    }
}

#[async_trait]
impl PatronRepository for MemoryPatronRepository {
    async fn query_users(&self, query: &IdentifierQuery, limit: usize) -> LibraryResult<PaginatedResult<PatronDto>> {
        Ok(self.backend.query_users(query, limit))
    }

    async fn find_users_by_ids(&self, ids: &[String]) -> LibraryResult<Vec<PatronDto>> {
        Ok(self.backend.users_by_ids(ids))
    }

    async fn find_proxies_for(&self, proxy_user_id: &str) -> LibraryResult<Vec<ProxyForDto>> {
        Ok(self.backend.proxies_for(proxy_user_id))
    }

    async fn find_manual_blocks(&self, user_id: &str) -> LibraryResult<Vec<ManualBlockDto>> {
        Ok(self.backend.manual_blocks(user_id))
    }

    async fn find_automated_blocks(&self, user_id: &str) -> LibraryResult<Vec<AutomatedBlockDto>> {
        self.backend.automated_blocks(user_id)
    }

    async fn delete_manual_block(&self, id: &str) -> LibraryResult<()> {
        self.backend.delete_manual_block(id)
    }

    async fn count_awaiting_pickup(&self, user_id: &str) -> LibraryResult<usize> {
        Ok(self.backend.awaiting_pickup(user_id))
    }
}
