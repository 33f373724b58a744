pub mod memory_patron_repository;
pub mod okapi_patron_repository;

use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::patrons::dto::{AutomatedBlockDto, ManualBlockDto, PatronDto, ProxyForDto};
use crate::patrons::identifiers::IdentifierQuery;

pub(crate) const AWAITING_PICKUP: &str = "Open - Awaiting pickup";

#[async_trait]
pub(crate) trait PatronRepository: Sync + Send {
    async fn query_users(&self, query: &IdentifierQuery, limit: usize) -> LibraryResult<PaginatedResult<PatronDto>>;
    async fn find_users_by_ids(&self, ids: &[String]) -> LibraryResult<Vec<PatronDto>>;
    // relationships in which `proxy_user_id` acts for a sponsor
    async fn find_proxies_for(&self, proxy_user_id: &str) -> LibraryResult<Vec<ProxyForDto>>;
    async fn find_manual_blocks(&self, user_id: &str) -> LibraryResult<Vec<ManualBlockDto>>;
    async fn find_automated_blocks(&self, user_id: &str) -> LibraryResult<Vec<AutomatedBlockDto>>;
    async fn delete_manual_block(&self, id: &str) -> LibraryResult<()>;
    async fn count_awaiting_pickup(&self, user_id: &str) -> LibraryResult<usize>;
}
