pub mod blocks;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::core::library::LibraryResult;
use crate::patrons::dto::{PatronBlock, PatronDto};
use crate::patrons::identifiers::IdentifierQuery;

#[async_trait]
pub(crate) trait PatronService: Sync + Send {
    async fn find_patrons(&self, query: &IdentifierQuery) -> LibraryResult<Vec<PatronDto>>;
    // sponsors `proxy_user_id` may currently borrow for
    async fn find_sponsors(&self, proxy_user_id: &str, now: DateTime<Utc>) -> LibraryResult<Vec<PatronDto>>;
    // manual and automated blocks of the patron; the manual ones survive a failed
    // automated lookup
    async fn find_blocks(&self, patron_id: &str) -> LibraryResult<Vec<PatronBlock>>;
    async fn delete_block(&self, id: &str) -> LibraryResult<()>;
    async fn count_awaiting_pickup(&self, patron_id: &str) -> LibraryResult<usize>;
}
