use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::patrons::domain::PatronService;
use crate::patrons::dto::{PatronBlock, PatronDto};
use crate::patrons::identifiers::IdentifierQuery;
use crate::patrons::repository::PatronRepository;

pub(crate) struct PatronServiceImpl {
    lookup_limit: usize,
    patron_repository: Box<dyn PatronRepository>,
}

impl PatronServiceImpl {
    pub(crate) fn new(config: &Configuration, patron_repository: Box<dyn PatronRepository>) -> Self {
        PatronServiceImpl {
            lookup_limit: config.patron_lookup_limit,
            patron_repository,
        }
    }
}

#[async_trait]
impl PatronService for PatronServiceImpl {
    async fn find_patrons(&self, query: &IdentifierQuery) -> LibraryResult<Vec<PatronDto>> {
        let res = self.patron_repository.query_users(query, self.lookup_limit).await?;
        Ok(res.records)
    }

    async fn find_sponsors(&self, proxy_user_id: &str, now: DateTime<Utc>) -> LibraryResult<Vec<PatronDto>> {
        let proxies = self.patron_repository.find_proxies_for(proxy_user_id).await?;
        let sponsor_ids: Vec<String> = proxies.iter()
            .filter(|p| p.is_usable(now))
            .map(|p| p.user_id.to_string())
            .collect();
        if sponsor_ids.is_empty() {
            return Ok(vec![]);
        }
        let sponsors = self.patron_repository.find_users_by_ids(&sponsor_ids).await?;
        // keep relationship order
        Ok(sponsor_ids.iter()
            .filter_map(|id| sponsors.iter().find(|s| &s.id == id).cloned())
            .collect())
    }

    async fn find_blocks(&self, patron_id: &str) -> LibraryResult<Vec<PatronBlock>> {
        let manual = self.patron_repository.find_manual_blocks(patron_id).await?;
        let automated = match self.patron_repository.find_automated_blocks(patron_id).await {
            Ok(automated) => automated,
            Err(err) => {
                tracing::warn!(patron_id, error = %err, "failed to load automated blocks, using manual blocks only");
                vec![]
            }
        };
        let mut blocks: Vec<PatronBlock> = manual.iter().map(PatronBlock::from).collect();
        blocks.extend(automated.iter().map(|b| PatronBlock::from_automated(patron_id, b)));
        Ok(blocks)
    }

    async fn delete_block(&self, id: &str) -> LibraryResult<()> {
        self.patron_repository.delete_manual_block(id).await
    }

    async fn count_awaiting_pickup(&self, patron_id: &str) -> LibraryResult<usize> {
        self.patron_repository.count_awaiting_pickup(patron_id).await
    }
}
