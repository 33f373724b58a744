use async_trait::async_trait;
use serde::Deserialize;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::patrons::dto::{AutomatedBlockDto, ManualBlockDto, PatronDto, ProxyForDto};
use crate::patrons::identifiers::IdentifierQuery;
use crate::patrons::repository::{AWAITING_PICKUP, PatronRepository};
use crate::utils::cql;
use crate::utils::okapi::OkapiClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersPage {
    #[serde(default)]
    users: Vec<PatronDto>,
    #[serde(default)]
    total_records: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxiesPage {
    #[serde(default)]
    proxies_for: Vec<ProxyForDto>,
}

#[derive(Debug, Deserialize)]
struct ManualBlocksPage {
    #[serde(default)]
    manualblocks: Vec<ManualBlockDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutomatedBlocksPage {
    #[serde(default)]
    automated_patron_blocks: Vec<AutomatedBlockDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestCount {
    #[serde(default)]
    total_records: usize,
}

pub(crate) struct OkapiPatronRepository {
    client: OkapiClient,
}

impl OkapiPatronRepository {
    pub(crate) fn new(client: OkapiClient) -> Self {
        Self {
            client,
        }
    }
}

pub(crate) fn awaiting_pickup_query(user_id: &str) -> String {
    cql::all_of(&[cql::exact("requesterId", user_id), cql::exact("status", AWAITING_PICKUP)])
}

#[async_trait]
impl PatronRepository for OkapiPatronRepository {
    async fn query_users(&self, query: &IdentifierQuery, limit: usize) -> LibraryResult<PaginatedResult<PatronDto>> {
        let page: UsersPage = self.client.get_json("/users", &[
            ("query", query.to_cql()),
            ("limit", limit.to_string()),
        ]).await?;
        Ok(PaginatedResult::new(0, limit, page.total_records, page.users))
    }

    async fn find_users_by_ids(&self, ids: &[String]) -> LibraryResult<Vec<PatronDto>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let clauses: Vec<String> = ids.iter().map(|id| cql::exact("id", id.as_str())).collect();
        let page: UsersPage = self.client.get_json("/users", &[
            ("query", cql::any_of(&clauses)),
            ("limit", ids.len().to_string()),
        ]).await?;
        Ok(page.users)
    }

    async fn find_proxies_for(&self, proxy_user_id: &str) -> LibraryResult<Vec<ProxyForDto>> {
        let page: ProxiesPage = self.client.get_json("/proxiesfor", &[
            ("query", cql::all_of(&[cql::exact("proxyUserId", proxy_user_id)])),
        ]).await?;
        Ok(page.proxies_for)
    }

    async fn find_manual_blocks(&self, user_id: &str) -> LibraryResult<Vec<ManualBlockDto>> {
        let page: ManualBlocksPage = self.client.get_json("/manualblocks", &[
            ("query", cql::all_of(&[cql::exact("userId", user_id)])),
            ("limit", "100".to_string()),
        ]).await?;
        Ok(page.manualblocks)
    }

    async fn find_automated_blocks(&self, user_id: &str) -> LibraryResult<Vec<AutomatedBlockDto>> {
        let page: AutomatedBlocksPage = self.client.get_json(
            format!("/automated-patron-blocks/{}", user_id).as_str(), &[]).await?;
        Ok(page.automated_patron_blocks)
    }

    async fn delete_manual_block(&self, id: &str) -> LibraryResult<()> {
        self.client.delete(format!("/manualblocks/{}", id).as_str()).await
    }

    async fn count_awaiting_pickup(&self, user_id: &str) -> LibraryResult<usize> {
        let res: RequestCount = self.client.get_json("/circulation/requests", &[
            ("query", awaiting_pickup_query(user_id)),
            ("limit", "0".to_string()),
        ]).await?;
        Ok(res.total_records)
    }
}
