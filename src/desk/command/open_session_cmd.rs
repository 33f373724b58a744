use async_trait::async_trait;
use serde::Deserialize;
use crate::checkout::domain::overrides::StaffPermissions;
use crate::core::command::{Command, CommandError};
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::desk::domain::DeskOutcome;
use crate::desk::factory;
use crate::desk::registry::DeskRegistry;

pub(crate) struct OpenSessionCommand {
    config: Configuration,
    store: RepositoryStore,
    desks: DeskRegistry,
}

impl OpenSessionCommand {
    pub(crate) fn new(config: Configuration, store: RepositoryStore, desks: DeskRegistry) -> Self {
        Self {
            config,
            store,
            desks,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenSessionCommandRequest {
    // permissions of the staff member operating the desk
    #[serde(default)]
    pub(crate) permissions: Vec<String>,
}

pub(crate) type OpenSessionCommandResponse = DeskOutcome;

#[async_trait]
impl Command<OpenSessionCommandRequest, OpenSessionCommandResponse> for OpenSessionCommand {
    async fn execute(&self, req: OpenSessionCommandRequest) -> Result<OpenSessionCommandResponse, CommandError> {
        let mut desk = factory::create_checkout_desk(&self.config, self.store.clone()).await;
        let effects = desk.open(StaffPermissions::new(req.permissions)).await;
        let view = desk.view();
        let _ = self.desks.insert(desk);
        Ok(DeskOutcome::new(effects, view))
    }
}
